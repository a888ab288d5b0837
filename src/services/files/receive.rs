//! multipart 接收：唯一的 `file` 字段落盘为 `{upload.dir}/{token}.bin`，其余文本字段收集返回

use actix_multipart::Multipart;
use actix_web::HttpResponse;
use futures_util::{StreamExt, TryStreamExt};
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::errors::SchoolSystemError;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::bad_request;
use crate::storage::Storage;
use crate::utils::validate_magic_bytes;

const MAX_TEXT_FIELD: usize = 4096;

#[derive(Debug)]
pub struct ReceivedUpload {
    pub token: String,
    pub file_name: String,
    /// 带点的小写扩展名，如 ".pdf"
    pub extension: String,
    pub size: i64,
    pub fields: HashMap<String, String>,
    path: PathBuf,
}

impl ReceivedUpload {
    /// 后续步骤失败时删除已落盘的文件
    pub fn discard(&self) {
        if let Err(e) = fs::remove_file(&self.path) {
            tracing::warn!("Failed to remove orphan upload {}: {}", self.path.display(), e);
        }
    }
}

pub fn stored_path(upload_dir: &str, token: &str) -> PathBuf {
    Path::new(upload_dir).join(format!("{token}.bin"))
}

/// 删除文件记录及其落盘文件，失败只记日志
pub async fn remove_stored_file(storage: &Arc<dyn Storage>, upload_dir: &str, token: &str) {
    if let Err(e) = storage.delete_file(token).await {
        tracing::warn!("Failed to delete file record {}: {}", token, e);
    }
    let path = stored_path(upload_dir, token);
    if let Err(e) = fs::remove_file(&path)
        && e.kind() != std::io::ErrorKind::NotFound
    {
        tracing::warn!("Failed to remove stored file {}: {}", path.display(), e);
    }
}

fn file_error(e: impl std::fmt::Display, message: &str) -> HttpResponse {
    tracing::error!("{}", SchoolSystemError::file_operation(format!("{e}")));
    HttpResponse::InternalServerError()
        .json(ApiResponse::error_empty(ErrorCode::FileUploadFailed, message))
}

fn extension_of(file_name: &str) -> String {
    Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| format!(".{}", ext.to_lowercase()))
        .unwrap_or_default()
}

pub async fn receive_upload(mut payload: Multipart) -> Result<ReceivedUpload, HttpResponse> {
    let config = AppConfig::get();
    let upload_dir = &config.upload.dir;

    if !Path::new(upload_dir).exists()
        && let Err(e) = fs::create_dir_all(upload_dir)
    {
        return Err(file_error(e, "Failed to create upload directory"));
    }

    let mut fields = HashMap::new();
    let mut saved: Option<(String, String, String, i64, PathBuf)> = None;

    loop {
        let mut field = match payload.try_next().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                if let Some((.., ref path)) = saved {
                    let _ = fs::remove_file(path);
                }
                return Err(bad_request(
                    ErrorCode::BadRequest,
                    format!("Malformed multipart payload: {e}"),
                ));
            }
        };

        let content_disposition = field.content_disposition();
        let name = content_disposition
            .and_then(|cd| cd.get_name())
            .unwrap_or_default()
            .to_string();

        if name != "file" {
            let mut value = Vec::new();
            while let Some(chunk) = field.next().await {
                let Ok(data) = chunk else {
                    return Err(bad_request(ErrorCode::BadRequest, "Failed to read form field"));
                };
                value.extend_from_slice(&data);
                if value.len() > MAX_TEXT_FIELD {
                    return Err(bad_request(
                        ErrorCode::BadRequest,
                        format!("Form field '{name}' is too long"),
                    ));
                }
            }
            fields.insert(name, String::from_utf8_lossy(&value).trim().to_string());
            continue;
        }

        if let Some((.., ref path)) = saved {
            let _ = fs::remove_file(path);
            return Err(bad_request(
                ErrorCode::MultifileUploadNotAllowed,
                "Only one file can be uploaded at a time",
            ));
        }

        let file_name = content_disposition
            .and_then(|cd| cd.get_filename())
            .map(|s| s.to_string())
            .unwrap_or_default();
        let extension = extension_of(&file_name);

        if !config
            .upload
            .allowed_types
            .iter()
            .any(|t| t.to_lowercase() == extension)
        {
            return Err(bad_request(
                ErrorCode::FileTypeNotAllowed,
                "File type not allowed",
            ));
        }

        let token = Uuid::new_v4().to_string();
        let path = stored_path(upload_dir, &token);
        let mut file = match File::create(&path) {
            Ok(file) => file,
            Err(e) => return Err(file_error(e, "Failed to create file")),
        };

        let mut total_size: usize = 0;
        let mut first_chunk = true;
        while let Some(chunk) = field.next().await {
            let data = match chunk {
                Ok(data) => data,
                Err(e) => {
                    let _ = fs::remove_file(&path);
                    return Err(bad_request(
                        ErrorCode::FileUploadFailed,
                        format!("Failed to read upload: {e}"),
                    ));
                }
            };

            if first_chunk {
                first_chunk = false;
                if !validate_magic_bytes(&data, &extension) {
                    let _ = fs::remove_file(&path);
                    return Err(bad_request(
                        ErrorCode::FileTypeNotAllowed,
                        "File content does not match its extension",
                    ));
                }
            }

            total_size += data.len();
            if total_size > config.upload.max_size {
                let _ = fs::remove_file(&path);
                return Err(bad_request(
                    ErrorCode::FileSizeExceeded,
                    "File size exceeds the limit",
                ));
            }
            if let Err(e) = file.write_all(&data) {
                let _ = fs::remove_file(&path);
                return Err(file_error(e, "Failed to write file"));
            }
        }

        saved = Some((token, file_name, extension, total_size as i64, path));
    }

    let Some((token, file_name, extension, size, path)) = saved else {
        return Err(bad_request(
            ErrorCode::FileNotFound,
            "No file found in upload payload",
        ));
    };

    Ok(ReceivedUpload {
        token,
        file_name,
        extension,
        size,
        fields,
        path,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_is_lowercased_with_dot() {
        assert_eq!(extension_of("Report.PDF"), ".pdf");
        assert_eq!(extension_of("archive.tar.gz"), ".gz");
        assert_eq!(extension_of("README"), "");
    }

    #[test]
    fn test_stored_path_uses_token() {
        let path = stored_path("uploads", "abc");
        assert_eq!(path, Path::new("uploads").join("abc.bin"));
    }

    #[actix_web::test]
    async fn test_remove_stored_file_drops_record_and_disk_copy() {
        use crate::models::users::entities::UserRole;
        use crate::storage::sea_orm_storage::test_support::{memory_storage, new_user};

        let inner = memory_storage().await;
        let owner = inner
            .create_user_impl(new_user("s@school.test", UserRole::Student), None)
            .await
            .unwrap();
        let storage: Arc<dyn Storage> = Arc::new(inner);

        let dir = std::env::temp_dir().join(format!("uploads-{}", Uuid::new_v4()));
        fs::create_dir_all(&dir).unwrap();
        let upload_dir = dir.to_str().unwrap();
        let path = stored_path(upload_dir, "old-token");
        fs::write(&path, b"%PDF-1.4").unwrap();
        storage
            .upload_file("old-token", "v1.pdf", 8, ".pdf", owner.id)
            .await
            .unwrap();

        remove_stored_file(&storage, upload_dir, "old-token").await;

        assert!(!path.exists());
        assert!(storage.get_file_by_token("old-token").await.unwrap().is_none());

        // 已不存在时再删一次也不报错
        remove_stored_file(&storage, upload_dir, "old-token").await;
        fs::remove_dir_all(&dir).unwrap();
    }
}
