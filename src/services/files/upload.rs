use actix_multipart::Multipart;
use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{FileService, receive_upload};
use crate::models::{ApiResponse, ErrorCode, files::responses::FileUploadResponse};
use crate::services::access::current_user;
use crate::services::error_response;

pub async fn handle_upload(
    service: &FileService,
    request: &HttpRequest,
    payload: Multipart,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };

    let upload = match receive_upload(payload).await {
        Ok(upload) => upload,
        Err(resp) => return Ok(resp),
    };

    let storage = service.get_storage(request);
    match storage
        .upload_file(
            &upload.token,
            &upload.file_name,
            upload.size,
            &upload.extension,
            user.id,
        )
        .await
    {
        Ok(file) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            FileUploadResponse {
                token: file.token,
                file_name: file.file_name,
                size: file.file_size,
                content_type: file.file_type,
                uploaded_at: file.uploaded_at,
            },
            "File uploaded successfully",
        ))),
        Err(e) => {
            upload.discard();
            Ok(error_response(&e, ErrorCode::FileUploadFailed))
        }
    }
}
