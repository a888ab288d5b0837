//! 学习资料：任课教师为课程挂上已上传的文件或外部链接

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use crate::models::{
    ApiResponse, ErrorCode,
    materials::{
        requests::{CreateMaterialRequest, MaterialListParams},
        responses::MaterialListResponse,
    },
};
use crate::services::access::{class_for_member, class_for_staff, current_user};
use crate::services::{bad_request, error_response, not_found};

super::define_service! {
    MaterialService
}

fn validate_material(body: &CreateMaterialRequest) -> Result<(), String> {
    if body.title.trim().is_empty() {
        return Err("title cannot be empty".to_string());
    }
    if body.file_token.is_none() && body.link_url.is_none() {
        return Err("Either file_token or link_url is required".to_string());
    }
    if let Some(url) = &body.link_url
        && !(url.starts_with("http://") || url.starts_with("https://"))
    {
        return Err("link_url must be an http(s) URL".to_string());
    }
    Ok(())
}

impl MaterialService {
    pub async fn create_material(
        &self,
        body: CreateMaterialRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        let user = match current_user(request) {
            Ok(user) => user,
            Err(resp) => return Ok(resp),
        };
        if let Err(msg) = validate_material(&body) {
            return Ok(bad_request(ErrorCode::BadRequest, msg));
        }

        let storage = self.get_storage(request);
        if let Err(resp) = class_for_staff(&storage, &user, body.class_id).await {
            return Ok(resp);
        }

        if let Some(token) = &body.file_token {
            match storage.get_file_by_token(token).await {
                Ok(Some(_)) => {}
                Ok(None) => return Ok(not_found(ErrorCode::FileNotFound, "File not found")),
                Err(e) => return Ok(error_response(&e, ErrorCode::FileNotFound)),
            }
        }

        match storage.create_material(body, user.id).await {
            Ok(material) => Ok(HttpResponse::Created().json(ApiResponse::success(
                material,
                "Learning material created successfully",
            ))),
            Err(e) => Ok(error_response(&e, ErrorCode::InternalServerError)),
        }
    }

    pub async fn list_materials(
        &self,
        query: MaterialListParams,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        let user = match current_user(request) {
            Ok(user) => user,
            Err(resp) => return Ok(resp),
        };
        let storage = self.get_storage(request);
        if let Err(resp) = class_for_member(&storage, &user, query.class_id).await {
            return Ok(resp);
        }

        match storage.list_materials(query.class_id).await {
            Ok(items) => Ok(HttpResponse::Ok().json(ApiResponse::success(
                MaterialListResponse { items },
                "Learning materials retrieved successfully",
            ))),
            Err(e) => Ok(error_response(&e, ErrorCode::InternalServerError)),
        }
    }

    pub async fn delete_material(
        &self,
        material_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        let user = match current_user(request) {
            Ok(user) => user,
            Err(resp) => return Ok(resp),
        };
        let storage = self.get_storage(request);

        let material = match storage.get_material_by_id(material_id).await {
            Ok(Some(material)) => material,
            Ok(None) => {
                return Ok(not_found(
                    ErrorCode::MaterialNotFound,
                    "Learning material not found",
                ));
            }
            Err(e) => return Ok(error_response(&e, ErrorCode::MaterialNotFound)),
        };
        if let Err(resp) = class_for_staff(&storage, &user, material.class_id).await {
            return Ok(resp);
        }

        match storage.delete_material(material.id).await {
            Ok(true) => Ok(HttpResponse::Ok().json(ApiResponse::success_empty(
                "Learning material deleted successfully",
            ))),
            Ok(false) => Ok(not_found(
                ErrorCode::MaterialNotFound,
                "Learning material not found",
            )),
            Err(e) => Ok(error_response(&e, ErrorCode::InternalServerError)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn material(file_token: Option<&str>, link_url: Option<&str>) -> CreateMaterialRequest {
        CreateMaterialRequest {
            class_id: 1,
            title: "Week 3 slides".to_string(),
            description: None,
            file_token: file_token.map(str::to_string),
            link_url: link_url.map(str::to_string),
        }
    }

    #[test]
    fn test_material_needs_file_or_link() {
        assert!(validate_material(&material(Some("abc"), None)).is_ok());
        assert!(validate_material(&material(None, Some("https://example.org/a.pdf"))).is_ok());
        assert!(validate_material(&material(None, None)).is_err());
        assert!(validate_material(&material(None, Some("javascript:alert(1)"))).is_err());
    }
}
