//! 业务逻辑层
//!
//! 每个领域一个 `XService`（路由里以懒加载单例持有），具体操作拆在子模块中。
//! 服务函数直接返回 `HttpResponse`，业务错误通过 [`error_response`] 映射为统一响应体。

pub mod access;
pub mod alerts;
pub mod announcements;
pub mod applicants;
pub mod assignments;
pub mod attendance;
pub mod auth;
pub mod classes;
pub mod files;
pub mod grades;
pub mod materials;
pub mod parents;
pub mod quizzes;
pub mod sections;
pub mod submissions;
pub mod users;

pub use alerts::AlertService;
pub use announcements::AnnouncementService;
pub use applicants::ApplicantService;
pub use assignments::AssignmentService;
pub use attendance::AttendanceService;
pub use auth::AuthService;
pub use classes::ClassService;
pub use files::FileService;
pub use grades::GradeService;
pub use materials::MaterialService;
pub use parents::ParentService;
pub use quizzes::QuizService;
pub use sections::SectionService;
pub use submissions::SubmissionService;
pub use users::UserService;

use actix_web::{HttpRequest, HttpResponse, http::StatusCode, web};
use std::sync::Arc;
use tracing::error;

use crate::cache::ObjectCache;
use crate::errors::SchoolSystemError;
use crate::models::{ApiResponse, ErrorCode};
use crate::storage::Storage;

/// 生成带 `new_lazy` / `get_storage` 的服务结构体
macro_rules! define_service {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        pub struct $name {
            storage: Option<std::sync::Arc<dyn $crate::storage::Storage>>,
        }

        impl $name {
            pub fn new_lazy() -> Self {
                Self { storage: None }
            }

            pub(crate) fn get_storage(
                &self,
                request: &actix_web::HttpRequest,
            ) -> std::sync::Arc<dyn $crate::storage::Storage> {
                match &self.storage {
                    Some(storage) => storage.clone(),
                    None => $crate::services::storage_from(request),
                }
            }
        }
    };
}
pub(crate) use define_service;

pub(crate) fn storage_from(request: &HttpRequest) -> Arc<dyn Storage> {
    request
        .app_data::<web::Data<Arc<dyn Storage>>>()
        .expect("Storage not found in app data")
        .get_ref()
        .clone()
}

pub(crate) fn cache_from(request: &HttpRequest) -> Option<Arc<dyn ObjectCache>> {
    request
        .app_data::<web::Data<Arc<dyn ObjectCache>>>()
        .map(|cache| cache.get_ref().clone())
}

/// 清除会话用户缓存，角色、状态、邮箱变化后调用
pub(crate) async fn forget_cached_user(request: &HttpRequest, user_id: i64) {
    if let Some(cache) = cache_from(request) {
        cache.remove(&crate::cache::user_key(user_id)).await;
    }
}

/// 按错误的 HTTP 状态码返回统一响应体；5xx 记录日志并隐藏细节
pub(crate) fn error_response(err: &SchoolSystemError, code: ErrorCode) -> HttpResponse {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    if !err.is_client_error() {
        error!("{}", err);
        return HttpResponse::build(status).json(ApiResponse::error_empty(
            ErrorCode::InternalServerError,
            "Internal server error",
        ));
    }

    HttpResponse::build(status).json(ApiResponse::error_empty(code, err.message()))
}

pub(crate) fn bad_request(code: ErrorCode, message: impl Into<String>) -> HttpResponse {
    HttpResponse::BadRequest().json(ApiResponse::error_empty(code, message))
}

pub(crate) fn not_found(code: ErrorCode, message: impl Into<String>) -> HttpResponse {
    HttpResponse::NotFound().json(ApiResponse::error_empty(code, message))
}

pub(crate) fn forbidden(code: ErrorCode, message: impl Into<String>) -> HttpResponse {
    HttpResponse::Forbidden().json(ApiResponse::error_empty(code, message))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_response_maps_status() {
        let resp = error_response(
            &SchoolSystemError::conflict("Applicant already approved"),
            ErrorCode::ApplicantAlreadyApproved,
        );
        assert_eq!(resp.status(), StatusCode::CONFLICT);

        let resp = error_response(
            &SchoolSystemError::database_operation("disk I/O error"),
            ErrorCode::ApplicantAlreadyApproved,
        );
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
