//! 公告：管理员发布全校公告，任课教师发布课程公告

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use crate::models::{
    ApiResponse, ErrorCode,
    announcements::{
        requests::{AnnouncementListParams, CreateAnnouncementRequest},
        responses::AnnouncementListResponse,
    },
    users::entities::UserRole,
};
use crate::services::access::{class_for_member, class_for_staff, current_user};
use crate::services::{bad_request, error_response, forbidden, not_found};

super::define_service! {
    AnnouncementService
}

const MAX_TITLE_LEN: usize = 200;

fn validate_announcement(title: &str, content: &str) -> Result<(), String> {
    let title = title.trim();
    if title.is_empty() {
        return Err("title cannot be empty".to_string());
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(format!("title must be at most {MAX_TITLE_LEN} characters"));
    }
    if content.trim().is_empty() {
        return Err("content cannot be empty".to_string());
    }
    Ok(())
}

impl AnnouncementService {
    pub async fn create_announcement(
        &self,
        body: CreateAnnouncementRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        let user = match current_user(request) {
            Ok(user) => user,
            Err(resp) => return Ok(resp),
        };
        if let Err(msg) = validate_announcement(&body.title, &body.content) {
            return Ok(bad_request(ErrorCode::BadRequest, msg));
        }

        let storage = self.get_storage(request);
        match body.class_id {
            Some(class_id) => {
                if let Err(resp) = class_for_staff(&storage, &user, class_id).await {
                    return Ok(resp);
                }
            }
            None if user.role != UserRole::Admin => {
                return Ok(forbidden(
                    ErrorCode::Forbidden,
                    "Only administrators can post school-wide announcements",
                ));
            }
            None => {}
        }

        match storage
            .create_announcement(
                body.class_id,
                user.id,
                body.title.trim(),
                body.content.trim(),
            )
            .await
        {
            Ok(announcement) => Ok(HttpResponse::Created().json(ApiResponse::success(
                announcement,
                "Announcement created successfully",
            ))),
            Err(e) => Ok(error_response(&e, ErrorCode::InternalServerError)),
        }
    }

    /// 全校公告 + 指定课程的公告
    pub async fn list_announcements(
        &self,
        query: AnnouncementListParams,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        let user = match current_user(request) {
            Ok(user) => user,
            Err(resp) => return Ok(resp),
        };
        let storage = self.get_storage(request);
        if let Some(class_id) = query.class_id
            && let Err(resp) = class_for_member(&storage, &user, class_id).await
        {
            return Ok(resp);
        }

        match storage.list_announcements(query.class_id).await {
            Ok(items) => Ok(HttpResponse::Ok().json(ApiResponse::success(
                AnnouncementListResponse { items },
                "Announcements retrieved successfully",
            ))),
            Err(e) => Ok(error_response(&e, ErrorCode::InternalServerError)),
        }
    }

    /// 作者本人或管理员可以删除
    pub async fn delete_announcement(
        &self,
        announcement_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        let user = match current_user(request) {
            Ok(user) => user,
            Err(resp) => return Ok(resp),
        };
        let storage = self.get_storage(request);

        match storage.get_announcement_by_id(announcement_id).await {
            Ok(Some(announcement))
                if announcement.author_id == user.id || user.role == UserRole::Admin => {}
            Ok(Some(_)) => {
                return Ok(forbidden(
                    ErrorCode::Forbidden,
                    "You can only delete your own announcements",
                ));
            }
            Ok(None) => {
                return Ok(not_found(
                    ErrorCode::AnnouncementNotFound,
                    "Announcement not found",
                ));
            }
            Err(e) => return Ok(error_response(&e, ErrorCode::AnnouncementNotFound)),
        }

        match storage.delete_announcement(announcement_id).await {
            Ok(true) => Ok(HttpResponse::Ok().json(ApiResponse::success_empty(
                "Announcement deleted successfully",
            ))),
            Ok(false) => Ok(not_found(
                ErrorCode::AnnouncementNotFound,
                "Announcement not found",
            )),
            Err(e) => Ok(error_response(&e, ErrorCode::InternalServerError)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_announcement() {
        assert!(validate_announcement("Field trip", "Bring a packed lunch").is_ok());
        assert!(validate_announcement("  ", "body").is_err());
        assert!(validate_announcement("Title", " \n").is_err());
        assert!(validate_announcement(&"x".repeat(MAX_TITLE_LEN + 1), "body").is_err());
    }
}
