use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::UserService;
use crate::models::{ApiResponse, ErrorCode, users::responses::UserResponse};
use crate::services::{error_response, not_found};

pub async fn get_user(
    service: &UserService,
    user_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let user = match storage.get_user_by_id(user_id).await {
        Ok(Some(user)) => user,
        Ok(None) => return Ok(not_found(ErrorCode::UserNotFound, "User not found")),
        Err(e) => return Ok(error_response(&e, ErrorCode::UserNotFound)),
    };

    let profile_number = match storage.get_profile_number(&user).await {
        Ok(number) => number,
        Err(e) => return Ok(error_response(&e, ErrorCode::UserNotFound)),
    };

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        UserResponse {
            user,
            profile_number,
        },
        "User retrieved successfully",
    )))
}
