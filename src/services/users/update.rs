use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::UserService;
use crate::models::{
    ApiResponse, ErrorCode,
    users::{
        entities::UserRole,
        requests::{UpdateUserRequest, UserUpdate},
        responses::UserResponse,
    },
};
use crate::services::{bad_request, error_response, forget_cached_user, not_found};
use crate::utils::password::hash_password;
use crate::utils::validate::{validate_email, validate_name, validate_password};

pub async fn update_user(
    service: &UserService,
    user_id: i64,
    update_data: UpdateUserRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let email = update_data.email.map(|e| e.trim().to_lowercase());
    if let Some(ref email) = email {
        if let Err(msg) = validate_email(email) {
            return Ok(bad_request(ErrorCode::UserEmailInvalid, msg));
        }
        match storage.get_user_by_email(email).await {
            Ok(Some(other)) if other.id != user_id => {
                return Ok(HttpResponse::Conflict().json(ApiResponse::error_empty(
                    ErrorCode::UserEmailAlreadyExists,
                    "Email already exists",
                )));
            }
            Ok(_) => {}
            Err(e) => return Ok(error_response(&e, ErrorCode::UserUpdateFailed)),
        }
    }

    for (field, value) in [
        ("first_name", &update_data.first_name),
        ("last_name", &update_data.last_name),
    ] {
        if let Some(value) = value
            && let Err(msg) = validate_name(field, value)
        {
            return Ok(bad_request(ErrorCode::UserNameInvalid, msg));
        }
    }

    if update_data.role == Some(UserRole::Applicant) {
        return Ok(bad_request(
            ErrorCode::BadRequest,
            "Users cannot be turned back into applicants",
        ));
    }

    let password_hash = match update_data.password {
        Some(ref password) => {
            if let Err(msg) = validate_password(password) {
                return Ok(bad_request(ErrorCode::UserPasswordInvalid, msg));
            }
            match hash_password(password) {
                Ok(hash) => Some(hash),
                Err(e) => return Ok(error_response(&e, ErrorCode::UserUpdateFailed)),
            }
        }
        None => None,
    };

    let update = UserUpdate {
        email,
        password_hash,
        role: update_data.role,
        status: update_data.status,
        first_name: update_data.first_name.map(|s| s.trim().to_string()),
        last_name: update_data.last_name.map(|s| s.trim().to_string()),
    };

    let user = match storage.update_user(user_id, update).await {
        Ok(Some(user)) => user,
        Ok(None) => return Ok(not_found(ErrorCode::UserNotFound, "User not found")),
        Err(e) => return Ok(error_response(&e, ErrorCode::UserUpdateFailed)),
    };

    forget_cached_user(request, user_id).await;
    let profile_number = storage.get_profile_number(&user).await.unwrap_or_default();

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        UserResponse {
            user,
            profile_number,
        },
        "User updated successfully",
    )))
}
