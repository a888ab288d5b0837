use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::UserService;
use crate::models::{
    ApiResponse, ErrorCode,
    users::{
        entities::{UserRole, UserStatus},
        requests::{CreateUserRequest, NewUser},
        responses::UserResponse,
    },
};
use crate::services::{bad_request, error_response};
use crate::utils::password::hash_password;
use crate::utils::validate::{validate_email, validate_name, validate_password};

pub async fn create_user(
    service: &UserService,
    user_data: CreateUserRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let email = user_data.email.trim().to_lowercase();

    if let Err(msg) = validate_email(&email) {
        return Ok(bad_request(ErrorCode::UserEmailInvalid, msg));
    }
    if let Err(msg) = validate_password(&user_data.password) {
        return Ok(bad_request(ErrorCode::UserPasswordInvalid, msg));
    }
    for (field, value) in [
        ("first_name", &user_data.first_name),
        ("last_name", &user_data.last_name),
    ] {
        if let Err(msg) = validate_name(field, value) {
            return Ok(bad_request(ErrorCode::UserNameInvalid, msg));
        }
    }
    // 申请人只能走报名流程
    if user_data.role == UserRole::Applicant {
        return Ok(bad_request(
            ErrorCode::BadRequest,
            "Applicant accounts are created through signup",
        ));
    }

    let storage = service.get_storage(request);

    match storage.get_user_by_email(&email).await {
        Ok(Some(_)) => {
            return Ok(HttpResponse::Conflict().json(ApiResponse::error_empty(
                ErrorCode::UserEmailAlreadyExists,
                "Email already exists",
            )));
        }
        Ok(None) => {}
        Err(e) => return Ok(error_response(&e, ErrorCode::UserCreationFailed)),
    }

    let password_hash = match hash_password(&user_data.password) {
        Ok(hash) => hash,
        Err(e) => return Ok(error_response(&e, ErrorCode::UserCreationFailed)),
    };

    let new_user = NewUser {
        email,
        password_hash,
        role: user_data.role,
        status: UserStatus::Active,
        first_name: user_data.first_name.trim().to_string(),
        last_name: user_data.last_name.trim().to_string(),
    };

    let user = match storage.create_user(new_user, user_data.phone).await {
        Ok(user) => user,
        Err(e) => return Ok(error_response(&e, ErrorCode::UserCreationFailed)),
    };
    let profile_number = storage.get_profile_number(&user).await.unwrap_or_default();

    info!("User {} created with role {}", user.id, user.role);

    Ok(HttpResponse::Created().json(ApiResponse::success(
        UserResponse {
            user,
            profile_number,
        },
        "User created successfully",
    )))
}
