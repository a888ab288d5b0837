use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::ApplicantService;
use crate::models::{
    ApiResponse, ErrorCode,
    applicants::{
        entities::Gender,
        requests::{NewApplication, SignupRequest},
        responses::SignupResponse,
    },
};
use crate::services::{bad_request, error_response};
use crate::utils::password::hash_password;
use crate::utils::random_code::generate_reference_code;
use crate::utils::validate::{
    format_date, validate_birthdate, validate_email, validate_name, validate_password,
};

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

pub async fn handle_signup(
    service: &ApplicantService,
    signup: SignupRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let email = signup.email.trim().to_lowercase();

    if let Err(msg) = validate_email(&email) {
        return Ok(bad_request(ErrorCode::UserEmailInvalid, msg));
    }
    if let Err(msg) = validate_password(&signup.password) {
        return Ok(bad_request(ErrorCode::UserPasswordInvalid, msg));
    }
    for (field, value) in [
        ("first_name", &signup.first_name),
        ("last_name", &signup.last_name),
    ] {
        if let Err(msg) = validate_name(field, value) {
            return Ok(bad_request(ErrorCode::UserNameInvalid, msg));
        }
    }

    let gender = match signup.gender.trim().to_lowercase().parse::<Gender>() {
        Ok(gender) => gender,
        Err(_) => {
            return Ok(bad_request(
                ErrorCode::ApplicantGenderInvalid,
                "Gender must be 'male' or 'female'",
            ));
        }
    };

    let today = chrono::Utc::now().date_naive();
    let birthdate = match validate_birthdate(signup.birthdate.trim(), today) {
        Ok(date) => format_date(date),
        Err(msg) => return Ok(bad_request(ErrorCode::ApplicantBirthdateInvalid, msg)),
    };

    let password_hash = match hash_password(&signup.password) {
        Ok(hash) => hash,
        Err(e) => return Ok(error_response(&e, ErrorCode::RegisterFailed)),
    };

    let application = NewApplication {
        email,
        password_hash,
        first_name: signup.first_name.trim().to_string(),
        last_name: signup.last_name.trim().to_string(),
        reference_code: generate_reference_code(),
        application_type: signup.application_type,
        gender,
        birthdate,
        grade_level_applied: non_blank(signup.grade_level_applied),
        guardian_name: non_blank(signup.guardian_name),
        contact_number: non_blank(signup.contact_number),
        address: non_blank(signup.address),
        personal_info: non_blank(signup.personal_info),
    };

    let storage = service.get_storage(request);

    // 重复邮箱由存储层在事务内判定，返回 400
    match storage.create_application(application).await {
        Ok(detail) => {
            info!(
                "New application {} submitted by user {}",
                detail.applicant.applicant_number, detail.user.id
            );
            Ok(HttpResponse::Created().json(ApiResponse::success(
                SignupResponse {
                    applicant_number: detail.applicant.applicant_number,
                    reference_code: detail.applicant.reference_code,
                },
                "Application submitted successfully",
            )))
        }
        Err(e) => Ok(error_response(&e, ErrorCode::RegisterFailed)),
    }
}
