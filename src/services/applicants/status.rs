use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::ApplicantService;
use crate::models::{ApiResponse, ErrorCode, applicants::responses::ApplicantStatusResponse};
use crate::services::access::current_user;
use crate::services::{error_response, not_found};

/// 申请人（录取后为学生）查询自己的申请进度
pub async fn get_status(
    service: &ApplicantService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request);

    let applicant = match storage.get_applicant_by_user_id(user.id).await {
        Ok(Some(applicant)) => applicant,
        Ok(None) => {
            return Ok(not_found(
                ErrorCode::ApplicantNotFound,
                "No application found for this account",
            ));
        }
        Err(e) => return Ok(error_response(&e, ErrorCode::ApplicantNotFound)),
    };

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        ApplicantStatusResponse {
            status: applicant.status,
            reference_code: applicant.reference_code,
            applicant_number: applicant.applicant_number,
            application_type: applicant.application_type,
            created_at: applicant.created_at,
            updated_at: applicant.updated_at,
            rejection_reason: applicant.rejection_reason,
            user,
        },
        "Application status retrieved successfully",
    )))
}
