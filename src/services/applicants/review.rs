use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::ApplicantService;
use crate::models::{
    ApiResponse, ErrorCode,
    applicants::{
        entities::ApplicantStatus,
        requests::{ApproveApplicantRequest, RejectApplicantRequest, UpdateApplicantStatusRequest},
        responses::{
            ApproveApplicantResponse, ApprovedStudent, RejectApplicantResponse, RejectedApplicant,
        },
    },
};
use crate::services::{bad_request, error_response, forget_cached_user, not_found};

/// 进入审核中 / 候补
pub async fn update_status(
    service: &ApplicantService,
    applicant_id: i64,
    body: UpdateApplicantStatusRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    if !matches!(
        body.status,
        ApplicantStatus::UnderReview | ApplicantStatus::Waitlisted
    ) {
        return Ok(bad_request(
            ErrorCode::ApplicantStatusInvalid,
            "Status must be 'under_review' or 'waitlisted'; use approve or reject instead",
        ));
    }

    let storage = service.get_storage(request);

    match storage
        .update_applicant_review_status(applicant_id, body.status)
        .await
    {
        Ok(applicant) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            applicant,
            "Applicant status updated",
        ))),
        Err(e) => Ok(error_response(&e, status_error_code(e.status_code()))),
    }
}

pub async fn approve(
    service: &ApplicantService,
    applicant_id: i64,
    body: ApproveApplicantRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    // 先单独检查，给出具体的错误码；事务内还会再校验一次
    match storage.get_applicant_by_id(applicant_id).await {
        Ok(Some(detail)) if detail.applicant.status == ApplicantStatus::Approved => {
            return Ok(HttpResponse::Conflict().json(ApiResponse::error_empty(
                ErrorCode::ApplicantAlreadyApproved,
                "Applicant already approved",
            )));
        }
        Ok(Some(_)) => {}
        Ok(None) => return Ok(not_found(ErrorCode::ApplicantNotFound, "Applicant not found")),
        Err(e) => return Ok(error_response(&e, ErrorCode::ApplicantNotFound)),
    }
    match storage.get_parent_by_id(body.parent_id).await {
        Ok(Some(_)) => {}
        Ok(None) => return Ok(not_found(ErrorCode::ParentNotFound, "Parent not found")),
        Err(e) => return Ok(error_response(&e, ErrorCode::ParentNotFound)),
    }
    match storage.get_section_by_id(body.section_id).await {
        Ok(Some(_)) => {}
        Ok(None) => return Ok(not_found(ErrorCode::SectionNotFound, "Section not found")),
        Err(e) => return Ok(error_response(&e, ErrorCode::SectionNotFound)),
    }

    let outcome = match storage
        .approve_applicant(applicant_id, body.parent_id, body.section_id)
        .await
    {
        Ok(outcome) => outcome,
        Err(e) => {
            let code = if e.status_code() == 409 {
                ErrorCode::ApplicantAlreadyApproved
            } else {
                ErrorCode::ApplicantNotFound
            };
            return Ok(error_response(&e, code));
        }
    };

    // 角色已变为学生，旧的会话缓存作废
    forget_cached_user(request, outcome.user.id).await;

    let name = outcome.user.full_name();
    info!(
        "Applicant {} approved as student {} in section {}",
        applicant_id, outcome.student.student_number, outcome.section.id
    );

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        ApproveApplicantResponse {
            message: format!("{name} has been enrolled"),
            student: ApprovedStudent {
                id: outcome.student.id,
                student_number: outcome.student.student_number,
                name,
                section: outcome.section.display_name(),
            },
        },
        "Applicant approved",
    )))
}

pub async fn reject(
    service: &ApplicantService,
    applicant_id: i64,
    body: RejectApplicantRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let reason = body.reason.trim();
    if reason.is_empty() {
        return Ok(bad_request(
            ErrorCode::RejectionReasonRequired,
            "Rejection reason is required",
        ));
    }

    let storage = service.get_storage(request);

    match storage.reject_applicant(applicant_id, reason).await {
        Ok(detail) => {
            info!("Applicant {} rejected", applicant_id);
            let name = detail.user.full_name();
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                RejectApplicantResponse {
                    message: format!("Application of {name} has been rejected"),
                    applicant: RejectedApplicant {
                        id: detail.applicant.id,
                        applicant_number: detail.applicant.applicant_number,
                        name,
                        status: detail.applicant.status,
                    },
                },
                "Applicant rejected",
            )))
        }
        Err(e) => Ok(error_response(&e, status_error_code(e.status_code()))),
    }
}

fn status_error_code(status: u16) -> ErrorCode {
    match status {
        404 => ErrorCode::ApplicantNotFound,
        _ => ErrorCode::ApplicantStatusInvalid,
    }
}
