use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::ApplicantService;
use crate::models::{
    ApiResponse, ErrorCode,
    applicants::requests::{ApplicantListParams, ApplicantListQuery},
};
use crate::services::{error_response, not_found};

pub async fn list_applicants(
    service: &ApplicantService,
    query: ApplicantListParams,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let list_query = ApplicantListQuery {
        page: Some(query.pagination.page),
        size: Some(query.pagination.size),
        status: query.status,
        search: query.search,
    };

    match storage.list_applicants_with_pagination(list_query).await {
        Ok(response) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            response,
            "Applicant list retrieved successfully",
        ))),
        Err(e) => Ok(error_response(&e, ErrorCode::InternalServerError)),
    }
}

pub async fn get_applicant(
    service: &ApplicantService,
    applicant_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage.get_applicant_by_id(applicant_id).await {
        Ok(Some(detail)) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            detail,
            "Applicant retrieved successfully",
        ))),
        Ok(None) => Ok(not_found(ErrorCode::ApplicantNotFound, "Applicant not found")),
        Err(e) => Ok(error_response(&e, ErrorCode::ApplicantNotFound)),
    }
}
