//! 分区管理（仅管理员）

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use crate::models::{
    ApiResponse, ErrorCode,
    sections::{
        requests::{
            CreateSectionRequest, SectionListParams, SectionListQuery, UpdateSectionRequest,
        },
        responses::SectionStudentsResponse,
    },
};
use crate::services::{bad_request, error_response, not_found};

super::define_service! {
    SectionService
}

fn validate_label(field: &str, value: &str) -> Result<(), String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(format!("{field} cannot be empty"));
    }
    if value.chars().count() > 50 {
        return Err(format!("{field} must be at most 50 characters"));
    }
    Ok(())
}

impl SectionService {
    pub async fn create_section(
        &self,
        body: CreateSectionRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        for (field, value) in [("grade_level", &body.grade_level), ("name", &body.name)] {
            if let Err(msg) = validate_label(field, value) {
                return Ok(bad_request(ErrorCode::BadRequest, msg));
            }
        }

        let storage = self.get_storage(request);
        match storage
            .create_section(body.grade_level.trim(), body.name.trim())
            .await
        {
            Ok(section) => Ok(HttpResponse::Created()
                .json(ApiResponse::success(section, "Section created successfully"))),
            Err(e) => Ok(error_response(&e, ErrorCode::SectionAlreadyExists)),
        }
    }

    pub async fn list_sections(
        &self,
        query: SectionListParams,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        let storage = self.get_storage(request);
        let list_query = SectionListQuery {
            page: Some(query.pagination.page),
            size: Some(query.pagination.size),
            grade_level: query.grade_level,
            search: query.search,
        };

        match storage.list_sections_with_pagination(list_query).await {
            Ok(response) => Ok(HttpResponse::Ok().json(ApiResponse::success(
                response,
                "Section list retrieved successfully",
            ))),
            Err(e) => Ok(error_response(&e, ErrorCode::InternalServerError)),
        }
    }

    pub async fn get_section(
        &self,
        section_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        let storage = self.get_storage(request);
        match storage.get_section_by_id(section_id).await {
            Ok(Some(section)) => Ok(HttpResponse::Ok()
                .json(ApiResponse::success(section, "Section retrieved successfully"))),
            Ok(None) => Ok(not_found(ErrorCode::SectionNotFound, "Section not found")),
            Err(e) => Ok(error_response(&e, ErrorCode::SectionNotFound)),
        }
    }

    pub async fn update_section(
        &self,
        section_id: i64,
        body: UpdateSectionRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        for (field, value) in [("grade_level", &body.grade_level), ("name", &body.name)] {
            if let Some(value) = value
                && let Err(msg) = validate_label(field, value)
            {
                return Ok(bad_request(ErrorCode::BadRequest, msg));
            }
        }

        let update = UpdateSectionRequest {
            grade_level: body.grade_level.map(|s| s.trim().to_string()),
            name: body.name.map(|s| s.trim().to_string()),
        };

        let storage = self.get_storage(request);
        match storage.update_section(section_id, update).await {
            Ok(Some(section)) => Ok(HttpResponse::Ok()
                .json(ApiResponse::success(section, "Section updated successfully"))),
            Ok(None) => Ok(not_found(ErrorCode::SectionNotFound, "Section not found")),
            Err(e) => Ok(error_response(&e, ErrorCode::SectionAlreadyExists)),
        }
    }

    pub async fn delete_section(
        &self,
        section_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        let storage = self.get_storage(request);
        match storage.delete_section(section_id).await {
            Ok(true) => Ok(
                HttpResponse::Ok().json(ApiResponse::success_empty("Section deleted successfully"))
            ),
            Ok(false) => Ok(not_found(ErrorCode::SectionNotFound, "Section not found")),
            Err(e) => Ok(error_response(&e, ErrorCode::SectionNotEmpty)),
        }
    }

    pub async fn list_students(
        &self,
        section_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        let storage = self.get_storage(request);

        match storage.get_section_by_id(section_id).await {
            Ok(Some(_)) => {}
            Ok(None) => return Ok(not_found(ErrorCode::SectionNotFound, "Section not found")),
            Err(e) => return Ok(error_response(&e, ErrorCode::SectionNotFound)),
        }

        match storage.list_section_students(section_id).await {
            Ok(items) => Ok(HttpResponse::Ok().json(ApiResponse::success(
                SectionStudentsResponse { section_id, items },
                "Section students retrieved successfully",
            ))),
            Err(e) => Ok(error_response(&e, ErrorCode::InternalServerError)),
        }
    }
}
