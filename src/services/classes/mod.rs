//! 课程：管理员维护，成员按角色查看

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::{
    ApiResponse, ErrorCode,
    classes::requests::{ClassListParams, ClassListQuery, CreateClassRequest, UpdateClassRequest},
    classes::responses::ClassListResponse,
    common::PaginationInfo,
    users::entities::UserRole,
};
use crate::services::access::{class_for_member, current_user, student_profile, teacher_profile};
use crate::services::{bad_request, error_response, not_found};
use crate::storage::Storage;

super::define_service! {
    ClassService
}

async fn check_refs(
    storage: &Arc<dyn Storage>,
    section_id: Option<i64>,
    teacher_id: Option<i64>,
) -> Result<(), HttpResponse> {
    if let Some(section_id) = section_id {
        match storage.get_section_by_id(section_id).await {
            Ok(Some(_)) => {}
            Ok(None) => return Err(not_found(ErrorCode::SectionNotFound, "Section not found")),
            Err(e) => return Err(error_response(&e, ErrorCode::SectionNotFound)),
        }
    }
    if let Some(teacher_id) = teacher_id {
        match storage.get_teacher_by_id(teacher_id).await {
            Ok(Some(_)) => {}
            Ok(None) => return Err(not_found(ErrorCode::TeacherNotFound, "Teacher not found")),
            Err(e) => return Err(error_response(&e, ErrorCode::TeacherNotFound)),
        }
    }
    Ok(())
}

impl ClassService {
    pub async fn create_class(
        &self,
        body: CreateClassRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        if body.subject_name.trim().is_empty() {
            return Ok(bad_request(ErrorCode::BadRequest, "subject_name cannot be empty"));
        }

        let storage = self.get_storage(request);
        if let Err(resp) = check_refs(&storage, Some(body.section_id), Some(body.teacher_id)).await
        {
            return Ok(resp);
        }
        let body = CreateClassRequest {
            subject_name: body.subject_name.trim().to_string(),
            ..body
        };

        match storage.create_class(body).await {
            Ok(class) => Ok(HttpResponse::Created()
                .json(ApiResponse::success(class, "Class created successfully"))),
            Err(e) => Ok(error_response(&e, ErrorCode::ClassNotFound)),
        }
    }

    /// 管理员看全部；教师看自己任教的；学生看本分区的
    pub async fn list_classes(
        &self,
        query: ClassListParams,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        let user = match current_user(request) {
            Ok(user) => user,
            Err(resp) => return Ok(resp),
        };
        let storage = self.get_storage(request);

        let mut list_query = ClassListQuery {
            page: Some(query.pagination.page),
            size: Some(query.pagination.size),
            section_id: query.section_id,
            teacher_id: None,
            search: query.search,
        };

        match user.role {
            UserRole::Teacher => match teacher_profile(&storage, &user).await {
                Ok(teacher) => list_query.teacher_id = Some(teacher.id),
                Err(resp) => return Ok(resp),
            },
            UserRole::Student => {
                let student = match student_profile(&storage, &user).await {
                    Ok(student) => student,
                    Err(resp) => return Ok(resp),
                };
                let Some(section_id) = student.section_id else {
                    // 未分班的学生没有课程
                    return Ok(HttpResponse::Ok().json(ApiResponse::success(
                        ClassListResponse {
                            items: Vec::new(),
                            pagination: PaginationInfo::empty(
                                query.pagination.page,
                                query.pagination.size,
                            ),
                        },
                        "Class list retrieved successfully",
                    )));
                };
                list_query.section_id = Some(section_id);
            }
            _ => {}
        }

        match storage.list_classes_with_pagination(list_query).await {
            Ok(response) => Ok(HttpResponse::Ok().json(ApiResponse::success(
                response,
                "Class list retrieved successfully",
            ))),
            Err(e) => Ok(error_response(&e, ErrorCode::InternalServerError)),
        }
    }

    pub async fn get_class(&self, class_id: i64, request: &HttpRequest) -> ActixResult<HttpResponse> {
        let user = match current_user(request) {
            Ok(user) => user,
            Err(resp) => return Ok(resp),
        };
        let storage = self.get_storage(request);

        if let Err(resp) = class_for_member(&storage, &user, class_id).await {
            return Ok(resp);
        }

        match storage.get_class_detail(class_id).await {
            Ok(Some(detail)) => Ok(HttpResponse::Ok()
                .json(ApiResponse::success(detail, "Class retrieved successfully"))),
            Ok(None) => Ok(not_found(ErrorCode::ClassNotFound, "Class not found")),
            Err(e) => Ok(error_response(&e, ErrorCode::ClassNotFound)),
        }
    }

    pub async fn update_class(
        &self,
        class_id: i64,
        body: UpdateClassRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        if body
            .subject_name
            .as_deref()
            .is_some_and(|s| s.trim().is_empty())
        {
            return Ok(bad_request(ErrorCode::BadRequest, "subject_name cannot be empty"));
        }

        let storage = self.get_storage(request);
        if let Err(resp) = check_refs(&storage, body.section_id, body.teacher_id).await {
            return Ok(resp);
        }
        match storage.update_class(class_id, body).await {
            Ok(Some(class)) => Ok(HttpResponse::Ok()
                .json(ApiResponse::success(class, "Class updated successfully"))),
            Ok(None) => Ok(not_found(ErrorCode::ClassNotFound, "Class not found")),
            Err(e) => Ok(error_response(&e, ErrorCode::ClassNotFound)),
        }
    }

    pub async fn delete_class(
        &self,
        class_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        let storage = self.get_storage(request);
        match storage.delete_class(class_id).await {
            Ok(true) => {
                Ok(HttpResponse::Ok().json(ApiResponse::success_empty("Class deleted successfully")))
            }
            Ok(false) => Ok(not_found(ErrorCode::ClassNotFound, "Class not found")),
            Err(e) => Ok(error_response(&e, ErrorCode::InternalServerError)),
        }
    }
}
