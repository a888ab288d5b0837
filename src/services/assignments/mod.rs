//! 作业：任课教师维护，学生查看本分区已发布的作业

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use crate::models::{
    ApiResponse, ErrorCode,
    assignments::{
        entities::{Assignment, AssignmentStatus},
        requests::{
            AssignmentListParams, AssignmentListQuery, AssignmentUpdate, CreateAssignmentRequest,
            NewAssignment, UpdateAssignmentRequest,
        },
        responses::StudentAssignmentListResponse,
    },
    users::entities::{User, UserRole},
};
use crate::services::access::{
    Access, class_for_member, class_for_staff, current_user, student_profile,
};
use crate::services::{bad_request, error_response, not_found};
use crate::storage::Storage;
use std::sync::Arc;

super::define_service! {
    AssignmentService
}

fn validate_fields(title: Option<&str>, max_score: Option<f64>) -> Result<(), String> {
    if let Some(title) = title {
        let title = title.trim();
        if title.is_empty() {
            return Err("title cannot be empty".to_string());
        }
        if title.chars().count() > 200 {
            return Err("title must be at most 200 characters".to_string());
        }
    }
    if let Some(max_score) = max_score
        && !(max_score.is_finite() && max_score > 0.0)
    {
        return Err("max_score must be a positive number".to_string());
    }
    Ok(())
}

/// 读取作业并确认当前用户可以管理它
async fn owned_assignment(
    storage: &Arc<dyn Storage>,
    user: &User,
    assignment_id: i64,
) -> Access<Assignment> {
    let assignment = match storage.get_assignment_by_id(assignment_id).await {
        Ok(Some(assignment)) => assignment,
        Ok(None) => return Err(not_found(ErrorCode::AssignmentNotFound, "Assignment not found")),
        Err(e) => return Err(error_response(&e, ErrorCode::AssignmentNotFound)),
    };
    class_for_staff(storage, user, assignment.class_id).await?;
    Ok(assignment)
}

impl AssignmentService {
    pub async fn create_assignment(
        &self,
        body: CreateAssignmentRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        let user = match current_user(request) {
            Ok(user) => user,
            Err(resp) => return Ok(resp),
        };
        if let Err(msg) = validate_fields(Some(&body.title), Some(body.max_score)) {
            return Ok(bad_request(ErrorCode::BadRequest, msg));
        }

        let storage = self.get_storage(request);
        if let Err(resp) = class_for_staff(&storage, &user, body.class_id).await {
            return Ok(resp);
        }

        let new_assignment = NewAssignment {
            class_id: body.class_id,
            title: body.title.trim().to_string(),
            description: body.description,
            due_date: body.due_date.timestamp(),
            max_score: body.max_score,
            status: body.status,
            created_by: user.id,
        };

        match storage.create_assignment(new_assignment).await {
            Ok(assignment) => Ok(HttpResponse::Created()
                .json(ApiResponse::success(assignment, "Assignment created successfully"))),
            Err(e) => Ok(error_response(&e, ErrorCode::ClassNotFound)),
        }
    }

    /// 学生与家长只能看到已发布的作业
    pub async fn list_assignments(
        &self,
        query: AssignmentListParams,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        let user = match current_user(request) {
            Ok(user) => user,
            Err(resp) => return Ok(resp),
        };
        let storage = self.get_storage(request);
        if let Err(resp) = class_for_member(&storage, &user, query.class_id).await {
            return Ok(resp);
        }

        let status = match user.role {
            UserRole::Admin | UserRole::Teacher => query.status,
            _ => Some(AssignmentStatus::Published),
        };
        let list_query = AssignmentListQuery {
            page: Some(query.pagination.page),
            size: Some(query.pagination.size),
            class_id: query.class_id,
            status,
        };

        match storage.list_assignments_with_pagination(list_query).await {
            Ok(response) => Ok(HttpResponse::Ok().json(ApiResponse::success(
                response,
                "Assignment list retrieved successfully",
            ))),
            Err(e) => Ok(error_response(&e, ErrorCode::InternalServerError)),
        }
    }

    pub async fn get_assignment(
        &self,
        assignment_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        let user = match current_user(request) {
            Ok(user) => user,
            Err(resp) => return Ok(resp),
        };
        let storage = self.get_storage(request);

        let assignment = match storage.get_assignment_by_id(assignment_id).await {
            Ok(Some(assignment)) => assignment,
            Ok(None) => return Ok(not_found(ErrorCode::AssignmentNotFound, "Assignment not found")),
            Err(e) => return Ok(error_response(&e, ErrorCode::AssignmentNotFound)),
        };
        if let Err(resp) = class_for_member(&storage, &user, assignment.class_id).await {
            return Ok(resp);
        }
        let is_staff = matches!(user.role, UserRole::Admin | UserRole::Teacher);
        if !is_staff && assignment.status != AssignmentStatus::Published {
            return Ok(not_found(ErrorCode::AssignmentNotFound, "Assignment not found"));
        }

        Ok(HttpResponse::Ok().json(ApiResponse::success(
            assignment,
            "Assignment retrieved successfully",
        )))
    }

    pub async fn update_assignment(
        &self,
        assignment_id: i64,
        body: UpdateAssignmentRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        let user = match current_user(request) {
            Ok(user) => user,
            Err(resp) => return Ok(resp),
        };
        if let Err(msg) = validate_fields(body.title.as_deref(), body.max_score) {
            return Ok(bad_request(ErrorCode::BadRequest, msg));
        }

        let storage = self.get_storage(request);
        if let Err(resp) = owned_assignment(&storage, &user, assignment_id).await {
            return Ok(resp);
        }

        let update = AssignmentUpdate {
            title: body.title.map(|s| s.trim().to_string()),
            description: body.description,
            due_date: body.due_date.map(|d| d.timestamp()),
            max_score: body.max_score,
            status: body.status,
        };

        match storage.update_assignment(assignment_id, update).await {
            Ok(Some(assignment)) => Ok(HttpResponse::Ok()
                .json(ApiResponse::success(assignment, "Assignment updated successfully"))),
            Ok(None) => Ok(not_found(ErrorCode::AssignmentNotFound, "Assignment not found")),
            Err(e) => Ok(error_response(&e, ErrorCode::AssignmentNotFound)),
        }
    }

    pub async fn delete_assignment(
        &self,
        assignment_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        let user = match current_user(request) {
            Ok(user) => user,
            Err(resp) => return Ok(resp),
        };
        let storage = self.get_storage(request);
        if let Err(resp) = owned_assignment(&storage, &user, assignment_id).await {
            return Ok(resp);
        }

        match storage.delete_assignment(assignment_id).await {
            Ok(true) => Ok(HttpResponse::Ok()
                .json(ApiResponse::success_empty("Assignment deleted successfully"))),
            Ok(false) => Ok(not_found(ErrorCode::AssignmentNotFound, "Assignment not found")),
            Err(e) => Ok(error_response(&e, ErrorCode::InternalServerError)),
        }
    }

    /// 学生自己的作业列表，附带提交状态
    pub async fn list_my_assignments(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        let user = match current_user(request) {
            Ok(user) => user,
            Err(resp) => return Ok(resp),
        };
        let storage = self.get_storage(request);
        let student = match student_profile(&storage, &user).await {
            Ok(student) => student,
            Err(resp) => return Ok(resp),
        };

        let items = match student.section_id {
            Some(section_id) => match storage
                .list_student_assignments(student.id, section_id)
                .await
            {
                Ok(items) => items,
                Err(e) => return Ok(error_response(&e, ErrorCode::InternalServerError)),
            },
            None => Vec::new(),
        };

        Ok(HttpResponse::Ok().json(ApiResponse::success(
            StudentAssignmentListResponse { items },
            "Assignments retrieved successfully",
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_fields() {
        assert!(validate_fields(Some("Essay"), Some(100.0)).is_ok());
        assert!(validate_fields(None, None).is_ok());
        assert!(validate_fields(Some("   "), None).is_err());
        assert!(validate_fields(None, Some(0.0)).is_err());
        assert!(validate_fields(None, Some(f64::NAN)).is_err());
    }
}
