//! 作业提交：学生上传，教师按作业查看

use actix_multipart::Multipart;
use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use crate::config::AppConfig;
use crate::models::{
    ApiResponse, ErrorCode,
    assignments::entities::AssignmentStatus,
    submissions::{
        entities::SubmissionStatus,
        requests::SubmissionUpsert,
        responses::{SubmissionListResponse, SubmitAssignmentResponse},
    },
};
use crate::services::access::{class_for_staff, current_user, load_class, student_profile};
use crate::services::files::{receive_upload, remove_stored_file};
use crate::services::{bad_request, error_response, forbidden, not_found};
use crate::utils::extractor::parse_positive_id;

super::define_service! {
    SubmissionService
}

impl SubmissionService {
    /// multipart：`assignment_id` + `file`，同一学生重复提交会覆盖
    pub async fn submit(
        &self,
        request: &HttpRequest,
        payload: Multipart,
    ) -> ActixResult<HttpResponse> {
        let user = match current_user(request) {
            Ok(user) => user,
            Err(resp) => return Ok(resp),
        };
        let storage = self.get_storage(request);
        let student = match student_profile(&storage, &user).await {
            Ok(student) => student,
            Err(resp) => return Ok(resp),
        };

        let upload = match receive_upload(payload).await {
            Ok(upload) => upload,
            Err(resp) => return Ok(resp),
        };

        let reject = |resp: HttpResponse| -> ActixResult<HttpResponse> {
            upload.discard();
            Ok(resp)
        };

        let Some(assignment_id) =
            parse_positive_id(upload.fields.get("assignment_id").map(String::as_str))
        else {
            return reject(bad_request(
                ErrorCode::BadRequest,
                "assignment_id is required",
            ));
        };

        let assignment = match storage.get_assignment_by_id(assignment_id).await {
            Ok(Some(assignment)) => assignment,
            Ok(None) => {
                return reject(not_found(ErrorCode::AssignmentNotFound, "Assignment not found"));
            }
            Err(e) => return reject(error_response(&e, ErrorCode::AssignmentNotFound)),
        };
        if assignment.status != AssignmentStatus::Published {
            return reject(bad_request(
                ErrorCode::AssignmentNotPublished,
                "Assignment is not open for submissions",
            ));
        }

        let class = match load_class(&storage, assignment.class_id).await {
            Ok(class) => class,
            Err(resp) => return reject(resp),
        };
        if student.section_id != Some(class.section_id) {
            return reject(forbidden(
                ErrorCode::ClassPermissionDenied,
                "This assignment is not for your section",
            ));
        }

        if let Err(e) = storage
            .upload_file(
                &upload.token,
                &upload.file_name,
                upload.size,
                &upload.extension,
                user.id,
            )
            .await
        {
            return reject(error_response(&e, ErrorCode::SubmissionFailed));
        }

        let submitted_at = chrono::Utc::now().timestamp();
        let status = SubmissionStatus::from_times(submitted_at, assignment.due_date.timestamp());

        match storage
            .upsert_submission(SubmissionUpsert {
                assignment_id,
                student_id: student.id,
                file_token: upload.token.clone(),
                file_name: upload.file_name.clone(),
                status,
                submitted_at,
            })
            .await
        {
            Ok((submission, replaced)) => {
                // 重复提交换了文件，旧文件不再被引用
                if let Some(old_token) = replaced {
                    remove_stored_file(&storage, &AppConfig::get().upload.dir, &old_token).await;
                }
                tracing::info!(
                    "Student {} submitted assignment {} ({})",
                    student.id,
                    assignment_id,
                    submission.status
                );
                Ok(HttpResponse::Ok().json(ApiResponse::success(
                    SubmitAssignmentResponse { submission },
                    "Assignment submitted successfully",
                )))
            }
            Err(e) => {
                remove_stored_file(&storage, &AppConfig::get().upload.dir, &upload.token).await;
                Ok(error_response(&e, ErrorCode::SubmissionFailed))
            }
        }
    }

    pub async fn list_for_assignment(
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
        if let Err(resp) = class_for_staff(&storage, &user, assignment.class_id).await {
            return Ok(resp);
        }

        match storage.list_submissions_for_assignment(assignment_id).await {
            Ok(items) => Ok(HttpResponse::Ok().json(ApiResponse::success(
                SubmissionListResponse {
                    assignment_id,
                    items,
                },
                "Submissions retrieved successfully",
            ))),
            Err(e) => Ok(error_response(&e, ErrorCode::InternalServerError)),
        }
    }
}
