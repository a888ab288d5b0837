//! 成绩：任课教师录入（按自然键 upsert），学生查看自己的成绩

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use crate::models::{
    ApiResponse, ErrorCode,
    grades::{
        requests::{GradeUpsert, StudentGradeListParams, TeacherGradeListParams, UpsertGradeRequest},
        responses::{GradeListResponse, GradeResponse},
    },
};
use crate::services::access::{class_for_staff, current_user, student_profile};
use crate::services::alerts::notify_grade_posted;
use crate::services::{bad_request, error_response, not_found};

super::define_service! {
    GradeService
}

/// 作业成绩在 [0, max_score] 内；课程总评只要求非负
fn check_score(score: f64, max_score: Option<f64>) -> Result<(), String> {
    if !score.is_finite() || score < 0.0 {
        return Err("Score must be a non-negative number".to_string());
    }
    if let Some(max) = max_score
        && score > max
    {
        return Err(format!("Score must be between 0 and {max}"));
    }
    Ok(())
}

const MAX_EMOJI_LEN: usize = 16;

impl GradeService {
    pub async fn upsert_grade(
        &self,
        body: UpsertGradeRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        let user = match current_user(request) {
            Ok(user) => user,
            Err(resp) => return Ok(resp),
        };
        let storage = self.get_storage(request);

        let class = match class_for_staff(&storage, &user, body.class_id).await {
            Ok(class) => class,
            Err(resp) => return Ok(resp),
        };

        match storage.get_student_by_id(body.student_id).await {
            Ok(Some(student)) if student.section_id == Some(class.section_id) => {}
            Ok(Some(_)) => {
                return Ok(bad_request(
                    ErrorCode::StudentNotFound,
                    "Student is not enrolled in this class",
                ));
            }
            Ok(None) => return Ok(not_found(ErrorCode::StudentNotFound, "Student not found")),
            Err(e) => return Ok(error_response(&e, ErrorCode::StudentNotFound)),
        }

        let max_score = match body.assignment_id {
            Some(assignment_id) => match storage.get_assignment_by_id(assignment_id).await {
                Ok(Some(assignment)) if assignment.class_id == class.id => {
                    Some(assignment.max_score)
                }
                Ok(_) => {
                    return Ok(not_found(
                        ErrorCode::AssignmentNotFound,
                        "Assignment not found in this class",
                    ));
                }
                Err(e) => return Ok(error_response(&e, ErrorCode::AssignmentNotFound)),
            },
            None => None,
        };

        if let Err(msg) = check_score(body.score, max_score) {
            return Ok(bad_request(ErrorCode::GradeScoreInvalid, msg));
        }
        if body
            .feedback_emoji
            .as_deref()
            .is_some_and(|e| e.chars().count() > MAX_EMOJI_LEN)
        {
            return Ok(bad_request(
                ErrorCode::BadRequest,
                "feedback_emoji is too long",
            ));
        }

        let upsert = GradeUpsert {
            student_id: body.student_id,
            class_id: body.class_id,
            assignment_id: body.assignment_id,
            score: body.score,
            remarks: body.remarks,
            feedback_emoji: body.feedback_emoji,
            graded_by: user.id,
        };

        match storage.upsert_grade(upsert).await {
            Ok(grade) => {
                notify_grade_posted(&storage, &grade).await;
                Ok(HttpResponse::Ok().json(ApiResponse::success(
                    GradeResponse { grade },
                    "Grade saved successfully",
                )))
            }
            Err(e) => Ok(error_response(&e, ErrorCode::GradeScoreInvalid)),
        }
    }

    pub async fn list_class_grades(
        &self,
        query: TeacherGradeListParams,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        let user = match current_user(request) {
            Ok(user) => user,
            Err(resp) => return Ok(resp),
        };
        let storage = self.get_storage(request);
        if let Err(resp) = class_for_staff(&storage, &user, query.class_id).await {
            return Ok(resp);
        }

        match storage
            .list_class_grades(query.class_id, query.assignment_id)
            .await
        {
            Ok(items) => Ok(HttpResponse::Ok().json(ApiResponse::success(
                GradeListResponse { items },
                "Grades retrieved successfully",
            ))),
            Err(e) => Ok(error_response(&e, ErrorCode::InternalServerError)),
        }
    }

    pub async fn list_my_grades(
        &self,
        query: StudentGradeListParams,
        request: &HttpRequest,
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

        match storage.list_student_grades(student.id, query.class_id).await {
            Ok(items) => Ok(HttpResponse::Ok().json(ApiResponse::success(
                GradeListResponse { items },
                "Grades retrieved successfully",
            ))),
            Err(e) => Ok(error_response(&e, ErrorCode::InternalServerError)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_score_bounds() {
        assert!(check_score(0.0, Some(100.0)).is_ok());
        assert!(check_score(100.0, Some(100.0)).is_ok());
        assert!(check_score(100.5, Some(100.0)).is_err());
        assert!(check_score(-1.0, None).is_err());
        assert!(check_score(250.0, None).is_ok());
        assert!(check_score(f64::INFINITY, None).is_err());
    }
}
