//! 家长首页：孩子概览（平均分、出勤统计）与单个孩子的成绩

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use crate::models::{
    ApiResponse, ErrorCode,
    attendance::entities::AttendanceCounts,
    grades::entities::GradeDetail,
    parents::responses::{ChildGradesResponse, ChildOverview, ParentChildrenResponse},
};
use crate::services::access::{child_of_parent, current_user, parent_profile};
use crate::services::{error_response, not_found};

super::define_service! {
    ParentService
}

/// 所有成绩的算术平均，保留两位小数
fn average_score(grades: &[GradeDetail]) -> Option<f64> {
    if grades.is_empty() {
        return None;
    }
    let sum: f64 = grades.iter().map(|g| g.grade.score).sum();
    let avg = sum / grades.len() as f64;
    Some((avg * 100.0).round() / 100.0)
}

impl ParentService {
    pub async fn list_children(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        let user = match current_user(request) {
            Ok(user) => user,
            Err(resp) => return Ok(resp),
        };
        let storage = self.get_storage(request);
        let parent = match parent_profile(&storage, &user).await {
            Ok(parent) => parent,
            Err(resp) => return Ok(resp),
        };

        let children = match storage.list_children(parent.id).await {
            Ok(children) => children,
            Err(e) => return Ok(error_response(&e, ErrorCode::InternalServerError)),
        };

        let mut items = Vec::with_capacity(children.len());
        for student in children {
            let section = match student.section_id {
                Some(section_id) => match storage.get_section_by_id(section_id).await {
                    Ok(section) => section,
                    Err(e) => return Ok(error_response(&e, ErrorCode::SectionNotFound)),
                },
                None => None,
            };
            let grades = match storage.list_student_grades(student.id, None).await {
                Ok(grades) => grades,
                Err(e) => return Ok(error_response(&e, ErrorCode::InternalServerError)),
            };
            let attendance = match storage.list_student_attendance(student.id).await {
                Ok(records) => AttendanceCounts::from_statuses(records.iter().map(|r| &r.status)),
                Err(e) => return Ok(error_response(&e, ErrorCode::InternalServerError)),
            };

            items.push(ChildOverview {
                student,
                section,
                average_grade: average_score(&grades),
                attendance,
            });
        }

        Ok(HttpResponse::Ok().json(ApiResponse::success(
            ParentChildrenResponse { items },
            "Children retrieved successfully",
        )))
    }

    pub async fn child_grades(
        &self,
        student_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        let user = match current_user(request) {
            Ok(user) => user,
            Err(resp) => return Ok(resp),
        };
        let storage = self.get_storage(request);
        let parent = match parent_profile(&storage, &user).await {
            Ok(parent) => parent,
            Err(resp) => return Ok(resp),
        };
        let child = match child_of_parent(&storage, &parent, student_id).await {
            Ok(child) => child,
            Err(resp) => return Ok(resp),
        };

        let student = match storage.get_student_summary(child.id).await {
            Ok(Some(student)) => student,
            Ok(None) => return Ok(not_found(ErrorCode::StudentNotFound, "Student not found")),
            Err(e) => return Ok(error_response(&e, ErrorCode::StudentNotFound)),
        };

        match storage.list_student_grades(child.id, None).await {
            Ok(items) => Ok(HttpResponse::Ok().json(ApiResponse::success(
                ChildGradesResponse { student, items },
                "Grades retrieved successfully",
            ))),
            Err(e) => Ok(error_response(&e, ErrorCode::InternalServerError)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::grades::entities::Grade;

    fn detail(score: f64) -> GradeDetail {
        GradeDetail {
            grade: Grade {
                id: 1,
                student_id: 1,
                class_id: 1,
                assignment_id: None,
                score,
                remarks: None,
                feedback_emoji: None,
                graded_by: 1,
                graded_at: chrono::Utc::now(),
            },
            student_number: "STU-2025-00001".to_string(),
            student_name: "Test Student".to_string(),
            subject_name: "Math".to_string(),
            assignment_title: None,
        }
    }

    #[test]
    fn test_average_score() {
        assert_eq!(average_score(&[]), None);
        assert_eq!(average_score(&[detail(90.0), detail(85.0)]), Some(87.5));
        assert_eq!(
            average_score(&[detail(90.0), detail(85.0), detail(80.0)]),
            Some(85.0)
        );
        assert_eq!(average_score(&[detail(1.0), detail(2.0), detail(2.0)]), Some(1.67));
    }
}
