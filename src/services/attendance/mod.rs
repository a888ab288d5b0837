//! 考勤：任课教师按日录入，缺勤/迟到通知家长

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::collections::{BTreeMap, HashSet};

use crate::models::{
    ApiResponse, ErrorCode,
    attendance::{
        entities::{AttendanceCounts, AttendanceWithStudent, StudentAttendanceSummary},
        requests::{
            AttendanceHistoryParams, AttendanceQueryParams, AttendanceUpsert,
            RecordAttendanceRequest,
        },
        responses::{AttendanceHistoryResponse, AttendanceListResponse, RecordAttendanceResponse},
    },
};
use crate::services::access::{class_for_staff, current_user};
use crate::services::alerts::notify_attendance_issue;
use crate::services::{bad_request, error_response};
use crate::utils::validate::{format_date, parse_date, validate_date_range};

super::define_service! {
    AttendanceService
}

/// 按学生汇总，顺序跟随学号
fn summarize(records: &[AttendanceWithStudent]) -> Vec<StudentAttendanceSummary> {
    let mut grouped: BTreeMap<&str, Vec<&AttendanceWithStudent>> = BTreeMap::new();
    for row in records {
        grouped.entry(row.student_number.as_str()).or_default().push(row);
    }

    grouped
        .into_values()
        .filter_map(|rows| {
            let first = rows.first()?;
            Some(StudentAttendanceSummary {
                student_id: first.record.student_id,
                student_number: first.student_number.clone(),
                student_name: first.student_name.clone(),
                counts: AttendanceCounts::from_statuses(rows.iter().map(|r| &r.record.status)),
            })
        })
        .collect()
}

impl AttendanceService {
    pub async fn record(
        &self,
        body: RecordAttendanceRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        let user = match current_user(request) {
            Ok(user) => user,
            Err(resp) => return Ok(resp),
        };
        let date = match parse_date(&body.date) {
            Ok(date) => format_date(date),
            Err(msg) => return Ok(bad_request(ErrorCode::AttendanceInvalid, msg)),
        };
        if body.records.is_empty() {
            return Ok(bad_request(
                ErrorCode::AttendanceInvalid,
                "records cannot be empty",
            ));
        }

        let mut seen = HashSet::new();
        if let Some(dup) = body.records.iter().find(|r| !seen.insert(r.student_id)) {
            return Ok(bad_request(
                ErrorCode::AttendanceInvalid,
                format!("Student {} appears more than once", dup.student_id),
            ));
        }

        let storage = self.get_storage(request);
        let class = match class_for_staff(&storage, &user, body.class_id).await {
            Ok(class) => class,
            Err(resp) => return Ok(resp),
        };

        let roster: HashSet<i64> = match storage.list_section_students(class.section_id).await {
            Ok(students) => students.into_iter().map(|s| s.id).collect(),
            Err(e) => return Ok(error_response(&e, ErrorCode::InternalServerError)),
        };
        if let Some(outsider) = body.records.iter().find(|r| !roster.contains(&r.student_id)) {
            return Ok(bad_request(
                ErrorCode::StudentNotFound,
                format!("Student {} is not enrolled in this class", outsider.student_id),
            ));
        }

        let upserts = body
            .records
            .iter()
            .map(|entry| AttendanceUpsert {
                student_id: entry.student_id,
                class_id: class.id,
                attendance_date: date.clone(),
                status: entry.status,
                remarks: entry.remarks.clone(),
                recorded_by: user.id,
            })
            .collect();

        let items = match storage.upsert_attendance(upserts).await {
            Ok(items) => items,
            Err(e) => return Ok(error_response(&e, ErrorCode::AttendanceInvalid)),
        };

        for record in &items {
            notify_attendance_issue(&storage, record.student_id, &class, &date, record.status)
                .await;
        }

        Ok(HttpResponse::Ok().json(ApiResponse::success(
            RecordAttendanceResponse {
                class_id: class.id,
                date,
                items,
            },
            "Attendance recorded successfully",
        )))
    }

    pub async fn list_for_date(
        &self,
        query: AttendanceQueryParams,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        let user = match current_user(request) {
            Ok(user) => user,
            Err(resp) => return Ok(resp),
        };
        let date = match parse_date(&query.date) {
            Ok(date) => format_date(date),
            Err(msg) => return Ok(bad_request(ErrorCode::AttendanceInvalid, msg)),
        };

        let storage = self.get_storage(request);
        if let Err(resp) = class_for_staff(&storage, &user, query.class_id).await {
            return Ok(resp);
        }

        match storage
            .list_attendance(query.class_id, &date, &date)
            .await
        {
            Ok(items) => Ok(HttpResponse::Ok().json(ApiResponse::success(
                AttendanceListResponse {
                    class_id: query.class_id,
                    date,
                    items,
                },
                "Attendance retrieved successfully",
            ))),
            Err(e) => Ok(error_response(&e, ErrorCode::InternalServerError)),
        }
    }

    pub async fn history(
        &self,
        query: AttendanceHistoryParams,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        let user = match current_user(request) {
            Ok(user) => user,
            Err(resp) => return Ok(resp),
        };
        let (start_date, end_date) =
            match validate_date_range(&query.start_date, &query.end_date) {
                Ok((start, end)) => (format_date(start), format_date(end)),
                Err(msg) => return Ok(bad_request(ErrorCode::AttendanceInvalid, msg)),
            };

        let storage = self.get_storage(request);
        if let Err(resp) = class_for_staff(&storage, &user, query.class_id).await {
            return Ok(resp);
        }

        let records = match storage
            .list_attendance(query.class_id, &start_date, &end_date)
            .await
        {
            Ok(records) => records,
            Err(e) => return Ok(error_response(&e, ErrorCode::InternalServerError)),
        };
        let summary = summarize(&records);

        Ok(HttpResponse::Ok().json(ApiResponse::success(
            AttendanceHistoryResponse {
                class_id: query.class_id,
                start_date,
                end_date,
                records,
                summary,
            },
            "Attendance history retrieved successfully",
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::attendance::entities::{AttendanceRecord, AttendanceStatus};

    fn row(student_id: i64, number: &str, status: AttendanceStatus) -> AttendanceWithStudent {
        AttendanceWithStudent {
            record: AttendanceRecord {
                id: 0,
                student_id,
                class_id: 1,
                attendance_date: "2025-03-03".into(),
                status,
                remarks: None,
                recorded_by: 1,
                recorded_at: chrono::Utc::now(),
            },
            student_number: number.into(),
            student_name: format!("Student {student_id}"),
        }
    }

    #[test]
    fn test_summarize_groups_by_student() {
        let records = vec![
            row(2, "BFPS-2025-0002", AttendanceStatus::Absent),
            row(1, "BFPS-2025-0001", AttendanceStatus::Present),
            row(2, "BFPS-2025-0002", AttendanceStatus::Late),
            row(1, "BFPS-2025-0001", AttendanceStatus::Present),
        ];
        let summary = summarize(&records);

        assert_eq!(summary.len(), 2);
        assert_eq!(summary[0].student_id, 1);
        assert_eq!(summary[0].counts.present, 2);
        assert_eq!(summary[0].counts.attendance_rate, Some(1.0));
        assert_eq!(summary[1].counts.absent, 1);
        assert_eq!(summary[1].counts.late, 1);
        assert_eq!(summary[1].counts.attendance_rate, Some(0.5));
    }
}
