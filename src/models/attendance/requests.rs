use serde::Deserialize;
use ts_rs::TS;

use super::entities::AttendanceStatus;

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/attendance.ts")]
pub struct AttendanceEntry {
    pub student_id: i64,
    pub status: AttendanceStatus,
    pub remarks: Option<String>,
}

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/attendance.ts")]
pub struct RecordAttendanceRequest {
    pub class_id: i64,
    /// YYYY-MM-DD
    pub date: String,
    pub records: Vec<AttendanceEntry>,
}

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/attendance.ts")]
pub struct AttendanceQueryParams {
    pub class_id: i64,
    pub date: String,
}

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/attendance.ts")]
pub struct AttendanceHistoryParams {
    pub class_id: i64,
    pub start_date: String,
    pub end_date: String,
}

#[derive(Debug, Clone)]
pub struct AttendanceUpsert {
    pub student_id: i64,
    pub class_id: i64,
    pub attendance_date: String,
    pub status: AttendanceStatus,
    pub remarks: Option<String>,
    pub recorded_by: i64,
}
