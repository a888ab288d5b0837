use serde::Serialize;
use ts_rs::TS;

use super::entities::{AttendanceRecord, AttendanceWithStudent, StudentAttendanceSummary};

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/attendance.ts")]
pub struct RecordAttendanceResponse {
    pub class_id: i64,
    pub date: String,
    pub items: Vec<AttendanceRecord>,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/attendance.ts")]
pub struct AttendanceListResponse {
    pub class_id: i64,
    pub date: String,
    pub items: Vec<AttendanceWithStudent>,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/attendance.ts")]
pub struct AttendanceHistoryResponse {
    pub class_id: i64,
    pub start_date: String,
    pub end_date: String,
    pub records: Vec<AttendanceWithStudent>,
    pub summary: Vec<StudentAttendanceSummary>,
}
