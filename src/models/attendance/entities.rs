use serde::{Deserialize, Serialize};
use ts_rs::TS;

string_enum! {
    /// 考勤状态
    #[ts(export, export_to = "../frontend/src/types/generated/attendance.ts")]
    AttendanceStatus("考勤状态") {
        Present => "present",
        Absent => "absent",
        Late => "late",
        Excused => "excused",
    }
}

impl AttendanceStatus {
    /// 需要通知家长的状态
    pub fn is_issue(&self) -> bool {
        matches!(self, AttendanceStatus::Absent | AttendanceStatus::Late)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/attendance.ts")]
pub struct AttendanceRecord {
    pub id: i64,
    pub student_id: i64,
    pub class_id: i64,
    /// YYYY-MM-DD
    pub attendance_date: String,
    pub status: AttendanceStatus,
    pub remarks: Option<String>,
    pub recorded_by: i64,
    pub recorded_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/attendance.ts")]
pub struct AttendanceWithStudent {
    pub record: AttendanceRecord,
    pub student_number: String,
    pub student_name: String,
}

/// 按状态计数
#[derive(Debug, Clone, Default, PartialEq, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/attendance.ts")]
pub struct AttendanceCounts {
    pub present: i64,
    pub absent: i64,
    pub late: i64,
    pub excused: i64,
    pub total: i64,
    /// (present + late) / total，无记录时为空
    pub attendance_rate: Option<f64>,
}

impl AttendanceCounts {
    pub fn from_statuses<'a>(statuses: impl IntoIterator<Item = &'a AttendanceStatus>) -> Self {
        let mut counts = AttendanceCounts::default();
        for status in statuses {
            match status {
                AttendanceStatus::Present => counts.present += 1,
                AttendanceStatus::Absent => counts.absent += 1,
                AttendanceStatus::Late => counts.late += 1,
                AttendanceStatus::Excused => counts.excused += 1,
            }
            counts.total += 1;
        }
        if counts.total > 0 {
            counts.attendance_rate =
                Some((counts.present + counts.late) as f64 / counts.total as f64);
        }
        counts
    }
}

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/attendance.ts")]
pub struct StudentAttendanceSummary {
    pub student_id: i64,
    pub student_number: String,
    pub student_name: String,
    pub counts: AttendanceCounts,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_from_statuses() {
        let statuses = [
            AttendanceStatus::Present,
            AttendanceStatus::Late,
            AttendanceStatus::Absent,
            AttendanceStatus::Excused,
        ];
        let counts = AttendanceCounts::from_statuses(&statuses);
        assert_eq!(counts.total, 4);
        assert_eq!(counts.absent, 1);
        assert_eq!(counts.attendance_rate, Some(0.5));
    }

    #[test]
    fn test_counts_empty_has_no_rate() {
        let counts = AttendanceCounts::from_statuses(Vec::<AttendanceStatus>::new().iter());
        assert_eq!(counts.total, 0);
        assert!(counts.attendance_rate.is_none());
    }
}
