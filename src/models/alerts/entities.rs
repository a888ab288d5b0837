use serde::{Deserialize, Serialize};
use ts_rs::TS;

string_enum! {
    /// 提醒类型，持久化在 alerts.alert_type
    #[ts(export, export_to = "../frontend/src/types/generated/alert.ts")]
    AlertType("提醒类型") {
        OverdueAssignment => "overdue_assignment",
        GradePosted => "grade_posted",
        AttendanceIssue => "attendance_issue",
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/alert.ts")]
pub struct Alert {
    pub id: i64,
    pub parent_id: i64,
    pub student_id: i64,
    pub assignment_id: Option<i64>,
    pub alert_type: AlertType,
    pub message: String,
    pub viewed: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// 逾期扫描的候选行：已发布且过期的作业 × 未提交且有家长的学生
#[derive(Debug, Clone)]
pub struct OverdueCandidate {
    pub parent_id: i64,
    pub student_id: i64,
    pub student_name: String,
    pub assignment_id: i64,
    pub assignment_title: String,
    pub subject_name: String,
    pub due_date: i64,
}

impl OverdueCandidate {
    pub fn message(&self) -> String {
        let due = chrono::DateTime::<chrono::Utc>::from_timestamp(self.due_date, 0)
            .unwrap_or_default()
            .format("%Y-%m-%d %H:%M UTC");
        format!(
            "{} has not submitted \"{}\" for {} (due {}).",
            self.student_name, self.assignment_title, self.subject_name, due
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overdue_message_names_everything() {
        let candidate = OverdueCandidate {
            parent_id: 1,
            student_id: 2,
            student_name: "Ana Cruz".into(),
            assignment_id: 3,
            assignment_title: "Essay".into(),
            subject_name: "English".into(),
            due_date: 1_735_689_600, // 2025-01-01 00:00 UTC
        };
        let message = candidate.message();
        assert!(message.contains("Ana Cruz"));
        assert!(message.contains("\"Essay\""));
        assert!(message.contains("English"));
        assert!(message.contains("2025-01-01"));
    }
}
