use serde::{Deserialize, Serialize};
use ts_rs::TS;

string_enum! {
    #[ts(export, export_to = "../frontend/src/types/generated/submission.ts")]
    SubmissionStatus("提交状态") {
        Submitted => "submitted",
        Late => "late",
    }
}

impl SubmissionStatus {
    /// 晚于截止时间即为迟交，恰好等于截止时间不算
    pub fn from_times(submitted_at: i64, due_date: i64) -> Self {
        if submitted_at > due_date {
            SubmissionStatus::Late
        } else {
            SubmissionStatus::Submitted
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/submission.ts")]
pub struct Submission {
    pub id: i64,
    pub assignment_id: i64,
    pub student_id: i64,
    pub file_token: String,
    pub file_name: String,
    pub status: SubmissionStatus,
    pub submitted_at: chrono::DateTime<chrono::Utc>,
}

/// 教师查看提交列表时附带学生信息
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/submission.ts")]
pub struct SubmissionWithStudent {
    pub submission: Submission,
    pub student_number: String,
    pub student_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_from_times() {
        assert_eq!(SubmissionStatus::from_times(99, 100), SubmissionStatus::Submitted);
        assert_eq!(SubmissionStatus::from_times(100, 100), SubmissionStatus::Submitted);
        assert_eq!(SubmissionStatus::from_times(101, 100), SubmissionStatus::Late);
    }
}
