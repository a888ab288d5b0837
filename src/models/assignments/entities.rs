use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::models::submissions::entities::Submission;

string_enum! {
    /// 作业状态
    #[ts(export, export_to = "../frontend/src/types/generated/assignment.ts")]
    AssignmentStatus("作业状态") {
        Draft => "draft",
        Published => "published",
        Closed => "closed",
    }
}

impl Default for AssignmentStatus {
    fn default() -> Self {
        AssignmentStatus::Draft
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/assignment.ts")]
pub struct Assignment {
    pub id: i64,
    pub class_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub due_date: chrono::DateTime<chrono::Utc>,
    pub max_score: f64,
    pub status: AssignmentStatus,
    pub created_by: i64,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// 学生视角：作业 + 课程名 + 自己的提交
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/assignment.ts")]
pub struct StudentAssignment {
    pub assignment: Assignment,
    pub subject_name: String,
    pub submission: Option<Submission>,
}
