use serde::{Deserialize, Serialize};
use ts_rs::TS;

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/class.ts")]
pub struct Class {
    pub id: i64,
    // 所属分区
    pub section_id: i64,
    // 任课教师（teachers.id）
    pub teacher_id: i64,
    pub subject_name: String,
    // 上课时间，自由文本
    pub schedule: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// 课程 + 分区 + 教师姓名
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/class.ts")]
pub struct ClassDetail {
    pub class: Class,
    pub section_name: String,
    pub grade_level: String,
    pub teacher_name: String,
}
