use serde::{Deserialize, Serialize};
use ts_rs::TS;

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/section.ts")]
pub struct Section {
    pub id: i64,
    pub grade_level: String,
    pub name: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl Section {
    /// 例如 "Grade 7 - Rizal"
    pub fn display_name(&self) -> String {
        format!("{} - {}", self.grade_level, self.name)
    }
}

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/section.ts")]
pub struct SectionWithCounts {
    pub section: Section,
    pub student_count: i64,
    pub class_count: i64,
}
