use serde::{Deserialize, Serialize};
use ts_rs::TS;

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/material.ts")]
pub struct LearningMaterial {
    pub id: i64,
    pub class_id: i64,
    pub uploaded_by: i64,
    pub title: String,
    pub description: Option<String>,
    /// 已上传文件的 token
    pub file_token: Option<String>,
    pub link_url: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}
