use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// 上传文件元数据，作业提交与学习资料通过 token 引用
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/file.ts")]
pub struct File {
    pub token: String,
    // 原始文件名
    pub file_name: String,
    // 字节数
    pub file_size: i64,
    // 扩展名
    pub file_type: String,
    pub uploaded_at: chrono::DateTime<chrono::Utc>,
    // 上传者
    pub user_id: i64,
}
