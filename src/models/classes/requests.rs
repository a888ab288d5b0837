use serde::Deserialize;
use ts_rs::TS;

use crate::models::common::PaginationQuery;

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/class.ts")]
pub struct CreateClassRequest {
    pub section_id: i64,
    pub teacher_id: i64,
    pub subject_name: String,
    pub schedule: Option<String>,
}

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/class.ts")]
pub struct UpdateClassRequest {
    pub section_id: Option<i64>,
    pub teacher_id: Option<i64>,
    pub subject_name: Option<String>,
    pub schedule: Option<String>,
}

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/class.ts")]
pub struct ClassListParams {
    #[serde(flatten)]
    #[ts(flatten)]
    pub pagination: PaginationQuery,
    pub section_id: Option<i64>,
    pub search: Option<String>,
}

// 存储层查询，teacher_id / section_id 由服务层按角色填充
#[derive(Debug, Clone, Default)]
pub struct ClassListQuery {
    pub page: Option<i64>,
    pub size: Option<i64>,
    pub section_id: Option<i64>,
    pub teacher_id: Option<i64>,
    pub search: Option<String>,
}
