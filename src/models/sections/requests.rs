use serde::Deserialize;
use ts_rs::TS;

use crate::models::common::PaginationQuery;

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/section.ts")]
pub struct CreateSectionRequest {
    pub grade_level: String,
    pub name: String,
}

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/section.ts")]
pub struct UpdateSectionRequest {
    pub grade_level: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/section.ts")]
pub struct SectionListParams {
    #[serde(flatten)]
    #[ts(flatten)]
    pub pagination: PaginationQuery,
    pub grade_level: Option<String>,
    pub search: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct SectionListQuery {
    pub page: Option<i64>,
    pub size: Option<i64>,
    pub grade_level: Option<String>,
    pub search: Option<String>,
}
