use serde::Serialize;
use ts_rs::TS;

use super::entities::SectionWithCounts;
use crate::models::common::PaginationInfo;
use crate::models::profiles::entities::StudentSummary;

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/section.ts")]
pub struct SectionListResponse {
    pub items: Vec<SectionWithCounts>,
    pub pagination: PaginationInfo,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/section.ts")]
pub struct SectionStudentsResponse {
    pub section_id: i64,
    pub items: Vec<StudentSummary>,
}
