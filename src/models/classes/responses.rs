use serde::Serialize;
use ts_rs::TS;

use super::entities::ClassDetail;
use crate::models::common::PaginationInfo;

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/class.ts")]
pub struct ClassListResponse {
    pub items: Vec<ClassDetail>,
    pub pagination: PaginationInfo,
}
