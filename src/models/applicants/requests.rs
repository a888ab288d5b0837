use serde::Deserialize;
use ts_rs::TS;

use super::entities::{ApplicantStatus, ApplicationType, Gender};
use crate::models::common::PaginationQuery;

// 公开报名请求
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/applicant.ts")]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    /// male | female，在服务层校验以返回 400
    pub gender: String,
    pub birthdate: String,
    #[serde(default)]
    pub application_type: ApplicationType,
    pub grade_level_applied: Option<String>,
    pub guardian_name: Option<String>,
    pub contact_number: Option<String>,
    pub address: Option<String>,
    pub personal_info: Option<String>,
}

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/applicant.ts")]
pub struct ApplicantListParams {
    #[serde(flatten)]
    #[ts(flatten)]
    pub pagination: PaginationQuery,
    pub status: Option<ApplicantStatus>,
    pub search: Option<String>,
}

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/applicant.ts")]
pub struct UpdateApplicantStatusRequest {
    pub status: ApplicantStatus,
}

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/applicant.ts")]
pub struct ApproveApplicantRequest {
    pub parent_id: i64,
    pub section_id: i64,
}

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/applicant.ts")]
pub struct RejectApplicantRequest {
    #[serde(default)]
    pub reason: String,
}

// 存储层参数
#[derive(Debug, Clone)]
pub struct NewApplication {
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub reference_code: String,
    pub application_type: ApplicationType,
    pub gender: Gender,
    pub birthdate: String,
    pub grade_level_applied: Option<String>,
    pub guardian_name: Option<String>,
    pub contact_number: Option<String>,
    pub address: Option<String>,
    pub personal_info: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ApplicantListQuery {
    pub page: Option<i64>,
    pub size: Option<i64>,
    pub status: Option<ApplicantStatus>,
    pub search: Option<String>,
}
