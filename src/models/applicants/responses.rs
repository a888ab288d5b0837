use serde::Serialize;
use ts_rs::TS;

use super::entities::{ApplicantDetail, ApplicantStatus, ApplicationType};
use crate::models::common::PaginationInfo;
use crate::models::profiles::entities::Student;
use crate::models::sections::entities::Section;
use crate::models::users::entities::User;

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/applicant.ts")]
pub struct SignupResponse {
    pub applicant_number: String,
    pub reference_code: String,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/applicant.ts")]
pub struct ApplicantStatusResponse {
    pub status: ApplicantStatus,
    pub reference_code: String,
    pub applicant_number: String,
    pub application_type: ApplicationType,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
    pub rejection_reason: Option<String>,
    pub user: User,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/applicant.ts")]
pub struct ApplicantListResponse {
    pub items: Vec<ApplicantDetail>,
    pub pagination: PaginationInfo,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/applicant.ts")]
pub struct ApprovedStudent {
    pub id: i64,
    pub student_number: String,
    pub name: String,
    pub section: String,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/applicant.ts")]
pub struct ApproveApplicantResponse {
    pub message: String,
    pub student: ApprovedStudent,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/applicant.ts")]
pub struct RejectedApplicant {
    pub id: i64,
    pub applicant_number: String,
    pub name: String,
    pub status: ApplicantStatus,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/applicant.ts")]
pub struct RejectApplicantResponse {
    pub message: String,
    pub applicant: RejectedApplicant,
}

/// 录取事务的结果（存储层返回）
#[derive(Debug, Clone)]
pub struct ApprovalOutcome {
    pub student: Student,
    pub user: User,
    pub section: Section,
}
