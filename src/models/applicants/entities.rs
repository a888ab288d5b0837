use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::models::users::entities::User;

string_enum! {
    /// 申请状态
    #[ts(export, export_to = "../frontend/src/types/generated/applicant.ts")]
    ApplicantStatus("申请状态") {
        Pending => "pending",
        UnderReview => "under_review",
        Approved => "approved",
        Rejected => "rejected",
        Waitlisted => "waitlisted",
    }
}

string_enum! {
    #[ts(export, export_to = "../frontend/src/types/generated/applicant.ts")]
    ApplicationType("申请类型") {
        New => "new",
        Transferee => "transferee",
        Returning => "returning",
    }
}

impl Default for ApplicationType {
    fn default() -> Self {
        ApplicationType::New
    }
}

string_enum! {
    #[ts(export, export_to = "../frontend/src/types/generated/applicant.ts")]
    Gender("性别") {
        Male => "male",
        Female => "female",
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/applicant.ts")]
pub struct Applicant {
    pub id: i64,
    pub user_id: i64,
    pub status: ApplicantStatus,
    pub reference_code: String,
    pub applicant_number: String,
    pub application_type: ApplicationType,
    pub gender: Gender,
    /// YYYY-MM-DD
    pub birthdate: String,
    pub grade_level_applied: Option<String>,
    pub guardian_name: Option<String>,
    pub contact_number: Option<String>,
    pub address: Option<String>,
    pub personal_info: Option<String>,
    pub rejection_reason: Option<String>,
    pub reviewed_at: Option<chrono::DateTime<chrono::Utc>>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// 申请 + 申请人账号
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/applicant.ts")]
pub struct ApplicantDetail {
    pub applicant: Applicant,
    pub user: User,
}
