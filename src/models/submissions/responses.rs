use serde::Serialize;
use ts_rs::TS;

use super::entities::{Submission, SubmissionWithStudent};

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/submission.ts")]
pub struct SubmitAssignmentResponse {
    pub submission: Submission,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/submission.ts")]
pub struct SubmissionListResponse {
    pub assignment_id: i64,
    pub items: Vec<SubmissionWithStudent>,
}
