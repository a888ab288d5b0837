use serde::Deserialize;
use ts_rs::TS;

use super::entities::AssignmentStatus;
use crate::models::common::PaginationQuery;

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/assignment.ts")]
pub struct CreateAssignmentRequest {
    pub class_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub due_date: chrono::DateTime<chrono::Utc>,
    pub max_score: f64,
    #[serde(default)]
    pub status: AssignmentStatus,
}

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/assignment.ts")]
pub struct UpdateAssignmentRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<chrono::DateTime<chrono::Utc>>,
    pub max_score: Option<f64>,
    pub status: Option<AssignmentStatus>,
}

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/assignment.ts")]
pub struct AssignmentListParams {
    #[serde(flatten)]
    #[ts(flatten)]
    pub pagination: PaginationQuery,
    pub class_id: i64,
    pub status: Option<AssignmentStatus>,
}

#[derive(Debug, Clone)]
pub struct NewAssignment {
    pub class_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub due_date: i64,
    pub max_score: f64,
    pub status: AssignmentStatus,
    pub created_by: i64,
}

#[derive(Debug, Clone, Default)]
pub struct AssignmentUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<i64>,
    pub max_score: Option<f64>,
    pub status: Option<AssignmentStatus>,
}

#[derive(Debug, Clone, Default)]
pub struct AssignmentListQuery {
    pub page: Option<i64>,
    pub size: Option<i64>,
    pub class_id: i64,
    pub status: Option<AssignmentStatus>,
}
