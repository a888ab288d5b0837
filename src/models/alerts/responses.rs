use serde::Serialize;
use ts_rs::TS;

use super::entities::Alert;

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/alert.ts")]
pub struct AlertListResponse {
    pub items: Vec<Alert>,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/alert.ts")]
pub struct UnreadCountResponse {
    pub unread_count: i64,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/alert.ts")]
pub struct MarkViewedResponse {
    pub marked_count: i64,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/alert.ts")]
pub struct GenerateAlertsResponse {
    pub created: i64,
}
