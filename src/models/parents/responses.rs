use serde::Serialize;
use ts_rs::TS;

use crate::models::attendance::entities::AttendanceCounts;
use crate::models::grades::entities::GradeDetail;
use crate::models::profiles::entities::StudentSummary;
use crate::models::sections::entities::Section;

/// 家长首页的孩子概览
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/parent.ts")]
pub struct ChildOverview {
    pub student: StudentSummary,
    pub section: Option<Section>,
    pub average_grade: Option<f64>,
    pub attendance: AttendanceCounts,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/parent.ts")]
pub struct ParentChildrenResponse {
    pub items: Vec<ChildOverview>,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/parent.ts")]
pub struct ChildGradesResponse {
    pub student: StudentSummary,
    pub items: Vec<GradeDetail>,
}
