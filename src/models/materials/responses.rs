use serde::Serialize;
use ts_rs::TS;

use super::entities::LearningMaterial;

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/material.ts")]
pub struct MaterialListResponse {
    pub items: Vec<LearningMaterial>,
}
