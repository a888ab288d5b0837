use serde::Deserialize;
use ts_rs::TS;

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/grade.ts")]
pub struct UpsertGradeRequest {
    pub student_id: i64,
    pub class_id: i64,
    pub assignment_id: Option<i64>,
    pub score: f64,
    pub remarks: Option<String>,
    pub feedback_emoji: Option<String>,
}

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/grade.ts")]
pub struct TeacherGradeListParams {
    pub class_id: i64,
    pub assignment_id: Option<i64>,
}

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/grade.ts")]
pub struct StudentGradeListParams {
    pub class_id: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct GradeUpsert {
    pub student_id: i64,
    pub class_id: i64,
    pub assignment_id: Option<i64>,
    pub score: f64,
    pub remarks: Option<String>,
    pub feedback_emoji: Option<String>,
    pub graded_by: i64,
}
