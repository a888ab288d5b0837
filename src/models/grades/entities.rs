use serde::{Deserialize, Serialize};
use ts_rs::TS;

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/grade.ts")]
pub struct Grade {
    pub id: i64,
    pub student_id: i64,
    pub class_id: i64,
    /// 为空表示课程总评
    pub assignment_id: Option<i64>,
    pub score: f64,
    pub remarks: Option<String>,
    pub feedback_emoji: Option<String>,
    pub graded_by: i64,
    pub graded_at: chrono::DateTime<chrono::Utc>,
}

/// 成绩唯一键："{student}:{class}:{assignment|overall}"
pub fn grade_scope_key(student_id: i64, class_id: i64, assignment_id: Option<i64>) -> String {
    match assignment_id {
        Some(id) => format!("{student_id}:{class_id}:{id}"),
        None => format!("{student_id}:{class_id}:overall"),
    }
}

/// 成绩 + 学生 / 课程 / 作业信息
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/grade.ts")]
pub struct GradeDetail {
    pub grade: Grade,
    pub student_number: String,
    pub student_name: String,
    pub subject_name: String,
    pub assignment_title: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_key_distinguishes_overall() {
        assert_eq!(grade_scope_key(3, 7, Some(11)), "3:7:11");
        assert_eq!(grade_scope_key(3, 7, None), "3:7:overall");
        assert_ne!(grade_scope_key(3, 71, None), grade_scope_key(37, 1, None));
    }
}
