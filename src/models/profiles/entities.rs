//! 角色资料（教师 / 家长 / 学生），与 users 一对一

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// 编号类别，决定前缀
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentifierKind {
    Student,
    Teacher,
    Parent,
    Applicant,
}

impl IdentifierKind {
    pub fn prefix(&self) -> &'static str {
        match self {
            IdentifierKind::Student => "BFPS",
            IdentifierKind::Teacher => "EMP",
            IdentifierKind::Parent => "P",
            IdentifierKind::Applicant => "APP",
        }
    }

    /// id_counters.counter_type 列的取值
    pub fn counter_type(&self) -> &'static str {
        match self {
            IdentifierKind::Student => "student",
            IdentifierKind::Teacher => "teacher",
            IdentifierKind::Parent => "parent",
            IdentifierKind::Applicant => "applicant",
        }
    }
}

/// `{PREFIX}-{year}-{number:04}`，超过 9999 自然加宽
pub fn format_identifier(kind: IdentifierKind, year: i32, number: i64) -> String {
    format!("{}-{}-{:04}", kind.prefix(), year, number)
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/profile.ts")]
pub struct Teacher {
    pub id: i64,
    pub user_id: i64,
    pub employee_number: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/profile.ts")]
pub struct Parent {
    pub id: i64,
    pub user_id: i64,
    pub parent_number: String,
    pub phone: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/profile.ts")]
pub struct Student {
    pub id: i64,
    pub user_id: i64,
    pub parent_id: Option<i64>,
    pub section_id: Option<i64>,
    pub student_number: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// 学生 + 姓名，用于名单类接口
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/profile.ts")]
pub struct StudentSummary {
    pub id: i64,
    pub user_id: i64,
    pub student_number: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub parent_id: Option<i64>,
    pub section_id: Option<i64>,
}

impl StudentSummary {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_identifier_pads_to_four_digits() {
        assert_eq!(
            format_identifier(IdentifierKind::Student, 2025, 1),
            "BFPS-2025-0001"
        );
        assert_eq!(
            format_identifier(IdentifierKind::Teacher, 2024, 42),
            "EMP-2024-0042"
        );
        assert_eq!(
            format_identifier(IdentifierKind::Parent, 2025, 9999),
            "P-2025-9999"
        );
    }

    #[test]
    fn test_format_identifier_widens_past_four_digits() {
        assert_eq!(
            format_identifier(IdentifierKind::Applicant, 2025, 12345),
            "APP-2025-12345"
        );
    }
}
