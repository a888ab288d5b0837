//! SeaORM 实体定义
//!
//! 这些实体用于数据库操作，与 models 模块中的业务实体分离。
//! Storage 层使用这些实体进行 CRUD 操作，然后转换为 models 中的业务实体。
//! 时间统一存为 unix 秒，枚举统一存为小写字符串。

pub mod prelude;

pub mod admins;
pub mod alerts;
pub mod announcements;
pub mod applicants;
pub mod assignment_submissions;
pub mod assignments;
pub mod attendance;
pub mod classes;
pub mod files;
pub mod grades;
pub mod id_counters;
pub mod learning_materials;
pub mod parents;
pub mod quiz_answers;
pub mod quiz_attempts;
pub mod quiz_options;
pub mod quiz_questions;
pub mod quizzes;
pub mod sections;
pub mod students;
pub mod teachers;
pub mod users;

use chrono::{DateTime, Utc};

/// unix 秒转 UTC 时间，非法值回落到 epoch
pub(crate) fn to_datetime(ts: i64) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(ts, 0).unwrap_or_default()
}

/// 解析持久化的枚举字符串，未知值回落到默认值并记录日志
pub(crate) fn parse_or<T: std::str::FromStr>(value: &str, fallback: T) -> T {
    value.parse::<T>().unwrap_or_else(|_| {
        tracing::warn!("Unknown stored enum value: {}", value);
        fallback
    })
}
