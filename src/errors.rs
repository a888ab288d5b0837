//! 统一错误处理模块
//!
//! 使用宏生成错误类型，每个变体带有错误代码、类型名称和对应的 HTTP 状态码。

use std::fmt;

/// 定义错误类型的宏
///
/// 自动生成：
/// - enum 定义
/// - code() / error_type() / message() / status_code()
/// - snake_case 便捷构造函数
macro_rules! define_schoolsystem_errors {
    ($(
        $variant:ident($code:literal, $type_name:literal, $status:literal)
    ),* $(,)?) => {
        #[derive(Debug, Clone)]
        pub enum SchoolSystemError {
            $($variant(String),)*
        }

        impl SchoolSystemError {
            /// 获取错误代码
            pub fn code(&self) -> &'static str {
                match self {
                    $(SchoolSystemError::$variant(_) => $code,)*
                }
            }

            /// 获取错误类型名称
            pub fn error_type(&self) -> &'static str {
                match self {
                    $(SchoolSystemError::$variant(_) => $type_name,)*
                }
            }

            /// 获取错误详情
            pub fn message(&self) -> &str {
                match self {
                    $(SchoolSystemError::$variant(msg) => msg,)*
                }
            }

            /// 对应的 HTTP 状态码
            pub fn status_code(&self) -> u16 {
                match self {
                    $(SchoolSystemError::$variant(_) => $status,)*
                }
            }
        }

        paste::paste! {
            impl SchoolSystemError {
                $(
                    pub fn [<$variant:snake>]<T: Into<String>>(msg: T) -> Self {
                        SchoolSystemError::$variant(msg.into())
                    }
                )*
            }
        }
    };
}

define_schoolsystem_errors! {
    CacheConnection("E001", "Cache Connection Error", 500),
    DatabaseConfig("E003", "Database Configuration Error", 500),
    DatabaseConnection("E004", "Database Connection Error", 500),
    DatabaseOperation("E005", "Database Operation Error", 500),
    FileOperation("E006", "File Operation Error", 500),
    Validation("E007", "Validation Error", 400),
    NotFound("E008", "Resource Not Found", 404),
    Serialization("E009", "Serialization Error", 500),
    DateParse("E011", "Date Parse Error", 400),
    Authentication("E012", "Authentication Error", 401),
    Authorization("E013", "Authorization Error", 403),
    Conflict("E014", "Conflict", 409),
}

impl SchoolSystemError {
    /// 格式化为简洁输出
    pub fn format_simple(&self) -> String {
        format!("[{}] {}: {}", self.code(), self.error_type(), self.message())
    }

    /// 是否属于业务规则错误（非 5xx）
    pub fn is_client_error(&self) -> bool {
        self.status_code() < 500
    }
}

impl fmt::Display for SchoolSystemError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for SchoolSystemError {}

impl From<sea_orm::DbErr> for SchoolSystemError {
    fn from(err: sea_orm::DbErr) -> Self {
        SchoolSystemError::DatabaseOperation(err.to_string())
    }
}

impl From<std::io::Error> for SchoolSystemError {
    fn from(err: std::io::Error) -> Self {
        SchoolSystemError::FileOperation(err.to_string())
    }
}

impl From<serde_json::Error> for SchoolSystemError {
    fn from(err: serde_json::Error) -> Self {
        SchoolSystemError::Serialization(err.to_string())
    }
}

impl From<chrono::ParseError> for SchoolSystemError {
    fn from(err: chrono::ParseError) -> Self {
        SchoolSystemError::DateParse(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SchoolSystemError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(SchoolSystemError::cache_connection("test").code(), "E001");
        assert_eq!(SchoolSystemError::validation("test").code(), "E007");
        assert_eq!(SchoolSystemError::conflict("test").code(), "E014");
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(SchoolSystemError::validation("x").status_code(), 400);
        assert_eq!(SchoolSystemError::not_found("x").status_code(), 404);
        assert_eq!(SchoolSystemError::conflict("x").status_code(), 409);
        assert_eq!(SchoolSystemError::authorization("x").status_code(), 403);
        assert_eq!(SchoolSystemError::database_operation("x").status_code(), 500);
        assert!(!SchoolSystemError::file_operation("x").is_client_error());
    }

    #[test]
    fn test_db_error_maps_to_operation_error() {
        let err: SchoolSystemError = sea_orm::DbErr::Custom("boom".into()).into();
        assert_eq!(err.error_type(), "Database Operation Error");
        assert!(err.message().contains("boom"));
    }

    #[test]
    fn test_format_simple() {
        let err = SchoolSystemError::conflict("Applicant already approved");
        let formatted = err.format_simple();
        assert!(formatted.contains("Conflict"));
        assert!(formatted.contains("already approved"));
    }
}
