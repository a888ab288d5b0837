//! 数据模型
//!
//! 请求/响应结构与业务实体，统一导出 TypeScript 类型给前端。

/// 定义以小写字符串持久化的枚举
///
/// 生成 `as_str()`、`Display`、`FromStr` 以及带可读错误的 `Deserialize`。
macro_rules! string_enum {
    (
        $(#[$meta:meta])*
        $name:ident($label:literal) {
            $($variant:ident => $value:literal),+ $(,)?
        }
    ) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, ts_rs::TS)]
        #[serde(rename_all = "snake_case")]
        $(#[$meta])*
        pub enum $name {
            $($variant,)+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $value,)+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($value => Ok($name::$variant),)+
                    _ => Err(format!("Invalid {}: {s}", $label)),
                }
            }
        }

        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let s = <String as serde::Deserialize>::deserialize(deserializer)?;
                s.parse::<$name>().map_err(|_| {
                    serde::de::Error::custom(format!(
                        "无效的{}: '{s}'. 支持: {}",
                        $label,
                        [$($value),+].join(", ")
                    ))
                })
            }
        }
    };
}

pub mod alerts;
pub mod announcements;
pub mod applicants;
pub mod assignments;
pub mod attendance;
pub mod auth;
pub mod classes;
pub mod common;
pub mod files;
pub mod grades;
pub mod materials;
pub mod parents;
pub mod profiles;
pub mod quizzes;
pub mod sections;
pub mod submissions;
pub mod users;

pub use common::{ApiResponse, PaginationInfo, PaginationQuery};

/// 程序启动时间
#[derive(Debug, Clone)]
pub struct AppStartTime {
    pub start_datetime: chrono::DateTime<chrono::Utc>,
}

/// 业务错误码
///
/// 0 为成功；1xxx 通用；2xxx 用户与招生；3xxx 分区与课程；4xxx 教学记录；5xxx 提醒；6xxx 文件。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ErrorCode {
    Success = 0,

    // 通用
    BadRequest = 1000,
    Unauthorized = 1001,
    Forbidden = 1003,
    NotFound = 1004,
    Conflict = 1009,
    InternalServerError = 1500,
    RateLimitExceeded = 1429,

    // 认证
    AuthFailed = 1100,
    RegisterFailed = 1101,

    // 用户
    UserNotFound = 2000,
    UserEmailInvalid = 2002,
    UserPasswordInvalid = 2003,
    UserNameInvalid = 2004,
    UserEmailAlreadyExists = 2005,
    UserCreationFailed = 2006,
    UserUpdateFailed = 2007,
    UserDeleteFailed = 2008,
    CanNotDeleteCurrentUser = 2009,

    // 招生
    ApplicantNotFound = 2100,
    ApplicantAlreadyApproved = 2101,
    ApplicantStatusInvalid = 2102,
    ApplicantGenderInvalid = 2103,
    ApplicantBirthdateInvalid = 2104,
    RejectionReasonRequired = 2105,

    // 学生 / 家长 / 教师资料
    StudentNotFound = 2200,
    ParentNotFound = 2201,
    TeacherNotFound = 2202,

    // 分区
    SectionNotFound = 3000,
    SectionAlreadyExists = 3001,
    SectionNotEmpty = 3002,

    // 课程
    ClassNotFound = 3100,
    ClassPermissionDenied = 3101,

    // 作业
    AssignmentNotFound = 4000,
    AssignmentNotPublished = 4001,

    // 作业提交
    SubmissionFailed = 4101,

    // 成绩
    GradeScoreInvalid = 4201,

    // 考勤
    AttendanceInvalid = 4300,

    // 测验
    QuizNotFound = 4400,
    QuizNotPublished = 4401,
    QuizAttemptNotFound = 4402,
    QuizAttemptAlreadySubmitted = 4403,
    QuizMaxAttemptsReached = 4404,
    QuizInvalid = 4405,

    // 公告
    AnnouncementNotFound = 4500,

    // 学习资料
    MaterialNotFound = 4600,

    // 提醒
    AlertNotFound = 5000,
    CronDisabled = 5001,

    // 文件
    FileNotFound = 6000,
    FileUploadFailed = 6001,
    FileTypeNotAllowed = 6002,
    FileSizeExceeded = 6003,
    MultifileUploadNotAllowed = 6004,
}
