//! 输入校验：邮箱、密码策略、姓名、日期

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").expect("Invalid email regex")
});

const COMMON_PASSWORDS: &[&str] = &[
    "password1",
    "password123",
    "qwerty123",
    "welcome123",
    "letmein123",
    "admin123",
    "abcd1234",
    "school123",
];

pub const MAX_NAME_LEN: usize = 100;

pub fn validate_email(email: &str) -> Result<(), &'static str> {
    if email.len() > 254 || !EMAIL_RE.is_match(email) {
        return Err("Email format is invalid");
    }
    Ok(())
}

/// 密码策略：至少 8 位，含大小写字母与数字，且不在常见弱密码表中
///
/// 返回全部不满足的条目，便于前端一次性提示。
pub fn password_problems(password: &str) -> Vec<&'static str> {
    let mut problems = Vec::new();

    if password.chars().count() < 8 {
        problems.push("Password must be at least 8 characters long");
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        problems.push("Password must contain at least one uppercase letter");
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        problems.push("Password must contain at least one lowercase letter");
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        problems.push("Password must contain at least one digit");
    }
    if COMMON_PASSWORDS
        .iter()
        .any(|weak| password.eq_ignore_ascii_case(weak))
    {
        problems.push("Password is too common");
    }

    problems
}

pub fn validate_password(password: &str) -> Result<(), String> {
    let problems = password_problems(password);
    if problems.is_empty() {
        Ok(())
    } else {
        Err(problems.join("; "))
    }
}

const DATE_FORMAT: &str = "%Y-%m-%d";

/// 姓名去掉首尾空白后不能为空
pub fn validate_name(field: &str, value: &str) -> Result<(), String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(format!("{field} is required"));
    }
    if trimmed.chars().count() > MAX_NAME_LEN {
        return Err(format!("{field} must be at most {MAX_NAME_LEN} characters"));
    }
    Ok(())
}

/// 严格的 YYYY-MM-DD，必须能原样格式化回去（拒绝 `2025-3-03`、前导空格或 `+` 号）
pub fn parse_date(value: &str) -> Result<NaiveDate, String> {
    let invalid = || format!("Invalid date '{value}', expected YYYY-MM-DD");
    let date = NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|_| invalid())?;
    if date.format(DATE_FORMAT).to_string() != value {
        return Err(invalid());
    }
    Ok(date)
}

/// 存储与比较用的规范日期字符串
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// 出生日期不能晚于 today
pub fn validate_birthdate(value: &str, today: NaiveDate) -> Result<NaiveDate, String> {
    let date = parse_date(value)?;
    if date > today {
        return Err("Birthdate cannot be in the future".to_string());
    }
    Ok(date)
}

/// 查询区间，start <= end
pub fn validate_date_range(start: &str, end: &str) -> Result<(NaiveDate, NaiveDate), String> {
    let start_date = parse_date(start)?;
    let end_date = parse_date(end)?;
    if start_date > end_date {
        return Err("start_date must not be after end_date".to_string());
    }
    Ok((start_date, end_date))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email() {
        assert!(validate_email("ana.cruz@school.edu.ph").is_ok());
        assert!(validate_email("no-at-sign.com").is_err());
        assert!(validate_email("a@b").is_err());
    }

    #[test]
    fn test_password_policy_lists_every_problem() {
        assert!(validate_password("Classroom42").is_ok());

        let problems = password_problems("abc");
        assert!(problems.contains(&"Password must be at least 8 characters long"));
        assert!(problems.contains(&"Password must contain at least one uppercase letter"));
        assert!(problems.contains(&"Password must contain at least one digit"));
        assert!(!problems.contains(&"Password must contain at least one lowercase letter"));
    }

    #[test]
    fn test_common_password_rejected_case_insensitively() {
        let err = validate_password("Password123").unwrap_err();
        assert!(err.contains("too common"));
    }

    #[test]
    fn test_name_required() {
        assert!(validate_name("first_name", "  ").is_err());
        assert!(validate_name("first_name", "Ana").is_ok());
        assert!(validate_name("last_name", &"x".repeat(101)).is_err());
    }

    #[test]
    fn test_dates() {
        let today = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        assert!(validate_birthdate("2012-05-01", today).is_ok());
        assert!(validate_birthdate("2025-06-02", today).is_err());
        assert!(validate_birthdate("2012-5-1", today).is_err());
        assert!(validate_birthdate("2012-02-30", today).is_err());

        assert!(validate_date_range("2025-01-01", "2025-01-31").is_ok());
        assert!(validate_date_range("2025-02-01", "2025-01-31").is_err());
    }

    #[test]
    fn test_parse_date_rejects_non_canonical_forms() {
        assert_eq!(
            parse_date("2025-03-03").map(format_date),
            Ok("2025-03-03".to_string())
        );
        for value in [" 2025-3-03", "+2025-3-03", "2025-3-3", "2025-03-3 ", "+2025-03-03"] {
            assert!(parse_date(value).is_err(), "{value:?} should be rejected");
        }
    }
}
