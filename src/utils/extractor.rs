//! 路径参数提取器
//!
//! 非正整数的 id 直接返回 400 + 统一响应体，而不是 actix 默认的 404 纯文本。

use actix_web::{FromRequest, HttpRequest, HttpResponse, dev::Payload, error::InternalError};
use futures_util::future::{Ready, ready};

use crate::models::{ApiResponse, ErrorCode};

/// 解析为正 i64
pub fn parse_positive_id(raw: Option<&str>) -> Option<i64> {
    raw.and_then(|s| s.parse::<i64>().ok()).filter(|id| *id > 0)
}

fn invalid_path_param(param: &str) -> actix_web::Error {
    let response = HttpResponse::BadRequest().json(ApiResponse::error_empty(
        ErrorCode::BadRequest,
        format!("Invalid path parameter '{param}'"),
    ));
    InternalError::from_response(format!("invalid {param}"), response).into()
}

/// `define_safe_i64_extractor!(SafeQuizId, "quiz_id")` 生成读取 `{quiz_id}` 的提取器
#[macro_export]
macro_rules! define_safe_i64_extractor {
    ($name:ident, $param:literal) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub struct $name(pub i64);

        impl actix_web::FromRequest for $name {
            type Error = actix_web::Error;
            type Future = futures_util::future::Ready<Result<Self, Self::Error>>;

            fn from_request(
                req: &actix_web::HttpRequest,
                _: &mut actix_web::dev::Payload,
            ) -> Self::Future {
                futures_util::future::ready(
                    $crate::utils::extractor::extract_id(req, $param).map($name),
                )
            }
        }
    };
}

pub fn extract_id(req: &HttpRequest, param: &str) -> Result<i64, actix_web::Error> {
    parse_positive_id(req.match_info().get(param)).ok_or_else(|| invalid_path_param(param))
}

define_safe_i64_extractor!(SafeIDI64, "id");
define_safe_i64_extractor!(SafeClassIdI64, "class_id");
define_safe_i64_extractor!(SafeStudentIdI64, "student_id");
define_safe_i64_extractor!(SafeAttemptIdI64, "attempt_id");

/// 文件 token（uuid）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SafeFileToken(pub String);

impl FromRequest for SafeFileToken {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let token = req
            .match_info()
            .get("token")
            .filter(|t| uuid::Uuid::parse_str(t).is_ok())
            .map(|t| SafeFileToken(t.to_string()))
            .ok_or_else(|| invalid_path_param("token"));
        ready(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn test_parse_positive_id() {
        assert_eq!(parse_positive_id(Some("12")), Some(12));
        assert_eq!(parse_positive_id(Some("0")), None);
        assert_eq!(parse_positive_id(Some("-3")), None);
        assert_eq!(parse_positive_id(Some("1; DROP")), None);
        assert_eq!(parse_positive_id(None), None);
    }

    #[actix_web::test]
    async fn test_extractor_reads_named_param() {
        let req = TestRequest::default()
            .param("class_id", "7")
            .to_http_request();
        let id = SafeClassIdI64::extract(&req).await.unwrap();
        assert_eq!(id.0, 7);

        let req = TestRequest::default().param("class_id", "x").to_http_request();
        assert!(SafeClassIdI64::extract(&req).await.is_err());
    }

    #[actix_web::test]
    async fn test_file_token_must_be_uuid() {
        let token = uuid::Uuid::new_v4().to_string();
        let req = TestRequest::default().param("token", token.clone()).to_http_request();
        assert_eq!(SafeFileToken::extract(&req).await.unwrap().0, token);

        let req = TestRequest::default().param("token", "../etc/passwd").to_http_request();
        assert!(SafeFileToken::extract(&req).await.is_err());
    }
}
