/*!
 * 速率限制中间件
 *
 * 固定窗口计数，键为 `前缀:用户或IP:窗口序号`。已认证请求按用户计数，否则按客户端 IP。
 *
 * ```rust,ignore
 * web::resource("/login").wrap(RateLimit::login()).route(web::post().to(login))
 * ```
 */

use actix_service::{Service, Transform};
use actix_web::{
    Error, HttpMessage, HttpResponse,
    body::EitherBody,
    dev::{ServiceRequest, ServiceResponse},
    http::StatusCode,
    http::header::CONTENT_TYPE,
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use moka::future::Cache;
use once_cell::sync::Lazy;
use std::net::IpAddr;
use std::rc::Rc;
use std::time::Duration;
use tracing::warn;

use crate::models::users::entities::User;
use crate::models::{ApiResponse, ErrorCode};

// 最长窗口之后自然过期
static RATE_LIMIT_CACHE: Lazy<Cache<String, u32>> = Lazy::new(|| {
    Cache::builder()
        .time_to_live(Duration::from_secs(3600))
        .max_capacity(100_000)
        .build()
});

#[derive(Clone)]
pub struct RateLimit {
    max_requests: u32,
    window_secs: u64,
    key_prefix: &'static str,
}

impl RateLimit {
    pub fn new(max_requests: u32, window_secs: u64, key_prefix: &'static str) -> Self {
        Self {
            max_requests,
            window_secs: window_secs.max(1),
            key_prefix,
        }
    }

    /// 5 次/分钟
    pub fn login() -> Self {
        Self::new(5, 60, "login")
    }

    /// 报名 3 次/分钟
    pub fn signup() -> Self {
        Self::new(3, 60, "signup")
    }

    pub fn refresh_token() -> Self {
        Self::new(10, 60, "refresh")
    }

    pub fn file_upload() -> Self {
        Self::new(10, 60, "upload")
    }

    fn cache_key(&self, identifier: &str, now_secs: u64) -> String {
        format!(
            "{}:{}:{}",
            self.key_prefix,
            identifier,
            now_secs / self.window_secs
        )
    }

    /// 当前窗口剩余秒数
    fn retry_after(&self, now_secs: u64) -> u64 {
        self.window_secs - now_secs % self.window_secs
    }
}

/// 先取连接信息，再退回转发头
fn client_ip(req: &ServiceRequest) -> String {
    let from_connection = req
        .connection_info()
        .realip_remote_addr()
        .map(|s| s.to_string());

    if let Some(ref ip) = from_connection
        && ip.parse::<IpAddr>().is_ok()
    {
        return ip.clone();
    }

    if let Some(value) = req
        .headers()
        .get("X-Forwarded-For")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        && value.parse::<IpAddr>().is_ok()
    {
        return value.to_string();
    }

    from_connection.unwrap_or_else(|| "unknown".to_string())
}

fn rate_limited_response(retry_after: u64) -> HttpResponse {
    HttpResponse::build(StatusCode::TOO_MANY_REQUESTS)
        .insert_header((CONTENT_TYPE, "application/json; charset=utf-8"))
        .insert_header(("Retry-After", retry_after.to_string()))
        .json(ApiResponse::error_empty(
            ErrorCode::RateLimitExceeded,
            "Too many requests, please try again later",
        ))
}

impl<S, B> Transform<S, ServiceRequest> for RateLimit
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RateLimitMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RateLimitMiddleware {
            service: Rc::new(service),
            policy: self.clone(),
        }))
    }
}

pub struct RateLimitMiddleware<S> {
    service: Rc<S>,
    policy: RateLimit,
}

impl<S, B> Service<ServiceRequest> for RateLimitMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &self,
        ctx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let srv = self.service.clone();
        let policy = self.policy.clone();

        Box::pin(async move {
            let identifier = match req.extensions().get::<User>() {
                Some(user) => format!("user:{}", user.id),
                None => format!("ip:{}", client_ip(&req)),
            };
            let now = chrono::Utc::now().timestamp().max(0) as u64;
            let key = policy.cache_key(&identifier, now);

            let count = RATE_LIMIT_CACHE.get(&key).await.unwrap_or(0);
            if count >= policy.max_requests {
                warn!(
                    "Rate limit exceeded for {} ({}/{})",
                    key, count, policy.max_requests
                );
                return Ok(req.into_response(
                    rate_limited_response(policy.retry_after(now)).map_into_right_body(),
                ));
            }
            RATE_LIMIT_CACHE.insert(key, count + 1).await;

            Ok(srv.call(req).await?.map_into_left_body())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets() {
        let login = RateLimit::login();
        assert_eq!(login.max_requests, 5);
        assert_eq!(login.window_secs, 60);
        assert_eq!(RateLimit::signup().max_requests, 3);
    }

    #[test]
    fn test_window_bucketing() {
        let limit = RateLimit::new(1, 60, "x");
        assert_eq!(limit.cache_key("ip:1.2.3.4", 119), "x:ip:1.2.3.4:1");
        assert_eq!(limit.cache_key("ip:1.2.3.4", 120), "x:ip:1.2.3.4:2");
        assert_eq!(limit.retry_after(119), 1);
        assert_eq!(limit.retry_after(120), 60);
    }
}
