//! 访问令牌与刷新令牌
//!
//! access token 放在 `Authorization: Bearer`，refresh token 只走 HttpOnly cookie。

use crate::config::AppConfig;
use actix_web::cookie::{Cookie, SameSite};
use jsonwebtoken::errors::{Error as JwtError, ErrorKind};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

pub const REFRESH_COOKIE: &str = "refresh_token";

/// 令牌用途，写入 claims.token_type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Access,
    Refresh,
}

impl TokenKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Access => "access",
            TokenKind::Refresh => "refresh",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub role: String,
    pub token_type: String,
    pub exp: usize,
    pub iat: usize,
}

impl Claims {
    pub fn user_id(&self) -> Result<i64, JwtError> {
        self.sub
            .parse::<i64>()
            .map_err(|_| JwtError::from(ErrorKind::InvalidSubject))
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

pub struct JwtUtils;

impl JwtUtils {
    fn secret() -> &'static str {
        &AppConfig::get().jwt.secret
    }

    /// 按用途签发，exp = now + ttl
    pub fn issue(
        user_id: i64,
        role: &str,
        kind: TokenKind,
        ttl: chrono::Duration,
    ) -> Result<String, JwtError> {
        let now = chrono::Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            role: role.to_string(),
            token_type: kind.as_str().to_string(),
            exp: (now + ttl).timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(Self::secret().as_bytes()),
        )
    }

    pub fn access_ttl() -> chrono::Duration {
        chrono::Duration::minutes(AppConfig::get().jwt.access_token_expiry)
    }

    /// 记住我时使用更长的刷新期限
    pub fn refresh_ttl(remember_me: bool) -> chrono::Duration {
        let jwt = &AppConfig::get().jwt;
        if remember_me {
            chrono::Duration::days(jwt.refresh_token_remember_me_expiry)
        } else {
            chrono::Duration::days(jwt.refresh_token_expiry)
        }
    }

    pub fn generate_token_pair(
        user_id: i64,
        role: &str,
        remember_me: bool,
    ) -> Result<TokenPair, JwtError> {
        Ok(TokenPair {
            access_token: Self::issue(user_id, role, TokenKind::Access, Self::access_ttl())?,
            refresh_token: Self::issue(
                user_id,
                role,
                TokenKind::Refresh,
                Self::refresh_ttl(remember_me),
            )?,
        })
    }

    /// 校验签名、过期时间与用途
    pub fn verify(token: &str, kind: TokenKind) -> Result<Claims, JwtError> {
        let claims = decode::<Claims>(
            token,
            &DecodingKey::from_secret(Self::secret().as_bytes()),
            &Validation::default(),
        )?
        .claims;

        if claims.token_type != kind.as_str() {
            return Err(JwtError::from(ErrorKind::InvalidToken));
        }
        Ok(claims)
    }

    /// 用 refresh token 换新的 access token
    pub fn refresh_access_token(refresh_token: &str) -> Result<String, JwtError> {
        let claims = Self::verify(refresh_token, TokenKind::Refresh)?;
        Self::issue(
            claims.user_id()?,
            &claims.role,
            TokenKind::Access,
            Self::access_ttl(),
        )
    }

    pub fn refresh_cookie(refresh_token: &str, remember_me: bool) -> Cookie<'static> {
        let max_age = Self::refresh_ttl(remember_me).num_seconds();
        Cookie::build(REFRESH_COOKIE, refresh_token.to_string())
            .path("/")
            .max_age(actix_web::cookie::time::Duration::seconds(max_age))
            .same_site(SameSite::Strict)
            .http_only(true)
            .secure(AppConfig::get().is_production())
            .finish()
    }

    /// 注销时覆盖为空并立即过期
    pub fn expired_refresh_cookie() -> Cookie<'static> {
        Cookie::build(REFRESH_COOKIE, "")
            .path("/")
            .max_age(actix_web::cookie::time::Duration::ZERO)
            .same_site(SameSite::Strict)
            .http_only(true)
            .secure(AppConfig::get().is_production())
            .finish()
    }

    pub fn refresh_token_from_cookie(req: &actix_web::HttpRequest) -> Option<String> {
        req.cookie(REFRESH_COOKIE).map(|c| c.value().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pair_verifies_by_kind() {
        let pair = JwtUtils::generate_token_pair(42, "teacher", false).unwrap();

        let claims = JwtUtils::verify(&pair.access_token, TokenKind::Access).unwrap();
        assert_eq!(claims.user_id().unwrap(), 42);
        assert_eq!(claims.role, "teacher");

        assert!(JwtUtils::verify(&pair.access_token, TokenKind::Refresh).is_err());
        assert!(JwtUtils::verify(&pair.refresh_token, TokenKind::Refresh).is_ok());
    }

    #[test]
    fn test_expired_token_rejected() {
        let token =
            JwtUtils::issue(1, "admin", TokenKind::Access, chrono::Duration::minutes(-10)).unwrap();
        assert!(JwtUtils::verify(&token, TokenKind::Access).is_err());
    }

    #[test]
    fn test_refresh_issues_access_token() {
        let pair = JwtUtils::generate_token_pair(7, "parent", true).unwrap();
        let access = JwtUtils::refresh_access_token(&pair.refresh_token).unwrap();
        let claims = JwtUtils::verify(&access, TokenKind::Access).unwrap();
        assert_eq!(claims.sub, "7");

        assert!(JwtUtils::refresh_access_token(&pair.access_token).is_err());
    }

    #[test]
    fn test_remember_me_extends_refresh_ttl() {
        assert!(JwtUtils::refresh_ttl(true) > JwtUtils::refresh_ttl(false));
    }
}
