use actix_web::{HttpResponse, Result as ActixResult};

use crate::models::ApiResponse;
use crate::utils::jwt::JwtUtils;

/// 覆盖 refresh_token cookie，access token 自然过期
pub async fn handle_logout() -> ActixResult<HttpResponse> {
    Ok(HttpResponse::Ok()
        .cookie(JwtUtils::expired_refresh_cookie())
        .json(ApiResponse::<()>::success_empty("Logged out")))
}
