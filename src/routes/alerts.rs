use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares::{self, RequireRole};
use crate::models::alerts::requests::AlertAction;
use crate::models::users::entities::UserRole;
use crate::services::AlertService;

// 懒加载的全局 AlertService 实例
static ALERT_SERVICE: Lazy<AlertService> = Lazy::new(AlertService::new_lazy);

pub async fn list_alerts(req: HttpRequest) -> ActixResult<HttpResponse> {
    ALERT_SERVICE.list_alerts(&req).await
}

pub async fn unread_count(req: HttpRequest) -> ActixResult<HttpResponse> {
    ALERT_SERVICE.unread_count(&req).await
}

pub async fn apply_action(
    req: HttpRequest,
    body: web::Json<AlertAction>,
) -> ActixResult<HttpResponse> {
    ALERT_SERVICE.apply_action(body.into_inner(), &req).await
}

pub async fn generate_alerts(req: HttpRequest) -> ActixResult<HttpResponse> {
    ALERT_SERVICE.generate(&req).await
}

pub async fn cron_generate_alerts(req: HttpRequest) -> ActixResult<HttpResponse> {
    ALERT_SERVICE.cron_generate(&req).await
}

// 配置路由
pub fn configure_alert_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/parent/alerts")
            .wrap(RequireRole::new_any(UserRole::parent_roles()))
            .wrap(middlewares::RequireJWT)
            .route("", web::get().to(list_alerts))
            .route("", web::post().to(apply_action))
            .route("/unread-count", web::get().to(unread_count)),
    );

    cfg.service(
        web::scope("/api/v1/admin/alerts")
            .wrap(RequireRole::new_any(UserRole::admin_roles()))
            .wrap(middlewares::RequireJWT)
            .route("/generate", web::post().to(generate_alerts)),
    );

    // 由外部定时任务调用，凭 X-Cron-Secret 鉴权
    cfg.route(
        "/api/v1/cron/generate-alerts",
        web::get().to(cron_generate_alerts),
    );
}
