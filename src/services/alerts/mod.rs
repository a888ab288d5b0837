pub mod notify;

pub use notify::{
    generate_overdue_assignment_alerts, get_parent_alerts, get_unread_alert_count,
    mark_alert_viewed, mark_all_alerts_viewed, notify_attendance_issue, notify_grade_posted,
};

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use crate::config::AppConfig;
use crate::models::{
    ApiResponse, ErrorCode,
    alerts::{
        requests::AlertAction,
        responses::{AlertListResponse, GenerateAlertsResponse, MarkViewedResponse, UnreadCountResponse},
    },
};
use crate::services::access::{current_user, parent_profile};
use crate::services::not_found;

pub const CRON_SECRET_HEADER: &str = "X-Cron-Secret";

super::define_service! {
    /// 家长提醒收件箱与逾期扫描入口
    AlertService
}

impl AlertService {
    pub async fn list_alerts(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        let user = match current_user(request) {
            Ok(user) => user,
            Err(resp) => return Ok(resp),
        };
        let storage = self.get_storage(request);
        let parent = match parent_profile(&storage, &user).await {
            Ok(parent) => parent,
            Err(resp) => return Ok(resp),
        };

        let items = get_parent_alerts(&storage, parent.id).await;
        Ok(HttpResponse::Ok().json(ApiResponse::success(
            AlertListResponse { items },
            "Alerts retrieved successfully",
        )))
    }

    pub async fn unread_count(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        let user = match current_user(request) {
            Ok(user) => user,
            Err(resp) => return Ok(resp),
        };
        let storage = self.get_storage(request);
        let parent = match parent_profile(&storage, &user).await {
            Ok(parent) => parent,
            Err(resp) => return Ok(resp),
        };

        let unread_count = get_unread_alert_count(&storage, parent.id).await;
        Ok(HttpResponse::Ok().json(ApiResponse::success(
            UnreadCountResponse { unread_count },
            "Unread count retrieved successfully",
        )))
    }

    pub async fn apply_action(
        &self,
        action: AlertAction,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        let user = match current_user(request) {
            Ok(user) => user,
            Err(resp) => return Ok(resp),
        };
        let storage = self.get_storage(request);
        let parent = match parent_profile(&storage, &user).await {
            Ok(parent) => parent,
            Err(resp) => return Ok(resp),
        };

        let marked_count = match action {
            AlertAction::MarkViewed { alert_id } => {
                if !mark_alert_viewed(&storage, alert_id, parent.id).await {
                    return Ok(not_found(ErrorCode::AlertNotFound, "Alert not found"));
                }
                1
            }
            AlertAction::MarkAllViewed => mark_all_alerts_viewed(&storage, parent.id).await as i64,
        };

        Ok(HttpResponse::Ok().json(ApiResponse::success(
            MarkViewedResponse { marked_count },
            "Alerts updated",
        )))
    }

    /// 管理员手动触发
    pub async fn generate(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        let storage = self.get_storage(request);
        let created =
            generate_overdue_assignment_alerts(&storage, chrono::Utc::now().timestamp()).await;
        Ok(HttpResponse::Ok().json(ApiResponse::success(
            GenerateAlertsResponse { created },
            "Overdue alerts generated",
        )))
    }

    /// 外部定时任务触发，需携带 `X-Cron-Secret`
    pub async fn cron_generate(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        let config = AppConfig::get();
        if !config.cron_enabled() {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::CronDisabled,
                "Cron endpoint is disabled",
            )));
        }

        let provided = request
            .headers()
            .get(CRON_SECRET_HEADER)
            .and_then(|h| h.to_str().ok());
        if provided != Some(config.cron.secret.as_str()) {
            tracing::warn!("Rejected cron request with a missing or wrong secret");
            return Ok(HttpResponse::Unauthorized().json(ApiResponse::error_empty(
                ErrorCode::Unauthorized,
                "Invalid cron secret",
            )));
        }

        self.generate(request).await
    }
}
