use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares::{self, RequireRole};
use crate::models::attendance::requests::{
    AttendanceHistoryParams, AttendanceQueryParams, RecordAttendanceRequest,
};
use crate::models::users::entities::UserRole;
use crate::services::AttendanceService;

// 懒加载的全局 AttendanceService 实例
static ATTENDANCE_SERVICE: Lazy<AttendanceService> = Lazy::new(AttendanceService::new_lazy);

pub async fn record_attendance(
    req: HttpRequest,
    body: web::Json<RecordAttendanceRequest>,
) -> ActixResult<HttpResponse> {
    ATTENDANCE_SERVICE.record(body.into_inner(), &req).await
}

pub async fn list_attendance(
    req: HttpRequest,
    query: web::Query<AttendanceQueryParams>,
) -> ActixResult<HttpResponse> {
    ATTENDANCE_SERVICE
        .list_for_date(query.into_inner(), &req)
        .await
}

pub async fn attendance_history(
    req: HttpRequest,
    query: web::Query<AttendanceHistoryParams>,
) -> ActixResult<HttpResponse> {
    ATTENDANCE_SERVICE.history(query.into_inner(), &req).await
}

// 配置路由
pub fn configure_attendance_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/attendance")
            .wrap(RequireRole::new_any(UserRole::staff_roles()))
            .wrap(middlewares::RequireJWT)
            .route("", web::post().to(record_attendance))
            .route("", web::get().to(list_attendance))
            .route("/history", web::get().to(attendance_history)),
    );
}
