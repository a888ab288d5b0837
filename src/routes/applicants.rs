use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares::{self, RateLimit};
use crate::models::applicants::requests::{
    ApplicantListParams, ApproveApplicantRequest, RejectApplicantRequest, SignupRequest,
    UpdateApplicantStatusRequest,
};
use crate::models::users::entities::UserRole;
use crate::services::ApplicantService;
use crate::utils::SafeIDI64;

// 懒加载的全局 ApplicantService 实例
static APPLICANT_SERVICE: Lazy<ApplicantService> = Lazy::new(ApplicantService::new_lazy);

pub async fn signup(
    req: HttpRequest,
    body: web::Json<SignupRequest>,
) -> ActixResult<HttpResponse> {
    APPLICANT_SERVICE.signup(body.into_inner(), &req).await
}

pub async fn get_status(req: HttpRequest) -> ActixResult<HttpResponse> {
    APPLICANT_SERVICE.get_status(&req).await
}

pub async fn list_applicants(
    req: HttpRequest,
    query: web::Query<ApplicantListParams>,
) -> ActixResult<HttpResponse> {
    APPLICANT_SERVICE
        .list_applicants(query.into_inner(), &req)
        .await
}

pub async fn get_applicant(req: HttpRequest, id: SafeIDI64) -> ActixResult<HttpResponse> {
    APPLICANT_SERVICE.get_applicant(id.0, &req).await
}

pub async fn update_status(
    req: HttpRequest,
    id: SafeIDI64,
    body: web::Json<UpdateApplicantStatusRequest>,
) -> ActixResult<HttpResponse> {
    APPLICANT_SERVICE
        .update_status(id.0, body.into_inner(), &req)
        .await
}

pub async fn approve(
    req: HttpRequest,
    id: SafeIDI64,
    body: web::Json<ApproveApplicantRequest>,
) -> ActixResult<HttpResponse> {
    APPLICANT_SERVICE.approve(id.0, body.into_inner(), &req).await
}

pub async fn reject(
    req: HttpRequest,
    id: SafeIDI64,
    body: web::Json<RejectApplicantRequest>,
) -> ActixResult<HttpResponse> {
    APPLICANT_SERVICE.reject(id.0, body.into_inner(), &req).await
}

// 配置路由
pub fn configure_applicant_routes(cfg: &mut web::ServiceConfig) {
    // 公开报名
    cfg.service(
        web::resource("/api/v1/signup")
            .wrap(RateLimit::signup())
            .route(web::post().to(signup)),
    );

    cfg.service(
        web::scope("/api/v1/applicant")
            .wrap(middlewares::RequireRole::new_any(UserRole::applicant_roles()))
            .wrap(middlewares::RequireJWT)
            .route("/status", web::get().to(get_status)),
    );

    cfg.service(
        web::scope("/api/v1/admin/applicants")
            .wrap(middlewares::RequireRole::new_any(UserRole::admin_roles()))
            .wrap(middlewares::RequireJWT)
            .route("", web::get().to(list_applicants))
            .route("/{id}", web::get().to(get_applicant))
            .route("/{id}/status", web::post().to(update_status))
            .route("/{id}/approve", web::post().to(approve))
            .route("/{id}/reject", web::post().to(reject)),
    );
}
