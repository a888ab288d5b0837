use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::sections::requests::{
    CreateSectionRequest, SectionListParams, UpdateSectionRequest,
};
use crate::models::users::entities::UserRole;
use crate::services::SectionService;
use crate::utils::SafeIDI64;

// 懒加载的全局 SectionService 实例
static SECTION_SERVICE: Lazy<SectionService> = Lazy::new(SectionService::new_lazy);

pub async fn list_sections(
    req: HttpRequest,
    query: web::Query<SectionListParams>,
) -> ActixResult<HttpResponse> {
    SECTION_SERVICE.list_sections(query.into_inner(), &req).await
}

pub async fn create_section(
    req: HttpRequest,
    body: web::Json<CreateSectionRequest>,
) -> ActixResult<HttpResponse> {
    SECTION_SERVICE.create_section(body.into_inner(), &req).await
}

pub async fn get_section(req: HttpRequest, id: SafeIDI64) -> ActixResult<HttpResponse> {
    SECTION_SERVICE.get_section(id.0, &req).await
}

pub async fn update_section(
    req: HttpRequest,
    id: SafeIDI64,
    body: web::Json<UpdateSectionRequest>,
) -> ActixResult<HttpResponse> {
    SECTION_SERVICE
        .update_section(id.0, body.into_inner(), &req)
        .await
}

pub async fn delete_section(req: HttpRequest, id: SafeIDI64) -> ActixResult<HttpResponse> {
    SECTION_SERVICE.delete_section(id.0, &req).await
}

pub async fn list_students(req: HttpRequest, id: SafeIDI64) -> ActixResult<HttpResponse> {
    SECTION_SERVICE.list_students(id.0, &req).await
}

// 配置路由
pub fn configure_section_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/sections")
            .wrap(middlewares::RequireRole::new_any(UserRole::admin_roles()))
            .wrap(middlewares::RequireJWT)
            .route("", web::get().to(list_sections))
            .route("", web::post().to(create_section))
            .route("/{id}", web::get().to(get_section))
            .route("/{id}", web::put().to(update_section))
            .route("/{id}", web::delete().to(delete_section))
            .route("/{id}/students", web::get().to(list_students)),
    );
}
