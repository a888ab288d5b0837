use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares::{self, RequireRole};
use crate::models::materials::requests::{CreateMaterialRequest, MaterialListParams};
use crate::models::users::entities::UserRole;
use crate::services::MaterialService;
use crate::utils::SafeIDI64;

// 懒加载的全局 MaterialService 实例
static MATERIAL_SERVICE: Lazy<MaterialService> = Lazy::new(MaterialService::new_lazy);

pub async fn list_materials(
    req: HttpRequest,
    query: web::Query<MaterialListParams>,
) -> ActixResult<HttpResponse> {
    MATERIAL_SERVICE.list_materials(query.into_inner(), &req).await
}

pub async fn create_material(
    req: HttpRequest,
    body: web::Json<CreateMaterialRequest>,
) -> ActixResult<HttpResponse> {
    MATERIAL_SERVICE.create_material(body.into_inner(), &req).await
}

pub async fn delete_material(req: HttpRequest, id: SafeIDI64) -> ActixResult<HttpResponse> {
    MATERIAL_SERVICE.delete_material(id.0, &req).await
}

// 配置路由
pub fn configure_material_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/materials")
            .wrap(middlewares::RequireJWT)
            .route(
                "",
                web::get()
                    .to(list_materials)
                    .wrap(RequireRole::new_any(UserRole::class_member_roles())),
            )
            .route(
                "",
                web::post()
                    .to(create_material)
                    .wrap(RequireRole::new_any(UserRole::staff_roles())),
            )
            .route(
                "/{id}",
                web::delete()
                    .to(delete_material)
                    .wrap(RequireRole::new_any(UserRole::staff_roles())),
            ),
    );
}
