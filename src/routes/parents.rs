use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares::{self, RequireRole};
use crate::models::users::entities::UserRole;
use crate::services::ParentService;
use crate::utils::SafeStudentIdI64;

// 懒加载的全局 ParentService 实例
static PARENT_SERVICE: Lazy<ParentService> = Lazy::new(ParentService::new_lazy);

pub async fn list_children(req: HttpRequest) -> ActixResult<HttpResponse> {
    PARENT_SERVICE.list_children(&req).await
}

pub async fn child_grades(
    req: HttpRequest,
    student_id: SafeStudentIdI64,
) -> ActixResult<HttpResponse> {
    PARENT_SERVICE.child_grades(student_id.0, &req).await
}

// 配置路由
pub fn configure_parent_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/parent/children")
            .wrap(RequireRole::new_any(UserRole::parent_roles()))
            .wrap(middlewares::RequireJWT)
            .route("", web::get().to(list_children))
            .route("/{student_id}/grades", web::get().to(child_grades)),
    );
}
