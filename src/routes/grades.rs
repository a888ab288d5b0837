use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares::{self, RequireRole};
use crate::models::grades::requests::{
    StudentGradeListParams, TeacherGradeListParams, UpsertGradeRequest,
};
use crate::models::users::entities::UserRole;
use crate::services::GradeService;

// 懒加载的全局 GradeService 实例
static GRADE_SERVICE: Lazy<GradeService> = Lazy::new(GradeService::new_lazy);

pub async fn upsert_grade(
    req: HttpRequest,
    body: web::Json<UpsertGradeRequest>,
) -> ActixResult<HttpResponse> {
    GRADE_SERVICE.upsert_grade(body.into_inner(), &req).await
}

pub async fn list_class_grades(
    req: HttpRequest,
    query: web::Query<TeacherGradeListParams>,
) -> ActixResult<HttpResponse> {
    GRADE_SERVICE
        .list_class_grades(query.into_inner(), &req)
        .await
}

pub async fn list_my_grades(
    req: HttpRequest,
    query: web::Query<StudentGradeListParams>,
) -> ActixResult<HttpResponse> {
    GRADE_SERVICE.list_my_grades(query.into_inner(), &req).await
}

// 配置路由
pub fn configure_grade_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/grades")
            .wrap(RequireRole::new_any(UserRole::staff_roles()))
            .wrap(middlewares::RequireJWT)
            .route("", web::post().to(upsert_grade)),
    );

    cfg.service(
        web::scope("/api/v1/teacher/grades")
            .wrap(RequireRole::new_any(UserRole::staff_roles()))
            .wrap(middlewares::RequireJWT)
            .route("", web::get().to(list_class_grades)),
    );

    cfg.service(
        web::scope("/api/v1/student/grades")
            .wrap(RequireRole::new_any(UserRole::student_roles()))
            .wrap(middlewares::RequireJWT)
            .route("", web::get().to(list_my_grades)),
    );
}
