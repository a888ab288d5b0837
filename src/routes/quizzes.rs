use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares::{self, RequireRole};
use crate::models::quizzes::requests::{CreateQuizRequest, QuizListParams, SubmitQuizRequest};
use crate::models::users::entities::UserRole;
use crate::services::QuizService;
use crate::utils::{SafeAttemptIdI64, SafeIDI64};

// 懒加载的全局 QuizService 实例
static QUIZ_SERVICE: Lazy<QuizService> = Lazy::new(QuizService::new_lazy);

pub async fn list_quizzes(
    req: HttpRequest,
    query: web::Query<QuizListParams>,
) -> ActixResult<HttpResponse> {
    QUIZ_SERVICE.list_quizzes(query.into_inner(), &req).await
}

pub async fn create_quiz(
    req: HttpRequest,
    body: web::Json<CreateQuizRequest>,
) -> ActixResult<HttpResponse> {
    QUIZ_SERVICE.create_quiz(body.into_inner(), &req).await
}

pub async fn get_quiz(req: HttpRequest, id: SafeIDI64) -> ActixResult<HttpResponse> {
    QUIZ_SERVICE.get_quiz(id.0, &req).await
}

pub async fn start_attempt(req: HttpRequest, id: SafeIDI64) -> ActixResult<HttpResponse> {
    QUIZ_SERVICE.start_attempt(id.0, &req).await
}

pub async fn submit_attempt(
    req: HttpRequest,
    id: SafeIDI64,
    body: web::Json<SubmitQuizRequest>,
) -> ActixResult<HttpResponse> {
    QUIZ_SERVICE.submit_attempt(id.0, body.into_inner(), &req).await
}

pub async fn get_attempt(
    req: HttpRequest,
    id: SafeIDI64,
    attempt_id: SafeAttemptIdI64,
) -> ActixResult<HttpResponse> {
    QUIZ_SERVICE.get_attempt(id.0, attempt_id.0, &req).await
}

// 配置路由
pub fn configure_quiz_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/quizzes")
            .wrap(middlewares::RequireJWT)
            .route(
                "",
                web::get()
                    .to(list_quizzes)
                    .wrap(RequireRole::new_any(UserRole::class_member_roles())),
            )
            .route(
                "",
                web::post()
                    .to(create_quiz)
                    .wrap(RequireRole::new_any(UserRole::staff_roles())),
            )
            .route(
                "/{id}",
                web::get()
                    .to(get_quiz)
                    .wrap(RequireRole::new_any(UserRole::class_member_roles())),
            )
            .route(
                "/{id}/attempt",
                web::post()
                    .to(start_attempt)
                    .wrap(RequireRole::new_any(UserRole::student_roles())),
            )
            .route(
                "/{id}/attempt/{attempt_id}",
                web::get().to(get_attempt).wrap(RequireRole::new_any(&[
                    &UserRole::Admin,
                    &UserRole::Teacher,
                    &UserRole::Student,
                ])),
            )
            .route(
                "/{id}/submit",
                web::post()
                    .to(submit_attempt)
                    .wrap(RequireRole::new_any(UserRole::student_roles())),
            ),
    );
}
