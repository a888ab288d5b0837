pub mod alerts;

pub mod announcements;

pub mod applicants;

pub mod assignments;

pub mod attendance;

pub mod auth;

pub mod classes;

pub mod files;

pub mod grades;

pub mod materials;

pub mod parents;

pub mod quizzes;

pub mod sections;

pub mod users;

pub use alerts::configure_alert_routes;
pub use announcements::configure_announcement_routes;
pub use applicants::configure_applicant_routes;
pub use assignments::configure_assignment_routes;
pub use attendance::configure_attendance_routes;
pub use auth::configure_auth_routes;
pub use classes::configure_class_routes;
pub use files::configure_file_routes;
pub use grades::configure_grade_routes;
pub use materials::configure_material_routes;
pub use parents::configure_parent_routes;
pub use quizzes::configure_quiz_routes;
pub use sections::configure_section_routes;
pub use users::configure_user_routes;

use actix_web::web;

/// 注册全部 API 路由
pub fn configure_api_routes(cfg: &mut web::ServiceConfig) {
    cfg.configure(configure_auth_routes)
        .configure(configure_applicant_routes)
        .configure(configure_user_routes)
        .configure(configure_section_routes)
        .configure(configure_class_routes)
        .configure(configure_assignment_routes)
        .configure(configure_grade_routes)
        .configure(configure_attendance_routes)
        .configure(configure_quiz_routes)
        .configure(configure_announcement_routes)
        .configure(configure_material_routes)
        .configure(configure_alert_routes)
        .configure(configure_parent_routes)
        .configure(configure_file_routes);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{MokaObjectCache, ObjectCache};
    use crate::storage::Storage;
    use crate::storage::sea_orm_storage::test_support::*;
    use crate::utils::jwt::JwtUtils;
    use actix_web::{App, http::StatusCode, test};
    use serde_json::{Value, json};
    use std::sync::Arc;

    fn bearer(user_id: i64, role: &str) -> (&'static str, String) {
        let pair = JwtUtils::generate_token_pair(user_id, role, false).unwrap();
        ("Authorization", format!("Bearer {}", pair.access_token))
    }

    fn app_data(
        storage: Arc<dyn Storage>,
    ) -> (web::Data<Arc<dyn Storage>>, web::Data<Arc<dyn ObjectCache>>) {
        let cache: Arc<dyn ObjectCache> = Arc::new(MokaObjectCache::new(100, 60));
        (web::Data::new(storage), web::Data::new(cache))
    }

    #[actix_web::test]
    async fn test_scopes_enforce_roles() {
        let storage = memory_storage().await;
        let section = seed_section(&storage, "Grade 8", "Mabini").await;
        let student = seed_student(&storage, "kid@school.test", None, Some(section.id)).await;
        let (storage_data, cache_data) = app_data(Arc::new(storage));

        let app = test::init_service(
            App::new()
                .app_data(storage_data)
                .app_data(cache_data)
                .configure(configure_api_routes),
        )
        .await;

        let req = test::TestRequest::get().uri("/api/v1/sections").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let req = test::TestRequest::get()
            .uri("/api/v1/sections")
            .insert_header(bearer(student.user_id, "student"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);

        let req = test::TestRequest::get()
            .uri("/api/v1/parent/children")
            .insert_header(bearer(student.user_id, "student"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);

        // 默认配置未设置 cron secret
        let req = test::TestRequest::get()
            .uri("/api/v1/cron/generate-alerts")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_quiz_attempt_flow() {
        let storage = memory_storage().await;
        let section = seed_section(&storage, "Grade 7", "Rizal").await;
        let (teacher, teacher_user) = seed_teacher(&storage, "teacher@school.test").await;
        let class = seed_class(&storage, section.id, teacher.id, "Math").await;
        let student = seed_student(&storage, "kid@school.test", None, Some(section.id)).await;
        let (storage_data, cache_data) = app_data(Arc::new(storage));

        let app = test::init_service(
            App::new()
                .app_data(storage_data)
                .app_data(cache_data)
                .configure(configure_api_routes),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/v1/quizzes")
            .insert_header(bearer(teacher_user.id, "teacher"))
            .set_json(json!({
                "class_id": class.id,
                "title": "Fractions",
                "is_published": true,
                "questions": [
                    {
                        "question_text": "1/2 + 1/2 = ?",
                        "question_type": "multiple_choice",
                        "points": 2.0,
                        "options": [
                            {"option_text": "1", "is_correct": true},
                            {"option_text": "2/4", "is_correct": false}
                        ]
                    },
                    {
                        "question_text": "Explain a numerator",
                        "question_type": "short_answer",
                        "points": 3.0
                    }
                ]
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(resp).await;
        let quiz_id = body["data"]["quiz"]["id"].as_i64().unwrap();
        let choice = &body["data"]["questions"][0];
        let choice_id = choice["id"].as_i64().unwrap();
        let correct_option = choice["options"]
            .as_array()
            .unwrap()
            .iter()
            .find(|o| o["is_correct"] == json!(true))
            .and_then(|o| o["id"].as_i64())
            .unwrap();
        let essay_id = body["data"]["questions"][1]["id"].as_i64().unwrap();

        let req = test::TestRequest::post()
            .uri(&format!("/api/v1/quizzes/{quiz_id}/attempt"))
            .insert_header(bearer(student.user_id, "student"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        let attempt_id = body["data"]["attempt"]["id"].as_i64().unwrap();
        assert!(body["data"]["questions"][0]["options"][0]["is_correct"].is_null());

        let answers = json!({
            "attempt_id": attempt_id,
            "answers": [
                {"question_id": choice_id, "selected_option_id": correct_option},
                {"question_id": essay_id, "text_answer": "The top number"}
            ]
        });
        // 作答不属于路径中的测验
        let other_quiz = quiz_id + 1000;
        let req = test::TestRequest::post()
            .uri(&format!("/api/v1/quizzes/{other_quiz}/submit"))
            .insert_header(bearer(student.user_id, "student"))
            .set_json(&answers)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let req = test::TestRequest::post()
            .uri(&format!("/api/v1/quizzes/{quiz_id}/submit"))
            .insert_header(bearer(student.user_id, "student"))
            .set_json(&answers)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["data"]["score"].as_f64(), Some(2.0));
        assert_eq!(body["data"]["max_score"].as_f64(), Some(5.0));

        let req = test::TestRequest::get()
            .uri(&format!("/api/v1/quizzes/{quiz_id}/attempt/{attempt_id}"))
            .insert_header(bearer(student.user_id, "student"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["data"]["answers"].as_array().map(Vec::len), Some(2));

        let req = test::TestRequest::get()
            .uri(&format!("/api/v1/quizzes/{other_quiz}/attempt/{attempt_id}"))
            .insert_header(bearer(student.user_id, "student"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let req = test::TestRequest::post()
            .uri(&format!("/api/v1/quizzes/{quiz_id}/submit"))
            .insert_header(bearer(student.user_id, "student"))
            .set_json(&answers)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);

        // 默认只允许作答一次
        let req = test::TestRequest::post()
            .uri(&format!("/api/v1/quizzes/{quiz_id}/attempt"))
            .insert_header(bearer(student.user_id, "student"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);
    }

    #[actix_web::test]
    async fn test_attendance_dates_are_canonical() {
        let storage = memory_storage().await;
        let section = seed_section(&storage, "Grade 7", "Rizal").await;
        let (teacher, teacher_user) = seed_teacher(&storage, "teacher@school.test").await;
        let class = seed_class(&storage, section.id, teacher.id, "Math").await;
        let student = seed_student(&storage, "kid@school.test", None, Some(section.id)).await;
        let (storage_data, cache_data) = app_data(Arc::new(storage));

        let app = test::init_service(
            App::new()
                .app_data(storage_data)
                .app_data(cache_data)
                .configure(configure_api_routes),
        )
        .await;

        let record = |date: &str| {
            test::TestRequest::post()
                .uri("/api/v1/attendance")
                .insert_header(bearer(teacher_user.id, "teacher"))
                .set_json(json!({
                    "class_id": class.id,
                    "date": date,
                    "records": [{"student_id": student.id, "status": "present"}]
                }))
                .to_request()
        };

        let resp = test::call_service(&app, record("2025-03-03")).await;
        assert_eq!(resp.status(), StatusCode::OK);

        // 同一天的其他写法不能绕过唯一键
        for date in ["+2025-3-03", " 2025-3-03", "2025-3-3"] {
            let resp = test::call_service(&app, record(date)).await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "date {date:?}");
        }

        let req = test::TestRequest::get()
            .uri(&format!(
                "/api/v1/attendance/history?class_id={}&start_date=2025-03-03&end_date=2025-03-03",
                class.id
            ))
            .insert_header(bearer(teacher_user.id, "teacher"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["data"]["records"].as_array().map(Vec::len), Some(1));
    }

    #[actix_web::test]
    async fn test_student_upload_alias_reaches_submit_handler() {
        let storage = memory_storage().await;
        let section = seed_section(&storage, "Grade 7", "Rizal").await;
        let student = seed_student(&storage, "kid@school.test", None, Some(section.id)).await;
        let (storage_data, cache_data) = app_data(Arc::new(storage));

        let app = test::init_service(
            App::new()
                .app_data(storage_data)
                .app_data(cache_data)
                .configure(configure_api_routes),
        )
        .await;

        // 非 multipart 请求由提交处理拒绝，而不是 404
        let req = test::TestRequest::post()
            .uri("/api/v1/student/assignments/upload")
            .insert_header(bearer(student.user_id, "student"))
            .set_json(json!({"assignment_id": 1}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
