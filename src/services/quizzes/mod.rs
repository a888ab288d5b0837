//! 测验：任课教师出题，学生在次数上限内作答并自动判分

mod scoring;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::errors::SchoolSystemError;
use crate::models::{
    ApiResponse, ErrorCode,
    quizzes::{
        entities::{QuestionType, Quiz},
        requests::{CreateQuizRequest, QuizListParams, SubmitQuizRequest},
        responses::{
            AttemptDetailResponse, QuizDetailResponse, QuizListResponse, StartAttemptResponse,
        },
    },
    users::entities::{User, UserRole},
};
use crate::services::access::{
    Access, class_for_member, class_for_staff, current_user, student_profile,
};
use crate::services::{bad_request, error_response, not_found};
use crate::storage::Storage;

use scoring::score_answers;

super::define_service! {
    QuizService
}

fn validate_quiz(quiz: &CreateQuizRequest) -> Result<(), String> {
    if quiz.title.trim().is_empty() {
        return Err("title cannot be empty".to_string());
    }
    if quiz.max_attempts < 1 {
        return Err("max_attempts must be at least 1".to_string());
    }
    if quiz.time_limit_minutes.is_some_and(|m| m <= 0) {
        return Err("time_limit_minutes must be positive".to_string());
    }
    if quiz.questions.is_empty() {
        return Err("A quiz needs at least one question".to_string());
    }

    for (index, question) in quiz.questions.iter().enumerate() {
        let n = index + 1;
        if question.question_text.trim().is_empty() {
            return Err(format!("Question {n}: text cannot be empty"));
        }
        if !(question.points.is_finite() && question.points > 0.0) {
            return Err(format!("Question {n}: points must be positive"));
        }

        let correct = question.options.iter().filter(|o| o.is_correct).count();
        match question.question_type {
            QuestionType::MultipleChoice if question.options.len() < 2 => {
                return Err(format!("Question {n}: needs at least two options"));
            }
            QuestionType::TrueFalse if question.options.len() != 2 => {
                return Err(format!("Question {n}: true/false needs exactly two options"));
            }
            QuestionType::ShortAnswer if !question.options.is_empty() => {
                return Err(format!("Question {n}: short answer takes no options"));
            }
            _ => {}
        }
        if question.question_type.has_options() {
            if correct != 1 {
                return Err(format!("Question {n}: exactly one option must be correct"));
            }
            if question
                .options
                .iter()
                .any(|o| o.option_text.trim().is_empty())
            {
                return Err(format!("Question {n}: option text cannot be empty"));
            }
        }
    }
    Ok(())
}

fn is_staff(user: &User) -> bool {
    matches!(user.role, UserRole::Admin | UserRole::Teacher)
}

async fn load_quiz(storage: &Arc<dyn Storage>, quiz_id: i64) -> Access<Quiz> {
    match storage.get_quiz_by_id(quiz_id).await {
        Ok(Some(quiz)) => Ok(quiz),
        Ok(None) => Err(not_found(ErrorCode::QuizNotFound, "Quiz not found")),
        Err(e) => Err(error_response(&e, ErrorCode::QuizNotFound)),
    }
}

/// 非教职人员看不到未发布的测验
async fn visible_quiz(storage: &Arc<dyn Storage>, user: &User, quiz_id: i64) -> Access<Quiz> {
    let quiz = load_quiz(storage, quiz_id).await?;
    class_for_member(storage, user, quiz.class_id).await?;
    if !quiz.is_published && !is_staff(user) {
        return Err(not_found(ErrorCode::QuizNotFound, "Quiz not found"));
    }
    Ok(quiz)
}

impl QuizService {
    pub async fn create_quiz(
        &self,
        body: CreateQuizRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        let user = match current_user(request) {
            Ok(user) => user,
            Err(resp) => return Ok(resp),
        };
        if let Err(msg) = validate_quiz(&body) {
            return Ok(bad_request(ErrorCode::QuizInvalid, msg));
        }

        let storage = self.get_storage(request);
        if let Err(resp) = class_for_staff(&storage, &user, body.class_id).await {
            return Ok(resp);
        }

        match storage.create_quiz(body, user.id).await {
            Ok((quiz, questions)) => Ok(HttpResponse::Created().json(ApiResponse::success(
                QuizDetailResponse { quiz, questions },
                "Quiz created successfully",
            ))),
            Err(e) => Ok(error_response(&e, ErrorCode::QuizInvalid)),
        }
    }

    pub async fn list_quizzes(
        &self,
        query: QuizListParams,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        let user = match current_user(request) {
            Ok(user) => user,
            Err(resp) => return Ok(resp),
        };
        let storage = self.get_storage(request);
        if let Err(resp) = class_for_member(&storage, &user, query.class_id).await {
            return Ok(resp);
        }

        match storage.list_quizzes(query.class_id, !is_staff(&user)).await {
            Ok(items) => Ok(HttpResponse::Ok().json(ApiResponse::success(
                QuizListResponse { items },
                "Quiz list retrieved successfully",
            ))),
            Err(e) => Ok(error_response(&e, ErrorCode::InternalServerError)),
        }
    }

    pub async fn get_quiz(&self, quiz_id: i64, request: &HttpRequest) -> ActixResult<HttpResponse> {
        let user = match current_user(request) {
            Ok(user) => user,
            Err(resp) => return Ok(resp),
        };
        let storage = self.get_storage(request);
        let quiz = match visible_quiz(&storage, &user, quiz_id).await {
            Ok(quiz) => quiz,
            Err(resp) => return Ok(resp),
        };

        let questions = match storage.get_quiz_questions(quiz.id).await {
            Ok(questions) if is_staff(&user) => questions,
            Ok(questions) => questions
                .into_iter()
                .map(|q| q.without_answer_key())
                .collect(),
            Err(e) => return Ok(error_response(&e, ErrorCode::QuizNotFound)),
        };

        Ok(HttpResponse::Ok().json(ApiResponse::success(
            QuizDetailResponse { quiz, questions },
            "Quiz retrieved successfully",
        )))
    }

    pub async fn start_attempt(
        &self,
        quiz_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        let user = match current_user(request) {
            Ok(user) => user,
            Err(resp) => return Ok(resp),
        };
        let storage = self.get_storage(request);
        let student = match student_profile(&storage, &user).await {
            Ok(student) => student,
            Err(resp) => return Ok(resp),
        };
        let quiz = match load_quiz(&storage, quiz_id).await {
            Ok(quiz) => quiz,
            Err(resp) => return Ok(resp),
        };
        if let Err(resp) = class_for_member(&storage, &user, quiz.class_id).await {
            return Ok(resp);
        }
        if !quiz.is_published {
            return Ok(bad_request(ErrorCode::QuizNotPublished, "Quiz is not published"));
        }

        let attempt = match storage.start_quiz_attempt(&quiz, student.id).await {
            Ok(attempt) => attempt,
            Err(e) => return Ok(error_response(&e, ErrorCode::QuizMaxAttemptsReached)),
        };
        let questions = match storage.get_quiz_questions(quiz.id).await {
            Ok(questions) => questions
                .into_iter()
                .map(|q| q.without_answer_key())
                .collect(),
            Err(e) => return Ok(error_response(&e, ErrorCode::QuizNotFound)),
        };

        Ok(HttpResponse::Ok().json(ApiResponse::success(
            StartAttemptResponse {
                attempt,
                quiz,
                questions,
            },
            "Quiz attempt started",
        )))
    }

    /// 学生只能查看自己的作答；教师查看本课程的作答
    ///
    /// 作答须属于路径中的测验，否则按不存在处理
    pub async fn get_attempt(
        &self,
        quiz_id: i64,
        attempt_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        let user = match current_user(request) {
            Ok(user) => user,
            Err(resp) => return Ok(resp),
        };
        let storage = self.get_storage(request);

        let attempt = match storage.get_quiz_attempt(attempt_id).await {
            Ok(Some(attempt)) if attempt.quiz_id == quiz_id => attempt,
            Ok(_) => {
                return Ok(not_found(
                    ErrorCode::QuizAttemptNotFound,
                    "Quiz attempt not found",
                ));
            }
            Err(e) => return Ok(error_response(&e, ErrorCode::QuizAttemptNotFound)),
        };

        if user.role == UserRole::Student {
            match student_profile(&storage, &user).await {
                Ok(student) if student.id == attempt.student_id => {}
                Ok(_) => {
                    return Ok(not_found(
                        ErrorCode::QuizAttemptNotFound,
                        "Quiz attempt not found",
                    ));
                }
                Err(resp) => return Ok(resp),
            }
        } else {
            let quiz = match load_quiz(&storage, attempt.quiz_id).await {
                Ok(quiz) => quiz,
                Err(resp) => return Ok(resp),
            };
            if let Err(resp) = class_for_staff(&storage, &user, quiz.class_id).await {
                return Ok(resp);
            }
        }

        match storage.list_attempt_answers(attempt.id).await {
            Ok(answers) => Ok(HttpResponse::Ok().json(ApiResponse::success(
                AttemptDetailResponse { attempt, answers },
                "Quiz attempt retrieved successfully",
            ))),
            Err(e) => Ok(error_response(&e, ErrorCode::InternalServerError)),
        }
    }

    pub async fn submit_attempt(
        &self,
        quiz_id: i64,
        body: SubmitQuizRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        let user = match current_user(request) {
            Ok(user) => user,
            Err(resp) => return Ok(resp),
        };
        let storage = self.get_storage(request);
        let student = match student_profile(&storage, &user).await {
            Ok(student) => student,
            Err(resp) => return Ok(resp),
        };

        let attempt = match storage.get_quiz_attempt(body.attempt_id).await {
            Ok(Some(attempt)) if attempt.student_id == student.id && attempt.quiz_id == quiz_id => {
                attempt
            }
            Ok(_) => {
                return Ok(not_found(
                    ErrorCode::QuizAttemptNotFound,
                    "Quiz attempt not found",
                ));
            }
            Err(e) => return Ok(error_response(&e, ErrorCode::QuizAttemptNotFound)),
        };
        if attempt.submitted_at.is_some() {
            return Ok(error_response(
                &SchoolSystemError::conflict("Quiz attempt already submitted"),
                ErrorCode::QuizAttemptAlreadySubmitted,
            ));
        }

        let questions = match storage.get_quiz_questions(attempt.quiz_id).await {
            Ok(questions) => questions,
            Err(e) => return Ok(error_response(&e, ErrorCode::QuizNotFound)),
        };
        let (answers, score) = match score_answers(&questions, &body.answers) {
            Ok(scored) => scored,
            Err(msg) => return Ok(bad_request(ErrorCode::QuizInvalid, msg)),
        };

        match storage.submit_quiz_attempt(attempt.id, answers, score).await {
            Ok(attempt) => Ok(HttpResponse::Ok().json(ApiResponse::success(
                attempt,
                "Quiz submitted successfully",
            ))),
            Err(e) => Ok(error_response(&e, ErrorCode::QuizAttemptAlreadySubmitted)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::quizzes::requests::{CreateOptionRequest, CreateQuestionRequest};

    fn option(text: &str, is_correct: bool) -> CreateOptionRequest {
        CreateOptionRequest {
            option_text: text.to_string(),
            is_correct,
        }
    }

    fn quiz(questions: Vec<CreateQuestionRequest>) -> CreateQuizRequest {
        CreateQuizRequest {
            class_id: 1,
            title: "Unit 1".to_string(),
            description: None,
            time_limit_minutes: Some(20),
            max_attempts: 1,
            is_published: true,
            due_date: None,
            questions,
        }
    }

    fn question(kind: QuestionType, options: Vec<CreateOptionRequest>) -> CreateQuestionRequest {
        CreateQuestionRequest {
            question_text: "What is 2 + 2?".to_string(),
            question_type: kind,
            points: 1.0,
            options,
        }
    }

    #[test]
    fn test_validate_quiz_shapes() {
        let ok = quiz(vec![
            question(
                QuestionType::MultipleChoice,
                vec![option("3", false), option("4", true), option("5", false)],
            ),
            question(
                QuestionType::TrueFalse,
                vec![option("True", true), option("False", false)],
            ),
            question(QuestionType::ShortAnswer, vec![]),
        ]);
        assert!(validate_quiz(&ok).is_ok());

        let two_correct = quiz(vec![question(
            QuestionType::MultipleChoice,
            vec![option("4", true), option("four", true)],
        )]);
        assert!(validate_quiz(&two_correct).is_err());

        let short_with_options = quiz(vec![question(
            QuestionType::ShortAnswer,
            vec![option("x", true)],
        )]);
        assert!(validate_quiz(&short_with_options).is_err());

        assert!(validate_quiz(&quiz(vec![])).is_err());

        let mut no_attempts = ok.clone();
        no_attempts.max_attempts = 0;
        assert!(validate_quiz(&no_attempts).is_err());
    }
}
