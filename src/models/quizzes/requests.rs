use serde::Deserialize;
use ts_rs::TS;

use super::entities::QuestionType;

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/quiz.ts")]
pub struct CreateOptionRequest {
    pub option_text: String,
    #[serde(default)]
    pub is_correct: bool,
}

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/quiz.ts")]
pub struct CreateQuestionRequest {
    pub question_text: String,
    pub question_type: QuestionType,
    pub points: f64,
    #[serde(default)]
    pub options: Vec<CreateOptionRequest>,
}

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/quiz.ts")]
pub struct CreateQuizRequest {
    pub class_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub time_limit_minutes: Option<i32>,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: i32,
    #[serde(default)]
    pub is_published: bool,
    pub due_date: Option<chrono::DateTime<chrono::Utc>>,
    pub questions: Vec<CreateQuestionRequest>,
}

fn default_max_attempts() -> i32 {
    1
}

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/quiz.ts")]
pub struct QuizListParams {
    pub class_id: i64,
}

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/quiz.ts")]
pub struct AnswerSubmission {
    pub question_id: i64,
    pub selected_option_id: Option<i64>,
    pub text_answer: Option<String>,
}

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/quiz.ts")]
pub struct SubmitQuizRequest {
    pub attempt_id: i64,
    pub answers: Vec<AnswerSubmission>,
}

/// 评分后的单题答案，交给存储层在事务内写入
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredAnswer {
    pub question_id: i64,
    pub selected_option_id: Option<i64>,
    pub text_answer: Option<String>,
    pub is_correct: Option<bool>,
    pub points_awarded: f64,
}
