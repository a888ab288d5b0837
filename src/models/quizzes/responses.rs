use serde::Serialize;
use ts_rs::TS;

use super::entities::{Quiz, QuizAnswer, QuizAttempt, QuizQuestion};

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/quiz.ts")]
pub struct QuizDetailResponse {
    pub quiz: Quiz,
    pub questions: Vec<QuizQuestion>,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/quiz.ts")]
pub struct QuizListResponse {
    pub items: Vec<Quiz>,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/quiz.ts")]
pub struct StartAttemptResponse {
    pub attempt: QuizAttempt,
    pub quiz: Quiz,
    pub questions: Vec<QuizQuestion>,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/quiz.ts")]
pub struct AttemptDetailResponse {
    pub attempt: QuizAttempt,
    pub answers: Vec<QuizAnswer>,
}
