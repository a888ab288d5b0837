use serde::{Deserialize, Serialize};
use ts_rs::TS;

string_enum! {
    /// 题目类型
    #[ts(export, export_to = "../frontend/src/types/generated/quiz.ts")]
    QuestionType("题目类型") {
        MultipleChoice => "multiple_choice",
        TrueFalse => "true_false",
        ShortAnswer => "short_answer",
    }
}

impl QuestionType {
    /// 是否按选项自动判分
    pub fn has_options(&self) -> bool {
        !matches!(self, QuestionType::ShortAnswer)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/quiz.ts")]
pub struct Quiz {
    pub id: i64,
    pub class_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub time_limit_minutes: Option<i32>,
    pub max_attempts: i32,
    pub is_published: bool,
    pub due_date: Option<chrono::DateTime<chrono::Utc>>,
    pub created_by: i64,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/quiz.ts")]
pub struct QuizOption {
    pub id: i64,
    pub question_id: i64,
    pub option_text: String,
    /// 对学生隐藏时为空
    pub is_correct: Option<bool>,
    pub position: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/quiz.ts")]
pub struct QuizQuestion {
    pub id: i64,
    pub quiz_id: i64,
    pub question_text: String,
    pub question_type: QuestionType,
    pub points: f64,
    pub position: i32,
    pub options: Vec<QuizOption>,
}

impl QuizQuestion {
    /// 去掉正确答案标记
    pub fn without_answer_key(mut self) -> Self {
        for option in &mut self.options {
            option.is_correct = None;
        }
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/quiz.ts")]
pub struct QuizAttempt {
    pub id: i64,
    pub quiz_id: i64,
    pub student_id: i64,
    pub attempt_number: i32,
    pub score: Option<f64>,
    pub max_score: f64,
    pub started_at: chrono::DateTime<chrono::Utc>,
    pub submitted_at: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/quiz.ts")]
pub struct QuizAnswer {
    pub id: i64,
    pub attempt_id: i64,
    pub question_id: i64,
    pub selected_option_id: Option<i64>,
    pub text_answer: Option<String>,
    /// 简答题待人工批改时为空
    pub is_correct: Option<bool>,
    pub points_awarded: f64,
}
