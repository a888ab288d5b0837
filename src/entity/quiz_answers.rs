use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "quiz_answers")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub attempt_id: i64,
    pub question_id: i64,
    pub selected_option_id: Option<i64>,
    #[sea_orm(column_type = "Text", nullable)]
    pub text_answer: Option<String>,
    pub is_correct: Option<bool>,
    #[sea_orm(column_type = "Double")]
    pub points_awarded: f64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::quiz_attempts::Entity",
        from = "Column::AttemptId",
        to = "super::quiz_attempts::Column::Id"
    )]
    Attempt,
}

impl Related<super::quiz_attempts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Attempt.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_answer(self) -> crate::models::quizzes::entities::QuizAnswer {
        crate::models::quizzes::entities::QuizAnswer {
            id: self.id,
            attempt_id: self.attempt_id,
            question_id: self.question_id,
            selected_option_id: self.selected_option_id,
            text_answer: self.text_answer,
            is_correct: self.is_correct,
            points_awarded: self.points_awarded,
        }
    }
}
