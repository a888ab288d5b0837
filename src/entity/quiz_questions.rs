use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "quiz_questions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub quiz_id: i64,
    #[sea_orm(column_type = "Text")]
    pub question_text: String,
    pub question_type: String,
    #[sea_orm(column_type = "Double")]
    pub points: f64,
    pub position: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::quizzes::Entity",
        from = "Column::QuizId",
        to = "super::quizzes::Column::Id"
    )]
    Quiz,
    #[sea_orm(has_many = "super::quiz_options::Entity")]
    Options,
}

impl Related<super::quizzes::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Quiz.def()
    }
}

impl Related<super::quiz_options::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Options.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_question(
        self,
        options: Vec<super::quiz_options::Model>,
    ) -> crate::models::quizzes::entities::QuizQuestion {
        use crate::models::quizzes::entities::{QuestionType, QuizQuestion};

        QuizQuestion {
            id: self.id,
            quiz_id: self.quiz_id,
            question_text: self.question_text,
            question_type: super::parse_or(&self.question_type, QuestionType::ShortAnswer),
            points: self.points,
            position: self.position,
            options: options.into_iter().map(|o| o.into_option()).collect(),
        }
    }
}
