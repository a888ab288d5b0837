//! 测验存储操作：题目、作答、提交

use std::collections::HashMap;

use super::SeaOrmStorage;
use crate::entity::prelude::*;
use crate::entity::{quiz_answers, quiz_attempts, quiz_options, quiz_questions, quizzes};
use crate::errors::{Result, SchoolSystemError};
use crate::models::quizzes::{
    entities::{Quiz, QuizAnswer, QuizAttempt, QuizQuestion},
    requests::{CreateQuizRequest, ScoredAnswer},
};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, SqlErr, TransactionTrait,
};

async fn load_questions_in<C: ConnectionTrait>(conn: &C, quiz_id: i64) -> Result<Vec<QuizQuestion>> {
    let questions = QuizQuestions::find()
        .filter(quiz_questions::Column::QuizId.eq(quiz_id))
        .order_by_asc(quiz_questions::Column::Position)
        .all(conn)
        .await
        .map_err(|e| SchoolSystemError::database_operation(format!("查询测验题目失败: {e}")))?;

    let question_ids: Vec<i64> = questions.iter().map(|q| q.id).collect();
    let mut options: HashMap<i64, Vec<_>> = HashMap::new();
    if !question_ids.is_empty() {
        let rows = QuizOptions::find()
            .filter(quiz_options::Column::QuestionId.is_in(question_ids))
            .order_by_asc(quiz_options::Column::Position)
            .all(conn)
            .await?;
        for option in rows {
            options.entry(option.question_id).or_default().push(option);
        }
    }

    Ok(questions
        .into_iter()
        .map(|q| {
            let opts = options.remove(&q.id).unwrap_or_default();
            q.into_question(opts)
        })
        .collect())
}

impl SeaOrmStorage {
    /// 创建测验及题目选项，单事务
    pub async fn create_quiz_impl(
        &self,
        quiz: CreateQuizRequest,
        created_by: i64,
    ) -> Result<(Quiz, Vec<QuizQuestion>)> {
        let now = chrono::Utc::now().timestamp();
        let txn = self.db.begin().await?;

        let model = QuizActiveModel {
            class_id: Set(quiz.class_id),
            title: Set(quiz.title),
            description: Set(quiz.description),
            time_limit_minutes: Set(quiz.time_limit_minutes),
            max_attempts: Set(quiz.max_attempts),
            is_published: Set(quiz.is_published),
            due_date: Set(quiz.due_date.map(|d| d.timestamp())),
            created_by: Set(created_by),
            created_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(|e| SchoolSystemError::database_operation(format!("创建测验失败: {e}")))?;

        for (index, question) in quiz.questions.into_iter().enumerate() {
            let saved = QuizQuestionActiveModel {
                quiz_id: Set(model.id),
                question_text: Set(question.question_text),
                question_type: Set(question.question_type.to_string()),
                points: Set(question.points),
                position: Set(index as i32 + 1),
                ..Default::default()
            }
            .insert(&txn)
            .await
            .map_err(|e| SchoolSystemError::database_operation(format!("创建测验题目失败: {e}")))?;

            for (position, option) in question.options.into_iter().enumerate() {
                QuizOptionActiveModel {
                    question_id: Set(saved.id),
                    option_text: Set(option.option_text),
                    is_correct: Set(option.is_correct),
                    position: Set(position as i32 + 1),
                    ..Default::default()
                }
                .insert(&txn)
                .await
                .map_err(|e| {
                    SchoolSystemError::database_operation(format!("创建题目选项失败: {e}"))
                })?;
            }
        }

        let questions = load_questions_in(&txn, model.id).await?;
        txn.commit().await?;

        Ok((model.into_quiz(), questions))
    }

    pub async fn get_quiz_by_id_impl(&self, id: i64) -> Result<Option<Quiz>> {
        let result = Quizzes::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| SchoolSystemError::database_operation(format!("查询测验失败: {e}")))?;

        Ok(result.map(|m| m.into_quiz()))
    }

    pub async fn get_quiz_questions_impl(&self, quiz_id: i64) -> Result<Vec<QuizQuestion>> {
        load_questions_in(&self.db, quiz_id).await
    }

    pub async fn list_quizzes_impl(&self, class_id: i64, published_only: bool) -> Result<Vec<Quiz>> {
        let mut select = Quizzes::find().filter(quizzes::Column::ClassId.eq(class_id));
        if published_only {
            select = select.filter(quizzes::Column::IsPublished.eq(true));
        }

        let rows = select
            .order_by_desc(quizzes::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(|e| SchoolSystemError::database_operation(format!("查询测验列表失败: {e}")))?;

        Ok(rows.into_iter().map(|m| m.into_quiz()).collect())
    }

    /// 开始作答：有未提交的作答则复用，否则在次数上限内新建
    pub async fn start_quiz_attempt_impl(&self, quiz: &Quiz, student_id: i64) -> Result<QuizAttempt> {
        let txn = self.db.begin().await?;

        let open = QuizAttempts::find()
            .filter(quiz_attempts::Column::QuizId.eq(quiz.id))
            .filter(quiz_attempts::Column::StudentId.eq(student_id))
            .filter(quiz_attempts::Column::SubmittedAt.is_null())
            .one(&txn)
            .await?;
        if let Some(attempt) = open {
            txn.commit().await?;
            return Ok(attempt.into_attempt());
        }

        let used = QuizAttempts::find()
            .filter(quiz_attempts::Column::QuizId.eq(quiz.id))
            .filter(quiz_attempts::Column::StudentId.eq(student_id))
            .count(&txn)
            .await? as i32;
        if used >= quiz.max_attempts {
            return Err(SchoolSystemError::conflict(format!(
                "Maximum attempts reached ({used}/{})",
                quiz.max_attempts
            )));
        }

        let max_score: f64 = load_questions_in(&txn, quiz.id)
            .await?
            .iter()
            .map(|q| q.points)
            .sum();

        let attempt = QuizAttemptActiveModel {
            quiz_id: Set(quiz.id),
            student_id: Set(student_id),
            attempt_number: Set(used + 1),
            score: Set(None),
            max_score: Set(max_score),
            started_at: Set(chrono::Utc::now().timestamp()),
            submitted_at: Set(None),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(|e| match e.sql_err() {
            // 并发开始时由 (quiz, student, attempt_number) 唯一键兜底
            Some(SqlErr::UniqueConstraintViolation(_)) => {
                SchoolSystemError::conflict("Quiz attempt already started")
            }
            _ => SchoolSystemError::database_operation(format!("创建作答失败: {e}")),
        })?;

        txn.commit().await?;
        Ok(attempt.into_attempt())
    }

    pub async fn get_quiz_attempt_impl(&self, id: i64) -> Result<Option<QuizAttempt>> {
        let result = QuizAttempts::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| SchoolSystemError::database_operation(format!("查询作答失败: {e}")))?;

        Ok(result.map(|m| m.into_attempt()))
    }

    pub async fn list_attempt_answers_impl(&self, attempt_id: i64) -> Result<Vec<QuizAnswer>> {
        let rows = QuizAnswers::find()
            .filter(quiz_answers::Column::AttemptId.eq(attempt_id))
            .order_by_asc(quiz_answers::Column::QuestionId)
            .all(&self.db)
            .await
            .map_err(|e| SchoolSystemError::database_operation(format!("查询作答明细失败: {e}")))?;

        Ok(rows.into_iter().map(|m| m.into_answer()).collect())
    }

    /// 提交作答：关闭作答与写入答案在同一事务，已提交的作答返回冲突
    pub async fn submit_quiz_attempt_impl(
        &self,
        attempt_id: i64,
        answers: Vec<ScoredAnswer>,
        score: f64,
    ) -> Result<QuizAttempt> {
        let now = chrono::Utc::now().timestamp();
        let txn = self.db.begin().await?;

        let result = QuizAttempts::update_many()
            .col_expr(quiz_attempts::Column::Score, Expr::value(score))
            .col_expr(quiz_attempts::Column::SubmittedAt, Expr::value(now))
            .filter(quiz_attempts::Column::Id.eq(attempt_id))
            .filter(quiz_attempts::Column::SubmittedAt.is_null())
            .exec(&txn)
            .await
            .map_err(|e| SchoolSystemError::database_operation(format!("提交作答失败: {e}")))?;

        if result.rows_affected == 0 {
            let exists = QuizAttempts::find_by_id(attempt_id).one(&txn).await?.is_some();
            return Err(if exists {
                SchoolSystemError::conflict("Quiz attempt already submitted")
            } else {
                SchoolSystemError::not_found(format!("作答不存在: {attempt_id}"))
            });
        }

        for answer in answers {
            QuizAnswerActiveModel {
                attempt_id: Set(attempt_id),
                question_id: Set(answer.question_id),
                selected_option_id: Set(answer.selected_option_id),
                text_answer: Set(answer.text_answer),
                is_correct: Set(answer.is_correct),
                points_awarded: Set(answer.points_awarded),
                ..Default::default()
            }
            .insert(&txn)
            .await
            .map_err(|e| SchoolSystemError::database_operation(format!("保存答案失败: {e}")))?;
        }

        let attempt = QuizAttempts::find_by_id(attempt_id)
            .one(&txn)
            .await?
            .ok_or_else(|| SchoolSystemError::not_found(format!("作答不存在: {attempt_id}")))?;

        txn.commit().await?;
        Ok(attempt.into_attempt())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::quizzes::entities::QuestionType;
    use crate::models::quizzes::requests::{CreateOptionRequest, CreateQuestionRequest};
    use crate::storage::sea_orm_storage::test_support::{
        memory_storage, seed_class, seed_section, seed_student, seed_teacher,
    };

    fn quiz_request(class_id: i64, max_attempts: i32) -> CreateQuizRequest {
        CreateQuizRequest {
            class_id,
            title: "Fractions".into(),
            description: None,
            time_limit_minutes: Some(15),
            max_attempts,
            is_published: true,
            due_date: None,
            questions: vec![
                CreateQuestionRequest {
                    question_text: "1/2 + 1/2 = ?".into(),
                    question_type: QuestionType::MultipleChoice,
                    points: 2.0,
                    options: vec![
                        CreateOptionRequest {
                            option_text: "1".into(),
                            is_correct: true,
                        },
                        CreateOptionRequest {
                            option_text: "2".into(),
                            is_correct: false,
                        },
                    ],
                },
                CreateQuestionRequest {
                    question_text: "Explain a fraction.".into(),
                    question_type: QuestionType::ShortAnswer,
                    points: 3.0,
                    options: vec![],
                },
            ],
        }
    }

    async fn setup(max_attempts: i32) -> (SeaOrmStorage, Quiz, Vec<QuizQuestion>, i64) {
        let storage = memory_storage().await;
        let section = seed_section(&storage, "Grade 7", "Rizal").await;
        let (teacher, user) = seed_teacher(&storage, "t@school.test").await;
        let class = seed_class(&storage, section.id, teacher.id, "Math").await;
        let student = seed_student(&storage, "s@school.test", None, Some(section.id)).await;
        let (quiz, questions) = storage
            .create_quiz_impl(quiz_request(class.id, max_attempts), user.id)
            .await
            .unwrap();
        (storage, quiz, questions, student.id)
    }

    #[actix_web::test]
    async fn test_create_quiz_keeps_question_order_and_options() {
        let (storage, quiz, questions, _) = setup(1).await;
        assert_eq!(questions.len(), 2);
        assert_eq!(questions[0].position, 1);
        assert_eq!(questions[0].options.len(), 2);
        assert!(questions[1].options.is_empty());

        let reloaded = storage.get_quiz_questions_impl(quiz.id).await.unwrap();
        assert_eq!(reloaded[0].question_text, "1/2 + 1/2 = ?");
    }

    #[actix_web::test]
    async fn test_start_reuses_open_attempt() {
        let (storage, quiz, _, student_id) = setup(2).await;
        let first = storage.start_quiz_attempt_impl(&quiz, student_id).await.unwrap();
        let again = storage.start_quiz_attempt_impl(&quiz, student_id).await.unwrap();
        assert_eq!(first.id, again.id);
        assert_eq!(first.attempt_number, 1);
        assert_eq!(first.max_score, 5.0);
    }

    #[actix_web::test]
    async fn test_submit_twice_conflicts_and_max_attempts_enforced() {
        let (storage, quiz, questions, student_id) = setup(1).await;
        let attempt = storage.start_quiz_attempt_impl(&quiz, student_id).await.unwrap();

        let answers = vec![ScoredAnswer {
            question_id: questions[0].id,
            selected_option_id: Some(questions[0].options[0].id),
            text_answer: None,
            is_correct: Some(true),
            points_awarded: 2.0,
        }];
        let submitted = storage
            .submit_quiz_attempt_impl(attempt.id, answers.clone(), 2.0)
            .await
            .unwrap();
        assert_eq!(submitted.score, Some(2.0));
        assert!(submitted.submitted_at.is_some());

        let err = storage
            .submit_quiz_attempt_impl(attempt.id, answers, 2.0)
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 409);
        assert_eq!(
            storage.list_attempt_answers_impl(attempt.id).await.unwrap().len(),
            1
        );

        let err = storage
            .start_quiz_attempt_impl(&quiz, student_id)
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 409);
    }
}
