//! 成绩存储操作

use std::collections::HashMap;

use super::SeaOrmStorage;
use crate::entity::grades::{ActiveModel, Column, Entity as Grades, Model as GradeModel};
use crate::entity::prelude::{Assignments, Classes};
use crate::entity::{assignments, classes};
use crate::errors::{Result, SchoolSystemError};
use crate::models::grades::{
    entities::{Grade, GradeDetail, grade_scope_key},
    requests::GradeUpsert,
};
use sea_orm::sea_query::OnConflict;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};

impl SeaOrmStorage {
    /// 按 (学生, 课程, 作业或总评) upsert
    pub async fn upsert_grade_impl(&self, grade: GradeUpsert) -> Result<Grade> {
        let now = chrono::Utc::now().timestamp();
        let scope_key = grade_scope_key(grade.student_id, grade.class_id, grade.assignment_id);

        let model = ActiveModel {
            student_id: Set(grade.student_id),
            class_id: Set(grade.class_id),
            assignment_id: Set(grade.assignment_id),
            scope_key: Set(scope_key.clone()),
            score: Set(grade.score),
            remarks: Set(grade.remarks),
            feedback_emoji: Set(grade.feedback_emoji),
            graded_by: Set(grade.graded_by),
            graded_at: Set(now),
            ..Default::default()
        };

        Grades::insert(model)
            .on_conflict(
                OnConflict::column(Column::ScopeKey)
                    .update_columns([
                        Column::Score,
                        Column::Remarks,
                        Column::FeedbackEmoji,
                        Column::GradedBy,
                        Column::GradedAt,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await
            .map_err(|e| SchoolSystemError::database_operation(format!("保存成绩失败: {e}")))?;

        let saved = Grades::find()
            .filter(Column::ScopeKey.eq(scope_key))
            .one(&self.db)
            .await?
            .ok_or_else(|| SchoolSystemError::database_operation("成绩写入后未找到"))?;

        Ok(saved.into_grade())
    }

    pub async fn list_class_grades_impl(
        &self,
        class_id: i64,
        assignment_id: Option<i64>,
    ) -> Result<Vec<GradeDetail>> {
        let mut select = Grades::find().filter(Column::ClassId.eq(class_id));
        if let Some(assignment_id) = assignment_id {
            select = select.filter(Column::AssignmentId.eq(assignment_id));
        }

        let rows = select
            .order_by_asc(Column::StudentId)
            .all(&self.db)
            .await
            .map_err(|e| SchoolSystemError::database_operation(format!("查询课程成绩失败: {e}")))?;

        self.grade_details(rows).await
    }

    pub async fn list_student_grades_impl(
        &self,
        student_id: i64,
        class_id: Option<i64>,
    ) -> Result<Vec<GradeDetail>> {
        let mut select = Grades::find().filter(Column::StudentId.eq(student_id));
        if let Some(class_id) = class_id {
            select = select.filter(Column::ClassId.eq(class_id));
        }

        let rows = select
            .order_by_desc(Column::GradedAt)
            .all(&self.db)
            .await
            .map_err(|e| SchoolSystemError::database_operation(format!("查询学生成绩失败: {e}")))?;

        self.grade_details(rows).await
    }

    async fn grade_details(&self, rows: Vec<GradeModel>) -> Result<Vec<GradeDetail>> {
        let labels = self
            .student_labels(rows.iter().map(|g| g.student_id).collect())
            .await?;

        let class_ids: Vec<i64> = rows.iter().map(|g| g.class_id).collect();
        let subjects: HashMap<i64, String> = Classes::find()
            .filter(classes::Column::Id.is_in(class_ids))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|c| (c.id, c.subject_name))
            .collect();

        let assignment_ids: Vec<i64> = rows.iter().filter_map(|g| g.assignment_id).collect();
        let titles: HashMap<i64, String> = if assignment_ids.is_empty() {
            HashMap::new()
        } else {
            Assignments::find()
                .filter(assignments::Column::Id.is_in(assignment_ids))
                .all(&self.db)
                .await?
                .into_iter()
                .map(|a| (a.id, a.title))
                .collect()
        };

        Ok(rows
            .into_iter()
            .map(|g| {
                let (student_number, student_name) = labels
                    .get(&g.student_id)
                    .cloned()
                    .unwrap_or_default();
                let subject_name = subjects.get(&g.class_id).cloned().unwrap_or_default();
                let assignment_title = g.assignment_id.and_then(|id| titles.get(&id).cloned());
                GradeDetail {
                    grade: g.into_grade(),
                    student_number,
                    student_name,
                    subject_name,
                    assignment_title,
                }
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::assignments::entities::AssignmentStatus;
    use crate::storage::sea_orm_storage::test_support::{
        memory_storage, new_assignment, seed_class, seed_section, seed_student, seed_teacher,
    };

    fn grade(
        student_id: i64,
        class_id: i64,
        assignment_id: Option<i64>,
        score: f64,
        graded_by: i64,
    ) -> GradeUpsert {
        GradeUpsert {
            student_id,
            class_id,
            assignment_id,
            score,
            remarks: None,
            feedback_emoji: None,
            graded_by,
        }
    }

    #[actix_web::test]
    async fn test_grade_upsert_is_idempotent_per_scope() {
        let storage = memory_storage().await;
        let section = seed_section(&storage, "Grade 7", "Rizal").await;
        let (teacher, user) = seed_teacher(&storage, "t@school.test").await;
        let class = seed_class(&storage, section.id, teacher.id, "Math").await;
        let student = seed_student(&storage, "s@school.test", None, Some(section.id)).await;

        let first = storage
            .upsert_grade_impl(grade(student.id, class.id, None, 80.0, user.id))
            .await
            .unwrap();
        let mut again = grade(student.id, class.id, None, 92.5, user.id);
        again.feedback_emoji = Some("🌟".into());
        let second = storage.upsert_grade_impl(again).await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.score, 92.5);
        assert_eq!(second.feedback_emoji.as_deref(), Some("🌟"));

        let grades = storage
            .list_class_grades_impl(class.id, None)
            .await
            .unwrap();
        assert_eq!(grades.len(), 1);
        assert_eq!(grades[0].subject_name, "Math");
        assert_eq!(grades[0].student_number, student.student_number);
    }

    #[actix_web::test]
    async fn test_overall_and_assignment_grades_are_separate() {
        let storage = memory_storage().await;
        let section = seed_section(&storage, "Grade 7", "Rizal").await;
        let (teacher, user) = seed_teacher(&storage, "t@school.test").await;
        let class = seed_class(&storage, section.id, teacher.id, "Math").await;
        let student = seed_student(&storage, "s@school.test", None, Some(section.id)).await;
        let assignment = storage
            .create_assignment_impl(new_assignment(
                class.id,
                user.id,
                AssignmentStatus::Published,
                100,
            ))
            .await
            .unwrap();

        storage
            .upsert_grade_impl(grade(student.id, class.id, None, 85.0, user.id))
            .await
            .unwrap();
        storage
            .upsert_grade_impl(grade(student.id, class.id, Some(assignment.id), 40.0, user.id))
            .await
            .unwrap();

        let all = storage
            .list_student_grades_impl(student.id, None)
            .await
            .unwrap();
        assert_eq!(all.len(), 2);

        let only = storage
            .list_class_grades_impl(class.id, Some(assignment.id))
            .await
            .unwrap();
        assert_eq!(only.len(), 1);
        assert_eq!(only[0].grade.score, 40.0);
        assert_eq!(only[0].assignment_title.as_deref(), Some(assignment.title.as_str()));
    }
}
