//! 作业提交存储操作

use super::SeaOrmStorage;
use crate::entity::assignment_submissions::{ActiveModel, Column, Entity as AssignmentSubmissions};
use crate::errors::{Result, SchoolSystemError};
use crate::models::submissions::{
    entities::{Submission, SubmissionWithStudent},
    requests::SubmissionUpsert,
};
use sea_orm::sea_query::OnConflict;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait};

impl SeaOrmStorage {
    /// 按 (作业, 学生) upsert，重复提交覆盖文件与时间
    ///
    /// 同一事务内先读出旧的文件 token，换了文件时一并返回，由调用方清理。
    pub async fn upsert_submission_impl(
        &self,
        submission: SubmissionUpsert,
    ) -> Result<(Submission, Option<String>)> {
        let txn = self.db.begin().await?;

        let previous = AssignmentSubmissions::find()
            .filter(Column::AssignmentId.eq(submission.assignment_id))
            .filter(Column::StudentId.eq(submission.student_id))
            .one(&txn)
            .await?
            .map(|s| s.file_token)
            .filter(|token| *token != submission.file_token);

        let model = ActiveModel {
            assignment_id: Set(submission.assignment_id),
            student_id: Set(submission.student_id),
            file_token: Set(submission.file_token),
            file_name: Set(submission.file_name),
            status: Set(submission.status.to_string()),
            submitted_at: Set(submission.submitted_at),
            ..Default::default()
        };

        AssignmentSubmissions::insert(model)
            .on_conflict(
                OnConflict::columns([Column::AssignmentId, Column::StudentId])
                    .update_columns([
                        Column::FileToken,
                        Column::FileName,
                        Column::Status,
                        Column::SubmittedAt,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(&txn)
            .await
            .map_err(|e| SchoolSystemError::database_operation(format!("保存作业提交失败: {e}")))?;

        let saved = AssignmentSubmissions::find()
            .filter(Column::AssignmentId.eq(submission.assignment_id))
            .filter(Column::StudentId.eq(submission.student_id))
            .one(&txn)
            .await?
            .ok_or_else(|| SchoolSystemError::database_operation("作业提交写入后未找到"))?;

        txn.commit().await?;
        Ok((saved.into_submission(), previous))
    }

    /// 教师查看某作业的全部提交
    pub async fn list_submissions_for_assignment_impl(
        &self,
        assignment_id: i64,
    ) -> Result<Vec<SubmissionWithStudent>> {
        let rows = AssignmentSubmissions::find()
            .filter(Column::AssignmentId.eq(assignment_id))
            .order_by_asc(Column::SubmittedAt)
            .all(&self.db)
            .await
            .map_err(|e| SchoolSystemError::database_operation(format!("查询提交列表失败: {e}")))?;

        let mut labels = self
            .student_labels(rows.iter().map(|s| s.student_id).collect())
            .await?;

        Ok(rows
            .into_iter()
            .map(|s| {
                let (student_number, student_name) =
                    labels.remove(&s.student_id).unwrap_or_default();
                SubmissionWithStudent {
                    submission: s.into_submission(),
                    student_number,
                    student_name,
                }
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::assignments::entities::AssignmentStatus;
    use crate::models::submissions::entities::SubmissionStatus;
    use crate::storage::sea_orm_storage::test_support::{
        memory_storage, new_assignment, seed_class, seed_section, seed_student, seed_teacher,
    };

    #[actix_web::test]
    async fn test_resubmission_replaces_single_row() {
        let storage = memory_storage().await;
        let section = seed_section(&storage, "Grade 7", "Rizal").await;
        let (teacher, user) = seed_teacher(&storage, "t@school.test").await;
        let class = seed_class(&storage, section.id, teacher.id, "Math").await;
        let student = seed_student(&storage, "s@school.test", None, Some(section.id)).await;
        let assignment = storage
            .create_assignment_impl(new_assignment(class.id, user.id, AssignmentStatus::Published, 100))
            .await
            .unwrap();

        let (first, replaced) = storage
            .upsert_submission_impl(SubmissionUpsert {
                assignment_id: assignment.id,
                student_id: student.id,
                file_token: "a".into(),
                file_name: "v1.pdf".into(),
                status: SubmissionStatus::Submitted,
                submitted_at: 90,
            })
            .await
            .unwrap();
        assert_eq!(replaced, None);
        let (second, replaced) = storage
            .upsert_submission_impl(SubmissionUpsert {
                assignment_id: assignment.id,
                student_id: student.id,
                file_token: "b".into(),
                file_name: "v2.pdf".into(),
                status: SubmissionStatus::Late,
                submitted_at: 120,
            })
            .await
            .unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(replaced.as_deref(), Some("a"));
        assert_eq!(second.file_name, "v2.pdf");
        assert_eq!(second.status, SubmissionStatus::Late);

        let list = storage
            .list_submissions_for_assignment_impl(assignment.id)
            .await
            .unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].student_number, student.student_number);
    }
}
