//! 作业存储操作

use std::collections::HashMap;

use super::SeaOrmStorage;
use crate::entity::prelude::*;
use crate::entity::{assignment_submissions, assignments, classes};
use crate::errors::{Result, SchoolSystemError};
use crate::models::{
    PaginationInfo,
    assignments::{
        entities::{Assignment, AssignmentStatus, StudentAssignment},
        requests::{AssignmentListQuery, AssignmentUpdate, NewAssignment},
        responses::AssignmentListResponse,
    },
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};

impl SeaOrmStorage {
    pub async fn create_assignment_impl(&self, assignment: NewAssignment) -> Result<Assignment> {
        if Classes::find_by_id(assignment.class_id)
            .one(&self.db)
            .await?
            .is_none()
        {
            return Err(SchoolSystemError::not_found(format!(
                "课程不存在: {}",
                assignment.class_id
            )));
        }

        let now = chrono::Utc::now().timestamp();
        let model = AssignmentActiveModel {
            class_id: Set(assignment.class_id),
            title: Set(assignment.title),
            description: Set(assignment.description),
            due_date: Set(assignment.due_date),
            max_score: Set(assignment.max_score),
            status: Set(assignment.status.to_string()),
            created_by: Set(assignment.created_by),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(|e| SchoolSystemError::database_operation(format!("创建作业失败: {e}")))?;

        Ok(model.into_assignment())
    }

    pub async fn get_assignment_by_id_impl(&self, id: i64) -> Result<Option<Assignment>> {
        let result = Assignments::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| SchoolSystemError::database_operation(format!("查询作业失败: {e}")))?;

        Ok(result.map(|m| m.into_assignment()))
    }

    /// 分页列出课程作业，按截止时间升序
    pub async fn list_assignments_with_pagination_impl(
        &self,
        query: AssignmentListQuery,
    ) -> Result<AssignmentListResponse> {
        let page = query.page.unwrap_or(1).max(1) as u64;
        let size = query.size.unwrap_or(10).clamp(1, 100) as u64;

        let mut select = Assignments::find().filter(assignments::Column::ClassId.eq(query.class_id));

        if let Some(status) = query.status {
            select = select.filter(assignments::Column::Status.eq(status.as_str()));
        }

        let paginator = select
            .order_by_asc(assignments::Column::DueDate)
            .paginate(&self.db, size);

        let total = paginator.num_items().await.map_err(|e| {
            SchoolSystemError::database_operation(format!("查询作业总数失败: {e}"))
        })?;
        let pages = paginator.num_pages().await.map_err(|e| {
            SchoolSystemError::database_operation(format!("查询作业页数失败: {e}"))
        })?;
        let rows = paginator.fetch_page(page - 1).await.map_err(|e| {
            SchoolSystemError::database_operation(format!("查询作业列表失败: {e}"))
        })?;

        Ok(AssignmentListResponse {
            items: rows.into_iter().map(|m| m.into_assignment()).collect(),
            pagination: PaginationInfo::new(page, size, total, pages),
        })
    }

    /// 学生所在分区的已发布作业，附带本人提交
    pub async fn list_student_assignments_impl(
        &self,
        student_id: i64,
        section_id: i64,
    ) -> Result<Vec<StudentAssignment>> {
        let rows = Assignments::find()
            .find_also_related(Classes)
            .filter(classes::Column::SectionId.eq(section_id))
            .filter(assignments::Column::Status.eq(AssignmentStatus::Published.as_str()))
            .order_by_asc(assignments::Column::DueDate)
            .all(&self.db)
            .await
            .map_err(|e| SchoolSystemError::database_operation(format!("查询学生作业失败: {e}")))?;

        let assignment_ids: Vec<i64> = rows.iter().map(|(a, _)| a.id).collect();
        let mut submissions: HashMap<i64, _> = if assignment_ids.is_empty() {
            HashMap::new()
        } else {
            AssignmentSubmissions::find()
                .filter(assignment_submissions::Column::StudentId.eq(student_id))
                .filter(assignment_submissions::Column::AssignmentId.is_in(assignment_ids))
                .all(&self.db)
                .await?
                .into_iter()
                .map(|s| (s.assignment_id, s.into_submission()))
                .collect()
        };

        Ok(rows
            .into_iter()
            .map(|(assignment, class)| StudentAssignment {
                submission: submissions.remove(&assignment.id),
                subject_name: class.map(|c| c.subject_name).unwrap_or_default(),
                assignment: assignment.into_assignment(),
            })
            .collect())
    }

    pub async fn update_assignment_impl(
        &self,
        id: i64,
        update: AssignmentUpdate,
    ) -> Result<Option<Assignment>> {
        let Some(existing) = Assignments::find_by_id(id).one(&self.db).await? else {
            return Ok(None);
        };

        let mut model: AssignmentActiveModel = existing.into();
        model.updated_at = Set(chrono::Utc::now().timestamp());

        if let Some(title) = update.title {
            model.title = Set(title);
        }
        if let Some(description) = update.description {
            model.description = Set(Some(description));
        }
        if let Some(due_date) = update.due_date {
            model.due_date = Set(due_date);
        }
        if let Some(max_score) = update.max_score {
            model.max_score = Set(max_score);
        }
        if let Some(status) = update.status {
            model.status = Set(status.to_string());
        }

        let updated = model
            .update(&self.db)
            .await
            .map_err(|e| SchoolSystemError::database_operation(format!("更新作业失败: {e}")))?;

        Ok(Some(updated.into_assignment()))
    }

    pub async fn delete_assignment_impl(&self, id: i64) -> Result<bool> {
        let result = Assignments::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| SchoolSystemError::database_operation(format!("删除作业失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::submissions::{entities::SubmissionStatus, requests::SubmissionUpsert};
    use crate::storage::sea_orm_storage::test_support::{
        memory_storage, new_assignment, seed_class, seed_section, seed_student, seed_teacher,
    };

    #[actix_web::test]
    async fn test_student_sees_only_published_assignments_of_own_section() {
        let storage = memory_storage().await;
        let rizal = seed_section(&storage, "Grade 7", "Rizal").await;
        let mabini = seed_section(&storage, "Grade 7", "Mabini").await;
        let (teacher, user) = seed_teacher(&storage, "t@school.test").await;
        let math = seed_class(&storage, rizal.id, teacher.id, "Math").await;
        let other = seed_class(&storage, mabini.id, teacher.id, "Math").await;
        let student = seed_student(&storage, "s@school.test", None, Some(rizal.id)).await;

        let published = storage
            .create_assignment_impl(new_assignment(math.id, user.id, AssignmentStatus::Published, 100))
            .await
            .unwrap();
        storage
            .create_assignment_impl(new_assignment(math.id, user.id, AssignmentStatus::Draft, 100))
            .await
            .unwrap();
        storage
            .create_assignment_impl(new_assignment(other.id, user.id, AssignmentStatus::Published, 100))
            .await
            .unwrap();

        storage
            .upsert_submission_impl(SubmissionUpsert {
                assignment_id: published.id,
                student_id: student.id,
                file_token: "tok".into(),
                file_name: "essay.pdf".into(),
                status: SubmissionStatus::Submitted,
                submitted_at: 50,
            })
            .await
            .unwrap();

        let items = storage
            .list_student_assignments_impl(student.id, rizal.id)
            .await
            .unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].assignment.id, published.id);
        assert_eq!(items[0].subject_name, "Math");
        assert!(items[0].submission.is_some());
    }

    #[actix_web::test]
    async fn test_update_assignment_status() {
        let storage = memory_storage().await;
        let section = seed_section(&storage, "Grade 7", "Rizal").await;
        let (teacher, user) = seed_teacher(&storage, "t@school.test").await;
        let class = seed_class(&storage, section.id, teacher.id, "Math").await;
        let assignment = storage
            .create_assignment_impl(new_assignment(class.id, user.id, AssignmentStatus::Draft, 100))
            .await
            .unwrap();

        let updated = storage
            .update_assignment_impl(
                assignment.id,
                AssignmentUpdate {
                    status: Some(AssignmentStatus::Published),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.status, AssignmentStatus::Published);
        assert_eq!(updated.title, assignment.title);
    }
}
