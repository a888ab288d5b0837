//! 家长提醒存储操作

use std::collections::HashSet;

use super::SeaOrmStorage;
use crate::entity::prelude::*;
use crate::entity::{alerts, assignment_submissions, assignments, students};
use crate::errors::{Result, SchoolSystemError};
use crate::models::{
    alerts::{
        entities::{Alert, AlertType, OverdueCandidate},
        requests::NewAlert,
    },
    assignments::entities::AssignmentStatus,
};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};

impl SeaOrmStorage {
    /// 已发布且已过截止时间的作业 × 该分区内有家长且未提交的学生
    pub async fn list_overdue_candidates_impl(&self, now: i64) -> Result<Vec<OverdueCandidate>> {
        let overdue = Assignments::find()
            .find_also_related(Classes)
            .filter(assignments::Column::Status.eq(AssignmentStatus::Published.as_str()))
            .filter(assignments::Column::DueDate.lt(now))
            .order_by_asc(assignments::Column::DueDate)
            .all(&self.db)
            .await
            .map_err(|e| SchoolSystemError::database_operation(format!("查询逾期作业失败: {e}")))?;

        let mut candidates = Vec::new();

        for (assignment, class) in overdue {
            let Some(class) = class else { continue };

            let submitted: HashSet<i64> = AssignmentSubmissions::find()
                .filter(assignment_submissions::Column::AssignmentId.eq(assignment.id))
                .all(&self.db)
                .await?
                .into_iter()
                .map(|s| s.student_id)
                .collect();

            let roster = Students::find()
                .filter(students::Column::SectionId.eq(class.section_id))
                .filter(students::Column::ParentId.is_not_null())
                .find_also_related(Users)
                .all(&self.db)
                .await?;

            for (student, user) in roster {
                if submitted.contains(&student.id) {
                    continue;
                }
                let (Some(parent_id), Some(user)) = (student.parent_id, user) else {
                    continue;
                };
                candidates.push(OverdueCandidate {
                    parent_id,
                    student_id: student.id,
                    student_name: format!("{} {}", user.first_name, user.last_name),
                    assignment_id: assignment.id,
                    assignment_title: assignment.title.clone(),
                    subject_name: class.subject_name.clone(),
                    due_date: assignment.due_date,
                });
            }
        }

        Ok(candidates)
    }

    /// 按 (家长, 学生, 作业, 类型) 去重；无作业的提醒按消息去重。只与未读提醒比较
    ///
    /// 成绩提醒命中未读旧提醒且消息不同时就地刷新。返回是否新建或刷新。
    pub async fn create_alert_if_absent_impl(&self, alert: NewAlert) -> Result<bool> {
        let mut existing = Alerts::find()
            .filter(alerts::Column::ParentId.eq(alert.parent_id))
            .filter(alerts::Column::StudentId.eq(alert.student_id))
            .filter(alerts::Column::AlertType.eq(alert.alert_type.as_str()))
            .filter(alerts::Column::Viewed.eq(false));

        existing = match alert.assignment_id {
            Some(assignment_id) => existing.filter(alerts::Column::AssignmentId.eq(assignment_id)),
            None => existing
                .filter(alerts::Column::AssignmentId.is_null())
                .filter(alerts::Column::Message.eq(alert.message.as_str())),
        };

        if let Some(found) = existing.one(&self.db).await? {
            // 成绩改动后旧的未读提醒会过时，改为刷新内容与时间
            if alert.alert_type != AlertType::GradePosted || found.message == alert.message {
                return Ok(false);
            }
            let mut found: AlertActiveModel = found.into();
            found.message = Set(alert.message);
            found.created_at = Set(chrono::Utc::now().timestamp());
            found
                .update(&self.db)
                .await
                .map_err(|e| SchoolSystemError::database_operation(format!("刷新提醒失败: {e}")))?;
            return Ok(true);
        }

        AlertActiveModel {
            parent_id: Set(alert.parent_id),
            student_id: Set(alert.student_id),
            assignment_id: Set(alert.assignment_id),
            alert_type: Set(alert.alert_type.to_string()),
            message: Set(alert.message),
            viewed: Set(false),
            created_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(|e| SchoolSystemError::database_operation(format!("创建提醒失败: {e}")))?;

        Ok(true)
    }

    pub async fn list_parent_alerts_impl(&self, parent_id: i64, limit: u64) -> Result<Vec<Alert>> {
        let rows = Alerts::find()
            .filter(alerts::Column::ParentId.eq(parent_id))
            .order_by_desc(alerts::Column::CreatedAt)
            .order_by_desc(alerts::Column::Id)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(|e| SchoolSystemError::database_operation(format!("查询提醒失败: {e}")))?;

        Ok(rows.into_iter().map(|m| m.into_alert()).collect())
    }

    /// 标记单条已读，重复调用无副作用；提醒不属于该家长时返回 false
    pub async fn mark_alert_viewed_impl(&self, alert_id: i64, parent_id: i64) -> Result<bool> {
        let owned = Alerts::find_by_id(alert_id)
            .filter(alerts::Column::ParentId.eq(parent_id))
            .one(&self.db)
            .await?;
        if owned.is_none() {
            return Ok(false);
        }

        Alerts::update_many()
            .col_expr(alerts::Column::Viewed, Expr::value(true))
            .filter(alerts::Column::Id.eq(alert_id))
            .filter(alerts::Column::ParentId.eq(parent_id))
            .exec(&self.db)
            .await
            .map_err(|e| SchoolSystemError::database_operation(format!("标记提醒已读失败: {e}")))?;

        Ok(true)
    }

    pub async fn mark_all_alerts_viewed_impl(&self, parent_id: i64) -> Result<u64> {
        let result = Alerts::update_many()
            .col_expr(alerts::Column::Viewed, Expr::value(true))
            .filter(alerts::Column::ParentId.eq(parent_id))
            .filter(alerts::Column::Viewed.eq(false))
            .exec(&self.db)
            .await
            .map_err(|e| SchoolSystemError::database_operation(format!("标记全部已读失败: {e}")))?;

        Ok(result.rows_affected)
    }

    pub async fn count_unread_alerts_impl(&self, parent_id: i64) -> Result<i64> {
        let count = Alerts::find()
            .filter(alerts::Column::ParentId.eq(parent_id))
            .filter(alerts::Column::Viewed.eq(false))
            .count(&self.db)
            .await
            .map_err(|e| SchoolSystemError::database_operation(format!("统计未读提醒失败: {e}")))?;

        Ok(count as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::alerts::entities::AlertType;
    use crate::models::submissions::{entities::SubmissionStatus, requests::SubmissionUpsert};
    use crate::storage::sea_orm_storage::test_support::{
        memory_storage, new_assignment, seed_class, seed_parent, seed_section, seed_student,
        seed_teacher,
    };

    fn overdue_alert(candidate: &OverdueCandidate) -> NewAlert {
        NewAlert {
            parent_id: candidate.parent_id,
            student_id: candidate.student_id,
            assignment_id: Some(candidate.assignment_id),
            alert_type: AlertType::OverdueAssignment,
            message: candidate.message(),
        }
    }

    #[actix_web::test]
    async fn test_overdue_candidates_skip_submitted_and_parentless() {
        let storage = memory_storage().await;
        let section = seed_section(&storage, "Grade 7", "Rizal").await;
        let (teacher, user) = seed_teacher(&storage, "t@school.test").await;
        let class = seed_class(&storage, section.id, teacher.id, "Math").await;
        let parent = seed_parent(&storage, "p@mail.test").await;
        let late = seed_student(&storage, "a@school.test", Some(parent.id), Some(section.id)).await;
        let done = seed_student(&storage, "b@school.test", Some(parent.id), Some(section.id)).await;
        seed_student(&storage, "c@school.test", None, Some(section.id)).await;

        let assignment = storage
            .create_assignment_impl(new_assignment(class.id, user.id, AssignmentStatus::Published, 100))
            .await
            .unwrap();
        // 草稿与未到期的作业不参与
        storage
            .create_assignment_impl(new_assignment(class.id, user.id, AssignmentStatus::Draft, 100))
            .await
            .unwrap();
        storage
            .create_assignment_impl(new_assignment(class.id, user.id, AssignmentStatus::Published, 10_000))
            .await
            .unwrap();

        storage
            .upsert_submission_impl(SubmissionUpsert {
                assignment_id: assignment.id,
                student_id: done.id,
                file_token: "tok".into(),
                file_name: "hw.pdf".into(),
                status: SubmissionStatus::Late,
                submitted_at: 150,
            })
            .await
            .unwrap();

        let candidates = storage.list_overdue_candidates_impl(1_000).await.unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].student_id, late.id);
        assert_eq!(candidates[0].subject_name, "Math");
    }

    #[actix_web::test]
    async fn test_dedup_uses_assignment_key_not_message_text() {
        let storage = memory_storage().await;
        let section = seed_section(&storage, "Grade 7", "Rizal").await;
        let (teacher, user) = seed_teacher(&storage, "t@school.test").await;
        let class = seed_class(&storage, section.id, teacher.id, "English").await;
        let parent = seed_parent(&storage, "p@mail.test").await;
        seed_student(&storage, "a@school.test", Some(parent.id), Some(section.id)).await;

        // 标题互为子串的两份作业必须各自产生提醒
        let mut essay = new_assignment(class.id, user.id, AssignmentStatus::Published, 100);
        essay.title = "Essay".into();
        storage.create_assignment_impl(essay).await.unwrap();
        let mut essay_two = new_assignment(class.id, user.id, AssignmentStatus::Published, 100);
        essay_two.title = "Essay 2".into();
        storage.create_assignment_impl(essay_two).await.unwrap();

        let candidates = storage.list_overdue_candidates_impl(1_000).await.unwrap();
        assert_eq!(candidates.len(), 2);

        let mut created = 0;
        for candidate in &candidates {
            if storage
                .create_alert_if_absent_impl(overdue_alert(candidate))
                .await
                .unwrap()
            {
                created += 1;
            }
        }
        assert_eq!(created, 2);

        // 再次扫描不重复创建
        for candidate in &candidates {
            assert!(
                !storage
                    .create_alert_if_absent_impl(overdue_alert(candidate))
                    .await
                    .unwrap()
            );
        }
        assert_eq!(storage.count_unread_alerts_impl(parent.id).await.unwrap(), 2);
    }

    #[actix_web::test]
    async fn test_regrade_refreshes_unread_grade_alert() {
        let storage = memory_storage().await;
        let section = seed_section(&storage, "Grade 7", "Rizal").await;
        let (teacher, user) = seed_teacher(&storage, "t@school.test").await;
        let class = seed_class(&storage, section.id, teacher.id, "Math").await;
        let parent = seed_parent(&storage, "p@mail.test").await;
        let student = seed_student(&storage, "a@school.test", Some(parent.id), Some(section.id)).await;
        let assignment = storage
            .create_assignment_impl(new_assignment(class.id, user.id, AssignmentStatus::Published, 100))
            .await
            .unwrap();

        let grade_alert = |score: i32| NewAlert {
            parent_id: parent.id,
            student_id: student.id,
            assignment_id: Some(assignment.id),
            alert_type: AlertType::GradePosted,
            message: format!("Test received {score} on \"Quiz\" in Math."),
        };

        assert!(storage.create_alert_if_absent_impl(grade_alert(50)).await.unwrap());
        assert!(storage.create_alert_if_absent_impl(grade_alert(90)).await.unwrap());
        // 相同内容不再变动
        assert!(!storage.create_alert_if_absent_impl(grade_alert(90)).await.unwrap());

        let alerts = storage.list_parent_alerts_impl(parent.id, 50).await.unwrap();
        assert_eq!(alerts.len(), 1);
        assert!(alerts[0].message.contains("90"));
        assert!(!alerts[0].viewed);

        // 已读后再改分则新建一条
        storage.mark_alert_viewed_impl(alerts[0].id, parent.id).await.unwrap();
        assert!(storage.create_alert_if_absent_impl(grade_alert(95)).await.unwrap());
        assert_eq!(storage.count_unread_alerts_impl(parent.id).await.unwrap(), 1);
    }

    #[actix_web::test]
    async fn test_mark_viewed_is_idempotent_and_scoped_to_parent() {
        let storage = memory_storage().await;
        let section = seed_section(&storage, "Grade 7", "Rizal").await;
        let parent = seed_parent(&storage, "p@mail.test").await;
        let other = seed_parent(&storage, "q@mail.test").await;
        let student = seed_student(&storage, "a@school.test", Some(parent.id), Some(section.id)).await;

        for message in ["Absent on 2025-03-03", "Late on 2025-03-04"] {
            storage
                .create_alert_if_absent_impl(NewAlert {
                    parent_id: parent.id,
                    student_id: student.id,
                    assignment_id: None,
                    alert_type: AlertType::AttendanceIssue,
                    message: message.into(),
                })
                .await
                .unwrap();
        }

        let alerts = storage.list_parent_alerts_impl(parent.id, 50).await.unwrap();
        assert_eq!(alerts.len(), 2);
        assert_eq!(alerts[0].alert_type, AlertType::AttendanceIssue);

        assert!(!storage.mark_alert_viewed_impl(alerts[0].id, other.id).await.unwrap());
        assert!(storage.mark_alert_viewed_impl(alerts[0].id, parent.id).await.unwrap());
        assert!(storage.mark_alert_viewed_impl(alerts[0].id, parent.id).await.unwrap());
        assert_eq!(storage.count_unread_alerts_impl(parent.id).await.unwrap(), 1);

        assert_eq!(storage.mark_all_alerts_viewed_impl(parent.id).await.unwrap(), 1);
        assert_eq!(storage.mark_all_alerts_viewed_impl(parent.id).await.unwrap(), 0);
        assert_eq!(storage.count_unread_alerts_impl(parent.id).await.unwrap(), 0);

        let limited = storage.list_parent_alerts_impl(parent.id, 1).await.unwrap();
        assert_eq!(limited.len(), 1);
    }
}
