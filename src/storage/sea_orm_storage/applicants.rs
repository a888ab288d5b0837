//! 招生存储操作：报名、审核、录取、拒绝

use super::SeaOrmStorage;
use super::id_counters::{current_year, next_identifier_in};
use crate::entity::prelude::*;
use crate::entity::{applicants, students, users};
use crate::errors::{Result, SchoolSystemError};
use crate::models::{
    PaginationInfo,
    applicants::{
        entities::{Applicant, ApplicantDetail, ApplicantStatus},
        requests::{ApplicantListQuery, NewApplication},
        responses::{ApplicantListResponse, ApprovalOutcome},
    },
    profiles::entities::IdentifierKind,
    users::entities::{UserRole, UserStatus},
};
use crate::utils::escape_like_pattern;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};

async fn find_detail_in<C: ConnectionTrait>(conn: &C, id: i64) -> Result<Option<ApplicantDetail>> {
    let result = Applicants::find_by_id(id)
        .find_also_related(Users)
        .one(conn)
        .await
        .map_err(|e| SchoolSystemError::database_operation(format!("查询申请失败: {e}")))?;

    Ok(result.and_then(|(applicant, user)| {
        user.map(|u| ApplicantDetail {
            applicant: applicant.into_applicant(),
            user: u.into_user(),
        })
    }))
}

/// 条件更新未命中时区分 404 与 409
async fn status_miss_error<C: ConnectionTrait>(
    conn: &C,
    id: i64,
    action: &str,
) -> Result<SchoolSystemError> {
    let current = Applicants::find_by_id(id).one(conn).await?;
    Ok(match current {
        None => SchoolSystemError::not_found(format!("申请不存在: {id}")),
        Some(model) => SchoolSystemError::conflict(format!(
            "Cannot {action} applicant with status '{}'",
            model.status
        )),
    })
}

/// 条件更新为已录取；并发录取时后到者影响 0 行，返回冲突让事务回滚
async fn mark_approved_in<C: ConnectionTrait>(conn: &C, id: i64, now: i64) -> Result<()> {
    let result = Applicants::update_many()
        .col_expr(
            applicants::Column::Status,
            Expr::value(ApplicantStatus::Approved.as_str()),
        )
        .col_expr(applicants::Column::ReviewedAt, Expr::value(now))
        .col_expr(applicants::Column::UpdatedAt, Expr::value(now))
        .filter(applicants::Column::Id.eq(id))
        .filter(applicants::Column::Status.ne(ApplicantStatus::Approved.as_str()))
        .exec(conn)
        .await
        .map_err(|e| SchoolSystemError::database_operation(format!("更新申请状态失败: {e}")))?;

    if result.rows_affected == 0 {
        return Err(SchoolSystemError::conflict("Applicant already approved"));
    }
    Ok(())
}

impl SeaOrmStorage {
    /// 报名：申请人账号 + 申请编号 + 申请记录
    pub async fn create_application_impl(
        &self,
        application: NewApplication,
    ) -> Result<ApplicantDetail> {
        let now = chrono::Utc::now().timestamp();
        let txn = self.db.begin().await?;

        let exists = Users::find()
            .filter(users::Column::Email.eq(&application.email))
            .one(&txn)
            .await?
            .is_some();
        if exists {
            return Err(SchoolSystemError::validation("邮箱已被注册"));
        }

        let user = UserActiveModel {
            email: Set(application.email),
            password_hash: Set(application.password_hash),
            role: Set(UserRole::Applicant.to_string()),
            status: Set(UserStatus::Active.to_string()),
            first_name: Set(application.first_name),
            last_name: Set(application.last_name),
            last_login: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(|e| SchoolSystemError::database_operation(format!("创建申请人账号失败: {e}")))?;

        let applicant_number =
            next_identifier_in(&txn, IdentifierKind::Applicant, current_year()).await?;

        let applicant = ApplicantActiveModel {
            user_id: Set(user.id),
            status: Set(ApplicantStatus::Pending.to_string()),
            reference_code: Set(application.reference_code),
            applicant_number: Set(applicant_number),
            application_type: Set(application.application_type.to_string()),
            gender: Set(application.gender.to_string()),
            birthdate: Set(application.birthdate),
            grade_level_applied: Set(application.grade_level_applied),
            guardian_name: Set(application.guardian_name),
            contact_number: Set(application.contact_number),
            address: Set(application.address),
            personal_info: Set(application.personal_info),
            rejection_reason: Set(None),
            reviewed_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(|e| SchoolSystemError::database_operation(format!("创建申请记录失败: {e}")))?;

        txn.commit().await?;

        Ok(ApplicantDetail {
            applicant: applicant.into_applicant(),
            user: user.into_user(),
        })
    }

    pub async fn get_applicant_by_id_impl(&self, id: i64) -> Result<Option<ApplicantDetail>> {
        find_detail_in(&self.db, id).await
    }

    pub async fn get_applicant_by_user_id_impl(&self, user_id: i64) -> Result<Option<Applicant>> {
        let result = Applicants::find()
            .filter(applicants::Column::UserId.eq(user_id))
            .one(&self.db)
            .await
            .map_err(|e| SchoolSystemError::database_operation(format!("查询申请失败: {e}")))?;

        Ok(result.map(|m| m.into_applicant()))
    }

    pub async fn list_applicants_with_pagination_impl(
        &self,
        query: ApplicantListQuery,
    ) -> Result<ApplicantListResponse> {
        let page = query.page.unwrap_or(1).max(1) as u64;
        let size = query.size.unwrap_or(10).clamp(1, 100) as u64;

        let mut select = Applicants::find().find_also_related(Users);

        if let Some(status) = query.status {
            select = select.filter(applicants::Column::Status.eq(status.as_str()));
        }

        if let Some(ref search) = query.search
            && !search.trim().is_empty()
        {
            let escaped = escape_like_pattern(search.trim());
            select = select.filter(
                Condition::any()
                    .add(applicants::Column::ApplicantNumber.contains(&escaped))
                    .add(applicants::Column::ReferenceCode.contains(&escaped))
                    .add(users::Column::Email.contains(&escaped))
                    .add(users::Column::FirstName.contains(&escaped))
                    .add(users::Column::LastName.contains(&escaped)),
            );
        }

        let paginator = select
            .order_by_desc(applicants::Column::CreatedAt)
            .paginate(&self.db, size);

        let total = paginator.num_items().await.map_err(|e| {
            SchoolSystemError::database_operation(format!("查询申请总数失败: {e}"))
        })?;
        let pages = paginator.num_pages().await.map_err(|e| {
            SchoolSystemError::database_operation(format!("查询申请页数失败: {e}"))
        })?;
        let rows = paginator.fetch_page(page - 1).await.map_err(|e| {
            SchoolSystemError::database_operation(format!("查询申请列表失败: {e}"))
        })?;

        let items = rows
            .into_iter()
            .filter_map(|(applicant, user)| {
                user.map(|u| ApplicantDetail {
                    applicant: applicant.into_applicant(),
                    user: u.into_user(),
                })
            })
            .collect();

        Ok(ApplicantListResponse {
            items,
            pagination: PaginationInfo::new(page, size, total, pages),
        })
    }

    /// 审核中 / 候补，仅允许从可审核状态转入
    pub async fn update_applicant_review_status_impl(
        &self,
        id: i64,
        status: ApplicantStatus,
    ) -> Result<Applicant> {
        let now = chrono::Utc::now().timestamp();
        let reviewable = [
            ApplicantStatus::Pending.as_str(),
            ApplicantStatus::UnderReview.as_str(),
            ApplicantStatus::Waitlisted.as_str(),
        ];

        let result = Applicants::update_many()
            .col_expr(applicants::Column::Status, Expr::value(status.as_str()))
            .col_expr(applicants::Column::UpdatedAt, Expr::value(now))
            .filter(applicants::Column::Id.eq(id))
            .filter(applicants::Column::Status.is_in(reviewable))
            .exec(&self.db)
            .await
            .map_err(|e| SchoolSystemError::database_operation(format!("更新申请状态失败: {e}")))?;

        if result.rows_affected == 0 {
            return Err(status_miss_error(&self.db, id, "review").await?);
        }

        let model = Applicants::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| SchoolSystemError::not_found(format!("申请不存在: {id}")))?;

        Ok(model.into_applicant())
    }

    /// 录取：角色转为学生、生成学号、建学生资料、标记已录取
    ///
    /// 全部步骤在同一事务中，任一步失败整体回滚。
    pub async fn approve_applicant_impl(
        &self,
        id: i64,
        parent_id: i64,
        section_id: i64,
    ) -> Result<ApprovalOutcome> {
        let now = chrono::Utc::now().timestamp();
        let txn = self.db.begin().await?;

        let applicant = Applicants::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| SchoolSystemError::not_found(format!("申请不存在: {id}")))?;

        if applicant.status == ApplicantStatus::Approved.as_str() {
            return Err(SchoolSystemError::conflict("Applicant already approved"));
        }

        Parents::find_by_id(parent_id)
            .one(&txn)
            .await?
            .ok_or_else(|| SchoolSystemError::not_found(format!("家长不存在: {parent_id}")))?;

        let section = Sections::find_by_id(section_id)
            .one(&txn)
            .await?
            .ok_or_else(|| SchoolSystemError::not_found(format!("分区不存在: {section_id}")))?;

        let user = Users::find_by_id(applicant.user_id)
            .one(&txn)
            .await?
            .ok_or_else(|| {
                SchoolSystemError::not_found(format!("申请人账号不存在: {}", applicant.user_id))
            })?;

        let mut user: UserActiveModel = user.into();
        user.role = Set(UserRole::Student.to_string());
        user.updated_at = Set(now);
        let user = user.update(&txn).await?;

        // 管理员手动改过角色时学生资料可能已存在
        let existing = Students::find()
            .filter(students::Column::UserId.eq(user.id))
            .one(&txn)
            .await?;

        let student = match existing {
            Some(model) => {
                let mut model: StudentActiveModel = model.into();
                model.parent_id = Set(Some(parent_id));
                model.section_id = Set(Some(section_id));
                model.update(&txn).await?
            }
            None => {
                let student_number =
                    next_identifier_in(&txn, IdentifierKind::Student, current_year()).await?;
                StudentActiveModel {
                    user_id: Set(user.id),
                    parent_id: Set(Some(parent_id)),
                    section_id: Set(Some(section_id)),
                    student_number: Set(student_number),
                    created_at: Set(now),
                    ..Default::default()
                }
                .insert(&txn)
                .await
                .map_err(|e| {
                    SchoolSystemError::database_operation(format!("创建学生资料失败: {e}"))
                })?
            }
        };

        mark_approved_in(&txn, applicant.id, now).await?;

        txn.commit().await?;

        Ok(ApprovalOutcome {
            student: student.into_student(),
            user: user.into_user(),
            section: section.into_section(),
        })
    }

    /// 拒绝：仅 pending 状态可拒绝
    pub async fn reject_applicant_impl(&self, id: i64, reason: &str) -> Result<ApplicantDetail> {
        let now = chrono::Utc::now().timestamp();

        let result = Applicants::update_many()
            .col_expr(
                applicants::Column::Status,
                Expr::value(ApplicantStatus::Rejected.as_str()),
            )
            .col_expr(applicants::Column::RejectionReason, Expr::value(reason))
            .col_expr(applicants::Column::ReviewedAt, Expr::value(now))
            .col_expr(applicants::Column::UpdatedAt, Expr::value(now))
            .filter(applicants::Column::Id.eq(id))
            .filter(applicants::Column::Status.eq(ApplicantStatus::Pending.as_str()))
            .exec(&self.db)
            .await
            .map_err(|e| SchoolSystemError::database_operation(format!("拒绝申请失败: {e}")))?;

        if result.rows_affected == 0 {
            return Err(status_miss_error(&self.db, id, "reject").await?);
        }

        find_detail_in(&self.db, id)
            .await?
            .ok_or_else(|| SchoolSystemError::not_found(format!("申请不存在: {id}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::sea_orm_storage::test_support::{
        memory_storage, new_application, seed_parent, seed_section,
    };

    #[actix_web::test]
    async fn test_signup_creates_pending_applicant() {
        let storage = memory_storage().await;
        let detail = storage
            .create_application_impl(new_application("ana@mail.test", "REF-AAAA0001"))
            .await
            .unwrap();

        assert_eq!(detail.user.role, UserRole::Applicant);
        assert_eq!(detail.applicant.status, ApplicantStatus::Pending);
        assert!(detail.applicant.applicant_number.starts_with("APP-"));
        assert!(detail.applicant.applicant_number.ends_with("-0001"));
    }

    #[actix_web::test]
    async fn test_signup_duplicate_email_is_validation_error() {
        let storage = memory_storage().await;
        storage
            .create_application_impl(new_application("dup@mail.test", "REF-AAAA0001"))
            .await
            .unwrap();
        let err = storage
            .create_application_impl(new_application("dup@mail.test", "REF-AAAA0002"))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 400);
    }

    #[actix_web::test]
    async fn test_approve_promotes_user_and_creates_student() {
        let storage = memory_storage().await;
        let parent = seed_parent(&storage, "mom@mail.test").await;
        let section = seed_section(&storage, "Grade 7", "Rizal").await;
        let detail = storage
            .create_application_impl(new_application("kid@mail.test", "REF-AAAA0001"))
            .await
            .unwrap();

        let outcome = storage
            .approve_applicant_impl(detail.applicant.id, parent.id, section.id)
            .await
            .unwrap();
        assert_eq!(outcome.user.role, UserRole::Student);
        assert_eq!(outcome.student.parent_id, Some(parent.id));
        assert_eq!(outcome.student.section_id, Some(section.id));
        assert!(outcome.student.student_number.starts_with("BFPS-"));
        assert_eq!(outcome.section.display_name(), "Grade 7 - Rizal");

        let applicant = storage
            .get_applicant_by_id_impl(detail.applicant.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(applicant.applicant.status, ApplicantStatus::Approved);
        assert!(applicant.applicant.reviewed_at.is_some());
    }

    #[actix_web::test]
    async fn test_approve_twice_conflicts() {
        let storage = memory_storage().await;
        let parent = seed_parent(&storage, "mom@mail.test").await;
        let section = seed_section(&storage, "Grade 7", "Rizal").await;
        let detail = storage
            .create_application_impl(new_application("kid@mail.test", "REF-AAAA0001"))
            .await
            .unwrap();

        storage
            .approve_applicant_impl(detail.applicant.id, parent.id, section.id)
            .await
            .unwrap();
        let err = storage
            .approve_applicant_impl(detail.applicant.id, parent.id, section.id)
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 409);
    }

    #[actix_web::test]
    async fn test_mark_approved_only_once() {
        let storage = memory_storage().await;
        let detail = storage
            .create_application_impl(new_application("kid@mail.test", "REF-AAAA0001"))
            .await
            .unwrap();

        mark_approved_in(&storage.db, detail.applicant.id, 100)
            .await
            .unwrap();
        let err = mark_approved_in(&storage.db, detail.applicant.id, 200)
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 409);

        let applicant = storage
            .get_applicant_by_user_id_impl(detail.user.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(applicant.status, ApplicantStatus::Approved);
        assert_eq!(applicant.reviewed_at.map(|t| t.timestamp()), Some(100));
    }

    #[actix_web::test]
    async fn test_approve_with_missing_section_rolls_back() {
        let storage = memory_storage().await;
        let parent = seed_parent(&storage, "mom@mail.test").await;
        let detail = storage
            .create_application_impl(new_application("kid@mail.test", "REF-AAAA0001"))
            .await
            .unwrap();

        let err = storage
            .approve_applicant_impl(detail.applicant.id, parent.id, 999)
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 404);

        // 用户角色、申请状态、学生资料都未改变
        let user = storage
            .get_user_by_id_impl(detail.user.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(user.role, UserRole::Applicant);
        assert!(
            storage
                .get_student_by_user_id_impl(detail.user.id)
                .await
                .unwrap()
                .is_none()
        );
        let applicant = storage
            .get_applicant_by_user_id_impl(detail.user.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(applicant.status, ApplicantStatus::Pending);
    }

    #[actix_web::test]
    async fn test_reject_only_from_pending() {
        let storage = memory_storage().await;
        let detail = storage
            .create_application_impl(new_application("kid@mail.test", "REF-AAAA0001"))
            .await
            .unwrap();

        let rejected = storage
            .reject_applicant_impl(detail.applicant.id, "Incomplete documents")
            .await
            .unwrap();
        assert_eq!(rejected.applicant.status, ApplicantStatus::Rejected);
        assert_eq!(
            rejected.applicant.rejection_reason.as_deref(),
            Some("Incomplete documents")
        );

        let err = storage
            .reject_applicant_impl(detail.applicant.id, "again")
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 409);
        assert!(err.message().contains("rejected"));

        let err = storage.reject_applicant_impl(404, "x").await.unwrap_err();
        assert_eq!(err.status_code(), 404);
    }

    #[actix_web::test]
    async fn test_review_status_transitions() {
        let storage = memory_storage().await;
        let detail = storage
            .create_application_impl(new_application("kid@mail.test", "REF-AAAA0001"))
            .await
            .unwrap();
        let id = detail.applicant.id;

        let applicant = storage
            .update_applicant_review_status_impl(id, ApplicantStatus::UnderReview)
            .await
            .unwrap();
        assert_eq!(applicant.status, ApplicantStatus::UnderReview);

        let applicant = storage
            .update_applicant_review_status_impl(id, ApplicantStatus::Waitlisted)
            .await
            .unwrap();
        assert_eq!(applicant.status, ApplicantStatus::Waitlisted);

        // 被拒绝后不能再转入审核
        storage
            .update_applicant_review_status_impl(id, ApplicantStatus::Pending)
            .await
            .unwrap();
        storage.reject_applicant_impl(id, "full").await.unwrap();
        let err = storage
            .update_applicant_review_status_impl(id, ApplicantStatus::UnderReview)
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 409);
    }

    #[actix_web::test]
    async fn test_list_applicants_filters_status() {
        let storage = memory_storage().await;
        let first = storage
            .create_application_impl(new_application("a@mail.test", "REF-AAAA0001"))
            .await
            .unwrap();
        storage
            .create_application_impl(new_application("b@mail.test", "REF-AAAA0002"))
            .await
            .unwrap();
        storage
            .reject_applicant_impl(first.applicant.id, "no slot")
            .await
            .unwrap();

        let pending = storage
            .list_applicants_with_pagination_impl(ApplicantListQuery {
                status: Some(ApplicantStatus::Pending),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(pending.pagination.total, 1);
        assert_eq!(pending.items[0].user.email, "b@mail.test");
    }
}
