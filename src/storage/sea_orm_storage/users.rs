//! 用户与角色资料存储操作

use std::collections::HashMap;

use super::SeaOrmStorage;
use super::id_counters::{current_year, next_identifier_in};
use crate::entity::prelude::*;
use crate::entity::{admins, applicants, parents, students, teachers, users};
use crate::errors::{Result, SchoolSystemError};
use crate::models::{
    PaginationInfo,
    profiles::entities::{IdentifierKind, Parent, Student, StudentSummary, Teacher},
    users::{
        entities::{User, UserRole},
        requests::{NewUser, UserListQuery, UserUpdate},
        responses::UserListResponse,
    },
};
use crate::utils::escape_like_pattern;
use sea_orm::sea_query::IntoCondition;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};

/// 按角色补建资料行，已存在则跳过
pub(crate) async fn ensure_profile_in<C: ConnectionTrait>(
    conn: &C,
    user_id: i64,
    role: UserRole,
    phone: Option<String>,
) -> Result<()> {
    let now = chrono::Utc::now().timestamp();

    match role {
        UserRole::Admin => {
            let exists = Admins::find()
                .filter(admins::Column::UserId.eq(user_id))
                .one(conn)
                .await?
                .is_some();
            if !exists {
                AdminActiveModel {
                    user_id: Set(user_id),
                    created_at: Set(now),
                    ..Default::default()
                }
                .insert(conn)
                .await?;
            }
        }
        UserRole::Teacher => {
            let exists = Teachers::find()
                .filter(teachers::Column::UserId.eq(user_id))
                .one(conn)
                .await?
                .is_some();
            if !exists {
                let number = next_identifier_in(conn, IdentifierKind::Teacher, current_year()).await?;
                TeacherActiveModel {
                    user_id: Set(user_id),
                    employee_number: Set(number),
                    created_at: Set(now),
                    ..Default::default()
                }
                .insert(conn)
                .await?;
            }
        }
        UserRole::Parent => {
            let exists = Parents::find()
                .filter(parents::Column::UserId.eq(user_id))
                .one(conn)
                .await?
                .is_some();
            if !exists {
                let number = next_identifier_in(conn, IdentifierKind::Parent, current_year()).await?;
                ParentActiveModel {
                    user_id: Set(user_id),
                    parent_number: Set(number),
                    phone: Set(phone),
                    created_at: Set(now),
                    ..Default::default()
                }
                .insert(conn)
                .await?;
            }
        }
        UserRole::Student => {
            let exists = Students::find()
                .filter(students::Column::UserId.eq(user_id))
                .one(conn)
                .await?
                .is_some();
            if !exists {
                let number =
                    next_identifier_in(conn, IdentifierKind::Student, current_year()).await?;
                StudentActiveModel {
                    user_id: Set(user_id),
                    parent_id: Set(None),
                    section_id: Set(None),
                    student_number: Set(number),
                    created_at: Set(now),
                    ..Default::default()
                }
                .insert(conn)
                .await?;
            }
        }
        // 申请人资料只在报名时创建
        UserRole::Applicant => {}
    }

    Ok(())
}

impl SeaOrmStorage {
    /// 创建用户及其角色资料
    pub async fn create_user_impl(&self, user: NewUser, phone: Option<String>) -> Result<User> {
        let now = chrono::Utc::now().timestamp();
        let role = user.role;

        let txn = self.db.begin().await?;

        let model = UserActiveModel {
            email: Set(user.email),
            password_hash: Set(user.password_hash),
            role: Set(user.role.to_string()),
            status: Set(user.status.to_string()),
            first_name: Set(user.first_name),
            last_name: Set(user.last_name),
            last_login: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(|e| SchoolSystemError::database_operation(format!("创建用户失败: {e}")))?;

        ensure_profile_in(&txn, model.id, role, phone).await?;
        txn.commit().await?;

        Ok(model.into_user())
    }

    pub async fn get_user_by_id_impl(&self, id: i64) -> Result<Option<User>> {
        let result = Users::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| SchoolSystemError::database_operation(format!("查询用户失败: {e}")))?;

        Ok(result.map(|m| m.into_user()))
    }

    pub async fn get_user_by_email_impl(&self, email: &str) -> Result<Option<User>> {
        let result = Users::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(|e| SchoolSystemError::database_operation(format!("查询用户失败: {e}")))?;

        Ok(result.map(|m| m.into_user()))
    }

    /// 分页列出用户
    pub async fn list_users_with_pagination_impl(
        &self,
        query: UserListQuery,
    ) -> Result<UserListResponse> {
        let page = query.page.unwrap_or(1).max(1) as u64;
        let size = query.size.unwrap_or(10).clamp(1, 100) as u64;

        let mut select = Users::find();

        if let Some(ref search) = query.search
            && !search.trim().is_empty()
        {
            let escaped = escape_like_pattern(search.trim());
            select = select.filter(
                Condition::any()
                    .add(users::Column::Email.contains(&escaped))
                    .add(users::Column::FirstName.contains(&escaped))
                    .add(users::Column::LastName.contains(&escaped)),
            );
        }

        if let Some(role) = query.role {
            select = select.filter(users::Column::Role.eq(role.as_str()));
        }

        if let Some(status) = query.status {
            select = select.filter(users::Column::Status.eq(status.as_str()));
        }

        select = select.order_by_desc(users::Column::CreatedAt);

        let paginator = select.paginate(&self.db, size);
        let total = paginator.num_items().await.map_err(|e| {
            SchoolSystemError::database_operation(format!("查询用户总数失败: {e}"))
        })?;
        let pages = paginator.num_pages().await.map_err(|e| {
            SchoolSystemError::database_operation(format!("查询用户页数失败: {e}"))
        })?;
        let users = paginator.fetch_page(page - 1).await.map_err(|e| {
            SchoolSystemError::database_operation(format!("查询用户列表失败: {e}"))
        })?;

        Ok(UserListResponse {
            items: users.into_iter().map(|m| m.into_user()).collect(),
            pagination: PaginationInfo::new(page, size, total, pages),
        })
    }

    pub async fn update_last_login_impl(&self, id: i64) -> Result<bool> {
        let now = chrono::Utc::now().timestamp();

        let result = Users::update_many()
            .col_expr(users::Column::LastLogin, sea_orm::sea_query::Expr::value(now))
            .filter(users::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(|e| {
                SchoolSystemError::database_operation(format!("更新最后登录时间失败: {e}"))
            })?;

        Ok(result.rows_affected > 0)
    }

    /// 更新用户，角色变化时在同一事务内补建资料
    pub async fn update_user_impl(&self, id: i64, update: UserUpdate) -> Result<Option<User>> {
        let txn = self.db.begin().await?;

        let Some(existing) = Users::find_by_id(id).one(&txn).await? else {
            return Ok(None);
        };

        let now = chrono::Utc::now().timestamp();
        let role_changed = update.role.is_some_and(|r| r.as_str() != existing.role);
        let mut model: UserActiveModel = existing.into();
        model.updated_at = Set(now);

        if let Some(email) = update.email {
            model.email = Set(email);
        }
        if let Some(password_hash) = update.password_hash {
            model.password_hash = Set(password_hash);
        }
        if let Some(role) = update.role {
            model.role = Set(role.to_string());
        }
        if let Some(status) = update.status {
            model.status = Set(status.to_string());
        }
        if let Some(first_name) = update.first_name {
            model.first_name = Set(first_name);
        }
        if let Some(last_name) = update.last_name {
            model.last_name = Set(last_name);
        }

        let updated = model
            .update(&txn)
            .await
            .map_err(|e| SchoolSystemError::database_operation(format!("更新用户失败: {e}")))?;

        if role_changed && let Some(role) = update.role {
            ensure_profile_in(&txn, id, role, None).await?;
        }

        txn.commit().await?;
        Ok(Some(updated.into_user()))
    }

    pub async fn delete_user_impl(&self, id: i64) -> Result<bool> {
        let result = Users::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| SchoolSystemError::database_operation(format!("删除用户失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }

    pub async fn count_users_impl(&self) -> Result<u64> {
        let count = Users::find().count(&self.db).await.map_err(|e| {
            SchoolSystemError::database_operation(format!("统计用户数量失败: {e}"))
        })?;

        Ok(count)
    }

    /// 角色编号：学号 / 工号 / 家长编号 / 申请编号
    pub async fn get_profile_number_impl(&self, user: &User) -> Result<Option<String>> {
        let number = match user.role {
            UserRole::Admin => None,
            UserRole::Teacher => self
                .get_teacher_by_user_id_impl(user.id)
                .await?
                .map(|t| t.employee_number),
            UserRole::Parent => self
                .get_parent_by_user_id_impl(user.id)
                .await?
                .map(|p| p.parent_number),
            UserRole::Student => self
                .get_student_by_user_id_impl(user.id)
                .await?
                .map(|s| s.student_number),
            UserRole::Applicant => Applicants::find()
                .filter(applicants::Column::UserId.eq(user.id))
                .one(&self.db)
                .await?
                .map(|a| a.applicant_number),
        };

        Ok(number)
    }

    pub async fn get_teacher_by_id_impl(&self, id: i64) -> Result<Option<Teacher>> {
        let result = Teachers::find_by_id(id).one(&self.db).await?;
        Ok(result.map(|m| m.into_teacher()))
    }

    pub async fn get_teacher_by_user_id_impl(&self, user_id: i64) -> Result<Option<Teacher>> {
        let result = Teachers::find()
            .filter(teachers::Column::UserId.eq(user_id))
            .one(&self.db)
            .await?;
        Ok(result.map(|m| m.into_teacher()))
    }

    pub async fn get_parent_by_id_impl(&self, id: i64) -> Result<Option<Parent>> {
        let result = Parents::find_by_id(id).one(&self.db).await?;
        Ok(result.map(|m| m.into_parent()))
    }

    pub async fn get_parent_by_user_id_impl(&self, user_id: i64) -> Result<Option<Parent>> {
        let result = Parents::find()
            .filter(parents::Column::UserId.eq(user_id))
            .one(&self.db)
            .await?;
        Ok(result.map(|m| m.into_parent()))
    }

    pub async fn get_student_by_id_impl(&self, id: i64) -> Result<Option<Student>> {
        let result = Students::find_by_id(id).one(&self.db).await?;
        Ok(result.map(|m| m.into_student()))
    }

    pub async fn get_student_by_user_id_impl(&self, user_id: i64) -> Result<Option<Student>> {
        let result = Students::find()
            .filter(students::Column::UserId.eq(user_id))
            .one(&self.db)
            .await?;
        Ok(result.map(|m| m.into_student()))
    }

    pub async fn get_student_summary_impl(&self, student_id: i64) -> Result<Option<StudentSummary>> {
        let result = Students::find_by_id(student_id)
            .find_also_related(Users)
            .one(&self.db)
            .await?;

        Ok(result.and_then(|(student, user)| user.map(|u| student.into_summary(u))))
    }

    pub async fn list_children_impl(&self, parent_id: i64) -> Result<Vec<StudentSummary>> {
        self.list_student_summaries(students::Column::ParentId.eq(parent_id))
            .await
    }

    pub async fn list_section_students_impl(&self, section_id: i64) -> Result<Vec<StudentSummary>> {
        self.list_student_summaries(students::Column::SectionId.eq(section_id))
            .await
    }

    /// 学生 id → (学号, 姓名)，用于提交 / 成绩 / 考勤列表
    pub(crate) async fn student_labels(
        &self,
        student_ids: Vec<i64>,
    ) -> Result<HashMap<i64, (String, String)>> {
        if student_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = Students::find()
            .filter(students::Column::Id.is_in(student_ids))
            .find_also_related(Users)
            .all(&self.db)
            .await
            .map_err(|e| SchoolSystemError::database_operation(format!("查询学生信息失败: {e}")))?;

        Ok(rows
            .into_iter()
            .map(|(student, user)| {
                let name = user
                    .map(|u| format!("{} {}", u.first_name, u.last_name))
                    .unwrap_or_default();
                (student.id, (student.student_number, name))
            })
            .collect())
    }

    /// 学生 + 用户名单，按学号排序
    pub(crate) async fn list_student_summaries(
        &self,
        condition: impl IntoCondition + Send,
    ) -> Result<Vec<StudentSummary>> {
        let rows = Students::find()
            .filter(condition)
            .find_also_related(Users)
            .order_by_asc(students::Column::StudentNumber)
            .all(&self.db)
            .await
            .map_err(|e| SchoolSystemError::database_operation(format!("查询学生名单失败: {e}")))?;

        Ok(rows
            .into_iter()
            .filter_map(|(student, user)| user.map(|u| student.into_summary(u)))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::users::entities::UserStatus;
    use crate::storage::sea_orm_storage::test_support::{memory_storage, new_user};

    #[actix_web::test]
    async fn test_create_teacher_provisions_employee_number() {
        let storage = memory_storage().await;
        let user = storage
            .create_user_impl(new_user("t1@school.test", UserRole::Teacher), None)
            .await
            .unwrap();

        let teacher = storage
            .get_teacher_by_user_id_impl(user.id)
            .await
            .unwrap()
            .expect("teacher profile");
        assert!(teacher.employee_number.starts_with("EMP-"));
        assert!(teacher.employee_number.ends_with("-0001"));

        let number = storage.get_profile_number_impl(&user).await.unwrap();
        assert_eq!(number, Some(teacher.employee_number));
    }

    #[actix_web::test]
    async fn test_create_parent_keeps_phone() {
        let storage = memory_storage().await;
        let user = storage
            .create_user_impl(
                new_user("p1@school.test", UserRole::Parent),
                Some("0917-000-0000".into()),
            )
            .await
            .unwrap();

        let parent = storage
            .get_parent_by_user_id_impl(user.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(parent.phone.as_deref(), Some("0917-000-0000"));
        assert!(parent.parent_number.starts_with("P-"));
    }

    #[actix_web::test]
    async fn test_role_change_creates_missing_profile_once() {
        let storage = memory_storage().await;
        let user = storage
            .create_user_impl(new_user("x@school.test", UserRole::Parent), None)
            .await
            .unwrap();

        let update = UserUpdate {
            role: Some(UserRole::Teacher),
            ..Default::default()
        };
        let updated = storage
            .update_user_impl(user.id, update)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.role, UserRole::Teacher);
        assert!(
            storage
                .get_teacher_by_user_id_impl(user.id)
                .await
                .unwrap()
                .is_some()
        );

        // 再次设置相同角色不会重复生成编号
        let again = UserUpdate {
            role: Some(UserRole::Teacher),
            status: Some(UserStatus::Suspended),
            ..Default::default()
        };
        storage.update_user_impl(user.id, again).await.unwrap();
        let second = storage
            .create_user_impl(new_user("y@school.test", UserRole::Teacher), None)
            .await
            .unwrap();
        let teacher = storage
            .get_teacher_by_user_id_impl(second.id)
            .await
            .unwrap()
            .unwrap();
        assert!(teacher.employee_number.ends_with("-0002"));
    }

    #[actix_web::test]
    async fn test_update_missing_user_returns_none() {
        let storage = memory_storage().await;
        let result = storage
            .update_user_impl(404, UserUpdate::default())
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[actix_web::test]
    async fn test_list_users_filters_by_role_and_search() {
        let storage = memory_storage().await;
        storage
            .create_user_impl(new_user("alice@school.test", UserRole::Teacher), None)
            .await
            .unwrap();
        storage
            .create_user_impl(new_user("bob@school.test", UserRole::Parent), None)
            .await
            .unwrap();

        let result = storage
            .list_users_with_pagination_impl(UserListQuery {
                role: Some(UserRole::Teacher),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(result.pagination.total, 1);
        assert_eq!(result.items[0].email, "alice@school.test");

        let result = storage
            .list_users_with_pagination_impl(UserListQuery {
                search: Some("bob".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(result.items.len(), 1);
    }
}
