//! 能力检查：课程归属、分区成员、家长关系
//!
//! 角色白名单由路由层中间件保证，这里只处理“这个用户能不能碰这条记录”。
//! 失败时直接给出可返回的 `HttpResponse`。

use actix_web::{HttpRequest, HttpResponse};
use std::sync::Arc;

use crate::middlewares::RequireJWT;
use crate::models::{
    ApiResponse, ErrorCode,
    classes::entities::Class,
    profiles::entities::{Parent, Student, Teacher},
    users::entities::{User, UserRole},
};
use crate::storage::Storage;

use super::{error_response, forbidden, not_found};

pub(crate) type Access<T> = std::result::Result<T, HttpResponse>;

pub(crate) fn current_user(request: &HttpRequest) -> Access<User> {
    RequireJWT::extract_user_claims(request).ok_or_else(|| {
        HttpResponse::Unauthorized().json(ApiResponse::error_empty(
            ErrorCode::Unauthorized,
            "Unauthorized access, please login",
        ))
    })
}

pub(crate) async fn teacher_profile(storage: &Arc<dyn Storage>, user: &User) -> Access<Teacher> {
    match storage.get_teacher_by_user_id(user.id).await {
        Ok(Some(teacher)) => Ok(teacher),
        Ok(None) => Err(not_found(ErrorCode::TeacherNotFound, "Teacher profile not found")),
        Err(e) => Err(error_response(&e, ErrorCode::TeacherNotFound)),
    }
}

pub(crate) async fn student_profile(storage: &Arc<dyn Storage>, user: &User) -> Access<Student> {
    match storage.get_student_by_user_id(user.id).await {
        Ok(Some(student)) => Ok(student),
        Ok(None) => Err(not_found(ErrorCode::StudentNotFound, "Student profile not found")),
        Err(e) => Err(error_response(&e, ErrorCode::StudentNotFound)),
    }
}

pub(crate) async fn parent_profile(storage: &Arc<dyn Storage>, user: &User) -> Access<Parent> {
    match storage.get_parent_by_user_id(user.id).await {
        Ok(Some(parent)) => Ok(parent),
        Ok(None) => Err(not_found(ErrorCode::ParentNotFound, "Parent profile not found")),
        Err(e) => Err(error_response(&e, ErrorCode::ParentNotFound)),
    }
}

pub(crate) async fn load_class(storage: &Arc<dyn Storage>, class_id: i64) -> Access<Class> {
    match storage.get_class_by_id(class_id).await {
        Ok(Some(class)) => Ok(class),
        Ok(None) => Err(not_found(ErrorCode::ClassNotFound, "Class not found")),
        Err(e) => Err(error_response(&e, ErrorCode::ClassNotFound)),
    }
}

/// 管理员或任课教师
pub(crate) async fn class_for_staff(
    storage: &Arc<dyn Storage>,
    user: &User,
    class_id: i64,
) -> Access<Class> {
    let class = load_class(storage, class_id).await?;

    match user.role {
        UserRole::Admin => Ok(class),
        UserRole::Teacher => {
            let teacher = teacher_profile(storage, user).await?;
            if class.teacher_id == teacher.id {
                Ok(class)
            } else {
                Err(forbidden(
                    ErrorCode::ClassPermissionDenied,
                    "You are not the teacher of this class",
                ))
            }
        }
        _ => Err(forbidden(
            ErrorCode::ClassPermissionDenied,
            "Only the class teacher can manage this class",
        )),
    }
}

/// 管理员、任课教师、分区内学生、孩子在该分区的家长
pub(crate) async fn class_for_member(
    storage: &Arc<dyn Storage>,
    user: &User,
    class_id: i64,
) -> Access<Class> {
    let class = load_class(storage, class_id).await?;

    let allowed = match user.role {
        UserRole::Admin => true,
        UserRole::Teacher => teacher_profile(storage, user).await?.id == class.teacher_id,
        UserRole::Student => {
            student_profile(storage, user).await?.section_id == Some(class.section_id)
        }
        UserRole::Parent => {
            let parent = parent_profile(storage, user).await?;
            match storage.list_children(parent.id).await {
                Ok(children) => children
                    .iter()
                    .any(|child| child.section_id == Some(class.section_id)),
                Err(e) => return Err(error_response(&e, ErrorCode::ClassPermissionDenied)),
            }
        }
        UserRole::Applicant => false,
    };

    if allowed {
        Ok(class)
    } else {
        Err(forbidden(
            ErrorCode::ClassPermissionDenied,
            "You are not a member of this class",
        ))
    }
}

/// 家长只能查看自己的孩子；不属于自己的孩子按不存在处理
pub(crate) async fn child_of_parent(
    storage: &Arc<dyn Storage>,
    parent: &Parent,
    student_id: i64,
) -> Access<Student> {
    match storage.get_student_by_id(student_id).await {
        Ok(Some(student)) if student.parent_id == Some(parent.id) => Ok(student),
        Ok(_) => Err(not_found(ErrorCode::StudentNotFound, "Student not found")),
        Err(e) => Err(error_response(&e, ErrorCode::StudentNotFound)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::sea_orm_storage::test_support::*;
    use actix_web::http::StatusCode;

    #[actix_web::test]
    async fn test_class_for_staff_checks_ownership() {
        let storage = memory_storage().await;
        let section = seed_section(&storage, "Grade 7", "Rizal").await;
        let (owner, owner_user) = seed_teacher(&storage, "owner@school.test").await;
        let (_, other_user) = seed_teacher(&storage, "other@school.test").await;
        let class = seed_class(&storage, section.id, owner.id, "Science").await;
        let admin = storage
            .create_user(new_user("admin@school.test", UserRole::Admin), None)
            .await
            .unwrap();

        let storage: Arc<dyn Storage> = Arc::new(storage);
        assert!(class_for_staff(&storage, &owner_user, class.id).await.is_ok());
        assert!(class_for_staff(&storage, &admin, class.id).await.is_ok());

        let denied = class_for_staff(&storage, &other_user, class.id)
            .await
            .unwrap_err();
        assert_eq!(denied.status(), StatusCode::FORBIDDEN);

        let missing = class_for_staff(&storage, &admin, 9999).await.unwrap_err();
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_class_for_member_follows_section() {
        let storage = memory_storage().await;
        let rizal = seed_section(&storage, "Grade 7", "Rizal").await;
        let bonifacio = seed_section(&storage, "Grade 7", "Bonifacio").await;
        let (teacher, _) = seed_teacher(&storage, "t@school.test").await;
        let class = seed_class(&storage, rizal.id, teacher.id, "Math").await;
        let parent = seed_parent(&storage, "p@school.test").await;
        seed_student(&storage, "in@school.test", Some(parent.id), Some(rizal.id)).await;
        seed_student(&storage, "out@school.test", None, Some(bonifacio.id)).await;

        let inside = storage.get_user_by_email("in@school.test").await.unwrap().unwrap();
        let outside = storage.get_user_by_email("out@school.test").await.unwrap().unwrap();
        let parent_user = storage.get_user_by_email("p@school.test").await.unwrap().unwrap();

        let storage: Arc<dyn Storage> = Arc::new(storage);
        assert!(class_for_member(&storage, &inside, class.id).await.is_ok());
        assert!(class_for_member(&storage, &parent_user, class.id).await.is_ok());
        let denied = class_for_member(&storage, &outside, class.id)
            .await
            .unwrap_err();
        assert_eq!(denied.status(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn test_child_of_parent_hides_other_children() {
        let storage = memory_storage().await;
        let mine = seed_parent(&storage, "mine@school.test").await;
        let theirs = seed_parent(&storage, "theirs@school.test").await;
        let child = seed_student(&storage, "kid@school.test", Some(theirs.id), None).await;

        let storage: Arc<dyn Storage> = Arc::new(storage);
        let err = child_of_parent(&storage, &mine, child.id).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert!(child_of_parent(&storage, &theirs, child.id).await.is_ok());
    }
}
