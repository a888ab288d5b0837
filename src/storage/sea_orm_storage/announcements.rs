//! 公告存储操作

use super::SeaOrmStorage;
use crate::entity::announcements::{ActiveModel, Column, Entity as Announcements};
use crate::errors::{Result, SchoolSystemError};
use crate::models::announcements::entities::Announcement;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, QueryFilter, QueryOrder, Set,
};

impl SeaOrmStorage {
    pub async fn create_announcement_impl(
        &self,
        class_id: Option<i64>,
        author_id: i64,
        title: &str,
        content: &str,
    ) -> Result<Announcement> {
        let model = ActiveModel {
            class_id: Set(class_id),
            author_id: Set(author_id),
            title: Set(title.to_string()),
            content: Set(content.to_string()),
            created_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(|e| SchoolSystemError::database_operation(format!("创建公告失败: {e}")))?;

        Ok(model.into_announcement())
    }

    pub async fn get_announcement_by_id_impl(&self, id: i64) -> Result<Option<Announcement>> {
        let result = Announcements::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| SchoolSystemError::database_operation(format!("查询公告失败: {e}")))?;

        Ok(result.map(|m| m.into_announcement()))
    }

    /// 全校公告，外加指定课程的公告
    pub async fn list_announcements_impl(&self, class_id: Option<i64>) -> Result<Vec<Announcement>> {
        let mut scope = Condition::any().add(Column::ClassId.is_null());
        if let Some(class_id) = class_id {
            scope = scope.add(Column::ClassId.eq(class_id));
        }

        let rows = Announcements::find()
            .filter(scope)
            .order_by_desc(Column::CreatedAt)
            .order_by_desc(Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| SchoolSystemError::database_operation(format!("查询公告列表失败: {e}")))?;

        Ok(rows.into_iter().map(|m| m.into_announcement()).collect())
    }

    pub async fn delete_announcement_impl(&self, id: i64) -> Result<bool> {
        let result = Announcements::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| SchoolSystemError::database_operation(format!("删除公告失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }
}

#[cfg(test)]
mod tests {
    use crate::storage::sea_orm_storage::test_support::{
        memory_storage, seed_class, seed_section, seed_teacher,
    };

    #[actix_web::test]
    async fn test_listing_merges_school_wide_and_class_scope() {
        let storage = memory_storage().await;
        let section = seed_section(&storage, "Grade 7", "Rizal").await;
        let (teacher, user) = seed_teacher(&storage, "t@school.test").await;
        let math = seed_class(&storage, section.id, teacher.id, "Math").await;
        let science = seed_class(&storage, section.id, teacher.id, "Science").await;

        storage
            .create_announcement_impl(None, user.id, "Holiday", "No classes Friday")
            .await
            .unwrap();
        storage
            .create_announcement_impl(Some(math.id), user.id, "Quiz", "Quiz on Monday")
            .await
            .unwrap();
        storage
            .create_announcement_impl(Some(science.id), user.id, "Lab", "Bring goggles")
            .await
            .unwrap();

        let math_feed = storage.list_announcements_impl(Some(math.id)).await.unwrap();
        assert_eq!(math_feed.len(), 2);
        assert!(math_feed.iter().all(|a| a.class_id != Some(science.id)));

        let school = storage.list_announcements_impl(None).await.unwrap();
        assert_eq!(school.len(), 1);
        assert_eq!(school[0].title, "Holiday");
    }
}
