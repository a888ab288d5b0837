//! 文件存储操作

use super::SeaOrmStorage;
use crate::entity::files::{ActiveModel, Entity as Files};
use crate::errors::{Result, SchoolSystemError};
use crate::models::files::entities::File;
use sea_orm::{ActiveModelTrait, EntityTrait, Set};

impl SeaOrmStorage {
    /// 上传文件（创建文件记录）
    pub async fn upload_file_impl(
        &self,
        token: &str,
        file_name: &str,
        file_size: i64,
        file_type: &str,
        user_id: i64,
    ) -> Result<File> {
        let now = chrono::Utc::now().timestamp();

        let model = ActiveModel {
            token: Set(token.to_string()),
            file_name: Set(file_name.to_string()),
            file_size: Set(file_size),
            file_type: Set(file_type.to_string()),
            uploaded_at: Set(now),
            user_id: Set(user_id),
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| SchoolSystemError::database_operation(format!("上传文件记录失败: {e}")))?;

        Ok(result.into_file())
    }

    /// 通过 token 获取文件
    pub async fn get_file_by_token_impl(&self, token: &str) -> Result<Option<File>> {
        let result = Files::find_by_id(token.to_string())
            .one(&self.db)
            .await
            .map_err(|e| SchoolSystemError::database_operation(format!("查询文件失败: {e}")))?;

        Ok(result.map(|m| m.into_file()))
    }

    pub async fn delete_file_impl(&self, token: &str) -> Result<bool> {
        let result = Files::delete_by_id(token.to_string())
            .exec(&self.db)
            .await
            .map_err(|e| SchoolSystemError::database_operation(format!("删除文件记录失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }
}

#[cfg(test)]
mod tests {
    use crate::models::users::entities::UserRole;
    use crate::storage::sea_orm_storage::test_support::{memory_storage, new_user};

    #[actix_web::test]
    async fn test_upload_then_lookup_by_token() {
        let storage = memory_storage().await;
        let user = storage
            .create_user_impl(new_user("s@school.test", UserRole::Student), None)
            .await
            .unwrap();

        let file = storage
            .upload_file_impl("tok-1", "essay.pdf", 2048, "pdf", user.id)
            .await
            .unwrap();
        assert_eq!(file.file_size, 2048);

        let found = storage.get_file_by_token_impl("tok-1").await.unwrap().unwrap();
        assert_eq!(found.file_name, "essay.pdf");
        assert!(storage.get_file_by_token_impl("missing").await.unwrap().is_none());

        assert!(storage.delete_file_impl("tok-1").await.unwrap());
        assert!(!storage.delete_file_impl("tok-1").await.unwrap());
        assert!(storage.get_file_by_token_impl("tok-1").await.unwrap().is_none());
    }
}
