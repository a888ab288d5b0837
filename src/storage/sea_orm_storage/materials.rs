//! 学习资料存储操作

use super::SeaOrmStorage;
use crate::entity::learning_materials::{ActiveModel, Column, Entity as LearningMaterials};
use crate::errors::{Result, SchoolSystemError};
use crate::models::materials::{entities::LearningMaterial, requests::CreateMaterialRequest};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};

impl SeaOrmStorage {
    pub async fn create_material_impl(
        &self,
        material: CreateMaterialRequest,
        uploaded_by: i64,
    ) -> Result<LearningMaterial> {
        let model = ActiveModel {
            class_id: Set(material.class_id),
            uploaded_by: Set(uploaded_by),
            title: Set(material.title),
            description: Set(material.description),
            file_token: Set(material.file_token),
            link_url: Set(material.link_url),
            created_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(|e| SchoolSystemError::database_operation(format!("创建学习资料失败: {e}")))?;

        Ok(model.into_material())
    }

    pub async fn get_material_by_id_impl(&self, id: i64) -> Result<Option<LearningMaterial>> {
        let result = LearningMaterials::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| SchoolSystemError::database_operation(format!("查询学习资料失败: {e}")))?;

        Ok(result.map(|m| m.into_material()))
    }

    pub async fn list_materials_impl(&self, class_id: i64) -> Result<Vec<LearningMaterial>> {
        let rows = LearningMaterials::find()
            .filter(Column::ClassId.eq(class_id))
            .order_by_desc(Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(|e| SchoolSystemError::database_operation(format!("查询学习资料失败: {e}")))?;

        Ok(rows.into_iter().map(|m| m.into_material()).collect())
    }

    pub async fn delete_material_impl(&self, id: i64) -> Result<bool> {
        let result = LearningMaterials::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| SchoolSystemError::database_operation(format!("删除学习资料失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }
}
