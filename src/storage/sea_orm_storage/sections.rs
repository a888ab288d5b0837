//! 分区存储操作

use super::SeaOrmStorage;
use crate::entity::prelude::*;
use crate::entity::{classes, sections, students};
use crate::errors::{Result, SchoolSystemError};
use crate::models::{
    PaginationInfo,
    sections::{
        entities::{Section, SectionWithCounts},
        requests::{SectionListQuery, UpdateSectionRequest},
        responses::SectionListResponse,
    },
};
use crate::utils::escape_like_pattern;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};

/// 同名分区（年级 + 名称）是否已存在，可排除自身
async fn section_name_taken<C: ConnectionTrait>(
    conn: &C,
    grade_level: &str,
    name: &str,
    exclude_id: Option<i64>,
) -> Result<bool> {
    let mut select = Sections::find()
        .filter(sections::Column::GradeLevel.eq(grade_level))
        .filter(sections::Column::Name.eq(name));
    if let Some(id) = exclude_id {
        select = select.filter(sections::Column::Id.ne(id));
    }
    Ok(select.one(conn).await?.is_some())
}

impl SeaOrmStorage {
    pub async fn create_section_impl(&self, grade_level: &str, name: &str) -> Result<Section> {
        if section_name_taken(&self.db, grade_level, name, None).await? {
            return Err(SchoolSystemError::conflict(format!(
                "分区已存在: {grade_level} - {name}"
            )));
        }

        let now = chrono::Utc::now().timestamp();
        let model = SectionActiveModel {
            grade_level: Set(grade_level.to_string()),
            name: Set(name.to_string()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(|e| SchoolSystemError::database_operation(format!("创建分区失败: {e}")))?;

        Ok(model.into_section())
    }

    pub async fn get_section_by_id_impl(&self, id: i64) -> Result<Option<Section>> {
        let result = Sections::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| SchoolSystemError::database_operation(format!("查询分区失败: {e}")))?;

        Ok(result.map(|m| m.into_section()))
    }

    async fn section_counts(&self, section_id: i64) -> Result<(i64, i64)> {
        let student_count = Students::find()
            .filter(students::Column::SectionId.eq(section_id))
            .count(&self.db)
            .await?;
        let class_count = Classes::find()
            .filter(classes::Column::SectionId.eq(section_id))
            .count(&self.db)
            .await?;
        Ok((student_count as i64, class_count as i64))
    }

    /// 分页列出分区，附带学生数与课程数
    pub async fn list_sections_with_pagination_impl(
        &self,
        query: SectionListQuery,
    ) -> Result<SectionListResponse> {
        let page = query.page.unwrap_or(1).max(1) as u64;
        let size = query.size.unwrap_or(10).clamp(1, 100) as u64;

        let mut select = Sections::find();

        if let Some(ref grade_level) = query.grade_level {
            select = select.filter(sections::Column::GradeLevel.eq(grade_level.as_str()));
        }

        if let Some(ref search) = query.search
            && !search.trim().is_empty()
        {
            let escaped = escape_like_pattern(search.trim());
            select = select.filter(sections::Column::Name.contains(&escaped));
        }

        let paginator = select
            .order_by_asc(sections::Column::GradeLevel)
            .order_by_asc(sections::Column::Name)
            .paginate(&self.db, size);

        let total = paginator.num_items().await.map_err(|e| {
            SchoolSystemError::database_operation(format!("查询分区总数失败: {e}"))
        })?;
        let pages = paginator.num_pages().await.map_err(|e| {
            SchoolSystemError::database_operation(format!("查询分区页数失败: {e}"))
        })?;
        let rows = paginator.fetch_page(page - 1).await.map_err(|e| {
            SchoolSystemError::database_operation(format!("查询分区列表失败: {e}"))
        })?;

        let mut items = Vec::with_capacity(rows.len());
        for model in rows {
            let (student_count, class_count) = self.section_counts(model.id).await?;
            items.push(SectionWithCounts {
                section: model.into_section(),
                student_count,
                class_count,
            });
        }

        Ok(SectionListResponse {
            items,
            pagination: PaginationInfo::new(page, size, total, pages),
        })
    }

    pub async fn update_section_impl(
        &self,
        id: i64,
        update: UpdateSectionRequest,
    ) -> Result<Option<Section>> {
        let Some(existing) = Sections::find_by_id(id).one(&self.db).await? else {
            return Ok(None);
        };

        let grade_level = update
            .grade_level
            .unwrap_or_else(|| existing.grade_level.clone());
        let name = update.name.unwrap_or_else(|| existing.name.clone());

        if section_name_taken(&self.db, &grade_level, &name, Some(id)).await? {
            return Err(SchoolSystemError::conflict(format!(
                "分区已存在: {grade_level} - {name}"
            )));
        }

        let mut model: SectionActiveModel = existing.into();
        model.grade_level = Set(grade_level);
        model.name = Set(name);
        model.updated_at = Set(chrono::Utc::now().timestamp());

        let updated = model
            .update(&self.db)
            .await
            .map_err(|e| SchoolSystemError::database_operation(format!("更新分区失败: {e}")))?;

        Ok(Some(updated.into_section()))
    }

    /// 删除分区，仍有学生或课程时返回冲突
    pub async fn delete_section_impl(&self, id: i64) -> Result<bool> {
        if Sections::find_by_id(id).one(&self.db).await?.is_none() {
            return Ok(false);
        }

        let (student_count, class_count) = self.section_counts(id).await?;
        if student_count > 0 || class_count > 0 {
            return Err(SchoolSystemError::conflict(format!(
                "Cannot delete section with {student_count} student(s) and {class_count} class(es)"
            )));
        }

        let result = Sections::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| SchoolSystemError::database_operation(format!("删除分区失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::sea_orm_storage::test_support::{
        memory_storage, seed_class, seed_section, seed_teacher,
    };

    #[actix_web::test]
    async fn test_duplicate_section_conflicts() {
        let storage = memory_storage().await;
        seed_section(&storage, "Grade 7", "Rizal").await;
        let err = storage
            .create_section_impl("Grade 7", "Rizal")
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 409);

        // 不同年级同名允许
        storage.create_section_impl("Grade 8", "Rizal").await.unwrap();
    }

    #[actix_web::test]
    async fn test_delete_blocked_while_section_has_classes() {
        let storage = memory_storage().await;
        let section = seed_section(&storage, "Grade 7", "Rizal").await;
        let (teacher, _) = seed_teacher(&storage, "t@school.test").await;
        seed_class(&storage, section.id, teacher.id, "Math").await;

        let err = storage.delete_section_impl(section.id).await.unwrap_err();
        assert_eq!(err.status_code(), 409);
        assert!(storage.get_section_by_id_impl(section.id).await.unwrap().is_some());
    }

    #[actix_web::test]
    async fn test_delete_empty_section() {
        let storage = memory_storage().await;
        let section = seed_section(&storage, "Grade 7", "Rizal").await;
        assert!(storage.delete_section_impl(section.id).await.unwrap());
        assert!(!storage.delete_section_impl(section.id).await.unwrap());
    }

    #[actix_web::test]
    async fn test_list_sections_reports_counts() {
        let storage = memory_storage().await;
        let section = seed_section(&storage, "Grade 7", "Rizal").await;
        seed_section(&storage, "Grade 7", "Bonifacio").await;
        let (teacher, _) = seed_teacher(&storage, "t@school.test").await;
        seed_class(&storage, section.id, teacher.id, "Math").await;
        seed_class(&storage, section.id, teacher.id, "Science").await;

        let result = storage
            .list_sections_with_pagination_impl(SectionListQuery::default())
            .await
            .unwrap();
        assert_eq!(result.pagination.total, 2);
        let rizal = result
            .items
            .iter()
            .find(|s| s.section.name == "Rizal")
            .unwrap();
        assert_eq!(rizal.class_count, 2);
        assert_eq!(rizal.student_count, 0);
    }

    #[actix_web::test]
    async fn test_update_section_rename_conflict() {
        let storage = memory_storage().await;
        seed_section(&storage, "Grade 7", "Rizal").await;
        let other = seed_section(&storage, "Grade 7", "Mabini").await;

        let err = storage
            .update_section_impl(
                other.id,
                UpdateSectionRequest {
                    grade_level: None,
                    name: Some("Rizal".into()),
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 409);

        let renamed = storage
            .update_section_impl(
                other.id,
                UpdateSectionRequest {
                    grade_level: None,
                    name: Some("Luna".into()),
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(renamed.name, "Luna");
    }
}
