//! 课程存储操作

use std::collections::HashMap;

use super::SeaOrmStorage;
use crate::entity::classes::{ActiveModel, Column, Entity as Classes};
use crate::entity::prelude::{Sections, Teachers, Users};
use crate::errors::{Result, SchoolSystemError};
use crate::models::{
    PaginationInfo,
    classes::{
        entities::{Class, ClassDetail},
        requests::{ClassListQuery, CreateClassRequest, UpdateClassRequest},
        responses::ClassListResponse,
    },
};
use crate::utils::escape_like_pattern;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};

impl SeaOrmStorage {
    /// 创建课程，分区与教师必须存在
    pub async fn create_class_impl(&self, req: CreateClassRequest) -> Result<Class> {
        self.ensure_class_refs(req.section_id, req.teacher_id).await?;

        let now = chrono::Utc::now().timestamp();
        let model = ActiveModel {
            section_id: Set(req.section_id),
            teacher_id: Set(req.teacher_id),
            subject_name: Set(req.subject_name),
            schedule: Set(req.schedule),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| SchoolSystemError::database_operation(format!("创建课程失败: {e}")))?;

        Ok(result.into_class())
    }

    async fn ensure_class_refs(&self, section_id: i64, teacher_id: i64) -> Result<()> {
        if Sections::find_by_id(section_id).one(&self.db).await?.is_none() {
            return Err(SchoolSystemError::not_found(format!(
                "分区不存在: {section_id}"
            )));
        }
        if Teachers::find_by_id(teacher_id).one(&self.db).await?.is_none() {
            return Err(SchoolSystemError::not_found(format!(
                "教师不存在: {teacher_id}"
            )));
        }
        Ok(())
    }

    /// 通过 ID 获取课程
    pub async fn get_class_by_id_impl(&self, class_id: i64) -> Result<Option<Class>> {
        let result = Classes::find_by_id(class_id)
            .one(&self.db)
            .await
            .map_err(|e| SchoolSystemError::database_operation(format!("查询课程失败: {e}")))?;

        Ok(result.map(|m| m.into_class()))
    }

    pub async fn get_class_detail_impl(&self, class_id: i64) -> Result<Option<ClassDetail>> {
        let Some(model) = Classes::find_by_id(class_id).one(&self.db).await? else {
            return Ok(None);
        };
        Ok(self.class_details(vec![model]).await?.pop())
    }

    /// 补全分区名与教师姓名
    async fn class_details(
        &self,
        models: Vec<crate::entity::classes::Model>,
    ) -> Result<Vec<ClassDetail>> {
        let mut sections = HashMap::new();
        let mut teachers: HashMap<i64, String> = HashMap::new();
        let mut items = Vec::with_capacity(models.len());

        for model in models {
            if !sections.contains_key(&model.section_id)
                && let Some(section) = Sections::find_by_id(model.section_id).one(&self.db).await?
            {
                sections.insert(model.section_id, section);
            }

            if !teachers.contains_key(&model.teacher_id) {
                let name = Teachers::find_by_id(model.teacher_id)
                    .find_also_related(Users)
                    .one(&self.db)
                    .await?
                    .and_then(|(_, user)| user)
                    .map(|u| format!("{} {}", u.first_name, u.last_name))
                    .unwrap_or_default();
                teachers.insert(model.teacher_id, name);
            }

            let (section_name, grade_level) = sections
                .get(&model.section_id)
                .map(|s| (s.name.clone(), s.grade_level.clone()))
                .unwrap_or_default();
            let teacher_name = teachers
                .get(&model.teacher_id)
                .cloned()
                .unwrap_or_default();

            items.push(ClassDetail {
                class: model.into_class(),
                section_name,
                grade_level,
                teacher_name,
            });
        }

        Ok(items)
    }

    /// 分页列出课程
    pub async fn list_classes_with_pagination_impl(
        &self,
        query: ClassListQuery,
    ) -> Result<ClassListResponse> {
        let page = query.page.unwrap_or(1).max(1) as u64;
        let size = query.size.unwrap_or(10).clamp(1, 100) as u64;

        let mut select = Classes::find();

        if let Some(section_id) = query.section_id {
            select = select.filter(Column::SectionId.eq(section_id));
        }

        // 教师筛选
        if let Some(teacher_id) = query.teacher_id {
            select = select.filter(Column::TeacherId.eq(teacher_id));
        }

        if let Some(ref search) = query.search
            && !search.trim().is_empty()
        {
            let escaped = escape_like_pattern(search.trim());
            select = select.filter(Column::SubjectName.contains(&escaped));
        }

        select = select.order_by_asc(Column::SubjectName);

        let paginator = select.paginate(&self.db, size);
        let total = paginator
            .num_items()
            .await
            .map_err(|e| SchoolSystemError::database_operation(format!("查询课程总数失败: {e}")))?;

        let pages = paginator
            .num_pages()
            .await
            .map_err(|e| SchoolSystemError::database_operation(format!("查询课程页数失败: {e}")))?;

        let classes = paginator
            .fetch_page(page - 1)
            .await
            .map_err(|e| SchoolSystemError::database_operation(format!("查询课程列表失败: {e}")))?;

        Ok(ClassListResponse {
            items: self.class_details(classes).await?,
            pagination: PaginationInfo::new(page, size, total, pages),
        })
    }

    /// 更新课程信息
    pub async fn update_class_impl(
        &self,
        class_id: i64,
        update: UpdateClassRequest,
    ) -> Result<Option<Class>> {
        let Some(existing) = Classes::find_by_id(class_id).one(&self.db).await? else {
            return Ok(None);
        };

        self.ensure_class_refs(
            update.section_id.unwrap_or(existing.section_id),
            update.teacher_id.unwrap_or(existing.teacher_id),
        )
        .await?;

        let mut model: ActiveModel = existing.into();
        model.updated_at = Set(chrono::Utc::now().timestamp());

        if let Some(section_id) = update.section_id {
            model.section_id = Set(section_id);
        }
        if let Some(teacher_id) = update.teacher_id {
            model.teacher_id = Set(teacher_id);
        }
        if let Some(subject_name) = update.subject_name {
            model.subject_name = Set(subject_name);
        }
        if let Some(schedule) = update.schedule {
            model.schedule = Set(Some(schedule));
        }

        let updated = model
            .update(&self.db)
            .await
            .map_err(|e| SchoolSystemError::database_operation(format!("更新课程失败: {e}")))?;

        Ok(Some(updated.into_class()))
    }

    /// 删除课程
    pub async fn delete_class_impl(&self, class_id: i64) -> Result<bool> {
        let result = Classes::delete_by_id(class_id)
            .exec(&self.db)
            .await
            .map_err(|e| SchoolSystemError::database_operation(format!("删除课程失败: {e}")))?;

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
    async fn test_create_class_requires_existing_section() {
        let storage = memory_storage().await;
        let (teacher, _) = seed_teacher(&storage, "t@school.test").await;
        let err = storage
            .create_class_impl(CreateClassRequest {
                section_id: 42,
                teacher_id: teacher.id,
                subject_name: "Math".into(),
                schedule: None,
            })
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 404);
    }

    #[actix_web::test]
    async fn test_class_detail_includes_names() {
        let storage = memory_storage().await;
        let section = seed_section(&storage, "Grade 7", "Rizal").await;
        let (teacher, user) = seed_teacher(&storage, "t@school.test").await;
        let class = seed_class(&storage, section.id, teacher.id, "Math").await;

        let detail = storage
            .get_class_detail_impl(class.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(detail.section_name, "Rizal");
        assert_eq!(detail.grade_level, "Grade 7");
        assert_eq!(detail.teacher_name, user.full_name());
    }

    #[actix_web::test]
    async fn test_list_classes_filters_teacher_and_section() {
        let storage = memory_storage().await;
        let rizal = seed_section(&storage, "Grade 7", "Rizal").await;
        let mabini = seed_section(&storage, "Grade 7", "Mabini").await;
        let (t1, _) = seed_teacher(&storage, "t1@school.test").await;
        let (t2, _) = seed_teacher(&storage, "t2@school.test").await;
        seed_class(&storage, rizal.id, t1.id, "Math").await;
        seed_class(&storage, mabini.id, t1.id, "Science").await;
        seed_class(&storage, mabini.id, t2.id, "English").await;

        let own = storage
            .list_classes_with_pagination_impl(ClassListQuery {
                teacher_id: Some(t1.id),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(own.pagination.total, 2);

        let section = storage
            .list_classes_with_pagination_impl(ClassListQuery {
                section_id: Some(mabini.id),
                search: Some("Eng".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(section.items.len(), 1);
        assert_eq!(section.items[0].class.subject_name, "English");
    }
}
