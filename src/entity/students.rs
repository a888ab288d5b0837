//! 学生资料

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "students")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub user_id: i64,
    pub parent_id: Option<i64>,
    pub section_id: Option<i64>,
    #[sea_orm(unique)]
    pub student_number: String,
    pub created_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id"
    )]
    User,
    #[sea_orm(
        belongs_to = "super::parents::Entity",
        from = "Column::ParentId",
        to = "super::parents::Column::Id"
    )]
    Parent,
    #[sea_orm(
        belongs_to = "super::sections::Entity",
        from = "Column::SectionId",
        to = "super::sections::Column::Id"
    )]
    Section,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::parents::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Parent.def()
    }
}

impl Related<super::sections::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Section.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_student(self) -> crate::models::profiles::entities::Student {
        crate::models::profiles::entities::Student {
            id: self.id,
            user_id: self.user_id,
            parent_id: self.parent_id,
            section_id: self.section_id,
            student_number: self.student_number,
            created_at: super::to_datetime(self.created_at),
        }
    }

    /// 与用户记录合并为名单项
    pub fn into_summary(
        self,
        user: super::users::Model,
    ) -> crate::models::profiles::entities::StudentSummary {
        crate::models::profiles::entities::StudentSummary {
            id: self.id,
            user_id: self.user_id,
            student_number: self.student_number,
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
            parent_id: self.parent_id,
            section_id: self.section_id,
        }
    }
}
