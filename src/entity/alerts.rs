//! 家长提醒实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "alerts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub parent_id: i64,
    pub student_id: i64,
    pub assignment_id: Option<i64>,
    pub alert_type: String,
    #[sea_orm(column_type = "Text")]
    pub message: String,
    pub viewed: bool,
    pub created_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::parents::Entity",
        from = "Column::ParentId",
        to = "super::parents::Column::Id"
    )]
    Parent,
}

impl Related<super::parents::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Parent.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_alert(self) -> crate::models::alerts::entities::Alert {
        use crate::models::alerts::entities::{Alert, AlertType};

        Alert {
            id: self.id,
            parent_id: self.parent_id,
            student_id: self.student_id,
            assignment_id: self.assignment_id,
            alert_type: super::parse_or(&self.alert_type, AlertType::OverdueAssignment),
            message: self.message,
            viewed: self.viewed,
            created_at: super::to_datetime(self.created_at),
        }
    }
}
