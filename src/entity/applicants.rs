//! 申请人实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "applicants")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub user_id: i64,
    pub status: String,
    #[sea_orm(unique)]
    pub reference_code: String,
    #[sea_orm(unique)]
    pub applicant_number: String,
    pub application_type: String,
    pub gender: String,
    pub birthdate: String,
    pub grade_level_applied: Option<String>,
    pub guardian_name: Option<String>,
    pub contact_number: Option<String>,
    pub address: Option<String>,
    pub personal_info: Option<String>,
    pub rejection_reason: Option<String>,
    pub reviewed_at: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id"
    )]
    User,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_applicant(self) -> crate::models::applicants::entities::Applicant {
        use crate::models::applicants::entities::{
            Applicant, ApplicantStatus, ApplicationType, Gender,
        };

        Applicant {
            id: self.id,
            user_id: self.user_id,
            status: super::parse_or(&self.status, ApplicantStatus::Pending),
            reference_code: self.reference_code,
            applicant_number: self.applicant_number,
            application_type: super::parse_or(&self.application_type, ApplicationType::New),
            gender: super::parse_or(&self.gender, Gender::Male),
            birthdate: self.birthdate,
            grade_level_applied: self.grade_level_applied,
            guardian_name: self.guardian_name,
            contact_number: self.contact_number,
            address: self.address,
            personal_info: self.personal_info,
            rejection_reason: self.rejection_reason,
            reviewed_at: self.reviewed_at.map(super::to_datetime),
            created_at: super::to_datetime(self.created_at),
            updated_at: super::to_datetime(self.updated_at),
        }
    }
}
