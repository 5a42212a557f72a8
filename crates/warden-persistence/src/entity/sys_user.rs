//! `SeaORM` Entity for sys_user table
//!
//! Only the columns the permission subsystem reads are mapped; credentials
//! live with the authentication service.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "sys_user")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub username: String,
    pub available: bool,
    pub is_superuser: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::sys_user_roles::Entity")]
    SysUserRoles,
}

impl Related<super::sys_user_roles::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SysUserRoles.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
