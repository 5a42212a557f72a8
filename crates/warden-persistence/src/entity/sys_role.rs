//! `SeaORM` Entity for sys_role table

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "sys_role")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub name: String,
    #[sea_orm(unique)]
    pub code: String,
    pub available: bool,
    pub order: i32,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::sys_role_menus::Entity")]
    SysRoleMenus,
    #[sea_orm(has_many = "super::sys_user_roles::Entity")]
    SysUserRoles,
}

impl Related<super::sys_role_menus::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SysRoleMenus.def()
    }
}

impl Related<super::sys_user_roles::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SysUserRoles.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
