//! `SeaORM` Entity for sys_menu table
//!
//! Menus form a tree through `parent_id`; the reference is not enforced as a
//! foreign key so that a parent can be re-pointed without cascading.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "sys_menu")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(nullable)]
    pub parent_id: Option<i64>,
    #[sea_orm(unique)]
    pub name: String,
    /// Permission string such as `system:menu:query`
    #[sea_orm(nullable)]
    pub permission: Option<String>,
    pub available: bool,
    pub order: i32,
    #[sea_orm(nullable)]
    pub route_path: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::sys_role_menus::Entity")]
    SysRoleMenus,
}

impl Related<super::sys_role_menus::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SysRoleMenus.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
