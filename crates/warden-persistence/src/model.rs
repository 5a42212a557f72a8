//! Domain model types for the persistence abstraction layer
//!
//! These types are used as return values from the persistence traits,
//! decoupled from specific storage backends.

use serde::{Deserialize, Serialize};
use warden_common::SortField;

use crate::entity::{sys_menu, sys_role, sys_user};

/// A node of the menu hierarchy
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuInfo {
    pub id: i64,
    pub parent_id: Option<i64>,
    /// Resolved from `parent_id` on read, never persisted
    #[serde(default)]
    pub parent_name: Option<String>,
    pub name: String,
    pub permission: Option<String>,
    pub available: bool,
    pub order: i32,
    #[serde(default)]
    pub route_path: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl From<sys_menu::Model> for MenuInfo {
    fn from(value: sys_menu::Model) -> Self {
        Self {
            id: value.id,
            parent_id: value.parent_id,
            parent_name: None,
            name: value.name,
            permission: value.permission,
            available: value.available,
            order: value.order,
            route_path: value.route_path,
            description: value.description,
        }
    }
}

/// Fields for inserting a new menu
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMenu {
    pub parent_id: Option<i64>,
    pub name: String,
    pub permission: Option<String>,
    pub available: bool,
    pub order: i32,
    pub route_path: Option<String>,
    pub description: Option<String>,
}

/// Role information
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleInfo {
    pub id: i64,
    pub name: String,
    pub code: String,
    pub available: bool,
    pub order: i32,
    pub description: Option<String>,
}

impl From<sys_role::Model> for RoleInfo {
    fn from(value: sys_role::Model) -> Self {
        Self {
            id: value.id,
            name: value.name,
            code: value.code,
            available: value.available,
            order: value.order,
            description: value.description,
        }
    }
}

/// Basic user information returned from persistence
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub id: i64,
    pub username: String,
    pub available: bool,
    pub is_superuser: bool,
}

impl From<sys_user::Model> for UserInfo {
    fn from(value: sys_user::Model) -> Self {
        Self {
            id: value.id,
            username: value.username,
            available: value.available,
            is_superuser: value.is_superuser,
        }
    }
}

/// Filters for listing menus. `None` means "do not filter".
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuQuery {
    /// Substring match on the name
    pub name: Option<String>,
    /// Substring match on the permission string
    pub permission: Option<String>,
    pub available: Option<bool>,
    pub parent_id: Option<i64>,
}

impl MenuQuery {
    pub fn matches(&self, menu: &MenuInfo) -> bool {
        if let Some(name) = self.name.as_deref().filter(|s| !s.is_empty())
            && !menu.name.contains(name)
        {
            return false;
        }
        if let Some(permission) = self.permission.as_deref().filter(|s| !s.is_empty())
            && !menu
                .permission
                .as_deref()
                .is_some_and(|p| p.contains(permission))
        {
            return false;
        }
        if let Some(available) = self.available
            && menu.available != available
        {
            return false;
        }
        if let Some(parent_id) = self.parent_id
            && menu.parent_id != Some(parent_id)
        {
            return false;
        }
        true
    }
}

/// Sortable menu columns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuSortField {
    Id,
    Name,
    Order,
    ParentId,
}

impl SortField for MenuSortField {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "id" => Some(MenuSortField::Id),
            "name" => Some(MenuSortField::Name),
            "order" => Some(MenuSortField::Order),
            "parent_id" | "parentId" => Some(MenuSortField::ParentId),
            _ => None,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            MenuSortField::Id => "id",
            MenuSortField::Name => "name",
            MenuSortField::Order => "order",
            MenuSortField::ParentId => "parent_id",
        }
    }
}

/// Storage mode for the persistence layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StorageMode {
    /// External database (MySQL/PostgreSQL via SeaORM)
    ExternalDb,
    /// Process-local storage, for standalone development and tests
    Memory,
}

impl std::fmt::Display for StorageMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageMode::ExternalDb => write!(f, "external_db"),
            StorageMode::Memory => write!(f, "memory"),
        }
    }
}

impl std::str::FromStr for StorageMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "external_db" => Ok(StorageMode::ExternalDb),
            "memory" => Ok(StorageMode::Memory),
            _ => Err(format!("Invalid storage mode: {}", s)),
        }
    }
}
