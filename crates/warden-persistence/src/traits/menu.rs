//! Menu persistence trait
//!
//! Defines the interface for menu hierarchy storage operations.

use async_trait::async_trait;
use warden_common::SortSpec;

use crate::model::{MenuInfo, MenuQuery, MenuSortField, NewMenu, RoleInfo};

/// Menu hierarchy persistence operations
#[async_trait]
pub trait MenuPersistence: Send + Sync {
    /// Snapshot of every menu, unordered and unfiltered
    async fn menu_find_all(&self) -> anyhow::Result<Vec<MenuInfo>>;

    /// Find a menu by id, with `parent_name` resolved
    async fn menu_find_by_id(&self, id: i64) -> anyhow::Result<Option<MenuInfo>>;

    /// Find a menu by its unique name
    async fn menu_find_by_name(&self, name: &str) -> anyhow::Result<Option<MenuInfo>>;

    /// Filtered, sorted list with `parent_name` resolved
    async fn menu_find_list(
        &self,
        query: &MenuQuery,
        sort: &[SortSpec<MenuSortField>],
    ) -> anyhow::Result<Vec<MenuInfo>>;

    /// Insert a menu and return the stored record
    async fn menu_create(&self, menu: &NewMenu) -> anyhow::Result<MenuInfo>;

    /// Overwrite every persisted field of an existing menu
    async fn menu_update(&self, menu: &MenuInfo) -> anyhow::Result<MenuInfo>;

    /// Delete menus together with their role assignments
    async fn menu_delete(&self, ids: &[i64]) -> anyhow::Result<u64>;

    /// Set `available` on all listed menus as one atomic write
    async fn menu_set_available(&self, ids: &[i64], available: bool) -> anyhow::Result<u64>;

    /// Available roles whose menu set contains `menu_id`
    async fn menu_find_available_roles(&self, menu_id: i64) -> anyhow::Result<Vec<RoleInfo>>;
}
