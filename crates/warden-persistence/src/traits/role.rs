//! Role persistence trait
//!
//! Defines the interface for role, role-menu and user-role storage operations.

use async_trait::async_trait;

use crate::model::{RoleInfo, UserInfo};

/// Role and assignment persistence operations
#[async_trait]
pub trait RolePersistence: Send + Sync {
    // ==================== Role Operations ====================

    /// Find a role by id
    async fn role_find_by_id(&self, id: i64) -> anyhow::Result<Option<RoleInfo>>;

    /// Find all roles among `ids`; unknown ids are skipped
    async fn role_find_by_ids(&self, ids: &[i64]) -> anyhow::Result<Vec<RoleInfo>>;

    /// Set `available` on all listed roles
    async fn role_set_available(&self, ids: &[i64], available: bool) -> anyhow::Result<u64>;

    // ==================== Role-Menu Operations ====================

    /// Ids of the menus assigned to a role
    async fn role_find_menu_ids(&self, role_id: i64) -> anyhow::Result<Vec<i64>>;

    /// Replace the menu set of a role
    async fn role_set_menus(&self, role_id: i64, menu_ids: &[i64]) -> anyhow::Result<()>;

    // ==================== User Operations ====================

    /// Find a user by username
    async fn user_find_by_username(&self, username: &str) -> anyhow::Result<Option<UserInfo>>;

    /// Users holding at least one of `role_ids`, each listed once
    async fn user_find_by_role_ids(&self, role_ids: &[i64]) -> anyhow::Result<Vec<UserInfo>>;

    /// Permission strings of the available menus reachable through the
    /// user's available roles. May contain duplicates and blanks.
    async fn permission_find_by_username(&self, username: &str) -> anyhow::Result<Vec<String>>;
}
