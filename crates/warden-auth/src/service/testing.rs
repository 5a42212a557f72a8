//! Shared fixtures for service tests

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use parking_lot::Mutex;

use warden_common::{SortSpec, WardenError};
use warden_persistence::MemoryPersistService;
use warden_persistence::model::{
    MenuInfo, MenuQuery, MenuSortField, NewMenu, RoleInfo, StorageMode, UserInfo,
};
use warden_persistence::traits::{MenuPersistence, PersistenceService, RolePersistence};

use crate::service::permission::{PermissionCache, PermissionSet};

/// Cache that records every write and can be told to fail for some users
#[derive(Default)]
pub struct RecordingCache {
    entries: Mutex<HashMap<String, PermissionSet>>,
    writes: Mutex<Vec<(String, PermissionSet)>>,
    fail_for: HashSet<String>,
}

impl RecordingCache {
    pub fn failing_for(usernames: &[&str]) -> Self {
        Self {
            fail_for: usernames.iter().map(|u| u.to_string()).collect(),
            ..Default::default()
        }
    }

    pub fn write_count(&self) -> usize {
        self.writes.lock().len()
    }

    pub fn written_for(&self, username: &str) -> Vec<PermissionSet> {
        self.writes
            .lock()
            .iter()
            .filter(|(u, _)| u == username)
            .map(|(_, set)| set.clone())
            .collect()
    }
}

#[async_trait]
impl PermissionCache for RecordingCache {
    async fn get(&self, username: &str) -> Option<PermissionSet> {
        self.entries.lock().get(username).cloned()
    }

    async fn put(&self, username: &str, permissions: PermissionSet) -> anyhow::Result<()> {
        if self.fail_for.contains(username) {
            anyhow::bail!("cache unavailable for {}", username);
        }
        self.writes
            .lock()
            .push((username.to_string(), permissions.clone()));
        self.entries.lock().insert(username.to_string(), permissions);
        Ok(())
    }

    async fn invalidate(&self, username: &str) {
        self.entries.lock().remove(username);
    }
}

/// Seeded store:
///
/// ```text
/// System (1)
/// └── Report (2, report:view)      <- analyst
///     └── Export (3, report:export) <- auditor (unavailable)
/// Settings (4, system:settings)
/// ```
///
/// alice holds analyst, bob holds no role, dave holds auditor.
pub struct Fixture {
    pub store: MemoryPersistService,
    pub system: i64,
    pub report: i64,
    pub export: i64,
    pub settings: i64,
    pub analyst: i64,
    pub auditor: i64,
}

impl Fixture {
    pub async fn new() -> Self {
        let store = MemoryPersistService::new();

        let system = create(&store, "System", None, None).await;
        let report = create(&store, "Report", Some(system), Some("report:view")).await;
        let export = create(&store, "Export", Some(report), Some("report:export")).await;
        let settings = create(&store, "Settings", None, Some("system:settings")).await;

        let analyst = store.insert_role("Analyst", "analyst", true).id;
        let auditor = store.insert_role("Auditor", "auditor", false).id;
        store
            .role_set_menus(analyst, &[report])
            .await
            .expect("seed analyst menus");
        store
            .role_set_menus(auditor, &[export])
            .await
            .expect("seed auditor menus");

        let alice = store.insert_user("alice", false);
        store.assign_user_roles(alice.id, &[analyst]);
        store.insert_user("bob", false);
        let dave = store.insert_user("dave", false);
        store.assign_user_roles(dave.id, &[auditor]);

        Self {
            store,
            system,
            report,
            export,
            settings,
            analyst,
            auditor,
        }
    }

    pub async fn available(&self, id: i64) -> bool {
        self.store
            .menu_find_by_id(id)
            .await
            .expect("read menu")
            .map(|m| m.available)
            .unwrap_or(false)
    }
}

async fn create(
    store: &MemoryPersistService,
    name: &str,
    parent_id: Option<i64>,
    permission: Option<&str>,
) -> i64 {
    store
        .menu_create(&NewMenu {
            parent_id,
            name: name.to_string(),
            permission: permission.map(str::to_string),
            available: true,
            order: 1,
            ..Default::default()
        })
        .await
        .expect("seed menu")
        .id
}

/// Memory store whose selected writes fail after the check that guards them
#[derive(Default)]
pub struct FailingStore {
    pub inner: MemoryPersistService,
    /// `role_set_menus` fails for this role
    pub fail_role_menus: Option<i64>,
    /// `menu_set_available` always fails
    pub fail_set_available: bool,
}

fn write_failure(what: &str) -> anyhow::Error {
    WardenError::DatabaseError(format!("{} failed: connection reset", what)).into()
}

#[async_trait]
impl PersistenceService for FailingStore {
    fn storage_mode(&self) -> StorageMode {
        self.inner.storage_mode()
    }

    async fn health_check(&self) -> anyhow::Result<()> {
        self.inner.health_check().await
    }
}

#[async_trait]
impl MenuPersistence for FailingStore {
    async fn menu_find_all(&self) -> anyhow::Result<Vec<MenuInfo>> {
        self.inner.menu_find_all().await
    }

    async fn menu_find_by_id(&self, id: i64) -> anyhow::Result<Option<MenuInfo>> {
        self.inner.menu_find_by_id(id).await
    }

    async fn menu_find_by_name(&self, name: &str) -> anyhow::Result<Option<MenuInfo>> {
        self.inner.menu_find_by_name(name).await
    }

    async fn menu_find_list(
        &self,
        query: &MenuQuery,
        sort: &[SortSpec<MenuSortField>],
    ) -> anyhow::Result<Vec<MenuInfo>> {
        self.inner.menu_find_list(query, sort).await
    }

    async fn menu_create(&self, menu: &NewMenu) -> anyhow::Result<MenuInfo> {
        self.inner.menu_create(menu).await
    }

    async fn menu_update(&self, menu: &MenuInfo) -> anyhow::Result<MenuInfo> {
        self.inner.menu_update(menu).await
    }

    async fn menu_delete(&self, ids: &[i64]) -> anyhow::Result<u64> {
        self.inner.menu_delete(ids).await
    }

    async fn menu_set_available(&self, ids: &[i64], available: bool) -> anyhow::Result<u64> {
        if self.fail_set_available {
            return Err(write_failure("menu_set_available"));
        }
        self.inner.menu_set_available(ids, available).await
    }

    async fn menu_find_available_roles(&self, menu_id: i64) -> anyhow::Result<Vec<RoleInfo>> {
        self.inner.menu_find_available_roles(menu_id).await
    }
}

#[async_trait]
impl RolePersistence for FailingStore {
    async fn role_find_by_id(&self, id: i64) -> anyhow::Result<Option<RoleInfo>> {
        self.inner.role_find_by_id(id).await
    }

    async fn role_find_by_ids(&self, ids: &[i64]) -> anyhow::Result<Vec<RoleInfo>> {
        self.inner.role_find_by_ids(ids).await
    }

    async fn role_set_available(&self, ids: &[i64], available: bool) -> anyhow::Result<u64> {
        self.inner.role_set_available(ids, available).await
    }

    async fn role_find_menu_ids(&self, role_id: i64) -> anyhow::Result<Vec<i64>> {
        self.inner.role_find_menu_ids(role_id).await
    }

    async fn role_set_menus(&self, role_id: i64, menu_ids: &[i64]) -> anyhow::Result<()> {
        if self.fail_role_menus == Some(role_id) {
            return Err(write_failure("role_set_menus"));
        }
        self.inner.role_set_menus(role_id, menu_ids).await
    }

    async fn user_find_by_username(&self, username: &str) -> anyhow::Result<Option<UserInfo>> {
        self.inner.user_find_by_username(username).await
    }

    async fn user_find_by_role_ids(&self, role_ids: &[i64]) -> anyhow::Result<Vec<UserInfo>> {
        self.inner.user_find_by_role_ids(role_ids).await
    }

    async fn permission_find_by_username(&self, username: &str) -> anyhow::Result<Vec<String>> {
        self.inner.permission_find_by_username(username).await
    }
}
