// Process-local persistence backend
// Provides standalone storage without an external database, used for
// development deployments and as the store behind service tests.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;
use parking_lot::RwLock;
use warden_common::{SortDirection, SortSpec, WardenError};

use crate::model::{
    MenuInfo, MenuQuery, MenuSortField, NewMenu, RoleInfo, StorageMode, UserInfo,
};
use crate::traits::PersistenceService;
use crate::traits::menu::MenuPersistence;
use crate::traits::role::RolePersistence;

#[derive(Debug, Default)]
struct MemoryState {
    menus: BTreeMap<i64, MenuInfo>,
    roles: BTreeMap<i64, RoleInfo>,
    users: BTreeMap<i64, UserInfo>,
    /// (role_id, menu_id)
    role_menus: BTreeSet<(i64, i64)>,
    /// (user_id, role_id)
    user_roles: BTreeSet<(i64, i64)>,
    next_menu_id: i64,
    next_role_id: i64,
    next_user_id: i64,
}

impl MemoryState {
    fn with_parent_name(&self, mut menu: MenuInfo) -> MenuInfo {
        menu.parent_name = menu
            .parent_id
            .and_then(|id| self.menus.get(&id))
            .map(|p| p.name.clone());
        menu
    }
}

/// In-memory persistence
///
/// All state lives behind a single `RwLock`, so every trait operation is
/// atomic with respect to the others.
#[derive(Debug, Default)]
pub struct MemoryPersistService {
    state: RwLock<MemoryState>,
}

impl MemoryPersistService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a role; used for seeding
    pub fn insert_role(&self, name: &str, code: &str, available: bool) -> RoleInfo {
        let mut state = self.state.write();
        state.next_role_id += 1;
        let role = RoleInfo {
            id: state.next_role_id,
            name: name.to_string(),
            code: code.to_string(),
            available,
            order: state.next_role_id as i32,
            description: None,
        };
        state.roles.insert(role.id, role.clone());
        role
    }

    /// Insert a user; used for seeding
    pub fn insert_user(&self, username: &str, is_superuser: bool) -> UserInfo {
        let mut state = self.state.write();
        state.next_user_id += 1;
        let user = UserInfo {
            id: state.next_user_id,
            username: username.to_string(),
            available: true,
            is_superuser,
        };
        state.users.insert(user.id, user.clone());
        user
    }

    /// Grant roles to a user; used for seeding
    pub fn assign_user_roles(&self, user_id: i64, role_ids: &[i64]) {
        let mut state = self.state.write();
        for role_id in role_ids {
            state.user_roles.insert((user_id, *role_id));
        }
    }

    fn compare(a: &MenuInfo, b: &MenuInfo, sort: &[SortSpec<MenuSortField>]) -> Ordering {
        for spec in sort {
            let ordering = match spec.field {
                MenuSortField::Id => a.id.cmp(&b.id),
                MenuSortField::Name => a.name.cmp(&b.name),
                MenuSortField::Order => a.order.cmp(&b.order),
                MenuSortField::ParentId => a.parent_id.cmp(&b.parent_id),
            };
            let ordering = match spec.direction {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    }
}

#[async_trait]
impl PersistenceService for MemoryPersistService {
    fn storage_mode(&self) -> StorageMode {
        StorageMode::Memory
    }

    async fn health_check(&self) -> anyhow::Result<()> {
        Ok(())
    }
}

#[async_trait]
impl MenuPersistence for MemoryPersistService {
    async fn menu_find_all(&self) -> anyhow::Result<Vec<MenuInfo>> {
        Ok(self.state.read().menus.values().cloned().collect())
    }

    async fn menu_find_by_id(&self, id: i64) -> anyhow::Result<Option<MenuInfo>> {
        let state = self.state.read();
        Ok(state
            .menus
            .get(&id)
            .cloned()
            .map(|m| state.with_parent_name(m)))
    }

    async fn menu_find_by_name(&self, name: &str) -> anyhow::Result<Option<MenuInfo>> {
        Ok(self
            .state
            .read()
            .menus
            .values()
            .find(|m| m.name == name)
            .cloned())
    }

    async fn menu_find_list(
        &self,
        query: &MenuQuery,
        sort: &[SortSpec<MenuSortField>],
    ) -> anyhow::Result<Vec<MenuInfo>> {
        let state = self.state.read();
        let mut menus: Vec<MenuInfo> = state
            .menus
            .values()
            .filter(|m| query.matches(m))
            .cloned()
            .map(|m| state.with_parent_name(m))
            .collect();
        menus.sort_by(|a, b| Self::compare(a, b, sort));
        Ok(menus)
    }

    async fn menu_create(&self, menu: &NewMenu) -> anyhow::Result<MenuInfo> {
        let mut state = self.state.write();
        if state.menus.values().any(|m| m.name == menu.name) {
            return Err(WardenError::DatabaseError(format!(
                "duplicate entry '{}' for key 'sys_menu.name'",
                menu.name
            ))
            .into());
        }

        state.next_menu_id += 1;
        let created = MenuInfo {
            id: state.next_menu_id,
            parent_id: menu.parent_id,
            parent_name: None,
            name: menu.name.clone(),
            permission: menu.permission.clone(),
            available: menu.available,
            order: menu.order,
            route_path: menu.route_path.clone(),
            description: menu.description.clone(),
        };
        state.menus.insert(created.id, created.clone());
        Ok(created)
    }

    async fn menu_update(&self, menu: &MenuInfo) -> anyhow::Result<MenuInfo> {
        let mut state = self.state.write();
        let Some(stored) = state.menus.get_mut(&menu.id) else {
            return Err(WardenError::MenuNotExist(menu.id).into());
        };

        *stored = MenuInfo {
            parent_name: None,
            ..menu.clone()
        };
        Ok(stored.clone())
    }

    async fn menu_delete(&self, ids: &[i64]) -> anyhow::Result<u64> {
        let mut state = self.state.write();
        let mut deleted = 0;
        for id in ids {
            if state.menus.remove(id).is_some() {
                deleted += 1;
            }
        }
        state.role_menus.retain(|(_, menu_id)| !ids.contains(menu_id));
        Ok(deleted)
    }

    async fn menu_set_available(&self, ids: &[i64], available: bool) -> anyhow::Result<u64> {
        let mut state = self.state.write();
        let mut updated = 0;
        for id in ids {
            if let Some(menu) = state.menus.get_mut(id) {
                menu.available = available;
                updated += 1;
            }
        }
        Ok(updated)
    }

    async fn menu_find_available_roles(&self, menu_id: i64) -> anyhow::Result<Vec<RoleInfo>> {
        let state = self.state.read();
        let roles = state
            .role_menus
            .iter()
            .filter(|(_, m)| *m == menu_id)
            .filter_map(|(role_id, _)| state.roles.get(role_id))
            .filter(|r| r.available)
            .cloned()
            .collect();
        Ok(roles)
    }
}

#[async_trait]
impl RolePersistence for MemoryPersistService {
    async fn role_find_by_id(&self, id: i64) -> anyhow::Result<Option<RoleInfo>> {
        Ok(self.state.read().roles.get(&id).cloned())
    }

    async fn role_find_by_ids(&self, ids: &[i64]) -> anyhow::Result<Vec<RoleInfo>> {
        let state = self.state.read();
        let unique: BTreeSet<i64> = ids.iter().copied().collect();
        Ok(unique
            .iter()
            .filter_map(|id| state.roles.get(id))
            .cloned()
            .collect())
    }

    async fn role_set_available(&self, ids: &[i64], available: bool) -> anyhow::Result<u64> {
        let mut state = self.state.write();
        let mut updated = 0;
        for id in ids {
            if let Some(role) = state.roles.get_mut(id) {
                role.available = available;
                updated += 1;
            }
        }
        Ok(updated)
    }

    async fn role_find_menu_ids(&self, role_id: i64) -> anyhow::Result<Vec<i64>> {
        Ok(self
            .state
            .read()
            .role_menus
            .iter()
            .filter(|(r, _)| *r == role_id)
            .map(|(_, menu_id)| *menu_id)
            .collect())
    }

    async fn role_set_menus(&self, role_id: i64, menu_ids: &[i64]) -> anyhow::Result<()> {
        let mut state = self.state.write();
        state.role_menus.retain(|(r, _)| *r != role_id);
        for menu_id in menu_ids {
            state.role_menus.insert((role_id, *menu_id));
        }
        Ok(())
    }

    async fn user_find_by_username(&self, username: &str) -> anyhow::Result<Option<UserInfo>> {
        Ok(self
            .state
            .read()
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn user_find_by_role_ids(&self, role_ids: &[i64]) -> anyhow::Result<Vec<UserInfo>> {
        let state = self.state.read();
        let user_ids: BTreeSet<i64> = state
            .user_roles
            .iter()
            .filter(|(_, role_id)| role_ids.contains(role_id))
            .map(|(user_id, _)| *user_id)
            .collect();
        Ok(user_ids
            .iter()
            .filter_map(|id| state.users.get(id))
            .cloned()
            .collect())
    }

    async fn permission_find_by_username(&self, username: &str) -> anyhow::Result<Vec<String>> {
        let state = self.state.read();
        let Some(user) = state.users.values().find(|u| u.username == username) else {
            return Ok(vec![]);
        };

        let role_ids: BTreeSet<i64> = state
            .user_roles
            .iter()
            .filter(|(user_id, _)| *user_id == user.id)
            .map(|(_, role_id)| *role_id)
            .filter(|role_id| state.roles.get(role_id).is_some_and(|r| r.available))
            .collect();

        let menu_ids: BTreeSet<i64> = state
            .role_menus
            .iter()
            .filter(|(role_id, _)| role_ids.contains(role_id))
            .map(|(_, menu_id)| *menu_id)
            .collect();

        Ok(menu_ids
            .iter()
            .filter_map(|id| state.menus.get(id))
            .filter(|m| m.available)
            .filter_map(|m| m.permission.clone())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_menu(name: &str, parent_id: Option<i64>, permission: Option<&str>) -> NewMenu {
        NewMenu {
            parent_id,
            name: name.to_string(),
            permission: permission.map(str::to_string),
            available: true,
            order: 1,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_menu_crud() {
        let store = MemoryPersistService::new();
        let root = store.menu_create(&new_menu("System", None, None)).await.unwrap();
        let child = store
            .menu_create(&new_menu("Menu", Some(root.id), Some("system:menu:query")))
            .await
            .unwrap();

        let found = store.menu_find_by_id(child.id).await.unwrap().unwrap();
        assert_eq!(found.parent_name.as_deref(), Some("System"));

        assert!(store.menu_create(&new_menu("System", None, None)).await.is_err());

        let mut renamed = found.clone();
        renamed.name = "Menus".to_string();
        store.menu_update(&renamed).await.unwrap();
        assert!(store.menu_find_by_name("Menus").await.unwrap().is_some());

        assert_eq!(store.menu_delete(&[child.id, 999]).await.unwrap(), 1);
        assert!(store.menu_find_by_id(child.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_missing_menu() {
        let store = MemoryPersistService::new();
        let ghost = MenuInfo {
            id: 41,
            parent_id: None,
            parent_name: None,
            name: "Ghost".to_string(),
            permission: None,
            available: true,
            order: 0,
            route_path: None,
            description: None,
        };
        let err = store.menu_update(&ghost).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<WardenError>(),
            Some(WardenError::MenuNotExist(41))
        ));
    }

    #[tokio::test]
    async fn test_menu_list_sort_and_filter() {
        let store = MemoryPersistService::new();
        for (name, order) in [("b", 2), ("a", 3), ("c", 1)] {
            let mut menu = new_menu(name, None, None);
            menu.order = order;
            store.menu_create(&menu).await.unwrap();
        }

        let by_order = store
            .menu_find_list(&MenuQuery::default(), &[SortSpec::asc(MenuSortField::Order)])
            .await
            .unwrap();
        let names: Vec<&str> = by_order.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["c", "b", "a"]);

        let by_name_desc = store
            .menu_find_list(&MenuQuery::default(), &[SortSpec::desc(MenuSortField::Name)])
            .await
            .unwrap();
        let names: Vec<&str> = by_name_desc.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["c", "b", "a"]);

        let filtered = store
            .menu_find_list(
                &MenuQuery {
                    name: Some("a".to_string()),
                    ..Default::default()
                },
                &[],
            )
            .await
            .unwrap();
        assert_eq!(filtered.len(), 1);
    }

    #[tokio::test]
    async fn test_effective_permissions_respect_availability() {
        let store = MemoryPersistService::new();
        let view = store
            .menu_create(&new_menu("View", None, Some("report:view")))
            .await
            .unwrap();
        let export = store
            .menu_create(&new_menu("Export", None, Some("report:export")))
            .await
            .unwrap();
        let active = store.insert_role("Analyst", "analyst", true);
        let disabled = store.insert_role("Auditor", "auditor", false);
        let user = store.insert_user("alice", false);

        store.role_set_menus(active.id, &[view.id]).await.unwrap();
        store.role_set_menus(disabled.id, &[export.id]).await.unwrap();
        store.assign_user_roles(user.id, &[active.id, disabled.id]);

        let permissions = store.permission_find_by_username("alice").await.unwrap();
        assert_eq!(permissions, vec!["report:view".to_string()]);

        store.menu_set_available(&[view.id], false).await.unwrap();
        assert!(store.permission_find_by_username("alice").await.unwrap().is_empty());
        assert!(store.permission_find_by_username("nobody").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_roles_and_users_for_menu() {
        let store = MemoryPersistService::new();
        let menu = store.menu_create(&new_menu("Report", None, None)).await.unwrap();
        let r1 = store.insert_role("R1", "r1", true);
        let r2 = store.insert_role("R2", "r2", false);
        let r3 = store.insert_role("R3", "r3", true);
        store.role_set_menus(r1.id, &[menu.id]).await.unwrap();
        store.role_set_menus(r2.id, &[menu.id]).await.unwrap();

        let roles = store.menu_find_available_roles(menu.id).await.unwrap();
        assert_eq!(roles.iter().map(|r| r.id).collect::<Vec<_>>(), vec![r1.id]);

        let alice = store.insert_user("alice", false);
        let bob = store.insert_user("bob", false);
        store.assign_user_roles(alice.id, &[r1.id, r3.id]);
        store.assign_user_roles(bob.id, &[r3.id]);

        let users = store.user_find_by_role_ids(&[r1.id, r3.id]).await.unwrap();
        assert_eq!(users.len(), 2);

        store.menu_delete(&[menu.id]).await.unwrap();
        assert!(store.role_find_menu_ids(r1.id).await.unwrap().is_empty());
    }
}
