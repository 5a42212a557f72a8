//! Menu service
//!
//! Menu CRUD with availability propagation through the hierarchy and
//! permission cache invalidation after relevant changes.

use std::collections::{BTreeSet, HashMap};

use tracing::{debug, error, info, warn};

use warden_common::{SortSpec, WardenError, is_valid_permission};
use warden_persistence::model::{MenuInfo, MenuQuery, MenuSortField, NewMenu};
use warden_persistence::traits::{MenuPersistence, PersistenceService};

use crate::model::{InvalidationReport, MenuTreeNode, MenuUpdate};
use crate::service::hierarchy::{ancestors_of, child_id_map, descendants_of, parent_id_map};
use crate::service::permission::{
    PermissionCache, invalidate_permissions_for_menu, refresh_users, roles_containing_menu,
    users_with_any_role,
};

/// Apply `available` to `requested_ids` and their closure in one bulk write.
///
/// Enabling a menu enables every ancestor up to its root, disabling a menu
/// disables its whole subtree. Returns the ids that were written.
pub async fn propagate_availability(
    store: &dyn MenuPersistence,
    requested_ids: &[i64],
    available: bool,
    snapshot: &[MenuInfo],
) -> anyhow::Result<BTreeSet<i64>> {
    let affected: BTreeSet<i64> = if available {
        let parents = parent_id_map(snapshot);
        requested_ids
            .iter()
            .flat_map(|id| ancestors_of(*id, &parents))
            .collect()
    } else {
        let children = child_id_map(snapshot);
        requested_ids
            .iter()
            .flat_map(|id| descendants_of(*id, &children))
            .collect()
    };

    if affected.is_empty() {
        return Ok(affected);
    }

    let ids: Vec<i64> = affected.iter().copied().collect();
    let updated = store.menu_set_available(&ids, available).await?;
    debug!(?requested_ids, available, updated, "Propagated menu availability");

    Ok(affected)
}

/// Load a fresh snapshot and propagate availability over it
pub async fn set_menu_available(
    store: &dyn MenuPersistence,
    ids: &[i64],
    available: bool,
) -> anyhow::Result<BTreeSet<i64>> {
    let snapshot = store.menu_find_all().await?;
    propagate_availability(store, ids, available, &snapshot).await
}

/// Whether an update can change anyone's effective permissions
pub fn detect_relevant_change(old: &MenuInfo, new: &MenuInfo) -> bool {
    old.permission != new.permission || old.available != new.available
}

pub async fn get_menu_detail(store: &dyn MenuPersistence, id: i64) -> anyhow::Result<MenuInfo> {
    store
        .menu_find_by_id(id)
        .await?
        .ok_or_else(|| WardenError::MenuNotExist(id).into())
}

pub async fn list_menus(
    store: &dyn MenuPersistence,
    query: &MenuQuery,
    sort: &[SortSpec<MenuSortField>],
) -> anyhow::Result<Vec<MenuInfo>> {
    if sort.is_empty() {
        return store
            .menu_find_list(query, &[SortSpec::asc(MenuSortField::Order)])
            .await;
    }
    store.menu_find_list(query, sort).await
}

/// Nest menus under their parents.
///
/// A menu whose parent is not part of `menus` becomes a root. Siblings keep
/// their input order.
pub fn build_menu_tree(menus: Vec<MenuInfo>) -> Vec<MenuTreeNode> {
    let present: BTreeSet<i64> = menus.iter().map(|m| m.id).collect();
    let mut children: HashMap<i64, Vec<MenuInfo>> = HashMap::new();
    let mut roots = Vec::new();

    for menu in menus {
        match menu.parent_id {
            Some(parent_id) if parent_id != menu.id && present.contains(&parent_id) => {
                children.entry(parent_id).or_default().push(menu)
            }
            _ => roots.push(menu),
        }
    }

    let mut visited = BTreeSet::new();
    roots
        .into_iter()
        .map(|menu| attach_children(menu, &mut children, &mut visited))
        .collect()
}

fn attach_children(
    menu: MenuInfo,
    children: &mut HashMap<i64, Vec<MenuInfo>>,
    visited: &mut BTreeSet<i64>,
) -> MenuTreeNode {
    let mut node = MenuTreeNode::from(menu);
    if !visited.insert(node.menu.id) {
        return node;
    }
    if let Some(direct) = children.remove(&node.menu.id) {
        node.children = direct
            .into_iter()
            .map(|child| attach_children(child, children, visited))
            .collect();
    }
    node
}

async fn ensure_parent_exists(
    store: &dyn MenuPersistence,
    parent_id: Option<i64>,
) -> anyhow::Result<()> {
    if let Some(parent_id) = parent_id
        && store.menu_find_by_id(parent_id).await?.is_none()
    {
        return Err(WardenError::IllegalArgument(format!(
            "parent menu '{}' not exist",
            parent_id
        ))
        .into());
    }
    Ok(())
}

/// Reject a blank name or a malformed permission string
fn validate_menu_fields(name: &str, permission: Option<&str>) -> Result<(), WardenError> {
    if name.trim().is_empty() {
        return Err(WardenError::IllegalArgument("menu name is required".to_string()));
    }
    if let Some(permission) = permission.filter(|p| !p.is_empty())
        && !is_valid_permission(permission)
    {
        return Err(WardenError::IllegalArgument(format!(
            "menu permission '{}' is malformed",
            permission
        )));
    }
    Ok(())
}

pub async fn create_menu(store: &dyn MenuPersistence, menu: NewMenu) -> anyhow::Result<MenuInfo> {
    validate_menu_fields(&menu.name, menu.permission.as_deref())?;
    if store.menu_find_by_name(&menu.name).await?.is_some() {
        return Err(WardenError::IllegalArgument(format!(
            "menu '{}' already exist",
            menu.name
        ))
        .into());
    }
    ensure_parent_exists(store, menu.parent_id).await?;

    let created = store.menu_create(&menu).await?;
    info!(id = created.id, name = %created.name, "Created menu");

    get_menu_detail(store, created.id).await
}

/// Update a menu, propagate its availability and refresh affected caches.
///
/// Only the updated menu's own roles are considered for invalidation. Cache
/// refresh is best effort and never fails the update.
pub async fn update_menu(
    store: &dyn PersistenceService,
    cache: &dyn PermissionCache,
    update: MenuUpdate,
) -> anyhow::Result<MenuInfo> {
    validate_menu_fields(&update.name, update.permission.as_deref())?;
    let old = get_menu_detail(store, update.id).await?;

    if let Some(existing) = store.menu_find_by_name(&update.name).await?
        && existing.id != update.id
    {
        return Err(WardenError::IllegalArgument(format!(
            "menu name '{}' is duplicated",
            update.name
        ))
        .into());
    }

    if let Some(parent_id) = update.parent_id {
        ensure_parent_exists(store, Some(parent_id)).await?;

        let snapshot = store.menu_find_all().await?;
        if descendants_of(update.id, &child_id_map(&snapshot)).contains(&parent_id) {
            return Err(WardenError::IllegalArgument(format!(
                "menu '{}' can not be moved under itself or its descendant '{}'",
                update.id, parent_id
            ))
            .into());
        }
    }

    let new: MenuInfo = update.into();
    store.menu_update(&new).await?;

    // the row is committed, so the cache follows it even if propagation fails
    let propagated = set_menu_available(store, &[new.id], new.available).await;

    if detect_relevant_change(&old, &new) {
        let report = invalidate_permissions_for_menu(store, cache, new.id).await;
        if !report.failed.is_empty() {
            warn!(menu_id = new.id, failed = ?report.failed, "Some user permissions are stale");
        }
    }

    if let Err(e) = propagated {
        error!(menu_id = new.id, error = %e, "Failed to propagate menu availability");
        return Err(e);
    }

    get_menu_detail(store, new.id).await
}

/// Delete a menu and refresh the users who lost access through it
pub async fn delete_menu(
    store: &dyn PersistenceService,
    cache: &dyn PermissionCache,
    id: i64,
) -> anyhow::Result<InvalidationReport> {
    let menu = get_menu_detail(store, id).await?;

    // resolved before the role links are removed with the menu
    let role_ids = roles_containing_menu(store, id).await?;
    let users = users_with_any_role(store, &role_ids).await?;

    store.menu_delete(&[id]).await?;
    info!(id, name = %menu.name, "Deleted menu");

    Ok(refresh_users(store, cache, &role_ids, &users).await)
}
