//! Role service
//!
//! Role availability and menu assignment. Both change effective permissions,
//! so the users of the touched roles get their cache entries refreshed.

use tracing::{error, info, warn};

use warden_common::WardenError;
use warden_persistence::traits::PersistenceService;

use crate::model::{InvalidationReport, RoleDetail, RolePermissionSetting};
use crate::service::permission::{PermissionCache, invalidate_permissions_for_roles};

pub async fn get_role_detail(
    store: &dyn PersistenceService,
    id: i64,
) -> anyhow::Result<RoleDetail> {
    let role = store
        .role_find_by_id(id)
        .await?
        .ok_or(WardenError::RoleNotExist(id))?;
    let menu_ids = store.role_find_menu_ids(id).await?;

    Ok(RoleDetail { role, menu_ids })
}

pub async fn set_role_available(
    store: &dyn PersistenceService,
    cache: &dyn PermissionCache,
    ids: &[i64],
    available: bool,
) -> anyhow::Result<InvalidationReport> {
    if ids.is_empty() {
        return Ok(InvalidationReport::default());
    }

    let updated = store.role_set_available(ids, available).await?;
    info!(?ids, available, updated, "Updated role availability");

    Ok(invalidate_permissions_for_roles(store, cache, ids).await)
}

/// Replace the menu set of every listed role, then refresh their users
pub async fn set_role_permission(
    store: &dyn PersistenceService,
    cache: &dyn PermissionCache,
    setting: RolePermissionSetting,
) -> anyhow::Result<InvalidationReport> {
    if setting.role_ids.is_empty() {
        return Err(WardenError::IllegalArgument("role ids are required".to_string()).into());
    }

    let roles = store.role_find_by_ids(&setting.role_ids).await?;
    if let Some(missing) = setting
        .role_ids
        .iter()
        .find(|id| !roles.iter().any(|r| r.id == **id))
    {
        return Err(WardenError::RoleNotExist(*missing).into());
    }

    let mut written = Vec::with_capacity(roles.len());
    for role in &roles {
        if let Err(e) = store.role_set_menus(role.id, &setting.menu_ids).await {
            error!(role_id = role.id, error = %e, "Failed to assign menus to role");
            // earlier roles are committed, their users must not keep stale entries
            let report = invalidate_permissions_for_roles(store, cache, &written).await;
            warn!(
                roles = ?written,
                refreshed = report.refreshed,
                "Refreshed users of roles written before the failure"
            );
            return Err(e);
        }
        info!(role_id = role.id, menus = setting.menu_ids.len(), "Assigned menus to role");
        written.push(role.id);
    }

    Ok(invalidate_permissions_for_roles(store, cache, &setting.role_ids).await)
}
