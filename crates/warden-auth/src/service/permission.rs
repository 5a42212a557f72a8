//! Permission service
//!
//! Effective permission computation, the per-user permission cache and the
//! invalidation fan-out run after menu and role changes.

use std::collections::BTreeSet;
use std::time::Duration;

use async_trait::async_trait;
use futures::future::join_all;
use moka::future::Cache;
use tracing::{debug, error, info, warn};

use warden_common::SUPER_PERMISSION;
use warden_persistence::model::UserInfo;
use warden_persistence::traits::PersistenceService;

use crate::model::InvalidationReport;

/// A user's effective permission strings
pub type PermissionSet = BTreeSet<String>;

pub const DEFAULT_CACHE_MAX_CAPACITY: u64 = 10_000;
pub const DEFAULT_CACHE_TTL_SECONDS: u64 = 300;

/// Per-user permission cache keyed by username
#[async_trait]
pub trait PermissionCache: Send + Sync {
    async fn get(&self, username: &str) -> Option<PermissionSet>;

    /// Overwrite the entry for `username`
    async fn put(&self, username: &str, permissions: PermissionSet) -> anyhow::Result<()>;

    async fn invalidate(&self, username: &str);
}

/// Permission cache backed by `moka`, entries expire after the configured TTL
#[derive(Clone)]
pub struct MokaPermissionCache {
    inner: Cache<String, PermissionSet>,
}

impl MokaPermissionCache {
    pub fn new(max_capacity: u64, ttl: Duration) -> Self {
        Self {
            inner: Cache::builder()
                .max_capacity(max_capacity)
                .time_to_live(ttl)
                .build(),
        }
    }

    pub fn entry_count(&self) -> u64 {
        self.inner.entry_count()
    }
}

impl Default for MokaPermissionCache {
    fn default() -> Self {
        Self::new(
            DEFAULT_CACHE_MAX_CAPACITY,
            Duration::from_secs(DEFAULT_CACHE_TTL_SECONDS),
        )
    }
}

#[async_trait]
impl PermissionCache for MokaPermissionCache {
    async fn get(&self, username: &str) -> Option<PermissionSet> {
        self.inner.get(username).await
    }

    async fn put(&self, username: &str, permissions: PermissionSet) -> anyhow::Result<()> {
        self.inner.insert(username.to_string(), permissions).await;
        Ok(())
    }

    async fn invalidate(&self, username: &str) {
        self.inner.invalidate(username).await;
    }
}

/// Permissions granted to `user` by the store right now.
///
/// Disabled users get nothing, superusers get the wildcard permission only.
/// Blank permission strings are dropped.
pub async fn compute_effective_permissions(
    store: &dyn PersistenceService,
    user: &UserInfo,
) -> anyhow::Result<PermissionSet> {
    if !user.available {
        return Ok(PermissionSet::new());
    }
    if user.is_superuser {
        return Ok(PermissionSet::from([SUPER_PERMISSION.to_string()]));
    }

    let permissions = store
        .permission_find_by_username(&user.username)
        .await?
        .into_iter()
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .collect();

    Ok(permissions)
}

/// Recompute and overwrite the cache entry of one user
pub async fn refresh_user_permissions(
    store: &dyn PersistenceService,
    cache: &dyn PermissionCache,
    user: &UserInfo,
) -> anyhow::Result<usize> {
    let permissions = compute_effective_permissions(store, user).await?;
    let count = permissions.len();
    cache.put(&user.username, permissions).await?;

    debug!(username = %user.username, permissions = count, "Refreshed user permissions");
    Ok(count)
}

/// Ids of the available roles whose menu set contains `menu_id`
pub async fn roles_containing_menu(
    store: &dyn PersistenceService,
    menu_id: i64,
) -> anyhow::Result<BTreeSet<i64>> {
    let roles = store.menu_find_available_roles(menu_id).await?;
    Ok(roles.into_iter().map(|r| r.id).collect())
}

/// Users holding at least one of `role_ids`, each listed once
pub async fn users_with_any_role(
    store: &dyn PersistenceService,
    role_ids: &BTreeSet<i64>,
) -> anyhow::Result<Vec<UserInfo>> {
    if role_ids.is_empty() {
        return Ok(vec![]);
    }

    let ids: Vec<i64> = role_ids.iter().copied().collect();
    let mut seen = BTreeSet::new();
    let users = store
        .user_find_by_role_ids(&ids)
        .await?
        .into_iter()
        .filter(|u| seen.insert(u.id))
        .collect();

    Ok(users)
}

/// Refresh every listed user concurrently. Failures are logged and counted,
/// they never stop the other refreshes.
pub async fn refresh_users(
    store: &dyn PersistenceService,
    cache: &dyn PermissionCache,
    role_ids: &BTreeSet<i64>,
    users: &[UserInfo],
) -> InvalidationReport {
    let results = join_all(
        users
            .iter()
            .map(|user| refresh_user_permissions(store, cache, user)),
    )
    .await;

    let mut report = InvalidationReport {
        roles: role_ids.iter().copied().collect(),
        users: users.iter().map(|u| u.username.clone()).collect(),
        ..Default::default()
    };

    for (user, result) in users.iter().zip(results) {
        match result {
            Ok(_) => report.refreshed += 1,
            Err(e) => {
                warn!(username = %user.username, error = %e, "Failed to refresh user permissions");
                report.failed.push(user.username.clone());
            }
        }
    }

    report
}

/// Refresh the cache of every user whose permissions may depend on `menu_id`.
///
/// Best effort: resolution errors yield an empty report, per-user errors are
/// reported in `failed`.
pub async fn invalidate_permissions_for_menu(
    store: &dyn PersistenceService,
    cache: &dyn PermissionCache,
    menu_id: i64,
) -> InvalidationReport {
    let role_ids = match roles_containing_menu(store, menu_id).await {
        Ok(ids) => ids,
        Err(e) => {
            error!(menu_id, error = %e, "Failed to resolve roles for menu");
            return InvalidationReport::default();
        }
    };

    if role_ids.is_empty() {
        debug!(menu_id, "No available role contains menu, nothing to invalidate");
        return InvalidationReport::default();
    }

    let users = match users_with_any_role(store, &role_ids).await {
        Ok(users) => users,
        Err(e) => {
            error!(menu_id, error = %e, "Failed to resolve users for menu");
            return InvalidationReport::default();
        }
    };

    let report = refresh_users(store, cache, &role_ids, &users).await;
    info!(
        menu_id,
        roles = report.roles.len(),
        users = report.users.len(),
        refreshed = report.refreshed,
        failed = report.failed.len(),
        "Refreshed permissions of users affected by menu change"
    );
    report
}

/// Refresh the cache of every user holding any of `role_ids`, whether or not
/// the roles are currently available.
pub async fn invalidate_permissions_for_roles(
    store: &dyn PersistenceService,
    cache: &dyn PermissionCache,
    role_ids: &[i64],
) -> InvalidationReport {
    let role_ids: BTreeSet<i64> = role_ids.iter().copied().collect();

    let users = match users_with_any_role(store, &role_ids).await {
        Ok(users) => users,
        Err(e) => {
            error!(?role_ids, error = %e, "Failed to resolve users for roles");
            return InvalidationReport::default();
        }
    };

    let report = refresh_users(store, cache, &role_ids, &users).await;
    info!(
        roles = report.roles.len(),
        users = report.users.len(),
        refreshed = report.refreshed,
        failed = report.failed.len(),
        "Refreshed permissions of users affected by role change"
    );
    report
}

/// Effective permissions of `username`, served from the cache when present.
///
/// Returns `None` for an unknown user.
pub async fn find_permissions(
    store: &dyn PersistenceService,
    cache: &dyn PermissionCache,
    username: &str,
) -> anyhow::Result<Option<PermissionSet>> {
    if let Some(cached) = cache.get(username).await {
        return Ok(Some(cached));
    }

    let Some(user) = store.user_find_by_username(username).await? else {
        return Ok(None);
    };

    let permissions = compute_effective_permissions(store, &user).await?;
    if let Err(e) = cache.put(username, permissions.clone()).await {
        warn!(username, error = %e, "Failed to cache user permissions");
    }

    Ok(Some(permissions))
}

pub async fn has_permission(
    store: &dyn PersistenceService,
    cache: &dyn PermissionCache,
    username: &str,
    required: &str,
) -> anyhow::Result<bool> {
    let granted = find_permissions(store, cache, username)
        .await?
        .is_some_and(|set| set.contains(SUPER_PERMISSION) || set.contains(required));

    Ok(granted)
}

#[cfg(test)]
mod tests {
    use warden_persistence::traits::RolePersistence;

    use super::*;
    use crate::service::testing::{Fixture, RecordingCache};

    #[tokio::test]
    async fn test_moka_cache_overwrite_and_invalidate() {
        let cache = MokaPermissionCache::default();
        assert!(cache.get("alice").await.is_none());

        cache
            .put("alice", PermissionSet::from(["a:b".to_string()]))
            .await
            .unwrap();
        cache
            .put("alice", PermissionSet::from(["c:d".to_string()]))
            .await
            .unwrap();
        assert_eq!(
            cache.get("alice").await,
            Some(PermissionSet::from(["c:d".to_string()]))
        );

        cache.invalidate("alice").await;
        assert!(cache.get("alice").await.is_none());
    }

    #[tokio::test]
    async fn test_superuser_gets_wildcard() {
        let fixture = Fixture::new().await;
        let admin = fixture.store.insert_user("admin", true);

        let permissions = compute_effective_permissions(&fixture.store, &admin)
            .await
            .unwrap();
        assert_eq!(permissions, PermissionSet::from([SUPER_PERMISSION.to_string()]));
    }

    #[tokio::test]
    async fn test_disabled_user_gets_nothing() {
        let fixture = Fixture::new().await;
        let mut alice = fixture
            .store
            .user_find_by_username("alice")
            .await
            .unwrap()
            .unwrap();
        assert!(
            !compute_effective_permissions(&fixture.store, &alice)
                .await
                .unwrap()
                .is_empty()
        );

        alice.available = false;
        let permissions = compute_effective_permissions(&fixture.store, &alice)
            .await
            .unwrap();
        assert!(permissions.is_empty());

        let mut admin = fixture.store.insert_user("admin", true);
        admin.available = false;
        assert!(
            compute_effective_permissions(&fixture.store, &admin)
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn test_invalidate_for_menu_refreshes_role_users() {
        let fixture = Fixture::new().await;
        let cache = RecordingCache::default();

        let report = invalidate_permissions_for_menu(&fixture.store, &cache, fixture.report).await;

        assert_eq!(report.roles, vec![fixture.analyst]);
        assert_eq!(report.users, vec!["alice".to_string()]);
        assert_eq!(report.refreshed, 1);
        assert!(report.failed.is_empty());
        assert_eq!(
            cache.written_for("alice"),
            vec![PermissionSet::from(["report:view".to_string()])]
        );
        assert!(cache.written_for("bob").is_empty());
    }

    #[tokio::test]
    async fn test_invalidate_skips_menu_without_roles() {
        let fixture = Fixture::new().await;
        let cache = RecordingCache::default();

        let report = invalidate_permissions_for_menu(&fixture.store, &cache, fixture.system).await;

        assert!(report.is_empty());
        assert_eq!(cache.write_count(), 0);
    }

    #[tokio::test]
    async fn test_failed_write_does_not_stop_others() {
        let fixture = Fixture::new().await;
        let carol = fixture.store.insert_user("carol", false);
        fixture.store.assign_user_roles(carol.id, &[fixture.analyst]);
        let cache = RecordingCache::failing_for(&["alice"]);

        let report = invalidate_permissions_for_menu(&fixture.store, &cache, fixture.report).await;

        assert_eq!(report.users.len(), 2);
        assert_eq!(report.refreshed, 1);
        assert_eq!(report.failed, vec!["alice".to_string()]);
        assert_eq!(cache.written_for("carol").len(), 1);
    }

    #[tokio::test]
    async fn test_has_permission_reads_through() {
        let fixture = Fixture::new().await;
        let cache = RecordingCache::default();

        assert!(
            has_permission(&fixture.store, &cache, "alice", "report:view")
                .await
                .unwrap()
        );
        assert_eq!(cache.write_count(), 1);

        // second check is served from the cache
        assert!(
            !has_permission(&fixture.store, &cache, "alice", "system:menu:update")
                .await
                .unwrap()
        );
        assert_eq!(cache.write_count(), 1);

        assert!(
            !has_permission(&fixture.store, &cache, "nobody", "report:view")
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn test_roles_invalidation_includes_disabled_roles() {
        let fixture = Fixture::new().await;
        let cache = RecordingCache::default();
        fixture
            .store
            .role_set_available(&[fixture.analyst], false)
            .await
            .unwrap();

        let report = invalidate_permissions_for_roles(&fixture.store, &cache, &[fixture.analyst]).await;

        assert_eq!(report.refreshed, 1);
        assert_eq!(cache.written_for("alice"), vec![PermissionSet::new()]);
    }
}
