//! Application state management
//!
//! This module defines the central application state shared across all handlers.

use std::sync::Arc;

use warden_auth::PermissionCache;
use warden_persistence::PersistenceService;

use super::config::Configuration;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub configuration: Configuration,
    /// Unified persistence service (SQL or in-memory)
    pub persistence: Arc<dyn PersistenceService>,
    /// Per-user effective permission cache
    pub permission_cache: Arc<dyn PermissionCache>,
}

impl AppState {
    pub fn persistence(&self) -> &dyn PersistenceService {
        self.persistence.as_ref()
    }

    pub fn permission_cache(&self) -> &dyn PermissionCache {
        self.permission_cache.as_ref()
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("configuration", &self.configuration)
            .field("storage_mode", &self.persistence.storage_mode())
            .field("permission_cache", &"<dyn PermissionCache>")
            .finish()
    }
}
