//! Main entry point for the Warden RBAC administration server.
//!
//! Loads configuration, sets up logging, opens the configured persistence
//! backend and serves the console API.

use std::sync::Arc;

use tracing::info;
use warden_auth::MokaPermissionCache;
use warden_persistence::{
    ExternalDbPersistService, MemoryPersistService, PersistenceService, StorageMode,
};
use warden_server::{
    model::{AppState, Configuration},
    startup,
};

#[actix_web::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let configuration = Configuration::new()?;

    let logging_config = configuration.logging_config();
    let _logging_guard = startup::init_logging(&logging_config)?;

    let server_address = configuration.server_address();
    let server_port = configuration.server_port();
    let context_path = configuration.server_context_path();

    let storage_mode = configuration.storage_mode()?;
    info!("Persistence mode: {}", storage_mode);

    let persistence: Arc<dyn PersistenceService> = match storage_mode {
        StorageMode::ExternalDb => {
            let db = configuration.database_connection().await?;
            Arc::new(ExternalDbPersistService::new(db))
        }
        StorageMode::Memory => Arc::new(MemoryPersistService::new()),
    };

    let permission_cache = Arc::new(MokaPermissionCache::new(
        configuration.permission_cache_max_capacity(),
        configuration.permission_cache_ttl(),
    ));

    if !configuration.auth_enabled() {
        info!("Authorization is disabled, console endpoints are open");
    }

    let app_state = Arc::new(AppState {
        configuration,
        persistence,
        permission_cache,
    });

    info!(
        address = %server_address,
        port = server_port,
        context_path = %context_path,
        "Starting console server"
    );

    startup::console_server(app_state, context_path, server_address, server_port)?.await?;

    Ok(())
}
