//! Configuration management for Warden server
//!
//! Settings are layered from `conf/application.yml`, `WARDEN_` prefixed
//! environment variables and command line overrides, in that order.

use std::time::Duration;

use clap::Parser;
use config::{Config, Environment, File};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};

use warden_auth::service::permission::{DEFAULT_CACHE_MAX_CAPACITY, DEFAULT_CACHE_TTL_SECONDS};
use warden_persistence::StorageMode;

use super::constants::{
    AUTH_ENABLED_PROPERTY, DB_URL_PROPERTY, DEFAULT_CONFIG_FILE, DEFAULT_CONTEXT_PATH,
    DEFAULT_SERVER_ADDRESS, DEFAULT_SERVER_PORT, LOGS_CONSOLE_PROPERTY, LOGS_FILE_PROPERTY,
    LOGS_LEVEL_PROPERTY, LOGS_PATH_PROPERTY, PERMISSION_CACHE_MAX_CAPACITY_PROPERTY,
    PERMISSION_CACHE_TTL_PROPERTY, SERVER_ADDRESS_PROPERTY, SERVER_CONTEXT_PATH_PROPERTY,
    SERVER_PORT_PROPERTY, STORAGE_MODE_PROPERTY,
};
use crate::startup::LoggingConfig;

/// Command line arguments for the server
#[derive(Debug, Parser)]
#[command(version, about)]
pub struct Cli {
    /// Configuration file
    #[arg(short = 'c', long = "config", default_value = DEFAULT_CONFIG_FILE)]
    pub config_file: String,
    /// Storage backend: external_db or memory
    #[arg(short = 's', long = "storage")]
    pub storage: Option<String>,
    #[arg(long = "db-url", env = "DATABASE_URL")]
    pub database_url: Option<String>,
    #[arg(short = 'p', long = "port")]
    pub port: Option<u16>,
}

/// Application configuration loaded from config files and environment
#[derive(Clone, Debug, Default)]
pub struct Configuration {
    pub config: Config,
}

impl Configuration {
    /// Load configuration using the process arguments
    pub fn new() -> anyhow::Result<Self> {
        Self::from_cli(Cli::parse())
    }

    pub fn from_cli(args: Cli) -> anyhow::Result<Self> {
        let mut config_builder = Config::builder()
            .add_source(File::with_name(&args.config_file).required(false))
            .add_source(
                Environment::with_prefix("WARDEN")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        if let Some(v) = args.storage {
            config_builder = config_builder.set_override(STORAGE_MODE_PROPERTY, v)?;
        }
        if let Some(v) = args.database_url {
            config_builder = config_builder.set_override(DB_URL_PROPERTY, v)?;
        }
        if let Some(v) = args.port {
            config_builder = config_builder.set_override(SERVER_PORT_PROPERTY, i64::from(v))?;
        }

        let config = config_builder.build().map_err(|e| {
            anyhow::anyhow!(
                "Failed to build configuration - check {}: {}",
                args.config_file,
                e
            )
        })?;

        Ok(Self::from_config(config))
    }

    pub fn from_config(config: Config) -> Self {
        Configuration { config }
    }

    // ========================================================================
    // Server Configuration
    // ========================================================================

    pub fn server_address(&self) -> String {
        self.config
            .get_string(SERVER_ADDRESS_PROPERTY)
            .unwrap_or(DEFAULT_SERVER_ADDRESS.to_string())
    }

    pub fn server_port(&self) -> u16 {
        self.config
            .get_int(SERVER_PORT_PROPERTY)
            .ok()
            .and_then(|v| u16::try_from(v).ok())
            .unwrap_or(DEFAULT_SERVER_PORT)
    }

    /// Context path normalized to a leading slash, e.g. `/warden`
    pub fn server_context_path(&self) -> String {
        let path = self
            .config
            .get_string(SERVER_CONTEXT_PATH_PROPERTY)
            .unwrap_or(DEFAULT_CONTEXT_PATH.to_string());

        format!("/{}", path.trim_matches('/'))
    }

    // ========================================================================
    // Auth & Cache Configuration
    // ========================================================================

    pub fn auth_enabled(&self) -> bool {
        self.config.get_bool(AUTH_ENABLED_PROPERTY).unwrap_or(true)
    }

    pub fn permission_cache_ttl(&self) -> Duration {
        let seconds = self
            .config
            .get_int(PERMISSION_CACHE_TTL_PROPERTY)
            .ok()
            .and_then(|v| u64::try_from(v).ok())
            .unwrap_or(DEFAULT_CACHE_TTL_SECONDS);

        Duration::from_secs(seconds)
    }

    pub fn permission_cache_max_capacity(&self) -> u64 {
        self.config
            .get_int(PERMISSION_CACHE_MAX_CAPACITY_PROPERTY)
            .ok()
            .and_then(|v| u64::try_from(v).ok())
            .unwrap_or(DEFAULT_CACHE_MAX_CAPACITY)
    }

    // ========================================================================
    // Logging Configuration
    // ========================================================================

    pub fn logging_config(&self) -> LoggingConfig {
        LoggingConfig::from_config(
            self.config.get_string(LOGS_PATH_PROPERTY).ok(),
            self.config.get_bool(LOGS_CONSOLE_PROPERTY).unwrap_or(true),
            self.config.get_bool(LOGS_FILE_PROPERTY).unwrap_or(true),
            self.config
                .get_string(LOGS_LEVEL_PROPERTY)
                .unwrap_or("info".to_string()),
        )
    }

    // ========================================================================
    // Persistence Configuration
    // ========================================================================

    pub fn storage_mode(&self) -> anyhow::Result<StorageMode> {
        match self.config.get_string(STORAGE_MODE_PROPERTY) {
            Ok(mode) => mode.parse().map_err(anyhow::Error::msg),
            Err(_) => Ok(StorageMode::ExternalDb),
        }
    }

    pub async fn database_connection(&self) -> anyhow::Result<DatabaseConnection> {
        let max_connections = self
            .config
            .get_int("db.pool.config.maximumPoolSize")
            .unwrap_or(20) as u32;
        let min_connections = self
            .config
            .get_int("db.pool.config.minimumPoolSize")
            .unwrap_or(1) as u32;
        let connect_timeout = self
            .config
            .get_int("db.pool.config.connectionTimeout")
            .unwrap_or(30) as u64;
        let idle_timeout = self
            .config
            .get_int("db.pool.config.idleTimeout")
            .unwrap_or(10) as u64;
        let max_lifetime = self
            .config
            .get_int("db.pool.config.maxLifetime")
            .unwrap_or(1800) as u64;
        let sqlx_logging = self
            .config
            .get_bool("db.pool.config.sqlxLogging")
            .unwrap_or(false);

        let url = self.config.get_string(DB_URL_PROPERTY)?;

        let mut opt = ConnectOptions::new(url);

        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(connect_timeout))
            .idle_timeout(Duration::from_secs(idle_timeout))
            .max_lifetime(Duration::from_secs(max_lifetime))
            .sqlx_logging(sqlx_logging);

        tracing::info!(
            max_connections = max_connections,
            min_connections = min_connections,
            connect_timeout = connect_timeout,
            idle_timeout = idle_timeout,
            max_lifetime = max_lifetime,
            sqlx_logging = sqlx_logging,
            "Database connection pool configured"
        );

        let database_connection: DatabaseConnection = Database::connect(opt).await?;

        Ok(database_connection)
    }
}
