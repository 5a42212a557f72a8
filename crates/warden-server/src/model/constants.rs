//! Server configuration keys and defaults

pub const SERVER_ADDRESS_PROPERTY: &str = "server.address";
pub const SERVER_PORT_PROPERTY: &str = "server.port";
pub const SERVER_CONTEXT_PATH_PROPERTY: &str = "server.contextPath";

pub const DEFAULT_SERVER_ADDRESS: &str = "0.0.0.0";
pub const DEFAULT_SERVER_PORT: u16 = 8080;
pub const DEFAULT_CONTEXT_PATH: &str = "warden";

pub const STORAGE_MODE_PROPERTY: &str = "warden.storage.mode";
pub const DB_URL_PROPERTY: &str = "db.url";

pub const AUTH_ENABLED_PROPERTY: &str = "warden.auth.enabled";

pub const PERMISSION_CACHE_TTL_PROPERTY: &str = "warden.cache.permission.ttlSeconds";
pub const PERMISSION_CACHE_MAX_CAPACITY_PROPERTY: &str = "warden.cache.permission.maxCapacity";

pub const LOGS_PATH_PROPERTY: &str = "warden.logs.path";
pub const LOGS_LEVEL_PROPERTY: &str = "warden.logs.level";
pub const LOGS_CONSOLE_PROPERTY: &str = "warden.logs.console";
pub const LOGS_FILE_PROPERTY: &str = "warden.logs.file";

/// Header carrying the username authenticated by the upstream gateway
pub const IDENTITY_HEADER: &str = "X-Warden-User";

pub const DEFAULT_CONFIG_FILE: &str = "conf/application.yml";
