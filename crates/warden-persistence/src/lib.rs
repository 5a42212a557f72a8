//! Warden Persistence - Database entities and persistence layer
//!
//! This crate provides:
//! - SeaORM entity definitions for the system management tables
//! - Persistence trait abstractions for unified storage
//! - Domain model types for persistence operations

pub mod entity;
pub mod memory;
pub mod model;
pub mod sql;
pub mod traits;

// Re-export sea-orm for convenience
pub use sea_orm;

// Re-export entity prelude
pub use entity::prelude::*;

// Re-export persistence traits
pub use traits::{MenuPersistence, PersistenceService, RolePersistence};

// Re-export SQL backend
pub use sql::ExternalDbPersistService;

// Re-export in-memory backend
pub use memory::MemoryPersistService;

// Re-export model types
pub use model::{
    MenuInfo, MenuQuery, MenuSortField, NewMenu, RoleInfo, StorageMode, UserInfo,
};
