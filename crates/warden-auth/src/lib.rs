//! Warden Auth - Menu hierarchy and permission management
//!
//! This crate provides:
//! - Hierarchy index building and closure resolution over menus
//! - Menu and role services with availability propagation
//! - Permission cache and invalidation fan-out

pub mod model;
pub mod service;

// Re-export commonly used types
pub use model::*;
pub use service::permission::{MokaPermissionCache, PermissionCache, PermissionSet};
