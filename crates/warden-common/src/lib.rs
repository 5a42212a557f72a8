//! Warden Common - Shared types and utilities
//!
//! This crate provides the foundational types used across all Warden components:
//! - Error types and error codes
//! - Statically validated sort specifications
//! - Permission string constants

pub mod error;
pub mod sort;

// Re-exports for convenience
pub use error::{ErrorCode, WardenError};
pub use sort::{SortDirection, SortField, SortSpec, parse_order_by};

/// Wildcard permission granted to superusers
pub const SUPER_PERMISSION: &str = "*:*:*";

/// Separator between permission segments, e.g. `system:menu:query`
pub const PERMISSION_SEPARATOR: char = ':';

/// Console permission strings guarding the system management endpoints
pub mod permissions {
    pub const MENU_QUERY: &str = "system:menu:query";
    pub const MENU_CREATE: &str = "system:menu:create";
    pub const MENU_UPDATE: &str = "system:menu:update";
    pub const MENU_DELETE: &str = "system:menu:delete";
    pub const MENU_PATCH: &str = "system:menu:patch";
    pub const ROLE_QUERY: &str = "system:role:query";
    pub const ROLE_PATCH: &str = "system:role:patch";
    pub const ROLE_PERMISSION: &str = "system:role:permission";
}

/// Returns true if `permission` is a well formed permission string.
///
/// A permission is one or more non-empty segments separated by `:`.
///
/// ```
/// use warden_common::is_valid_permission;
///
/// assert!(is_valid_permission("system:menu:query"));
/// assert!(is_valid_permission("*:*:*"));
/// assert!(!is_valid_permission("system::query"));
/// assert!(!is_valid_permission(""));
/// ```
pub fn is_valid_permission(permission: &str) -> bool {
    !permission.is_empty()
        && permission
            .split(PERMISSION_SEPARATOR)
            .all(|segment| !segment.is_empty() && !segment.contains(char::is_whitespace))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_valid_permission() {
        assert!(is_valid_permission("report:view"));
        assert!(is_valid_permission(permissions::MENU_UPDATE));
        assert!(is_valid_permission(SUPER_PERMISSION));
        assert!(!is_valid_permission(":view"));
        assert!(!is_valid_permission("report:"));
        assert!(!is_valid_permission("report: view"));
    }
}
