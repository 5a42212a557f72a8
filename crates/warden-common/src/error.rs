//! Error types and error codes for Warden
//!
//! This module defines:
//! - `WardenError`: Application-specific error enum
//! - `ErrorCode`: Structured error codes for API responses

use serde::{Deserialize, Serialize};

/// Application-specific error types
#[derive(thiserror::Error, Debug)]
pub enum WardenError {
    #[error("caused: {0}")]
    IllegalArgument(String),

    #[error("menu '{0}' not exist!")]
    MenuNotExist(i64),

    #[error("role '{0}' not exist!")]
    RoleNotExist(i64),

    #[error("authentication error: {0}")]
    AuthError(String),

    #[error("{0}")]
    AccessDenied(String),

    #[error("database error: {0}")]
    DatabaseError(String),
}

impl WardenError {
    /// True for the not-found family of errors
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            WardenError::MenuNotExist(_) | WardenError::RoleNotExist(_)
        )
    }
}

/// Error code structure for API responses
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ErrorCode<'a> {
    pub code: i32,
    pub message: &'a str,
}

// General success and error codes
pub const SUCCESS: ErrorCode<'static> = ErrorCode {
    code: 0,
    message: "success",
};

pub const PARAMETER_MISSING: ErrorCode<'static> = ErrorCode {
    code: 10000,
    message: "parameter missing",
};

pub const ACCESS_DENIED: ErrorCode<'static> = ErrorCode {
    code: 10001,
    message: "access denied",
};

pub const DATA_ACCESS_ERROR: ErrorCode<'static> = ErrorCode {
    code: 10002,
    message: "data access error",
};

pub const PARAMETER_VALIDATE_ERROR: ErrorCode<'static> = ErrorCode {
    code: 20002,
    message: "parameter validate error",
};

pub const RESOURCE_NOT_FOUND: ErrorCode<'static> = ErrorCode {
    code: 20004,
    message: "resource not found",
};

pub const RESOURCE_CONFLICT: ErrorCode<'static> = ErrorCode {
    code: 20005,
    message: "resource conflict",
};

pub const MENU_NOT_EXIST: ErrorCode<'static> = ErrorCode {
    code: 24000,
    message: "menu not exist",
};

pub const ROLE_NOT_EXIST: ErrorCode<'static> = ErrorCode {
    code: 24001,
    message: "role not exist",
};

pub const SERVER_ERROR: ErrorCode<'static> = ErrorCode {
    code: 30000,
    message: "server error",
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warden_error_display() {
        let err = WardenError::IllegalArgument("invalid param".to_string());
        assert_eq!(format!("{}", err), "caused: invalid param");

        let err = WardenError::MenuNotExist(42);
        assert_eq!(format!("{}", err), "menu '42' not exist!");

        let err = WardenError::AccessDenied("authorization failed!.".to_string());
        assert_eq!(format!("{}", err), "authorization failed!.");
    }

    #[test]
    fn test_is_not_found() {
        assert!(WardenError::MenuNotExist(1).is_not_found());
        assert!(WardenError::RoleNotExist(1).is_not_found());
        assert!(!WardenError::IllegalArgument("x".to_string()).is_not_found());
    }

    #[test]
    fn test_error_code_constants() {
        assert_eq!(SUCCESS.code, 0);
        assert_eq!(SUCCESS.message, "success");
        assert_eq!(PARAMETER_MISSING.code, 10000);
        assert_eq!(ACCESS_DENIED.code, 10001);
    }
}
