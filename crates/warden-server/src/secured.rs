// Security context and authorization macro for console API access control

use actix_web::{HttpRequest, web};

use crate::model::app_state::AppState;
use crate::model::constants::IDENTITY_HEADER;

// Referenced via $crate::secured:: in the macro expansion
pub use warden_auth::service::permission::has_permission;

// Security context for one guarded request
#[derive(Debug, Clone)]
pub struct Secured<'a> {
    pub req: &'a HttpRequest,          // HTTP request reference
    pub data: &'a web::Data<AppState>, // Application state
    pub permission: &'a str,           // Permission required by the endpoint
}

impl<'a> Secured<'a> {
    pub fn new(req: &'a HttpRequest, data: &'a web::Data<AppState>, permission: &'a str) -> Self {
        Secured {
            req,
            data,
            permission,
        }
    }

    /// Username asserted by the upstream gateway, if any
    pub fn username(&self) -> Option<String> {
        self.req
            .headers()
            .get(IDENTITY_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    }
}

#[macro_export]
macro_rules! secured {
    ($secured: expr) => {
        let __secured = $secured;

        if __secured.data.configuration.auth_enabled() {
            let Some(__username) = __secured.username() else {
                return actix_web::ResponseError::error_response(&$crate::error::AppError::from(
                    $crate::error::WardenError::AuthError("no user identity found".to_string()),
                ));
            };

            match $crate::secured::has_permission(
                __secured.data.persistence(),
                __secured.data.permission_cache(),
                &__username,
                __secured.permission,
            )
            .await
            {
                Ok(true) => {}
                Ok(false) => {
                    tracing::warn!(
                        username = %__username,
                        permission = __secured.permission,
                        path = __secured.req.path(),
                        "Permission denied"
                    );
                    return actix_web::ResponseError::error_response(
                        &$crate::error::AppError::from($crate::error::WardenError::AccessDenied(
                            "authorization failed!.".to_string(),
                        )),
                    );
                }
                Err(__e) => {
                    return actix_web::ResponseError::error_response(
                        &$crate::error::AppError::from(__e),
                    );
                }
            }
        }
    };
}
