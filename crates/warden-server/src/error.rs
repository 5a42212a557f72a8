// Error handling for the HTTP layer
// Maps domain errors from the services onto status codes and API error codes

use std::fmt::{Display, Formatter};

use actix_web::HttpResponse;

pub use warden_common::error::{
    ACCESS_DENIED, DATA_ACCESS_ERROR, PARAMETER_VALIDATE_ERROR, RESOURCE_NOT_FOUND, SERVER_ERROR,
    WardenError,
};

use crate::model::response as common;

// Local wrapper for application errors to implement actix-web error handling
// (Cannot impl foreign trait for foreign type due to orphan rules)
#[derive(Debug)]
pub struct AppError {
    inner: anyhow::Error,
}

impl Display for AppError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(value: anyhow::Error) -> Self {
        AppError { inner: value }
    }
}

impl From<WardenError> for AppError {
    fn from(value: WardenError) -> Self {
        AppError {
            inner: value.into(),
        }
    }
}

impl AppError {
    pub fn inner(&self) -> &anyhow::Error {
        &self.inner
    }

    pub fn downcast_ref<E: std::error::Error + Send + Sync + 'static>(&self) -> Option<&E> {
        self.inner.downcast_ref::<E>()
    }
}

impl actix_web::error::ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        if let Some(e) = self.downcast_ref::<sea_orm::DbErr>() {
            tracing::error!(error = %e, "Database error");
            return common::Result::<String>::http_response(
                500,
                DATA_ACCESS_ERROR.code,
                e.to_string(),
                String::new(),
            );
        }

        let Some(e) = self.downcast_ref::<WardenError>() else {
            tracing::error!(error = %self.inner, "Unhandled error");
            return common::Result::<String>::http_response(
                500,
                SERVER_ERROR.code,
                self.inner.to_string(),
                String::new(),
            );
        };

        let (status, code) = match e {
            WardenError::IllegalArgument(_) => (400, PARAMETER_VALIDATE_ERROR.code),
            WardenError::MenuNotExist(_) | WardenError::RoleNotExist(_) => {
                (404, RESOURCE_NOT_FOUND.code)
            }
            WardenError::AuthError(_) => (401, ACCESS_DENIED.code),
            WardenError::AccessDenied(_) => (403, ACCESS_DENIED.code),
            WardenError::DatabaseError(_) => (500, DATA_ACCESS_ERROR.code),
        };

        common::Result::<String>::http_response(status, code, e.to_string(), String::new())
    }
}

#[cfg(test)]
mod tests {
    use actix_web::ResponseError;
    use actix_web::http::StatusCode;

    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (WardenError::IllegalArgument("bad".to_string()), StatusCode::BAD_REQUEST),
            (WardenError::MenuNotExist(1), StatusCode::NOT_FOUND),
            (WardenError::RoleNotExist(1), StatusCode::NOT_FOUND),
            (WardenError::AuthError("no user".to_string()), StatusCode::UNAUTHORIZED),
            (WardenError::AccessDenied("no".to_string()), StatusCode::FORBIDDEN),
            (
                WardenError::DatabaseError("down".to_string()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, status) in cases {
            assert_eq!(AppError::from(error).error_response().status(), status);
        }
    }

    #[actix_web::test]
    async fn test_database_error_is_data_access_error() {
        let err = AppError::from(anyhow::Error::from(sea_orm::DbErr::Custom(
            "connection refused".to_string(),
        )));

        let resp = err.error_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = actix_web::body::to_bytes(resp.into_body()).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["code"], DATA_ACCESS_ERROR.code);
    }

    #[test]
    fn test_unknown_error_is_server_error() {
        let err = AppError::from(anyhow::anyhow!("boom"));
        assert!(err.downcast_ref::<WardenError>().is_none());
        assert_eq!(
            err.error_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
