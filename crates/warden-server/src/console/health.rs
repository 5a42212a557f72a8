use actix_web::{Responder, get, web};
use serde::Serialize;
use tracing::error;

use crate::model::{AppState, response::Result};

#[derive(Debug, Serialize)]
struct HealthStatus {
    status: &'static str,
    storage: String,
}

#[get("/health")]
pub async fn health(data: web::Data<AppState>) -> impl Responder {
    let storage = data.persistence().storage_mode().to_string();

    match data.persistence().health_check().await {
        Ok(()) => Result::<HealthStatus>::http_success(HealthStatus {
            status: "UP",
            storage,
        }),
        Err(e) => {
            error!(error = %e, "Storage health check failed");
            Result::<HealthStatus>::http_response(
                503,
                crate::error::SERVER_ERROR.code,
                e.to_string(),
                HealthStatus {
                    status: "DOWN",
                    storage,
                },
            )
        }
    }
}
