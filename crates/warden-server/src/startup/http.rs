//! HTTP server setup for the console API.

use std::sync::Arc;

use actix_web::{App, HttpServer, dev::Server, middleware::Logger, web};

use crate::{console, model::AppState};

/// Creates and binds the console HTTP server.
///
/// All system management endpoints are mounted below `context_path`.
pub fn console_server(
    app_state: Arc<AppState>,
    context_path: String,
    address: String,
    port: u16,
) -> Result<Server, std::io::Error> {
    Ok(HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(web::Data::from(app_state.clone()))
            .service(web::scope(&context_path).service(console::route::routes()))
    })
    .bind((address, port))?
    .run())
}
