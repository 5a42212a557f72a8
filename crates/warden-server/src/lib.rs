// Main library module for Warden - an RBAC administration server
// Exposes the console API, configuration and startup helpers to the binary and tests

pub mod console; // Console web interface
pub mod error; // Error handling and types
pub mod model; // Data models and types
pub mod secured; // Permission guard for console endpoints
pub mod startup; // Application startup utilities

pub use model::{AppState, Configuration};
pub use secured::Secured;
