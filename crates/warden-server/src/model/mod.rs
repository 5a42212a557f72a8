//! Data models module
//!
//! # Module Structure
//!
//! - `constants` - Configuration keys and server defaults
//! - `config` - Configuration management
//! - `response` - HTTP response envelope
//! - `app_state` - Application state shared across handlers

pub mod app_state;
pub mod config;
pub mod constants;
pub mod response;

pub use app_state::AppState;
pub use config::Configuration;
pub use constants::*;
pub use response::Result;
