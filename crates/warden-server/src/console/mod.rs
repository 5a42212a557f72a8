//! Console management API handlers

pub mod health;
pub mod menu;
pub mod role;
pub mod route;
