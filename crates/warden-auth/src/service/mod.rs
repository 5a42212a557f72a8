//! Menu, role and permission service implementations

pub mod hierarchy;
pub mod menu;
pub mod permission;
pub mod role;

#[cfg(test)]
pub(crate) mod testing;
