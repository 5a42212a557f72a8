//! `SeaORM` entity definitions for the system management tables

pub mod prelude;

pub mod sys_menu;
pub mod sys_role;
pub mod sys_role_menus;
pub mod sys_user;
pub mod sys_user_roles;
