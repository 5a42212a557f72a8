//! `SeaORM` entity prelude

pub use super::sys_menu::Entity as SysMenu;
pub use super::sys_role::Entity as SysRole;
pub use super::sys_role_menus::Entity as SysRoleMenus;
pub use super::sys_user::Entity as SysUser;
pub use super::sys_user_roles::Entity as SysUserRoles;
