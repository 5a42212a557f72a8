//! Menu, role and permission models
//!
//! Request and response shapes of the services in this crate. Storage level
//! records live in `warden_persistence::model`.

use serde::{Deserialize, Serialize};

use warden_persistence::model::{MenuInfo, RoleInfo};

/// Menu with its children nested, as rendered by the console tree view
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuTreeNode {
    #[serde(flatten)]
    pub menu: MenuInfo,
    /// Same as `menu.id`, used as the row key by tree widgets
    pub key: i64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<MenuTreeNode>,
}

impl From<MenuInfo> for MenuTreeNode {
    fn from(menu: MenuInfo) -> Self {
        Self {
            key: menu.id,
            menu,
            children: vec![],
        }
    }
}

/// Full replacement of an existing menu's editable fields
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuUpdate {
    pub id: i64,
    pub parent_id: Option<i64>,
    pub name: String,
    pub permission: Option<String>,
    pub available: bool,
    #[serde(default)]
    pub order: i32,
    #[serde(default)]
    pub route_path: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl From<MenuUpdate> for MenuInfo {
    fn from(value: MenuUpdate) -> Self {
        Self {
            id: value.id,
            parent_id: value.parent_id,
            parent_name: None,
            name: value.name,
            permission: value.permission,
            available: value.available,
            order: value.order,
            route_path: value.route_path,
            description: value.description,
        }
    }
}

/// Bulk availability change for menus or roles
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSetAvailable {
    pub ids: Vec<i64>,
    pub available: bool,
}

/// A role together with the ids of the menus assigned to it
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleDetail {
    #[serde(flatten)]
    pub role: RoleInfo,
    pub menu_ids: Vec<i64>,
}

/// Replace the menu set of each listed role
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RolePermissionSetting {
    pub role_ids: Vec<i64>,
    #[serde(default)]
    pub menu_ids: Vec<i64>,
}

/// Outcome of one permission cache invalidation fan-out
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvalidationReport {
    /// Roles whose users were refreshed
    pub roles: Vec<i64>,
    /// Usernames selected for refresh
    pub users: Vec<String>,
    /// Number of cache entries rewritten
    pub refreshed: usize,
    /// Usernames whose refresh failed
    pub failed: Vec<String>,
}

impl InvalidationReport {
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_menu_update_deserialize_defaults() {
        let update: MenuUpdate = serde_json::from_str(
            r#"{"id":3,"parentId":1,"name":"Menu","permission":"system:menu:query","available":true}"#,
        )
        .unwrap();

        assert_eq!(update.parent_id, Some(1));
        assert_eq!(update.order, 0);
        assert!(update.route_path.is_none());
    }

    #[test]
    fn test_menu_tree_node_serialization() {
        let node = MenuTreeNode::from(MenuInfo {
            id: 7,
            parent_id: None,
            parent_name: None,
            name: "System".to_string(),
            permission: None,
            available: true,
            order: 1,
            route_path: Some("/system".to_string()),
            description: None,
        });

        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["key"], 7);
        assert_eq!(json["name"], "System");
        assert!(json.get("children").is_none());
    }
}
