//! SQL-based persistence backend (MySQL/PostgreSQL via SeaORM)
//!
//! This module implements the `PersistenceService` trait directly on top of
//! the SeaORM entities in [`crate::entity`].

use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use sea_orm::{prelude::Expr, *};
use warden_common::{SortDirection, SortSpec, WardenError};

use crate::entity::{sys_menu, sys_role, sys_role_menus, sys_user, sys_user_roles};
use crate::model::*;
use crate::traits::*;

/// External database persistence service
///
/// Wraps a SeaORM `DatabaseConnection` and implements all persistence traits
/// by issuing direct database queries.
pub struct ExternalDbPersistService {
    db: DatabaseConnection,
}

impl ExternalDbPersistService {
    /// Create a new ExternalDbPersistService with the given database connection
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Get a reference to the underlying database connection
    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    /// Fill `parent_name` for every menu with a parent
    async fn resolve_parent_names(&self, menus: &mut [MenuInfo]) -> anyhow::Result<()> {
        let parent_ids: BTreeSet<i64> = menus.iter().filter_map(|m| m.parent_id).collect();
        if parent_ids.is_empty() {
            return Ok(());
        }

        let names: HashMap<i64, String> = sys_menu::Entity::find()
            .select_only()
            .column(sys_menu::Column::Id)
            .column(sys_menu::Column::Name)
            .filter(sys_menu::Column::Id.is_in(parent_ids))
            .into_tuple::<(i64, String)>()
            .all(&self.db)
            .await?
            .into_iter()
            .collect();

        for menu in menus.iter_mut() {
            menu.parent_name = menu.parent_id.and_then(|id| names.get(&id).cloned());
        }
        Ok(())
    }
}

fn now() -> chrono::NaiveDateTime {
    chrono::Utc::now().naive_utc()
}

fn menu_column(field: MenuSortField) -> sys_menu::Column {
    match field {
        MenuSortField::Id => sys_menu::Column::Id,
        MenuSortField::Name => sys_menu::Column::Name,
        MenuSortField::Order => sys_menu::Column::Order,
        MenuSortField::ParentId => sys_menu::Column::ParentId,
    }
}

fn sea_order(direction: SortDirection) -> Order {
    match direction {
        SortDirection::Asc => Order::Asc,
        SortDirection::Desc => Order::Desc,
    }
}

// ============================================================================
// PersistenceService implementation
// ============================================================================

#[async_trait]
impl PersistenceService for ExternalDbPersistService {
    fn storage_mode(&self) -> StorageMode {
        StorageMode::ExternalDb
    }

    async fn health_check(&self) -> anyhow::Result<()> {
        // Execute a simple query to verify connectivity
        sys_user::Entity::find()
            .select_only()
            .column_as(Expr::cust("1"), "health")
            .into_tuple::<i32>()
            .one(&self.db)
            .await?;
        Ok(())
    }
}

// ============================================================================
// MenuPersistence implementation
// ============================================================================

#[async_trait]
impl MenuPersistence for ExternalDbPersistService {
    async fn menu_find_all(&self) -> anyhow::Result<Vec<MenuInfo>> {
        let menus = sys_menu::Entity::find()
            .all(&self.db)
            .await?
            .into_iter()
            .map(MenuInfo::from)
            .collect();

        Ok(menus)
    }

    async fn menu_find_by_id(&self, id: i64) -> anyhow::Result<Option<MenuInfo>> {
        let Some(model) = sys_menu::Entity::find_by_id(id).one(&self.db).await? else {
            return Ok(None);
        };

        let mut menu = MenuInfo::from(model);
        if let Some(parent_id) = menu.parent_id {
            menu.parent_name = sys_menu::Entity::find_by_id(parent_id)
                .one(&self.db)
                .await?
                .map(|p| p.name);
        }

        Ok(Some(menu))
    }

    async fn menu_find_by_name(&self, name: &str) -> anyhow::Result<Option<MenuInfo>> {
        let menu = sys_menu::Entity::find()
            .filter(sys_menu::Column::Name.eq(name))
            .one(&self.db)
            .await?
            .map(MenuInfo::from);

        Ok(menu)
    }

    async fn menu_find_list(
        &self,
        query: &MenuQuery,
        sort: &[SortSpec<MenuSortField>],
    ) -> anyhow::Result<Vec<MenuInfo>> {
        let mut select = sys_menu::Entity::find();

        if let Some(name) = query.name.as_deref().filter(|s| !s.is_empty()) {
            select = select.filter(sys_menu::Column::Name.contains(name));
        }
        if let Some(permission) = query.permission.as_deref().filter(|s| !s.is_empty()) {
            select = select.filter(sys_menu::Column::Permission.contains(permission));
        }
        if let Some(available) = query.available {
            select = select.filter(sys_menu::Column::Available.eq(available));
        }
        if let Some(parent_id) = query.parent_id {
            select = select.filter(sys_menu::Column::ParentId.eq(parent_id));
        }
        for spec in sort {
            select = select.order_by(menu_column(spec.field), sea_order(spec.direction));
        }

        let mut menus: Vec<MenuInfo> = select
            .all(&self.db)
            .await?
            .into_iter()
            .map(MenuInfo::from)
            .collect();
        self.resolve_parent_names(&mut menus).await?;

        Ok(menus)
    }

    async fn menu_create(&self, menu: &NewMenu) -> anyhow::Result<MenuInfo> {
        let timestamp = now();
        let entity = sys_menu::ActiveModel {
            parent_id: Set(menu.parent_id),
            name: Set(menu.name.clone()),
            permission: Set(menu.permission.clone()),
            available: Set(menu.available),
            order: Set(menu.order),
            route_path: Set(menu.route_path.clone()),
            description: Set(menu.description.clone()),
            created_at: Set(timestamp),
            updated_at: Set(timestamp),
            ..Default::default()
        };

        let model = entity.insert(&self.db).await?;
        Ok(MenuInfo::from(model))
    }

    async fn menu_update(&self, menu: &MenuInfo) -> anyhow::Result<MenuInfo> {
        match sys_menu::Entity::find_by_id(menu.id).one(&self.db).await? {
            Some(entity) => {
                let mut active: sys_menu::ActiveModel = entity.into();
                active.parent_id = Set(menu.parent_id);
                active.name = Set(menu.name.clone());
                active.permission = Set(menu.permission.clone());
                active.available = Set(menu.available);
                active.order = Set(menu.order);
                active.route_path = Set(menu.route_path.clone());
                active.description = Set(menu.description.clone());
                active.updated_at = Set(now());

                let model = active.update(&self.db).await?;
                Ok(MenuInfo::from(model))
            }
            None => Err(WardenError::MenuNotExist(menu.id).into()),
        }
    }

    async fn menu_delete(&self, ids: &[i64]) -> anyhow::Result<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        let txn = self.db.begin().await?;
        sys_role_menus::Entity::delete_many()
            .filter(sys_role_menus::Column::MenuId.is_in(ids.iter().copied()))
            .exec(&txn)
            .await?;
        let result = sys_menu::Entity::delete_many()
            .filter(sys_menu::Column::Id.is_in(ids.iter().copied()))
            .exec(&txn)
            .await?;
        txn.commit().await?;

        Ok(result.rows_affected)
    }

    async fn menu_set_available(&self, ids: &[i64], available: bool) -> anyhow::Result<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        let txn = self.db.begin().await?;
        let result = sys_menu::Entity::update_many()
            .col_expr(sys_menu::Column::Available, Expr::value(available))
            .col_expr(sys_menu::Column::UpdatedAt, Expr::value(now()))
            .filter(sys_menu::Column::Id.is_in(ids.iter().copied()))
            .exec(&txn)
            .await?;
        txn.commit().await?;

        Ok(result.rows_affected)
    }

    async fn menu_find_available_roles(&self, menu_id: i64) -> anyhow::Result<Vec<RoleInfo>> {
        let role_ids = sys_role_menus::Entity::find()
            .select_only()
            .column(sys_role_menus::Column::RoleId)
            .filter(sys_role_menus::Column::MenuId.eq(menu_id))
            .distinct()
            .into_tuple::<i64>()
            .all(&self.db)
            .await?;

        if role_ids.is_empty() {
            return Ok(vec![]);
        }

        let roles = sys_role::Entity::find()
            .filter(sys_role::Column::Id.is_in(role_ids))
            .filter(sys_role::Column::Available.eq(true))
            .order_by_asc(sys_role::Column::Id)
            .all(&self.db)
            .await?
            .into_iter()
            .map(RoleInfo::from)
            .collect();

        Ok(roles)
    }
}

// ============================================================================
// RolePersistence implementation
// ============================================================================

#[async_trait]
impl RolePersistence for ExternalDbPersistService {
    async fn role_find_by_id(&self, id: i64) -> anyhow::Result<Option<RoleInfo>> {
        let role = sys_role::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .map(RoleInfo::from);

        Ok(role)
    }

    async fn role_find_by_ids(&self, ids: &[i64]) -> anyhow::Result<Vec<RoleInfo>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        let roles = sys_role::Entity::find()
            .filter(sys_role::Column::Id.is_in(ids.iter().copied()))
            .order_by_asc(sys_role::Column::Id)
            .all(&self.db)
            .await?
            .into_iter()
            .map(RoleInfo::from)
            .collect();

        Ok(roles)
    }

    async fn role_set_available(&self, ids: &[i64], available: bool) -> anyhow::Result<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        let result = sys_role::Entity::update_many()
            .col_expr(sys_role::Column::Available, Expr::value(available))
            .col_expr(sys_role::Column::UpdatedAt, Expr::value(now()))
            .filter(sys_role::Column::Id.is_in(ids.iter().copied()))
            .exec(&self.db)
            .await?;

        Ok(result.rows_affected)
    }

    async fn role_find_menu_ids(&self, role_id: i64) -> anyhow::Result<Vec<i64>> {
        let menu_ids = sys_role_menus::Entity::find()
            .select_only()
            .column(sys_role_menus::Column::MenuId)
            .filter(sys_role_menus::Column::RoleId.eq(role_id))
            .order_by_asc(sys_role_menus::Column::MenuId)
            .into_tuple::<i64>()
            .all(&self.db)
            .await?;

        Ok(menu_ids)
    }

    async fn role_set_menus(&self, role_id: i64, menu_ids: &[i64]) -> anyhow::Result<()> {
        let unique: BTreeSet<i64> = menu_ids.iter().copied().collect();

        let txn = self.db.begin().await?;
        sys_role_menus::Entity::delete_many()
            .filter(sys_role_menus::Column::RoleId.eq(role_id))
            .exec(&txn)
            .await?;

        if !unique.is_empty() {
            let links = unique.into_iter().map(|menu_id| sys_role_menus::ActiveModel {
                role_id: Set(role_id),
                menu_id: Set(menu_id),
            });
            sys_role_menus::Entity::insert_many(links)
                .exec_without_returning(&txn)
                .await?;
        }
        txn.commit().await?;

        Ok(())
    }

    async fn user_find_by_username(&self, username: &str) -> anyhow::Result<Option<UserInfo>> {
        let user = sys_user::Entity::find()
            .filter(sys_user::Column::Username.eq(username))
            .one(&self.db)
            .await?
            .map(UserInfo::from);

        Ok(user)
    }

    async fn user_find_by_role_ids(&self, role_ids: &[i64]) -> anyhow::Result<Vec<UserInfo>> {
        if role_ids.is_empty() {
            return Ok(vec![]);
        }

        let user_ids = sys_user_roles::Entity::find()
            .select_only()
            .column(sys_user_roles::Column::UserId)
            .filter(sys_user_roles::Column::RoleId.is_in(role_ids.iter().copied()))
            .distinct()
            .into_tuple::<i64>()
            .all(&self.db)
            .await?;

        if user_ids.is_empty() {
            return Ok(vec![]);
        }

        let users = sys_user::Entity::find()
            .filter(sys_user::Column::Id.is_in(user_ids))
            .order_by_asc(sys_user::Column::Id)
            .all(&self.db)
            .await?
            .into_iter()
            .map(UserInfo::from)
            .collect();

        Ok(users)
    }

    async fn permission_find_by_username(&self, username: &str) -> anyhow::Result<Vec<String>> {
        let Some(user) = sys_user::Entity::find()
            .filter(sys_user::Column::Username.eq(username))
            .one(&self.db)
            .await?
        else {
            return Ok(vec![]);
        };

        let role_ids = sys_user_roles::Entity::find()
            .select_only()
            .column(sys_user_roles::Column::RoleId)
            .filter(sys_user_roles::Column::UserId.eq(user.id))
            .into_tuple::<i64>()
            .all(&self.db)
            .await?;
        if role_ids.is_empty() {
            return Ok(vec![]);
        }

        let available_role_ids = sys_role::Entity::find()
            .select_only()
            .column(sys_role::Column::Id)
            .filter(sys_role::Column::Id.is_in(role_ids))
            .filter(sys_role::Column::Available.eq(true))
            .into_tuple::<i64>()
            .all(&self.db)
            .await?;
        if available_role_ids.is_empty() {
            return Ok(vec![]);
        }

        let menu_ids = sys_role_menus::Entity::find()
            .select_only()
            .column(sys_role_menus::Column::MenuId)
            .filter(sys_role_menus::Column::RoleId.is_in(available_role_ids))
            .distinct()
            .into_tuple::<i64>()
            .all(&self.db)
            .await?;
        if menu_ids.is_empty() {
            return Ok(vec![]);
        }

        let permissions = sys_menu::Entity::find()
            .select_only()
            .column(sys_menu::Column::Permission)
            .filter(sys_menu::Column::Id.is_in(menu_ids))
            .filter(sys_menu::Column::Available.eq(true))
            .filter(sys_menu::Column::Permission.is_not_null())
            .into_tuple::<Option<String>>()
            .all(&self.db)
            .await?
            .into_iter()
            .flatten()
            .collect();

        Ok(permissions)
    }
}
