//! Menu management endpoints

use actix_web::{
    HttpRequest, Responder, ResponseError, delete, get, patch, post, put, web,
};
use serde::Deserialize;
use tracing::info;

use warden_auth::model::{BatchSetAvailable, InvalidationReport, MenuTreeNode, MenuUpdate};
use warden_auth::service::menu;
use warden_common::{parse_order_by, permissions};
use warden_persistence::model::{MenuInfo, MenuQuery, MenuSortField, NewMenu};

use crate::{
    Secured,
    error::AppError,
    model::{AppState, response::Result},
    secured,
};

#[derive(Debug, Deserialize)]
struct IdParam {
    id: i64,
}

#[derive(Debug, Default, Deserialize)]
struct ListParam {
    name: Option<String>,
    permission: Option<String>,
    available: Option<bool>,
    parent_id: Option<i64>,
    /// `[{"order":"asc"}]` or `order:asc,id:desc`
    order_by: Option<String>,
}

impl ListParam {
    fn query(&self) -> MenuQuery {
        MenuQuery {
            name: self.name.clone(),
            permission: self.permission.clone(),
            available: self.available,
            parent_id: self.parent_id,
        }
    }
}

async fn find_menus(data: &AppState, params: &ListParam) -> anyhow::Result<Vec<MenuInfo>> {
    let sort = parse_order_by::<MenuSortField>(params.order_by.as_deref().unwrap_or_default())?;
    menu::list_menus(data.persistence(), &params.query(), &sort).await
}

#[get("/menu/detail")]
pub async fn detail(
    req: HttpRequest,
    data: web::Data<AppState>,
    params: web::Query<IdParam>,
) -> impl Responder {
    secured!(Secured::new(&req, &data, permissions::MENU_QUERY));

    match menu::get_menu_detail(data.persistence(), params.id).await {
        Ok(menu) => Result::<MenuInfo>::http_success(menu),
        Err(e) => AppError::from(e).error_response(),
    }
}

#[get("/menu/list")]
pub async fn list(
    req: HttpRequest,
    data: web::Data<AppState>,
    params: web::Query<ListParam>,
) -> impl Responder {
    secured!(Secured::new(&req, &data, permissions::MENU_QUERY));

    match find_menus(&data, &params).await {
        Ok(menus) => Result::<Vec<MenuInfo>>::http_success(menus),
        Err(e) => AppError::from(e).error_response(),
    }
}

#[get("/menu/tree")]
pub async fn tree(
    req: HttpRequest,
    data: web::Data<AppState>,
    params: web::Query<ListParam>,
) -> impl Responder {
    secured!(Secured::new(&req, &data, permissions::MENU_QUERY));

    match find_menus(&data, &params).await {
        Ok(menus) => Result::<Vec<MenuTreeNode>>::http_success(menu::build_menu_tree(menus)),
        Err(e) => AppError::from(e).error_response(),
    }
}

#[post("/menu/create")]
pub async fn create(
    req: HttpRequest,
    data: web::Data<AppState>,
    body: web::Json<NewMenu>,
) -> impl Responder {
    secured!(Secured::new(&req, &data, permissions::MENU_CREATE));

    match menu::create_menu(data.persistence(), body.into_inner()).await {
        Ok(menu) => Result::<MenuInfo>::http_success(menu),
        Err(e) => AppError::from(e).error_response(),
    }
}

#[put("/menu/update")]
pub async fn update(
    req: HttpRequest,
    data: web::Data<AppState>,
    body: web::Json<MenuUpdate>,
) -> impl Responder {
    secured!(Secured::new(&req, &data, permissions::MENU_UPDATE));

    match menu::update_menu(data.persistence(), data.permission_cache(), body.into_inner()).await
    {
        Ok(menu) => {
            info!(id = menu.id, name = %menu.name, "Updated menu");
            Result::<MenuInfo>::http_success(menu)
        }
        Err(e) => AppError::from(e).error_response(),
    }
}

#[delete("/menu/delete")]
pub async fn delete(
    req: HttpRequest,
    data: web::Data<AppState>,
    params: web::Query<IdParam>,
) -> impl Responder {
    secured!(Secured::new(&req, &data, permissions::MENU_DELETE));

    match menu::delete_menu(data.persistence(), data.permission_cache(), params.id).await {
        Ok(report) => Result::<InvalidationReport>::http_success(report),
        Err(e) => AppError::from(e).error_response(),
    }
}

#[patch("/menu/available/setting")]
pub async fn set_available(
    req: HttpRequest,
    data: web::Data<AppState>,
    body: web::Json<BatchSetAvailable>,
) -> impl Responder {
    secured!(Secured::new(&req, &data, permissions::MENU_PATCH));

    match menu::set_menu_available(data.persistence(), &body.ids, body.available).await {
        Ok(ids) => {
            info!(?ids, available = body.available, "Updated menu availability");
            Result::<Vec<i64>>::http_success(ids.into_iter().collect::<Vec<_>>())
        }
        Err(e) => AppError::from(e).error_response(),
    }
}
