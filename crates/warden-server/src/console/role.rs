//! Role management endpoints

use actix_web::{HttpRequest, Responder, ResponseError, get, patch, web};
use serde::Deserialize;

use warden_auth::model::{BatchSetAvailable, InvalidationReport, RoleDetail, RolePermissionSetting};
use warden_auth::service::role;
use warden_common::permissions;

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

#[get("/role/detail")]
pub async fn detail(
    req: HttpRequest,
    data: web::Data<AppState>,
    params: web::Query<IdParam>,
) -> impl Responder {
    secured!(Secured::new(&req, &data, permissions::ROLE_QUERY));

    match role::get_role_detail(data.persistence(), params.id).await {
        Ok(detail) => Result::<RoleDetail>::http_success(detail),
        Err(e) => AppError::from(e).error_response(),
    }
}

#[patch("/role/available/setting")]
pub async fn set_available(
    req: HttpRequest,
    data: web::Data<AppState>,
    body: web::Json<BatchSetAvailable>,
) -> impl Responder {
    secured!(Secured::new(&req, &data, permissions::ROLE_PATCH));

    match role::set_role_available(
        data.persistence(),
        data.permission_cache(),
        &body.ids,
        body.available,
    )
    .await
    {
        Ok(report) => Result::<InvalidationReport>::http_success(report),
        Err(e) => AppError::from(e).error_response(),
    }
}

#[patch("/role/permission/setting")]
pub async fn set_permission(
    req: HttpRequest,
    data: web::Data<AppState>,
    body: web::Json<RolePermissionSetting>,
) -> impl Responder {
    secured!(Secured::new(&req, &data, permissions::ROLE_PERMISSION));

    match role::set_role_permission(data.persistence(), data.permission_cache(), body.into_inner())
        .await
    {
        Ok(report) => Result::<InvalidationReport>::http_success(report),
        Err(e) => AppError::from(e).error_response(),
    }
}
