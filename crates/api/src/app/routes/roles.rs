use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Extension, Path, Query, State},
    response::Response,
    routing::{get, post},
    Router,
};
use chrono::Utc;

use warden_auth::RequiredRightError;
use warden_core::{Role, RoleId, RoleInput};
use warden_query::ListParams;

use crate::app::routes::common;
use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::authz::{self, CrudRights};
use crate::context::PrincipalContext;

pub fn router() -> Result<Router, RequiredRightError> {
    let rights = Arc::new(CrudRights::for_module("role")?);
    Ok(Router::new()
        .route("/", post(create_role))
        .route("/all", post(list_roles))
        .route("/:roleId", get(get_role).put(update_role).delete(delete_role))
        .with_state(rights))
}

pub async fn create_role(
    State(rights): State<Arc<CrudRights>>,
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    body: Bytes,
) -> Response {
    if let Err(resp) = authz::require(&services, &principal, &rights.add, None).await {
        return resp;
    }
    let input: RoleInput = match dto::parse_body(&body) {
        Ok(input) => input,
        Err(resp) => return resp,
    };
    let role = match Role::create(input, Utc::now()) {
        Ok(role) => role,
        Err(e) => return errors::domain_error_to_response(e),
    };
    common::create(&*services.stores.roles, role).await
}

pub async fn list_roles(
    State(rights): State<Arc<CrudRights>>,
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Query(params): Query<ListParams>,
    body: Bytes,
) -> Response {
    if let Err(resp) = authz::require(&services, &principal, &rights.view, None).await {
        return resp;
    }
    common::list(&*services.stores.roles, params, &body).await
}

pub async fn get_role(
    State(rights): State<Arc<CrudRights>>,
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> Response {
    if let Err(resp) = authz::require(&services, &principal, &rights.view, None).await {
        return resp;
    }
    let id: RoleId = match common::parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    common::fetch(&*services.stores.roles, *id.as_uuid()).await
}

pub async fn update_role(
    State(rights): State<Arc<CrudRights>>,
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    body: Bytes,
) -> Response {
    if let Err(resp) = authz::require(&services, &principal, &rights.edit, None).await {
        return resp;
    }
    let id: RoleId = match common::parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let input: RoleInput = match dto::parse_body(&body) {
        Ok(input) => input,
        Err(resp) => return resp,
    };
    let mut role = match common::load(&*services.stores.roles, *id.as_uuid()).await {
        Ok(role) => role,
        Err(resp) => return resp,
    };
    if let Err(e) = role.apply(input, Utc::now()) {
        return errors::domain_error_to_response(e);
    }
    common::save(&*services.stores.roles, role).await
}

pub async fn delete_role(
    State(rights): State<Arc<CrudRights>>,
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> Response {
    if let Err(resp) = authz::require(&services, &principal, &rights.delete, None).await {
        return resp;
    }
    let id: RoleId = match common::parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let uuid = *id.as_uuid();
    let _refs = services.stores.lock_references().await;
    if let Err(resp) = common::ensure_exists(&*services.stores.roles, uuid).await {
        return resp;
    }
    let permissions = &*services.stores.permissions;
    if let Err(resp) = common::ensure_unreferenced(permissions, "roleId", uuid, "role").await {
        return resp;
    }
    let users = &*services.stores.users;
    if let Err(resp) = common::ensure_unreferenced(users, "roleId", uuid, "role").await {
        return resp;
    }
    common::remove(&*services.stores.roles, uuid).await
}
