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
use warden_core::{Permission, PermissionId, PermissionInput};
use warden_query::ListParams;

use crate::app::routes::common;
use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::authz::{self, CrudRights};
use crate::context::PrincipalContext;

pub fn router() -> Result<Router, RequiredRightError> {
    let rights = Arc::new(CrudRights::for_module("permission")?);
    Ok(Router::new()
        .route("/", post(create_permission))
        .route("/all", post(list_permissions))
        .route(
            "/:permissionId",
            get(get_permission).put(update_permission).delete(delete_permission),
        )
        .with_state(rights))
}

/// Both referenced rows must exist.
async fn check_references(services: &AppServices, input: &PermissionInput) -> Result<(), Response> {
    common::ensure_exists(&*services.stores.roles, *input.role_id.as_uuid()).await?;
    common::ensure_exists(&*services.stores.modules, *input.module_id.as_uuid()).await
}

pub async fn create_permission(
    State(rights): State<Arc<CrudRights>>,
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    body: Bytes,
) -> Response {
    if let Err(resp) = authz::require(&services, &principal, &rights.add, None).await {
        return resp;
    }
    let input: PermissionInput = match dto::parse_body(&body) {
        Ok(input) => input,
        Err(resp) => return resp,
    };
    let _refs = services.stores.lock_references().await;
    if let Err(resp) = check_references(&services, &input).await {
        return resp;
    }
    let permission = match Permission::create(input, Utc::now()) {
        Ok(permission) => permission,
        Err(e) => return errors::domain_error_to_response(e),
    };
    common::create(&*services.stores.permissions, permission).await
}

pub async fn list_permissions(
    State(rights): State<Arc<CrudRights>>,
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Query(params): Query<ListParams>,
    body: Bytes,
) -> Response {
    if let Err(resp) = authz::require(&services, &principal, &rights.view, None).await {
        return resp;
    }
    common::list(&*services.stores.permissions, params, &body).await
}

pub async fn get_permission(
    State(rights): State<Arc<CrudRights>>,
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> Response {
    if let Err(resp) = authz::require(&services, &principal, &rights.view, None).await {
        return resp;
    }
    let id: PermissionId = match common::parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    common::fetch(&*services.stores.permissions, *id.as_uuid()).await
}

pub async fn update_permission(
    State(rights): State<Arc<CrudRights>>,
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    body: Bytes,
) -> Response {
    if let Err(resp) = authz::require(&services, &principal, &rights.edit, None).await {
        return resp;
    }
    let id: PermissionId = match common::parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let input: PermissionInput = match dto::parse_body(&body) {
        Ok(input) => input,
        Err(resp) => return resp,
    };
    let mut permission = match common::load(&*services.stores.permissions, *id.as_uuid()).await {
        Ok(permission) => permission,
        Err(resp) => return resp,
    };
    let _refs = services.stores.lock_references().await;
    if let Err(resp) = check_references(&services, &input).await {
        return resp;
    }
    if let Err(e) = permission.apply(input, Utc::now()) {
        return errors::domain_error_to_response(e);
    }
    common::save(&*services.stores.permissions, permission).await
}

pub async fn delete_permission(
    State(rights): State<Arc<CrudRights>>,
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> Response {
    if let Err(resp) = authz::require(&services, &principal, &rights.delete, None).await {
        return resp;
    }
    let id: PermissionId = match common::parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    common::remove(&*services.stores.permissions, *id.as_uuid()).await
}
