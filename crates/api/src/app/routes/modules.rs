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
use warden_core::{Module, ModuleId, ModuleInput};
use warden_query::ListParams;

use crate::app::routes::common;
use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::authz::{self, CrudRights};
use crate::context::PrincipalContext;

pub fn router() -> Result<Router, RequiredRightError> {
    let rights = Arc::new(CrudRights::for_module("module")?);
    Ok(Router::new()
        .route("/", post(create_module))
        .route("/all", post(list_modules))
        .route("/:moduleId", get(get_module).put(update_module).delete(delete_module))
        .with_state(rights))
}

pub async fn create_module(
    State(rights): State<Arc<CrudRights>>,
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    body: Bytes,
) -> Response {
    if let Err(resp) = authz::require(&services, &principal, &rights.add, None).await {
        return resp;
    }
    let input: ModuleInput = match dto::parse_body(&body) {
        Ok(input) => input,
        Err(resp) => return resp,
    };
    let module = match Module::create(input, Utc::now()) {
        Ok(module) => module,
        Err(e) => return errors::domain_error_to_response(e),
    };
    common::create(&*services.stores.modules, module).await
}

pub async fn list_modules(
    State(rights): State<Arc<CrudRights>>,
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Query(params): Query<ListParams>,
    body: Bytes,
) -> Response {
    if let Err(resp) = authz::require(&services, &principal, &rights.view, None).await {
        return resp;
    }
    common::list(&*services.stores.modules, params, &body).await
}

pub async fn get_module(
    State(rights): State<Arc<CrudRights>>,
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> Response {
    if let Err(resp) = authz::require(&services, &principal, &rights.view, None).await {
        return resp;
    }
    let id: ModuleId = match common::parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    common::fetch(&*services.stores.modules, *id.as_uuid()).await
}

pub async fn update_module(
    State(rights): State<Arc<CrudRights>>,
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    body: Bytes,
) -> Response {
    if let Err(resp) = authz::require(&services, &principal, &rights.edit, None).await {
        return resp;
    }
    let id: ModuleId = match common::parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let input: ModuleInput = match dto::parse_body(&body) {
        Ok(input) => input,
        Err(resp) => return resp,
    };
    let mut module = match common::load(&*services.stores.modules, *id.as_uuid()).await {
        Ok(module) => module,
        Err(resp) => return resp,
    };
    if let Err(e) = module.apply(input, Utc::now()) {
        return errors::domain_error_to_response(e);
    }
    common::save(&*services.stores.modules, module).await
}

pub async fn delete_module(
    State(rights): State<Arc<CrudRights>>,
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> Response {
    if let Err(resp) = authz::require(&services, &principal, &rights.delete, None).await {
        return resp;
    }
    let id: ModuleId = match common::parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let uuid = *id.as_uuid();
    let _refs = services.stores.lock_references().await;
    if let Err(resp) = common::ensure_exists(&*services.stores.modules, uuid).await {
        return resp;
    }
    let permissions = &*services.stores.permissions;
    if let Err(resp) = common::ensure_unreferenced(permissions, "moduleId", uuid, "module").await {
        return resp;
    }
    common::remove(&*services.stores.modules, uuid).await
}
