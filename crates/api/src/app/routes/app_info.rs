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
use warden_core::{AppInfo, AppInfoId, AppInfoInput};
use warden_query::ListParams;

use crate::app::routes::common;
use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::authz::{self, CrudRights};
use crate::context::PrincipalContext;

pub fn router() -> Result<Router, RequiredRightError> {
    let rights = Arc::new(CrudRights::for_module("appInfo")?);
    Ok(Router::new()
        .route("/", post(create_app_info))
        .route("/all", post(list_app_info))
        .route(
            "/:appInfoId",
            get(get_app_info).put(update_app_info).delete(delete_app_info),
        )
        .with_state(rights))
}

pub async fn create_app_info(
    State(rights): State<Arc<CrudRights>>,
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    body: Bytes,
) -> Response {
    if let Err(resp) = authz::require(&services, &principal, &rights.add, None).await {
        return resp;
    }
    let input: AppInfoInput = match dto::parse_body(&body) {
        Ok(input) => input,
        Err(resp) => return resp,
    };
    let info = match AppInfo::create(input, Utc::now()) {
        Ok(info) => info,
        Err(e) => return errors::domain_error_to_response(e),
    };
    common::create(&*services.stores.app_info, info).await
}

pub async fn list_app_info(
    State(rights): State<Arc<CrudRights>>,
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Query(params): Query<ListParams>,
    body: Bytes,
) -> Response {
    if let Err(resp) = authz::require(&services, &principal, &rights.view, None).await {
        return resp;
    }
    common::list(&*services.stores.app_info, params, &body).await
}

pub async fn get_app_info(
    State(rights): State<Arc<CrudRights>>,
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> Response {
    if let Err(resp) = authz::require(&services, &principal, &rights.view, None).await {
        return resp;
    }
    let id: AppInfoId = match common::parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    common::fetch(&*services.stores.app_info, *id.as_uuid()).await
}

pub async fn update_app_info(
    State(rights): State<Arc<CrudRights>>,
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    body: Bytes,
) -> Response {
    if let Err(resp) = authz::require(&services, &principal, &rights.edit, None).await {
        return resp;
    }
    let id: AppInfoId = match common::parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let input: AppInfoInput = match dto::parse_body(&body) {
        Ok(input) => input,
        Err(resp) => return resp,
    };
    let mut info = match common::load(&*services.stores.app_info, *id.as_uuid()).await {
        Ok(info) => info,
        Err(resp) => return resp,
    };
    if let Err(e) = info.apply(input, Utc::now()) {
        return errors::domain_error_to_response(e);
    }
    common::save(&*services.stores.app_info, info).await
}

pub async fn delete_app_info(
    State(rights): State<Arc<CrudRights>>,
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> Response {
    if let Err(resp) = authz::require(&services, &principal, &rights.delete, None).await {
        return resp;
    }
    let id: AppInfoId = match common::parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    common::remove(&*services.stores.app_info, *id.as_uuid()).await
}
