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
use warden_core::{NewUser, RoleId, User, UserChanges, UserId};
use warden_query::ListParams;

use crate::app::routes::common;
use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::authz::{self, CrudRights};
use crate::context::PrincipalContext;

pub fn router() -> Result<Router, RequiredRightError> {
    let rights = Arc::new(CrudRights::for_module("user")?);
    Ok(Router::new()
        .route("/", post(create_user))
        .route("/all", post(list_users))
        .route("/:userId", get(get_user).put(update_user).delete(delete_user))
        .with_state(rights))
}

async fn check_role(services: &AppServices, role_id: Option<RoleId>) -> Result<(), Response> {
    match role_id {
        Some(role_id) => common::ensure_exists(&*services.stores.roles, *role_id.as_uuid()).await,
        None => Ok(()),
    }
}

pub async fn create_user(
    State(rights): State<Arc<CrudRights>>,
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    body: Bytes,
) -> Response {
    if let Err(resp) = authz::require(&services, &principal, &rights.add, None).await {
        return resp;
    }
    let input: NewUser = match dto::parse_body(&body) {
        Ok(input) => input,
        Err(resp) => return resp,
    };
    let _refs = services.stores.lock_references().await;
    if let Err(resp) = check_role(&services, input.role_id).await {
        return resp;
    }
    let user = match User::create(input, Utc::now()) {
        Ok(user) => user,
        Err(e) => return errors::domain_error_to_response(e),
    };
    common::create(&*services.stores.users, user).await
}

pub async fn list_users(
    State(rights): State<Arc<CrudRights>>,
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Query(params): Query<ListParams>,
    body: Bytes,
) -> Response {
    if let Err(resp) = authz::require(&services, &principal, &rights.view, None).await {
        return resp;
    }
    common::list(&*services.stores.users, params, &body).await
}

pub async fn get_user(
    State(rights): State<Arc<CrudRights>>,
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> Response {
    let target = common::parse_id::<UserId>(&id).ok();
    if let Err(resp) = authz::require(&services, &principal, &rights.view, target).await {
        return resp;
    }
    let id: UserId = match common::parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    common::fetch(&*services.stores.users, *id.as_uuid()).await
}

pub async fn update_user(
    State(rights): State<Arc<CrudRights>>,
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    body: Bytes,
) -> Response {
    let target = common::parse_id::<UserId>(&id).ok();
    if let Err(resp) = authz::require(&services, &principal, &rights.edit, target).await {
        return resp;
    }
    let id: UserId = match common::parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let changes: UserChanges = match dto::parse_body(&body) {
        Ok(changes) => changes,
        Err(resp) => return resp,
    };
    let mut user = match common::load(&*services.stores.users, *id.as_uuid()).await {
        Ok(user) => user,
        Err(resp) => return resp,
    };

    // Role and verification changes need the real right, never self-access.
    let role_changed = changes.role_id.is_some() && changes.role_id != user.role_id;
    let verification_changed = changes
        .is_email_verified
        .is_some_and(|verified| verified != user.is_email_verified);
    if role_changed || verification_changed {
        if let Err(resp) = authz::require(&services, &principal, &rights.edit, None).await {
            return resp;
        }
    }

    let _refs = services.stores.lock_references().await;
    if role_changed {
        if let Err(resp) = check_role(&services, changes.role_id).await {
            return resp;
        }
    }

    if let Err(e) = user.apply(changes, Utc::now()) {
        return errors::domain_error_to_response(e);
    }
    common::save(&*services.stores.users, user).await
}

pub async fn delete_user(
    State(rights): State<Arc<CrudRights>>,
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> Response {
    let target = common::parse_id::<UserId>(&id).ok();
    if let Err(resp) = authz::require(&services, &principal, &rights.delete, target).await {
        return resp;
    }
    let id: UserId = match common::parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    common::remove(&*services.stores.users, *id.as_uuid()).await
}
