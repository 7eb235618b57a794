use axum::{routing::get, Router};

use warden_auth::RequiredRightError;

pub mod app_info;
pub mod common;
pub mod modules;
pub mod permissions;
pub mod roles;
pub mod system;
pub mod users;

/// Router for all authenticated endpoints. Fails if a route declares a
/// malformed required right.
pub fn router() -> Result<Router, RequiredRightError> {
    Ok(Router::new()
        .route("/whoami", get(system::whoami))
        .nest("/users", users::router()?)
        .nest("/role", roles::router()?)
        .nest("/module", modules::router()?)
        .nest("/permission", permissions::router()?)
        .nest("/appInfo", app_info::router()?))
}
