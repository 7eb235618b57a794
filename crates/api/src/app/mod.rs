//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: repositories and the rights directory
//! - `routes/`: HTTP routes + handlers (one file per resource)
//! - `dto.rs`: request parsing and response shapes
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{routing::get, Extension, Router};
use tower::ServiceBuilder;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{info, Level};

use warden_auth::{Hs256JwtValidator, JwtValidator, RequiredRightError};
use warden_infra::{db, seed, Stores};

use crate::config::AppConfig;
use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

use services::AppServices;

/// Build the full HTTP router from configuration (entrypoint used by `main.rs`).
pub async fn build_app(config: &AppConfig) -> anyhow::Result<Router> {
    let stores = match &config.database_url {
        Some(url) => {
            let pool = db::connect(url).await?;
            db::migrate(&pool).await?;
            info!("using postgres stores");
            Stores::postgres(pool)
        }
        None => {
            info!("using in-memory stores");
            Stores::in_memory()
        }
    };

    if config.seed_defaults {
        seed::seed_defaults(&stores, config.admin_email.as_deref()).await?;
    }

    let services = Arc::new(AppServices::new(stores));
    let jwt = Arc::new(Hs256JwtValidator::new(config.jwt_secret.as_bytes()));
    Ok(router(services, jwt)?)
}

/// Assemble routes around already-built services.
pub fn router(
    services: Arc<AppServices>,
    jwt: Arc<dyn JwtValidator>,
) -> Result<Router, RequiredRightError> {
    let auth_state = middleware::AuthState {
        jwt,
        users: services.stores.users.clone(),
    };

    // Protected routes: require a valid bearer token for an existing user.
    let protected = routes::router()?
        .layer(Extension(services))
        .layer(axum::middleware::from_fn_with_state(
            auth_state,
            middleware::auth_middleware,
        ));

    Ok(Router::new()
        .route("/health", get(routes::system::health))
        .nest("/v1", protected)
        .layer(
            ServiceBuilder::new().layer(
                TraceLayer::new_for_http()
                    .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                    .on_response(DefaultOnResponse::new().level(Level::INFO)),
            ),
        ))
}
