use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use tracing::debug;

use warden_auth::{JwtValidator, Principal};
use warden_core::User;
use warden_infra::Repository;

use crate::app::errors;
use crate::context::PrincipalContext;

#[derive(Clone)]
pub struct AuthState {
    pub jwt: Arc<dyn JwtValidator>,
    pub users: Arc<dyn Repository<User>>,
}

/// Resolve the bearer token to a stored user and attach a
/// [`PrincipalContext`]. Any failure is a 401.
pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, Response> {
    let token = extract_bearer(req.headers()).ok_or_else(unauthorized)?;

    let claims = state.jwt.validate(token, Utc::now()).map_err(|e| {
        debug!(error = %e, "bearer token rejected");
        unauthorized()
    })?;

    let user = match state.users.get(*claims.sub.as_uuid()).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            debug!(user_id = %claims.sub, "token subject does not exist");
            return Err(unauthorized());
        }
        Err(e) => return Err(errors::store_error_to_response(e)),
    };

    req.extensions_mut()
        .insert(PrincipalContext::new(Principal::from(&user)));

    Ok(next.run(req).await)
}

fn unauthorized() -> Response {
    errors::json_error(StatusCode::UNAUTHORIZED, "unauthorized", "authentication required")
}

fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    let header = headers.get(axum::http::header::AUTHORIZATION)?;
    let header = header.to_str().ok()?;
    let token = header.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        return None;
    }
    Some(token)
}
