//! Route-side authorization guard.
//!
//! Handlers call [`require`] before touching storage.

use axum::http::StatusCode;
use axum::response::Response;

use warden_auth::{authorize, RequiredRight, RequiredRightError};
use warden_core::UserId;

use crate::app::errors;
use crate::app::services::AppServices;
use crate::context::PrincipalContext;

/// The rights a CRUD resource demands per operation, parsed when the router
/// is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrudRights {
    pub view: Vec<RequiredRight>,
    pub add: Vec<RequiredRight>,
    pub edit: Vec<RequiredRight>,
    pub delete: Vec<RequiredRight>,
}

impl CrudRights {
    pub fn for_module(module: &str) -> Result<Self, RequiredRightError> {
        let parse = |right: &str| RequiredRight::parse_all([format!("{module}:{right}").as_str()]);
        Ok(Self {
            view: parse("view")?,
            add: parse("add")?,
            edit: parse("edit")?,
            delete: parse("delete")?,
        })
    }
}

/// Check `required` for the caller. `target` is the user a route acts on,
/// when the route has one; it enables self-access.
pub async fn require(
    services: &AppServices,
    principal: &PrincipalContext,
    required: &[RequiredRight],
    target: Option<UserId>,
) -> Result<(), Response> {
    authorize(&services.directory, principal.principal(), required, target)
        .await
        .into_result()
        .map_err(|e| errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string()))
}

#[cfg(test)]
mod tests {
    use warden_core::Right;

    use super::*;

    #[test]
    fn crud_rights_cover_each_operation() {
        let rights = CrudRights::for_module("appInfo").unwrap();
        assert_eq!(rights.view, vec![RequiredRight::new("appinfo", Right::View)]);
        assert_eq!(rights.add[0].right, Right::Add);
        assert_eq!(rights.edit[0].right, Right::Edit);
        assert_eq!(rights.delete[0].right, Right::Delete);
    }

    #[test]
    fn blank_module_is_rejected() {
        assert!(CrudRights::for_module("").is_err());
    }
}
