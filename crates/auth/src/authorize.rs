//! Authorization evaluator.

use thiserror::Error;
use tracing::{error, info};

use warden_core::UserId;

use crate::{LookupError, Principal, RbacDirectory, RequiredRight};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("forbidden")]
    Forbidden,
}

/// Why a request was denied. Only used internally and in logs: every variant
/// reaches the caller as [`AuthzError::Forbidden`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DenyReason {
    NoRole,
    UnknownModule(String),
    MissingPermission(RequiredRight),
    RightNotGranted(Vec<RequiredRight>),
    LookupFailed(LookupError),
}

impl core::fmt::Display for DenyReason {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            DenyReason::NoRole => f.write_str("principal has no role"),
            DenyReason::UnknownModule(name) => write!(f, "unknown module '{name}'"),
            DenyReason::MissingPermission(r) => write!(f, "no permission row for '{r}'"),
            DenyReason::RightNotGranted(rights) => {
                f.write_str("rights not granted:")?;
                for r in rights {
                    write!(f, " {r}")?;
                }
                Ok(())
            }
            DenyReason::LookupFailed(err) => write!(f, "{err}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(DenyReason),
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }

    pub fn into_result(self) -> Result<(), AuthzError> {
        match self {
            Decision::Allow => Ok(()),
            Decision::Deny(_) => Err(AuthzError::Forbidden),
        }
    }
}

/// Decide whether `principal` may proceed.
///
/// Every requirement is resolved first (module by name, then the permission
/// row for the principal's role). A missing module, missing permission row or
/// failed lookup denies outright. Once all rows are found, the request is
/// allowed if every named right is granted, or if `target` is the principal's
/// own id. Only routes that act on a specific user pass a `target`.
pub async fn authorize(
    directory: &dyn RbacDirectory,
    principal: &Principal,
    required: &[RequiredRight],
    target: Option<UserId>,
) -> Decision {
    let decision = evaluate(directory, principal, required, target).await;
    if let Decision::Deny(reason) = &decision {
        match reason {
            DenyReason::LookupFailed(err) => {
                error!(principal_id = %principal.id, error = %err, "authorization lookup failed");
            }
            reason => {
                info!(principal_id = %principal.id, %reason, "authorization denied");
            }
        }
    }
    decision
}

async fn evaluate(
    directory: &dyn RbacDirectory,
    principal: &Principal,
    required: &[RequiredRight],
    target: Option<UserId>,
) -> Decision {
    if required.is_empty() {
        return Decision::Allow;
    }
    let Some(role_id) = principal.role_id else {
        return Decision::Deny(DenyReason::NoRole);
    };

    let mut missing = Vec::new();
    for requirement in required {
        let module = match directory.module_by_name(&requirement.module).await {
            Ok(Some(module)) => module,
            Ok(None) => {
                return Decision::Deny(DenyReason::UnknownModule(requirement.module.clone()));
            }
            Err(err) => return Decision::Deny(DenyReason::LookupFailed(err)),
        };
        let permission = match directory.permission_for(role_id, module.id).await {
            Ok(Some(permission)) => permission,
            Ok(None) => return Decision::Deny(DenyReason::MissingPermission(requirement.clone())),
            Err(err) => return Decision::Deny(DenyReason::LookupFailed(err)),
        };
        if !permission.grants(requirement.right) {
            missing.push(requirement.clone());
        }
    }

    if missing.is_empty() || target == Some(principal.id) {
        Decision::Allow
    } else {
        Decision::Deny(DenyReason::RightNotGranted(missing))
    }
}
