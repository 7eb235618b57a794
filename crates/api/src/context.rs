use warden_auth::Principal;
use warden_core::{RoleId, UserId};

/// Authenticated caller, inserted into request extensions by the auth
/// middleware.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PrincipalContext {
    principal: Principal,
}

impl PrincipalContext {
    pub fn new(principal: Principal) -> Self {
        Self { principal }
    }

    pub fn principal(&self) -> &Principal {
        &self.principal
    }

    pub fn user_id(&self) -> UserId {
        self.principal.id
    }

    pub fn role_id(&self) -> Option<RoleId> {
        self.principal.role_id
    }
}
