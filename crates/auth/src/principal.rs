use serde::Serialize;

use warden_core::{RoleId, User, UserId};

/// The authenticated caller of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Principal {
    pub id: UserId,
    pub role_id: Option<RoleId>,
}

impl Principal {
    pub fn new(id: UserId, role_id: Option<RoleId>) -> Self {
        Self { id, role_id }
    }
}

impl From<&User> for Principal {
    fn from(user: &User) -> Self {
        Self::new(user.id, user.role_id)
    }
}
