use async_trait::async_trait;
use thiserror::Error;

use warden_core::{Module, ModuleId, Permission, RoleId};

/// Infrastructure failure while resolving rights.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("rights lookup failed: {0}")]
pub struct LookupError(pub String);

impl LookupError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

/// Read access to the persisted role → module → permission graph.
///
/// `Ok(None)` means "does not exist"; `Err` means the lookup itself failed.
#[async_trait]
pub trait RbacDirectory: Send + Sync {
    /// `name` is already case-folded.
    async fn module_by_name(&self, name: &str) -> Result<Option<Module>, LookupError>;

    async fn permission_for(
        &self,
        role_id: RoleId,
        module_id: ModuleId,
    ) -> Result<Option<Permission>, LookupError>;
}
