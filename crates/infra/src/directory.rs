use std::sync::Arc;

use async_trait::async_trait;

use warden_auth::{LookupError, RbacDirectory};
use warden_core::{Module, ModuleId, Permission, RoleId};
use warden_query::Predicate;

use crate::store::Repository;

/// [`RbacDirectory`] over the module and permission repositories.
#[derive(Clone)]
pub struct StoreDirectory {
    modules: Arc<dyn Repository<Module>>,
    permissions: Arc<dyn Repository<Permission>>,
}

impl StoreDirectory {
    pub fn new(
        modules: Arc<dyn Repository<Module>>,
        permissions: Arc<dyn Repository<Permission>>,
    ) -> Self {
        Self {
            modules,
            permissions,
        }
    }
}

#[async_trait]
impl RbacDirectory for StoreDirectory {
    async fn module_by_name(&self, name: &str) -> Result<Option<Module>, LookupError> {
        self.modules
            .find_one(&Predicate::all().and_eq("name", name))
            .await
            .map_err(|e| LookupError::new(e.to_string()))
    }

    async fn permission_for(
        &self,
        role_id: RoleId,
        module_id: ModuleId,
    ) -> Result<Option<Permission>, LookupError> {
        let predicate = Predicate::all()
            .and_eq("roleId", role_id.to_string())
            .and_eq("moduleId", module_id.to_string());
        self.permissions
            .find_one(&predicate)
            .await
            .map_err(|e| LookupError::new(e.to_string()))
    }
}
