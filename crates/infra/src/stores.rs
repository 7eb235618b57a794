use std::sync::Arc;

use sqlx::PgPool;
use tokio::sync::{Mutex, MutexGuard};

use warden_core::{AppInfo, Module, Permission, Role, User};

use crate::directory::StoreDirectory;
use crate::store::{InMemoryRepository, PostgresRepository, Repository};

/// One repository per entity, all on the same backend.
#[derive(Clone)]
pub struct Stores {
    pub users: Arc<dyn Repository<User>>,
    pub roles: Arc<dyn Repository<Role>>,
    pub modules: Arc<dyn Repository<Module>>,
    pub permissions: Arc<dyn Repository<Permission>>,
    pub app_info: Arc<dyn Repository<AppInfo>>,
    references: Arc<Mutex<()>>,
}

impl Stores {
    pub fn in_memory() -> Self {
        Self {
            users: Arc::new(InMemoryRepository::new()),
            roles: Arc::new(InMemoryRepository::new()),
            modules: Arc::new(InMemoryRepository::new()),
            permissions: Arc::new(InMemoryRepository::new()),
            app_info: Arc::new(InMemoryRepository::new()),
            references: Arc::default(),
        }
    }

    pub fn postgres(pool: PgPool) -> Self {
        Self {
            users: Arc::new(PostgresRepository::new(pool.clone())),
            roles: Arc::new(PostgresRepository::new(pool.clone())),
            modules: Arc::new(PostgresRepository::new(pool.clone())),
            permissions: Arc::new(PostgresRepository::new(pool.clone())),
            app_info: Arc::new(PostgresRepository::new(pool)),
            references: Arc::default(),
        }
    }

    /// Hold across a cross-table reference check and the write that depends
    /// on it. Repositories only lock their own table.
    pub async fn lock_references(&self) -> MutexGuard<'_, ()> {
        self.references.lock().await
    }

    pub fn directory(&self) -> StoreDirectory {
        StoreDirectory::new(self.modules.clone(), self.permissions.clone())
    }
}
