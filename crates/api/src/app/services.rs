use warden_infra::{StoreDirectory, Stores};

/// Shared per-process services, handed to handlers as an `Extension`.
#[derive(Clone)]
pub struct AppServices {
    pub stores: Stores,
    pub directory: StoreDirectory,
}

impl AppServices {
    pub fn new(stores: Stores) -> Self {
        let directory = stores.directory();
        Self { stores, directory }
    }
}
