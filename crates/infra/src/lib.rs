//! Infrastructure layer: repositories, database bootstrap and seed data.

pub mod db;
pub mod directory;
pub mod seed;
pub mod store;
pub mod stores;
pub mod tables;

pub use directory::StoreDirectory;
pub use store::{
    check_query, Column, InMemoryRepository, PostgresRepository, Repository, StoreError, Table,
};
pub use stores::Stores;
