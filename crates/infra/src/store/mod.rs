//! Row storage behind a backend-neutral repository trait.
//!
//! Two backends implement [`Repository`]: [`InMemoryRepository`] for tests and
//! dev, [`PostgresRepository`] for persistent deployments. Both validate
//! filters and sort keys against the table's declared columns before touching
//! any rows, so an invalid query fails the same way on either backend.

pub mod in_memory;
pub mod postgres;

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use thiserror::Error;
use uuid::Uuid;

use warden_query::{FieldKind, FieldValue, FilterError, PageRequest, Predicate};

pub use in_memory::InMemoryRepository;
pub use postgres::PostgresRepository;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("{0} not found")]
    NotFound(&'static str),

    /// A unique or referential constraint rejected the write.
    #[error("conflict: {0}")]
    Conflict(String),

    #[error("invalid filter: {0}")]
    Filter(#[from] FilterError),

    #[error("invalid sort field '{0}'")]
    InvalidSort(String),

    #[error("storage backend error: {0}")]
    Backend(String),
}

/// A filterable column: its API name, its SQL name and its type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub field: &'static str,
    pub sql: &'static str,
    pub kind: FieldKind,
}

impl Column {
    pub const fn new(field: &'static str, sql: &'static str, kind: FieldKind) -> Self {
        Self { field, sql, kind }
    }
}

/// Schema of a stored entity.
pub trait Table: Clone + Send + Sync + 'static {
    /// SQL table name.
    const NAME: &'static str;
    /// Singular name used in error messages.
    const ENTITY: &'static str;
    /// Every persisted column; the first one is the primary key.
    const COLUMNS: &'static [Column];
    /// Column groups (by API name) that must be unique together.
    const UNIQUE: &'static [&'static [&'static str]];

    fn id(&self) -> Uuid;

    /// Value of the column whose API name is `field`.
    fn value(&self, field: &str) -> Option<FieldValue>;

    fn from_pg_row(row: &PgRow) -> Result<Self, sqlx::Error>;

    fn column(field: &str) -> Option<&'static Column> {
        Self::COLUMNS.iter().find(|c| c.field == field)
    }
}

/// Reject predicates and sort keys that name undeclared columns or carry
/// operands that do not parse as the column's type.
pub fn check_query<T: Table>(
    predicate: &Predicate,
    page: Option<&PageRequest>,
) -> Result<(), StoreError> {
    for cmp in predicate.comparisons() {
        let column = T::column(&cmp.field)
            .ok_or_else(|| FilterError::UnknownField(cmp.field.clone()))?;
        cmp.typed_operand(column.kind)?;
    }
    if let Some(sort) = page.and_then(|p| p.sort.as_ref()) {
        if T::column(&sort.field).is_none() {
            return Err(StoreError::InvalidSort(sort.field.clone()));
        }
    }
    Ok(())
}

#[async_trait]
pub trait Repository<T: Table>: Send + Sync {
    /// Fails with [`StoreError::Conflict`] when a unique group is taken.
    async fn insert(&self, row: T) -> Result<T, StoreError>;

    async fn get(&self, id: Uuid) -> Result<Option<T>, StoreError>;

    /// Replace the stored row with the same id.
    async fn update(&self, row: T) -> Result<T, StoreError>;

    /// Remove and return the row.
    async fn delete(&self, id: Uuid) -> Result<T, StoreError>;

    async fn find_one(&self, predicate: &Predicate) -> Result<Option<T>, StoreError>;

    /// One page of matching rows plus the total match count.
    async fn find_and_count(
        &self,
        predicate: &Predicate,
        page: &PageRequest,
    ) -> Result<(Vec<T>, u64), StoreError>;
}
