//! `warden-query`: client-supplied filters, sorting and paging.
//!
//! Filter clauses compile into a backend-neutral [`Predicate`]. Storage
//! backends either evaluate it in memory ([`Predicate::matches`]) or render it
//! into SQL with every operand bound as a parameter.

pub mod filter;
pub mod like;
pub mod pagination;
pub mod predicate;
pub mod value;

pub use filter::{
    compile, Condition, FilterClause, FilterError, MAX_CLAUSES, MAX_FIELDS, MAX_VALUES,
};
pub use like::ilike_match;
pub use pagination::{
    ListParams, Page, PageRequest, Paging, PagingError, SortBy, SortDirection, DEFAULT_LIMIT,
    MAX_LIMIT,
};
pub use predicate::{CompareOp, Comparison, Predicate};
pub use value::{FieldKind, FieldValue};
