//! Postgres-backed repository.
//!
//! SQL is assembled with `sqlx::QueryBuilder`. Identifiers come only from the
//! table's declared [`Column`]s; every operand is a bound parameter.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | StoreError |
//! |------------|----------------------|------------|
//! | Database (unique violation) | `23505` | `Conflict` |
//! | Database (foreign key violation) | `23503` | `Conflict` |
//! | Database (other) | Any other | `Backend` |
//! | Decode / pool / IO | N/A | `Backend` |

use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder, Row};
use tracing::{instrument, Span};
use uuid::Uuid;

use warden_query::{FieldKind, FieldValue, PageRequest, Predicate};

use super::{check_query, Column, Repository, StoreError, Table};

pub struct PostgresRepository<T> {
    pool: Arc<PgPool>,
    _row: PhantomData<fn() -> T>,
}

impl<T> PostgresRepository<T> {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
            _row: PhantomData,
        }
    }
}

impl<T> Clone for PostgresRepository<T> {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool.clone(),
            _row: PhantomData,
        }
    }
}

fn quoted(column: &Column) -> String {
    format!("\"{}\"", column.sql)
}

fn select_list<T: Table>() -> String {
    T::COLUMNS.iter().map(quoted).collect::<Vec<_>>().join(", ")
}

fn select_from<T: Table>() -> QueryBuilder<'static, Postgres> {
    QueryBuilder::new(format!("SELECT {} FROM {}", select_list::<T>(), T::NAME))
}

fn push_value(qb: &mut QueryBuilder<'_, Postgres>, kind: FieldKind, value: FieldValue) {
    match (kind, value) {
        (_, FieldValue::Text(v)) => qb.push_bind(v),
        (_, FieldValue::Integer(v)) => qb.push_bind(v),
        (_, FieldValue::Boolean(v)) => qb.push_bind(v),
        (_, FieldValue::Uuid(v)) => qb.push_bind(v),
        (_, FieldValue::Timestamp(v)) => qb.push_bind(v),
        (FieldKind::Text, FieldValue::Null) => qb.push_bind(None::<String>),
        (FieldKind::Integer, FieldValue::Null) => qb.push_bind(None::<i64>),
        (FieldKind::Boolean, FieldValue::Null) => qb.push_bind(None::<bool>),
        (FieldKind::Uuid, FieldValue::Null) => qb.push_bind(None::<Uuid>),
        (FieldKind::Timestamp, FieldValue::Null) => {
            qb.push_bind(None::<chrono::DateTime<chrono::Utc>>)
        }
    };
}

/// Append `WHERE TRUE AND (a OR b) AND (...)`.
fn push_predicate<T: Table>(
    qb: &mut QueryBuilder<'_, Postgres>,
    predicate: &Predicate,
) -> Result<(), StoreError> {
    qb.push(" WHERE TRUE");
    for conjunct in predicate.conjuncts() {
        qb.push(" AND (");
        for (i, cmp) in conjunct.iter().enumerate() {
            if i > 0 {
                qb.push(" OR ");
            }
            let column = T::column(&cmp.field)
                .ok_or_else(|| warden_query::FilterError::UnknownField(cmp.field.clone()))?;
            match cmp.typed_operand(column.kind)? {
                None => {
                    qb.push(format!("{}::text ILIKE ", quoted(column)));
                    qb.push_bind(cmp.operand.clone());
                }
                Some(value) => {
                    qb.push(format!("{} {} ", quoted(column), cmp.op.sql()));
                    push_value(qb, column.kind, value);
                }
            }
        }
        qb.push(")");
    }
    Ok(())
}

/// Append `ORDER BY <sort column>, "id" ASC`.
fn push_order<T: Table>(
    qb: &mut QueryBuilder<'_, Postgres>,
    page: &PageRequest,
) -> Result<(), StoreError> {
    qb.push(" ORDER BY ");
    if let Some(sort) = &page.sort {
        let column = T::column(&sort.field)
            .ok_or_else(|| StoreError::InvalidSort(sort.field.clone()))?;
        qb.push(format!("{} {}, ", quoted(column), sort.direction.sql()));
    }
    qb.push("\"id\" ASC");
    Ok(())
}

fn row_values<T: Table>(row: &T) -> impl Iterator<Item = (&'static Column, FieldValue)> + '_ {
    T::COLUMNS
        .iter()
        .map(move |c| (c, row.value(c.field).unwrap_or(FieldValue::Null)))
}

/// `INSERT ... RETURNING <every column>`.
fn insert_query<T: Table>(row: &T) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new(format!("INSERT INTO {} (", T::NAME));
    qb.push(select_list::<T>());
    qb.push(") VALUES (");
    for (i, (column, value)) in row_values(row).enumerate() {
        if i > 0 {
            qb.push(", ");
        }
        push_value(&mut qb, column.kind, value);
    }
    qb.push(") RETURNING ");
    qb.push(select_list::<T>());
    qb
}

/// `UPDATE ... SET` every non-key column, `RETURNING` the stored row.
fn update_query<T: Table>(row: &T) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new(format!("UPDATE {} SET ", T::NAME));
    for (i, (column, value)) in row_values(row).skip(1).enumerate() {
        if i > 0 {
            qb.push(", ");
        }
        qb.push(format!("{} = ", quoted(column)));
        push_value(&mut qb, column.kind, value);
    }
    qb.push(" WHERE \"id\" = ");
    qb.push_bind(row.id());
    qb.push(" RETURNING ");
    qb.push(select_list::<T>());
    qb
}

fn decode<T: Table>(operation: &str, row: &sqlx::postgres::PgRow) -> Result<T, StoreError> {
    T::from_pg_row(row).map_err(|e| map_sqlx_error(operation, e))
}

#[async_trait]
impl<T: Table> Repository<T> for PostgresRepository<T> {
    #[instrument(skip(self, row), fields(table = T::NAME, id = %row.id()), err)]
    async fn insert(&self, row: T) -> Result<T, StoreError> {
        // Decode what was stored; Postgres keeps microsecond timestamps.
        let stored = insert_query(&row)
            .build()
            .fetch_one(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("insert", e))?;
        decode("insert", &stored)
    }

    #[instrument(skip(self), fields(table = T::NAME), err)]
    async fn get(&self, id: Uuid) -> Result<Option<T>, StoreError> {
        let mut qb = select_from::<T>();
        qb.push(" WHERE \"id\" = ");
        qb.push_bind(id);

        let row = qb
            .build()
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("get", e))?;
        row.as_ref().map(|r| decode::<T>("get", r)).transpose()
    }

    #[instrument(skip(self, row), fields(table = T::NAME, id = %row.id()), err)]
    async fn update(&self, row: T) -> Result<T, StoreError> {
        let stored = update_query(&row)
            .build()
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("update", e))?
            .ok_or(StoreError::NotFound(T::ENTITY))?;
        decode("update", &stored)
    }

    #[instrument(skip(self), fields(table = T::NAME), err)]
    async fn delete(&self, id: Uuid) -> Result<T, StoreError> {
        let mut qb =
            QueryBuilder::<Postgres>::new(format!("DELETE FROM {} WHERE \"id\" = ", T::NAME));
        qb.push_bind(id);
        qb.push(" RETURNING ");
        qb.push(select_list::<T>());

        let row = qb
            .build()
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete", e))?
            .ok_or(StoreError::NotFound(T::ENTITY))?;
        decode("delete", &row)
    }

    #[instrument(skip(self, predicate), fields(table = T::NAME), err)]
    async fn find_one(&self, predicate: &Predicate) -> Result<Option<T>, StoreError> {
        check_query::<T>(predicate, None)?;
        let mut qb = select_from::<T>();
        push_predicate::<T>(&mut qb, predicate)?;
        qb.push(" ORDER BY \"id\" ASC LIMIT 1");

        let row = qb
            .build()
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_one", e))?;
        row.as_ref().map(|r| decode::<T>("find_one", r)).transpose()
    }

    #[instrument(
        skip(self, predicate, page),
        fields(table = T::NAME, page = page.page, limit = page.limit, rows = tracing::field::Empty),
        err
    )]
    async fn find_and_count(
        &self,
        predicate: &Predicate,
        page: &PageRequest,
    ) -> Result<(Vec<T>, u64), StoreError> {
        check_query::<T>(predicate, Some(page))?;

        let mut count =
            QueryBuilder::<Postgres>::new(format!("SELECT COUNT(*) FROM {}", T::NAME));
        push_predicate::<T>(&mut count, predicate)?;
        let total: i64 = count
            .build()
            .fetch_one(&*self.pool)
            .await
            .and_then(|row| row.try_get(0))
            .map_err(|e| map_sqlx_error("find_and_count", e))?;

        let mut qb = select_from::<T>();
        push_predicate::<T>(&mut qb, predicate)?;
        push_order::<T>(&mut qb, page)?;
        qb.push(" LIMIT ");
        qb.push_bind(i64::try_from(page.limit).unwrap_or(i64::MAX));
        qb.push(" OFFSET ");
        qb.push_bind(i64::try_from(page.offset()).unwrap_or(i64::MAX));

        let rows = qb
            .build()
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_and_count", e))?;
        let results = rows
            .iter()
            .map(|r| decode::<T>("find_and_count", r))
            .collect::<Result<Vec<_>, _>>()?;

        Span::current().record("rows", results.len());
        Ok((results, u64::try_from(total).unwrap_or(0)))
    }
}

/// Map SQLx errors to `StoreError`.
pub(crate) fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());
            match db_err.code().as_deref() {
                Some("23505") => StoreError::Conflict(
                    db_err
                        .constraint()
                        .map(|c| format!("duplicate value violates '{c}'"))
                        .unwrap_or(msg),
                ),
                Some("23503") => StoreError::Conflict(msg),
                _ => StoreError::Backend(msg),
            }
        }
        sqlx::Error::PoolClosed => {
            StoreError::Backend(format!("connection pool closed in {}", operation))
        }
        _ => StoreError::Backend(format!("sqlx error in {}: {}", operation, err)),
    }
}
