use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::RwLock;

use async_trait::async_trait;
use uuid::Uuid;

use warden_query::{FieldValue, PageRequest, Predicate, SortBy, SortDirection};

use super::{check_query, Repository, StoreError, Table};

/// In-memory repository for tests/dev.
#[derive(Debug)]
pub struct InMemoryRepository<T> {
    inner: RwLock<BTreeMap<Uuid, T>>,
}

impl<T> InMemoryRepository<T> {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(BTreeMap::new()),
        }
    }
}

impl<T> Default for InMemoryRepository<T> {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned() -> StoreError {
    StoreError::Backend("in-memory store lock poisoned".to_string())
}

fn ensure_unique<T: Table>(rows: &BTreeMap<Uuid, T>, candidate: &T) -> Result<(), StoreError> {
    for group in T::UNIQUE {
        let key: Vec<Option<FieldValue>> = group.iter().map(|f| candidate.value(f)).collect();
        let taken = rows
            .values()
            .filter(|row| row.id() != candidate.id())
            .any(|row| group.iter().map(|f| row.value(f)).eq(key.iter().cloned()));
        if taken {
            return Err(StoreError::Conflict(format!(
                "{} with the same {} already exists",
                T::ENTITY,
                group.join(", ")
            )));
        }
    }
    Ok(())
}

fn matching<'a, T: Table>(
    rows: &'a BTreeMap<Uuid, T>,
    predicate: &Predicate,
) -> Result<Vec<&'a T>, StoreError> {
    let mut out = Vec::new();
    for row in rows.values() {
        if predicate.matches(|field| row.value(field))? {
            out.push(row);
        }
    }
    Ok(out)
}

/// NULLs sort after every value, as in Postgres.
fn compare_values(a: &FieldValue, b: &FieldValue) -> Ordering {
    match (a.is_null(), b.is_null()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => a.compare(b).unwrap_or(Ordering::Equal),
    }
}

fn sort_rows<T: Table>(rows: &mut [&T], sort: Option<&SortBy>) {
    rows.sort_by(|a, b| {
        let primary = sort.map_or(Ordering::Equal, |s| {
            let a = a.value(&s.field).unwrap_or(FieldValue::Null);
            let b = b.value(&s.field).unwrap_or(FieldValue::Null);
            match s.direction {
                SortDirection::Asc => compare_values(&a, &b),
                SortDirection::Desc => compare_values(&b, &a),
            }
        });
        primary.then_with(|| a.id().cmp(&b.id()))
    });
}

#[async_trait]
impl<T: Table> Repository<T> for InMemoryRepository<T> {
    async fn insert(&self, row: T) -> Result<T, StoreError> {
        let mut map = self.inner.write().map_err(|_| poisoned())?;
        if map.contains_key(&row.id()) {
            return Err(StoreError::Conflict(format!("{} id already exists", T::ENTITY)));
        }
        ensure_unique(&map, &row)?;
        map.insert(row.id(), row.clone());
        Ok(row)
    }

    async fn get(&self, id: Uuid) -> Result<Option<T>, StoreError> {
        let map = self.inner.read().map_err(|_| poisoned())?;
        Ok(map.get(&id).cloned())
    }

    async fn update(&self, row: T) -> Result<T, StoreError> {
        let mut map = self.inner.write().map_err(|_| poisoned())?;
        if !map.contains_key(&row.id()) {
            return Err(StoreError::NotFound(T::ENTITY));
        }
        ensure_unique(&map, &row)?;
        map.insert(row.id(), row.clone());
        Ok(row)
    }

    async fn delete(&self, id: Uuid) -> Result<T, StoreError> {
        let mut map = self.inner.write().map_err(|_| poisoned())?;
        map.remove(&id).ok_or(StoreError::NotFound(T::ENTITY))
    }

    async fn find_one(&self, predicate: &Predicate) -> Result<Option<T>, StoreError> {
        check_query::<T>(predicate, None)?;
        let map = self.inner.read().map_err(|_| poisoned())?;
        Ok(matching(&map, predicate)?.into_iter().next().cloned())
    }

    async fn find_and_count(
        &self,
        predicate: &Predicate,
        page: &PageRequest,
    ) -> Result<(Vec<T>, u64), StoreError> {
        check_query::<T>(predicate, Some(page))?;
        let map = self.inner.read().map_err(|_| poisoned())?;
        let mut rows = matching(&map, predicate)?;
        sort_rows(&mut rows, page.sort.as_ref());

        let total = rows.len() as u64;
        let offset = usize::try_from(page.offset()).unwrap_or(usize::MAX);
        let limit = usize::try_from(page.limit).unwrap_or(usize::MAX);
        let results = rows.into_iter().skip(offset).take(limit).cloned().collect();
        Ok((results, total))
    }
}
