//! Generic paginated document access.
//!
//! [`Repository`] wraps a single logical collection and exposes the full set
//! of operations every resource type needs: create, find-one, find-by-id,
//! paginated find, update, update-many, delete-one and count. It is
//! parameterized over the record type and carries no domain knowledge of its
//! own; per-type concerns (field validators, a pre-persist transform) are
//! injected at construction.
//!
//! Absence of a record is a valid, non-exceptional outcome everywhere:
//! `find_*` return `Option`, `delete_one` returns whether anything was
//! removed, and only genuine store failures surface as
//! [`PersistenceError`].

use std::marker::PhantomData;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sqlx::postgres::{PgArguments, PgRow};
use sqlx::query::QueryAs;
use sqlx::{FromRow, PgPool, Postgres};
use uuid::Uuid;
use validator::Validate;

use crate::db::filter::{Document, Filter, Value};
use crate::error::PersistenceError;

/// Page requested when the caller supplies none.
pub const DEFAULT_PAGE: i64 = 1;
/// Page size used when the caller supplies none.
pub const DEFAULT_LIMIT: i64 = 15;

/// A persisted record type backed by one collection.
///
/// The store assigns the identifier and both timestamps; `ORDER_BY` is the
/// collection's declared order, used for paginated reads and for selecting the
/// "first" match of update/delete operations.
pub trait Record: for<'r> FromRow<'r, PgRow> + DeserializeOwned + Send + Unpin {
    const COLLECTION: &'static str;
    const ORDER_BY: &'static str = "created_at, id";
}

/// Page/limit parameters, both optional and 1-based.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct Pagination {
    #[validate(range(min = 1, message = "Page must be a positive number"))]
    pub page: Option<i64>,
    #[validate(range(min = 1, message = "Limit must be a positive number"))]
    pub limit: Option<i64>,
}

impl Pagination {
    pub fn page(&self) -> i64 {
        self.page.unwrap_or(DEFAULT_PAGE)
    }

    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_LIMIT)
    }
}

/// One page of a filtered result set plus its pagination metadata.
///
/// `data` is a contiguous slice of the full filtered result set under the
/// collection's declared order; `total_items` counts every record matching the
/// filter, not just the page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginatedResult<T> {
    pub data: Vec<T>,
    pub current_page: i64,
    pub total_pages: i64,
    pub total_items: i64,
}

impl<T> PaginatedResult<T> {
    pub fn new(data: Vec<T>, current_page: i64, total_pages: i64, total_items: i64) -> Self {
        PaginatedResult {
            data,
            current_page,
            total_pages,
            total_items,
        }
    }
}

fn total_pages(total_items: i64, limit: i64) -> i64 {
    if total_items == 0 {
        0
    } else {
        (total_items + limit - 1) / limit
    }
}

/// Transform applied to a document immediately before insert.
pub type PrePersist = Arc<dyn Fn(Document) -> Result<Document, PersistenceError> + Send + Sync>;

/// Field validator run before create, update and update-many, mirroring the
/// store schema. Failures surface as constraint violations.
pub type FieldValidator = Arc<dyn Fn(&Document) -> Result<(), PersistenceError> + Send + Sync>;

/// Generic data access for one collection of `T` records.
pub struct Repository<T: Record> {
    pool: PgPool,
    pre_persist: Option<PrePersist>,
    validators: Vec<FieldValidator>,
    _record: PhantomData<fn() -> T>,
}

impl<T: Record> Clone for Repository<T> {
    fn clone(&self) -> Self {
        Repository {
            pool: self.pool.clone(),
            pre_persist: self.pre_persist.clone(),
            validators: self.validators.clone(),
            _record: PhantomData,
        }
    }
}

impl<T: Record> Repository<T> {
    /// Creates a repository over an explicit store handle. The pool is opened
    /// at startup and torn down at process exit; no ambient connection state.
    pub fn new(pool: PgPool) -> Self {
        Repository {
            pool,
            pre_persist: None,
            validators: Vec::new(),
            _record: PhantomData,
        }
    }

    /// Installs the pre-persist transform for this record type. Domain write
    /// path side effects (e.g. password hashing) belong in the service layer,
    /// not here; this hook is for store-shape normalization.
    pub fn with_pre_persist(
        mut self,
        transform: impl Fn(Document) -> Result<Document, PersistenceError> + Send + Sync + 'static,
    ) -> Self {
        self.pre_persist = Some(Arc::new(transform));
        self
    }

    /// Adds a field validator for this record type.
    pub fn with_validator(
        mut self,
        validator: impl Fn(&Document) -> Result<(), PersistenceError> + Send + Sync + 'static,
    ) -> Self {
        self.validators.push(Arc::new(validator));
        self
    }

    fn run_validators(&self, doc: &Document) -> Result<(), PersistenceError> {
        for validator in &self.validators {
            validator(doc)?;
        }
        Ok(())
    }

    /// Persists a new record. The store assigns the identifier and both
    /// timestamps; the configured pre-persist transform runs first.
    pub async fn create(&self, doc: Document) -> Result<T, PersistenceError> {
        let doc = match &self.pre_persist {
            Some(transform) => transform(doc)?,
            None => doc,
        };
        self.run_validators(&doc)?;

        let sql = if doc.is_empty() {
            format!("INSERT INTO {} DEFAULT VALUES RETURNING *", T::COLLECTION)
        } else {
            let (columns, placeholders) = doc.insert_lists();
            format!(
                "INSERT INTO {} ({}) VALUES ({}) RETURNING *",
                T::COLLECTION,
                columns,
                placeholders
            )
        };

        let mut query = sqlx::query_as::<_, T>(&sql);
        for value in doc.params() {
            query = bind_value(query, value);
        }
        query.fetch_one(&self.pool).await.map_err(Into::into)
    }

    /// Returns the first record matching the filter under the collection's
    /// declared order, or `None`.
    pub async fn find_one(&self, filter: &Filter) -> Result<Option<T>, PersistenceError> {
        let sql = format!(
            "SELECT * FROM {} {} ORDER BY {} LIMIT 1",
            T::COLLECTION,
            filter.where_clause(1),
            T::ORDER_BY
        );
        let mut query = sqlx::query_as::<_, T>(&sql);
        for value in filter.params() {
            query = bind_value(query, value);
        }
        query.fetch_optional(&self.pool).await.map_err(Into::into)
    }

    /// Identifier lookup. Identifier format belongs to the store, so a
    /// malformed id cannot match anything and is reported as absence.
    pub async fn find_by_id(&self, id: &str) -> Result<Option<T>, PersistenceError> {
        let Ok(id) = Uuid::parse_str(id) else {
            return Ok(None);
        };
        self.find_one(&Filter::new().eq("id", id)).await
    }

    /// Paginated find: one page of filtered records plus the metadata
    /// describing the full filtered set.
    ///
    /// The filtered count and the page slice are computed by two subqueries of
    /// a single statement, so both observe the same snapshot and `total_pages`
    /// can never disagree with `data` under concurrent writes. A page past the
    /// end yields an empty `data` with the counts still correct.
    pub async fn find(
        &self,
        filter: &Filter,
        pagination: &Pagination,
    ) -> Result<PaginatedResult<T>, PersistenceError> {
        let page = pagination.page();
        let limit = pagination.limit();
        let skip = (page - 1) * limit;

        let where_sql = filter.where_clause(1);
        let params = filter.param_count();
        let sql = format!(
            "SELECT \
               (SELECT COUNT(*) FROM {table} {where_sql}) AS total_items, \
               (SELECT COALESCE(jsonb_agg(page), '[]'::jsonb) FROM \
                  (SELECT * FROM {table} {where_sql} ORDER BY {order} \
                   LIMIT ${limit_param} OFFSET ${offset_param}) AS page) AS data",
            table = T::COLLECTION,
            where_sql = where_sql,
            order = T::ORDER_BY,
            limit_param = params + 1,
            offset_param = params + 2,
        );

        let mut query = sqlx::query_as::<_, (i64, serde_json::Value)>(&sql);
        for value in filter.params() {
            query = bind_value(query, value);
        }
        let (total_items, data) = query
            .bind(limit)
            .bind(skip)
            .fetch_one(&self.pool)
            .await
            .map_err(PersistenceError::from)?;

        let data: Vec<T> = serde_json::from_value(data)
            .map_err(|e| PersistenceError::Unreachable(format!("undecodable page payload: {}", e)))?;

        Ok(PaginatedResult::new(
            data,
            page,
            total_pages(total_items, limit),
            total_items,
        ))
    }

    /// Atomically applies the patch to the first record matching the filter
    /// and returns the post-update state, or `None` when nothing matched.
    ///
    /// `updated_at` is refreshed on every update. Concurrent updates to the
    /// same record are last-writer-wins at record granularity; the returned
    /// state is authoritative.
    pub async fn update(
        &self,
        filter: &Filter,
        patch: Document,
    ) -> Result<Option<T>, PersistenceError> {
        self.run_validators(&patch)?;

        let sql = format!(
            "UPDATE {table} SET {sets} \
             WHERE id = (SELECT id FROM {table} {where_sql} ORDER BY {order} LIMIT 1) \
             RETURNING *",
            table = T::COLLECTION,
            sets = set_clause_with_timestamp(&patch),
            where_sql = filter.where_clause(patch.param_count() + 1),
            order = T::ORDER_BY,
        );

        let mut query = sqlx::query_as::<_, T>(&sql);
        for value in patch.params().chain(filter.params()) {
            query = bind_value(query, value);
        }
        query.fetch_optional(&self.pool).await.map_err(Into::into)
    }

    /// Applies the patch to every record matching the filter, returning the
    /// number affected. Zero is a valid outcome, not an error.
    pub async fn update_many(
        &self,
        filter: &Filter,
        patch: Document,
    ) -> Result<u64, PersistenceError> {
        self.run_validators(&patch)?;

        let sql = format!(
            "UPDATE {table} SET {sets} {where_sql} RETURNING id",
            table = T::COLLECTION,
            sets = set_clause_with_timestamp(&patch),
            where_sql = filter.where_clause(patch.param_count() + 1),
        );

        let mut query = sqlx::query_as::<_, (Uuid,)>(&sql);
        for value in patch.params().chain(filter.params()) {
            query = bind_value(query, value);
        }
        let updated = query.fetch_all(&self.pool).await?;
        Ok(updated.len() as u64)
    }

    /// Deletes the first record matching the filter. Returns whether a record
    /// was actually removed; deleting zero records is not an error.
    pub async fn delete_one(&self, filter: &Filter) -> Result<bool, PersistenceError> {
        let sql = format!(
            "DELETE FROM {table} \
             WHERE id = (SELECT id FROM {table} {where_sql} ORDER BY {order} LIMIT 1) \
             RETURNING id",
            table = T::COLLECTION,
            where_sql = filter.where_clause(1),
            order = T::ORDER_BY,
        );

        let mut query = sqlx::query_as::<_, (Uuid,)>(&sql);
        for value in filter.params() {
            query = bind_value(query, value);
        }
        let deleted = query.fetch_optional(&self.pool).await?;
        Ok(deleted.is_some())
    }

    /// Counts the records matching the filter.
    pub async fn count_documents(&self, filter: &Filter) -> Result<i64, PersistenceError> {
        let sql = format!(
            "SELECT COUNT(*) FROM {} {}",
            T::COLLECTION,
            filter.where_clause(1)
        );
        let mut query = sqlx::query_as::<_, (i64,)>(&sql);
        for value in filter.params() {
            query = bind_value(query, value);
        }
        let (count,) = query.fetch_one(&self.pool).await?;
        Ok(count)
    }
}

/// Every update refreshes `updated_at`, even one whose patch is otherwise
/// empty.
fn set_clause_with_timestamp(patch: &Document) -> String {
    if patch.is_empty() {
        "updated_at = now()".to_string()
    } else {
        format!("{}, updated_at = now()", patch.set_clause())
    }
}

/// Binds one runtime value onto a query. `Null` values never reach this point;
/// they are rendered as SQL literals so they need no wire type.
fn bind_value<'q, O>(
    query: QueryAs<'q, Postgres, O, PgArguments>,
    value: &Value,
) -> QueryAs<'q, Postgres, O, PgArguments> {
    match value {
        Value::Text(v) => query.bind(v.clone()),
        Value::Int(v) => query.bind(*v),
        Value::Bool(v) => query.bind(*v),
        Value::Uuid(v) => query.bind(*v),
        Value::Timestamp(v) => query.bind(*v),
        Value::Null => query.bind(Option::<String>::None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_pagination_defaults() {
        let pagination = Pagination::default();
        assert_eq!(pagination.page(), 1);
        assert_eq!(pagination.limit(), 15);

        let pagination = Pagination {
            page: Some(3),
            limit: Some(10),
        };
        assert_eq!(pagination.page(), 3);
        assert_eq!(pagination.limit(), 10);
    }

    #[test]
    fn test_pagination_rejects_non_positive_values() {
        let pagination = Pagination {
            page: Some(0),
            limit: Some(10),
        };
        assert!(pagination.validate().is_err());

        let pagination = Pagination {
            page: Some(1),
            limit: Some(-5),
        };
        assert!(pagination.validate().is_err());

        let pagination = Pagination {
            page: None,
            limit: None,
        };
        assert!(pagination.validate().is_ok());
    }

    #[test]
    fn test_total_pages_math() {
        assert_eq!(total_pages(0, 10), 0);
        assert_eq!(total_pages(1, 10), 1);
        assert_eq!(total_pages(10, 10), 1);
        assert_eq!(total_pages(11, 10), 2);
        assert_eq!(total_pages(25, 10), 3);
        assert_eq!(total_pages(25, 15), 2);
        assert_eq!(total_pages(25, 1), 25);
    }

    #[test]
    fn test_paginated_result_holds_metadata() {
        let result = PaginatedResult::new(vec![1, 2, 3], 2, 5, 42);
        assert_eq!(result.data, vec![1, 2, 3]);
        assert_eq!(result.current_page, 2);
        assert_eq!(result.total_pages, 5);
        assert_eq!(result.total_items, 42);
    }
}
