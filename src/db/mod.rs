//! Store access: connection lifecycle, filter/patch types and the generic
//! repository.
//!
//! The pool is the only store handle in the process. It is opened once at
//! startup, passed explicitly into each [`Repository`] at construction, and
//! torn down when the process exits. There is no ambient module-level
//! connection state.

pub mod filter;
pub mod repository;

pub use filter::{Document, Filter, Op, Value};
pub use repository::{
    PaginatedResult, Pagination, Record, Repository, DEFAULT_LIMIT, DEFAULT_PAGE,
};

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

/// Opens the process-wide connection pool.
pub async fn connect(database_url: &str) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await?;
    log::info!("connected to database");
    Ok(pool)
}
