//! The driver seam and its sqlx implementation.
//!
//! The client only needs two things from a database connection: run a
//! statement that returns no rows, and run one that does. [`SqlxDriver`]
//! provides both over any `sqlx` pool; tests substitute a scripted driver.

use std::future::Future;
use std::sync::Arc;

use snowddl_core::row::{Cell, Row};
use snowddl_core::DriverError;
use sqlx::any::{AnyPoolOptions, AnyRow};
use sqlx::{AnyPool, Column, Row as _, ValueRef};

use crate::context::Context;

/// Outcome of a statement that returns no rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecResult {
    /// Rows affected, as reported by the driver.
    pub rows_affected: u64,
}

/// A connection to the warehouse.
///
/// Implementations own their pooling; the client holds no other shared
/// state. Cancellation and deadlines are enforced by the client around
/// each call, and the context is passed along so that drivers able to
/// abort server-side work or route by account can do so.
pub trait Driver: Send + Sync {
    /// Runs a statement that produces no rows.
    fn exec(
        &self,
        ctx: &Context,
        sql: &str,
    ) -> impl Future<Output = Result<ExecResult, DriverError>> + Send;

    /// Runs a statement and returns every row.
    fn query(
        &self,
        ctx: &Context,
        sql: &str,
    ) -> impl Future<Output = Result<Vec<Row>, DriverError>> + Send;
}

impl<D: Driver> Driver for Arc<D> {
    fn exec(
        &self,
        ctx: &Context,
        sql: &str,
    ) -> impl Future<Output = Result<ExecResult, DriverError>> + Send {
        (**self).exec(ctx, sql)
    }

    fn query(
        &self,
        ctx: &Context,
        sql: &str,
    ) -> impl Future<Output = Result<Vec<Row>, DriverError>> + Send {
        (**self).query(ctx, sql)
    }
}

/// Driver backed by a `sqlx` [`AnyPool`].
#[derive(Debug, Clone)]
pub struct SqlxDriver {
    pool: AnyPool,
}

impl SqlxDriver {
    /// Connects to `url` with a small pool.
    pub async fn connect(url: &str) -> Result<Self, DriverError> {
        Self::connect_with(AnyPoolOptions::new().max_connections(5), url).await
    }

    /// Connects to `url` with custom pool options.
    pub async fn connect_with(options: AnyPoolOptions, url: &str) -> Result<Self, DriverError> {
        sqlx::any::install_default_drivers();
        let pool = options.connect(url).await.map_err(driver_error)?;
        Ok(Self { pool })
    }

    /// Wraps an existing pool.
    #[must_use]
    pub const fn from_pool(pool: AnyPool) -> Self {
        Self { pool }
    }

    /// Returns the underlying pool.
    #[must_use]
    pub const fn pool(&self) -> &AnyPool {
        &self.pool
    }
}

impl Driver for SqlxDriver {
    async fn exec(&self, _ctx: &Context, sql: &str) -> Result<ExecResult, DriverError> {
        let result = sqlx::query(sql)
            .execute(&self.pool)
            .await
            .map_err(driver_error)?;
        Ok(ExecResult {
            rows_affected: result.rows_affected(),
        })
    }

    async fn query(&self, _ctx: &Context, sql: &str) -> Result<Vec<Row>, DriverError> {
        let rows = sqlx::query(sql)
            .fetch_all(&self.pool)
            .await
            .map_err(driver_error)?;
        rows.iter().map(convert_row).collect()
    }
}

/// Converts a `sqlx` error, keeping the database error code when present.
pub fn driver_error(err: sqlx::Error) -> DriverError {
    let code = err
        .as_database_error()
        .and_then(|db| db.code())
        .map(|code| code.into_owned());
    DriverError::new(err.to_string())
        .with_code(code)
        .with_source(err)
}

fn convert_row(row: &AnyRow) -> Result<Row, DriverError> {
    let mut out = Row::new();
    for column in row.columns() {
        let cell = decode_cell(row, column.ordinal()).ok_or_else(|| {
            DriverError::new(format!(
                "column `{}` has a type that cannot be decoded",
                column.name()
            ))
        })?;
        out.push(column.name(), cell);
    }
    Ok(out)
}

fn decode_cell(row: &AnyRow, index: usize) -> Option<Cell> {
    let raw = row.try_get_raw(index).ok()?;
    if raw.is_null() {
        return Some(Cell::Null);
    }
    if let Ok(value) = row.try_get::<i64, _>(index) {
        return Some(Cell::Int(value));
    }
    if let Ok(value) = row.try_get::<f64, _>(index) {
        return Some(Cell::Float(value));
    }
    if let Ok(value) = row.try_get::<bool, _>(index) {
        return Some(Cell::Bool(value));
    }
    row.try_get::<String, _>(index).ok().map(Cell::Text)
}
