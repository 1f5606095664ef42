//! Connection pool lifecycle and the two query primitives every model
//! operation goes through.

use futures_util::{StreamExt, TryStreamExt};
use quill_data::query::render_for_log;
use quill_data::{DataError, Dialect, Row, Value};
use sqlx::any::{AnyArguments, AnyPoolOptions, AnyRow};
use sqlx::query::Query;
use sqlx::{Any, AnyPool, Column, Row as _, ValueRef};
use tracing::{info, warn};

use crate::config::DatabaseConfig;
use crate::error::{SqlxErrorExt, SqlxResult};

/// A pooled database handle. Cheap to clone; every clone shares the pool.
///
/// Created explicitly with [`Database::connect`] and closed explicitly with
/// [`Database::close`], which waits for every connection to be released.
#[derive(Clone, Debug)]
pub struct Database {
    pool: AnyPool,
    dialect: Dialect,
    autocommit: bool,
}

impl Database {
    pub async fn connect(config: &DatabaseConfig) -> SqlxResult<Self> {
        sqlx::any::install_default_drivers();
        let url = config.url();
        info!(url = %config.redacted_url(), "create database connection pool...");

        let pool = AnyPoolOptions::new()
            .min_connections(config.minsize)
            .max_connections(config.maxsize.max(1))
            .acquire_timeout(config.acquire_timeout())
            .idle_timeout(config.idle_timeout())
            .max_lifetime(config.max_lifetime())
            .connect(&url)
            .await
            .map_err(SqlxErrorExt::into_data_error)?;

        Ok(Self {
            pool,
            dialect: Dialect::from_url(&url),
            autocommit: config.autocommit,
        })
    }

    /// Close the pool and wait for every connection to be released.
    pub async fn close(&self) {
        info!("closing database connection pool...");
        self.pool.close().await;
    }

    pub fn pool(&self) -> &AnyPool {
        &self.pool
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Whether writes run outside an explicit transaction by default.
    pub fn autocommit(&self) -> bool {
        self.autocommit
    }

    /// Run a select and return its rows in column order, at most `size` of
    /// them when given.
    pub async fn select(
        &self,
        sql: &str,
        args: &[Value],
        size: Option<usize>,
    ) -> SqlxResult<Vec<Row>> {
        info!("SQL: {}", render_for_log(sql, args));
        let query = bind_all(sqlx::query(sql), args);
        let raw: Vec<AnyRow> = match size {
            Some(size) => {
                query
                    .fetch(&self.pool)
                    .take(size)
                    .try_collect()
                    .await
            }
            None => query.fetch_all(&self.pool).await,
        }
        .map_err(SqlxErrorExt::into_data_error)?;
        info!("rows returned: {}", raw.len());
        raw.iter().map(decode_row).collect()
    }

    /// Run an insert, update or delete and return the affected row count.
    ///
    /// Without `autocommit` the statement runs in its own transaction, which
    /// is rolled back when the statement fails.
    pub async fn execute(&self, sql: &str, args: &[Value], autocommit: bool) -> SqlxResult<u64> {
        info!("SQL: {}", render_for_log(sql, args));
        let query = bind_all(sqlx::query(sql), args);
        if autocommit {
            let done = query
                .execute(&self.pool)
                .await
                .map_err(SqlxErrorExt::into_data_error)?;
            return Ok(done.rows_affected());
        }

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(SqlxErrorExt::into_data_error)?;
        match query.execute(&mut *tx).await {
            Ok(done) => {
                tx.commit().await.map_err(SqlxErrorExt::into_data_error)?;
                Ok(done.rows_affected())
            }
            Err(e) => {
                if let Err(rollback) = tx.rollback().await {
                    warn!(error = %rollback, "rollback failed");
                }
                Err(e.into_data_error())
            }
        }
    }
}

fn bind_all<'q>(
    mut query: Query<'q, Any, AnyArguments<'q>>,
    args: &[Value],
) -> Query<'q, Any, AnyArguments<'q>> {
    for arg in args {
        query = match arg {
            Value::Null => query.bind(None::<String>),
            Value::Bool(b) => query.bind(*b),
            Value::Int(i) => query.bind(*i),
            Value::Float(f) => query.bind(*f),
            Value::Text(s) => query.bind(s.clone()),
        };
    }
    query
}

fn decode_row(row: &AnyRow) -> SqlxResult<Row> {
    let mut out = Row::new();
    for (index, column) in row.columns().iter().enumerate() {
        out.push(column.name(), decode_value(row, index)?);
    }
    Ok(out)
}

/// Decode one cell into the narrowest [`Value`] the driver accepts.
fn decode_value(row: &AnyRow, index: usize) -> SqlxResult<Value> {
    let raw = row
        .try_get_raw(index)
        .map_err(SqlxErrorExt::into_data_error)?;
    if raw.is_null() {
        return Ok(Value::Null);
    }
    if let Ok(i) = row.try_get::<i64, _>(index) {
        return Ok(Value::Int(i));
    }
    if let Ok(i) = row.try_get::<i32, _>(index) {
        return Ok(Value::Int(i64::from(i)));
    }
    if let Ok(f) = row.try_get::<f64, _>(index) {
        return Ok(Value::Float(f));
    }
    if let Ok(f) = row.try_get::<f32, _>(index) {
        return Ok(Value::Float(f64::from(f)));
    }
    if let Ok(b) = row.try_get::<bool, _>(index) {
        return Ok(Value::Bool(b));
    }
    if let Ok(s) = row.try_get::<String, _>(index) {
        return Ok(Value::Text(s));
    }
    match row.try_get::<Vec<u8>, _>(index) {
        Ok(bytes) => Ok(Value::Text(String::from_utf8_lossy(&bytes).into_owned())),
        Err(_) => Err(DataError::Decode(format!(
            "unsupported column type for `{}`",
            row.columns()[index].name()
        ))),
    }
}
