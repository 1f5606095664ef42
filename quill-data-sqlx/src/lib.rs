//! # quill-data-sqlx: SQLx backend for the Quill data layer
//!
//! | Type | Description |
//! |------|-------------|
//! | [`DatabaseConfig`] | Pool settings read from the `db.*` configuration section |
//! | [`Database`] | Explicitly created and closed connection pool with `select` / `execute` |
//! | [`Repository`] | Typed model queries: `find_all`, `find_number`, `find`, `save`, `update`, `remove` |
//! | [`WriteOutcome`] | Affected-row report for writes |
//! | [`SqlxErrorExt`] | Converts `sqlx::Error` into `DataError` (`.into_data_error()`) |
//!
//! Connections go through `sqlx::any`, so the driver is picked from the URL
//! scheme at runtime. Enable the matching feature:
//!
//! | Feature    | Driver |
//! |------------|--------|
//! | `mysql`    | MySQL via `sqlx/mysql` (default) |
//! | `sqlite`   | SQLite via `sqlx/sqlite` (default) |
//!
//! ```ignore
//! let db = Database::connect(&config.section::<DatabaseConfig>()?).await?;
//! let users = Repository::<User>::new(db.clone());
//! let found = users.find_all(&FindAll::new().filter("email=?", [email])).await?;
//! db.close().await;
//! ```

pub mod config;
pub mod database;
pub mod error;
pub mod repository;

pub use config::DatabaseConfig;
pub use database::Database;
pub use error::{SqlxErrorExt, SqlxResult};
pub use repository::{Repository, WriteOutcome};

/// Re-exports of the most commonly used types from both `quill-data` and this crate.
pub mod prelude {
    pub use crate::{Database, DatabaseConfig, Repository, SqlxErrorExt, WriteOutcome};
    pub use quill_data::prelude::*;
}
