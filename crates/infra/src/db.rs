//! SQLite connection pool and schema setup.
//!
//! The schema is a single `product` table created with `IF NOT EXISTS`, so
//! [`init_schema`] can run on every startup. There is no migration tooling.

use std::path::PathBuf;
use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("failed to prepare database location: {0}")]
    Io(#[from] std::io::Error),

    #[error("product not found")]
    NotFound,

    #[error("corrupt product row {id}: {reason}")]
    Corrupt { id: i64, reason: String },
}

const CREATE_PRODUCT_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS product (
        id          INTEGER PRIMARY KEY AUTOINCREMENT,
        name        VARCHAR(120) NOT NULL CHECK (length(trim(name)) > 0 AND length(name) <= 120),
        description TEXT NULL,
        is_featured BOOLEAN NOT NULL DEFAULT 0,
        created_at  TEXT NOT NULL,
        updated_at  TEXT NOT NULL
    )
"#;

const CREATE_FEATURED_INDEX: &str = r#"
    CREATE INDEX IF NOT EXISTS idx_product_featured ON product (is_featured, id)
"#;

/// Open a pool for `url`, creating the database file and its directory when absent.
pub async fn connect(url: &str, max_connections: u32) -> Result<SqlitePool, PersistenceError> {
    if let Some(path) = sqlite_file_path(url) {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
    }

    let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await?;

    tracing::info!(max_connections, "database pool ready");
    Ok(pool)
}

/// Create the schema if it does not exist yet. Safe to call repeatedly.
pub async fn init_schema(pool: &SqlitePool) -> Result<(), PersistenceError> {
    sqlx::query(CREATE_PRODUCT_TABLE).execute(pool).await?;
    sqlx::query(CREATE_FEATURED_INDEX).execute(pool).await?;
    tracing::info!("database tables created successfully");
    Ok(())
}

/// On-disk path of a `sqlite:` URL, or `None` for in-memory databases.
pub fn sqlite_file_path(url: &str) -> Option<PathBuf> {
    let rest = url
        .strip_prefix("sqlite://")
        .or_else(|| url.strip_prefix("sqlite:"))?;
    let path = rest.split('?').next().unwrap_or_default();
    if path.is_empty() || path == ":memory:" {
        return None;
    }
    Some(PathBuf::from(path))
}
