pub mod credentials;
pub mod dto;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

use std::str::FromStr;
use std::time::Duration;

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

pub use error::{Result, StorageError};

/// A transaction against the pick store. Every pick mutation runs inside one.
pub type Tx<'c> = sqlx::Transaction<'c, sqlx::Sqlite>;

const BUSY_TIMEOUT: Duration = Duration::from_secs(10);

/// Open a transaction that holds the database write lock from its first
/// statement. Mutations read before they write, and a deferred transaction
/// cannot upgrade its read lock while another writer is active.
pub async fn begin_write(pool: &SqlitePool) -> Result<Tx<'static>> {
    Ok(pool.begin_with("BEGIN IMMEDIATE").await?)
}

#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    pub async fn new(database_url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true)
            .busy_timeout(BUSY_TIMEOUT);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        Ok(Self { pool })
    }

    /// Private in-memory database with the schema applied. The pool holds a
    /// single connection that never expires, so the data outlives each query.
    pub async fn in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        let db = Self { pool };
        db.run_migrations().await?;
        Ok(db)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}
