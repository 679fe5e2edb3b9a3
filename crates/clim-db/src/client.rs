//! Database client and connection management

use crate::{DbError, DbResult};
use sqlx::pool::PoolConnection;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::Sqlite;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Database client wrapping a sqlx SQLite connection pool
#[derive(Clone)]
pub struct DbClient {
    pool: SqlitePool,
}

impl DbClient {
    /// Create a new database client from a `sqlite://` connection string.
    /// The database is opened read-only.
    pub async fn new(database_url: &str, max_connections: u32) -> DbResult<Self> {
        let opts = SqliteConnectOptions::from_str(database_url)?.read_only(true);
        Self::with_options(opts, max_connections).await
    }

    /// Create a new database client with custom options
    pub async fn with_options(opts: SqliteConnectOptions, max_connections: u32) -> DbResult<Self> {
        if max_connections == 0 {
            return Err(DbError::ConfigError(
                "max_connections must be at least 1".to_string(),
            ));
        }

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(30))
            .connect_with(opts)
            .await?;

        Ok(Self { pool })
    }

    /// Get reference to underlying pool for direct queries
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Check out one connection for the duration of a single query.
    /// It goes back to the pool when dropped, on success and error alike.
    pub(crate) async fn session(&self) -> DbResult<PoolConnection<Sqlite>> {
        Ok(self.pool.acquire().await?)
    }

    /// Test the database connection
    pub async fn ping(&self) -> DbResult<()> {
        let mut conn = self.session().await?;
        sqlx::query("SELECT 1").execute(&mut *conn).await?;
        Ok(())
    }

    /// Close the connection pool gracefully
    pub async fn close(self) {
        self.pool.close().await;
    }
}

/// Build SQLite connection options from components
pub struct DbConnectionBuilder {
    path: PathBuf,
    read_only: bool,
    create_if_missing: bool,
}

impl DbConnectionBuilder {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            read_only: true,
            create_if_missing: false,
        }
    }

    pub fn read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    pub fn create_if_missing(mut self, create: bool) -> Self {
        self.create_if_missing = create;
        self
    }

    pub fn build(self) -> SqliteConnectOptions {
        SqliteConnectOptions::new()
            .filename(&self.path)
            .read_only(self.read_only)
            .create_if_missing(self.create_if_missing)
    }
}
