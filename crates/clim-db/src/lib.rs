//! SQLite access layer for the station observation dataset
//!
//! Reads the existing `measurement` and `station` tables. NO migrations:
//! the schema is fixed and created by whoever produced the dataset.

pub mod client;
pub mod queries;
pub mod schema;

pub use client::*;
pub use schema::*;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("Database connection error: {0}")]
    ConnectionError(#[from] sqlx::Error),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("Corrupt row in {table}: {reason}")]
    CorruptRow { table: &'static str, reason: String },
}

pub type DbResult<T> = Result<T, DbError>;
