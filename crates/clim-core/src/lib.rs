//! Core data types, date windows, and statistics for the climate query API
//!
//! Everything in this crate is a pure computation over an immutable
//! snapshot of observations. The only I/O seam is [`ObservationStore`].

pub mod filter;
pub mod query;
pub mod rollups;
pub mod store;
pub mod types;
pub mod window;

pub use filter::*;
pub use query::*;
pub use rollups::*;
pub use store::*;
pub use types::*;
pub use window::*;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("No temperature observations matched the requested range")]
    EmptyResult,

    #[error("Malformed date '{input}', expected YYYY-MM-DD")]
    MalformedDate { input: String },

    #[error("The observation store holds no observations")]
    NoObservations,

    #[error("Store query failed: {0}")]
    Store(#[from] anyhow::Error),
}

pub type QueryResult<T> = Result<T, QueryError>;
