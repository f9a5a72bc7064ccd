use thiserror::Error;

use crate::query::QueryType;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("index does not exist for this engine: {0:?}")]
    UnknownIndex(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("unsupported query type: {0}")]
    UnsupportedQueryType(QueryType),

    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    #[error("operation cancelled")]
    Cancelled,

    #[error("deadline exceeded")]
    DeadlineExceeded,

    /// Failure reported by the underlying index engine, message kept verbatim.
    #[error("{0}")]
    Engine(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn invalid_query(msg: impl Into<String>) -> Self {
        Error::InvalidQuery(msg.into())
    }

    pub fn engine(err: impl std::fmt::Display) -> Self {
        Error::Engine(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
