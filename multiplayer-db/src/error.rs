use thiserror::Error;
use tokio_rusqlite::rusqlite;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("database connection error: {0}")]
    Connection(#[from] tokio_rusqlite::Error),

    #[error("mode not found")]
    ModeNotFound,

    #[error("a mode with this name already exists")]
    ModeAlreadyExists,
}

pub type Result<T> = std::result::Result<T, DbError>;

/// Failure talking to the ephemeral cache. Never fatal to a caller.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache backend unavailable: {0}")]
    Unavailable(String),

    #[error("cache operation failed for key {key}: {reason}")]
    Operation { key: String, reason: String },
}
