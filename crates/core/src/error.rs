//! Error types for the core domain.

use thiserror::Error;

/// Core domain error type.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid title: {0}")]
    InvalidTitle(String),

    #[error("invalid page id: {0}")]
    InvalidPageId(i64),

    #[error("invalid namespace: {0}")]
    InvalidNamespace(String),

    #[error("invalid page target: {0}")]
    InvalidTarget(String),
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, Error>;
