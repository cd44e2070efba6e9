//! Resource store error types

use thiserror::Error;

/// Store errors
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Store file is corrupted: {0}")]
    Corrupted(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;
