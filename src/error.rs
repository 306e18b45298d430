//! Error types for the actor/film store and search

use std::path::PathBuf;

use thiserror::Error;

use crate::path::PathError;

pub type Result<T> = std::result::Result<T, StoreError>;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to map {}: {source}", .path.display())]
    Init {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid file format: {0}")]
    InvalidFormat(String),

    #[error("Source and target are the same actor: {0}")]
    SameEndpoints(String),

    #[error("Path error: {0}")]
    Path(#[from] PathError),
}

impl StoreError {
    /// Short stable code for the error kind (used in JSON output)
    pub fn code(&self) -> &'static str {
        match self {
            StoreError::Init { .. } => "STORE_INIT_FAILED",
            StoreError::InvalidFormat(_) => "INVALID_FORMAT",
            StoreError::SameEndpoints(_) => "SAME_ENDPOINTS",
            StoreError::Path(_) => "PATH_ERROR",
        }
    }
}
