//! Error types shared by the library modules.

use std::path::PathBuf;

use thiserror::Error;

use crate::tags::provider::ProviderError;

/// Errors surfaced by the tag pipeline and the code-note converter.
#[derive(Debug, Error)]
pub enum VaultError {
    /// Input file or directory does not exist
    #[error("Not found: {}", path.display())]
    NotFound { path: PathBuf },

    /// Path exists but is not a directory
    #[error("{} is not a valid directory", path.display())]
    NotADirectory { path: PathBuf },

    /// Embedding provider failed
    #[error("Embedding provider failed: {0}")]
    Provider(#[from] ProviderError),

    /// Cache archive could not be written
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Vector length differs from the rest of the cache
    #[error("Dimension mismatch for '{tag}': expected {expected}, got {actual}")]
    DimensionMismatch {
        tag: String,
        expected: usize,
        actual: usize,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV output error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl VaultError {
    pub fn not_found(path: impl Into<PathBuf>) -> Self {
        Self::NotFound { path: path.into() }
    }
}

pub type Result<T> = std::result::Result<T, VaultError>;
