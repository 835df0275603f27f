//! I/O failures of the file-backed adapters.
//!
//! Adapters raise [`StorageError`] internally and convert it into the core's
//! error type at the port boundary.

use std::io;
use std::path::PathBuf;

use devmap_core::{application::ApplicationError, error::DevmapError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("{} does not exist", path.display())]
    NotFound { path: PathBuf },

    #[error("failed to {operation} {}: {source}", path.display())]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to decode {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("directory walk failed: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("{} holds mappings of PLC {found}, expected PLC {expected}", path.display())]
    PlcMismatch {
        path: PathBuf,
        expected: u32,
        found: u32,
    },
}

impl StorageError {
    pub(crate) fn io(operation: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            operation,
            path: path.into(),
            source,
        }
    }
}

impl From<StorageError> for DevmapError {
    fn from(err: StorageError) -> Self {
        let app = match &err {
            StorageError::NotFound { path } => ApplicationError::SourceNotFound {
                location: path.display().to_string(),
            },
            StorageError::Toml { path, source } => ApplicationError::MalformedSource {
                location: path.display().to_string(),
                reason: source.message().to_string(),
            },
            StorageError::Io { operation, .. } => ApplicationError::Repository {
                operation: *operation,
                reason: err.to_string(),
            },
            StorageError::Json { .. } | StorageError::PlcMismatch { .. } => {
                ApplicationError::Repository {
                    operation: "load",
                    reason: err.to_string(),
                }
            }
            StorageError::Walk(_) => ApplicationError::Repository {
                operation: "walk",
                reason: err.to_string(),
            },
        };
        app.into()
    }
}
