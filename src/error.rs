use std::path::PathBuf;
use thiserror::Error;

/// Failures surfaced by the indexing and orphan detection pipeline.
///
/// Every variant carries the path it concerns so the final report can name it.
#[derive(Debug, Error)]
pub enum OrphanError {
    #[error("Cannot ingest document {path}: {reason}")]
    Ingest { path: PathBuf, reason: String },

    #[error("Invalid configuration: {0}")]
    Configuration(String),

    #[error("Index at {path} is unusable: {reason}")]
    Persistence { path: PathBuf, reason: String },

    #[error("Cannot delete {path}: {source}")]
    Deletion {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl OrphanError {
    pub fn ingest(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::Ingest {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub fn persistence(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::Persistence {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Map an `anyhow` chain from the writer/reader plumbing into a persistence error.
    pub fn from_persistence_chain(path: impl Into<PathBuf>, err: anyhow::Error) -> Self {
        Self::Persistence {
            path: path.into(),
            reason: format!("{:#}", err),
        }
    }
}

pub type Result<T> = std::result::Result<T, OrphanError>;
