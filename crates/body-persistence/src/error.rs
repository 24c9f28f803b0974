//! Errores de persistencia.
//! Mapea errores de IO / serde a variantes semánticas del store.

use body_core::StoreError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("serialization: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("corrupted line {line} in {path}: {detail}")]
    Corrupted { path: PathBuf, line: usize, detail: String },
    #[error("not found: {0}")]
    NotFound(String),
}

impl PersistenceError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(),
                   source }
    }
}

impl From<PersistenceError> for StoreError {
    fn from(err: PersistenceError) -> Self {
        StoreError::Backend(err.to_string())
    }
}
