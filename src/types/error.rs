//! Crate Error Type
//!
//! The analysis core is infallible by design: parsers recover from malformed
//! input locally and return documented defaults, and the pipeline, risk,
//! dependency, cross-entity and migration components are pure functions over
//! already-materialized data. The only fallible paths are the ambient
//! surfaces around the core: snapshot loading, configuration, and report
//! output. Those all flow through [`LensError`].

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, LensError>;

#[derive(Debug, Error)]
pub enum LensError {
    /// Snapshot or report file could not be read or written.
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Snapshot document is not valid JSON or misses required fields.
    #[error("invalid snapshot: {0}")]
    Snapshot(#[from] serde_json::Error),

    /// Configuration could not be loaded or failed validation.
    #[error("configuration error: {0}")]
    Config(String),
}

impl LensError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
