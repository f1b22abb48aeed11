use std::io;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Why the question document could not be turned into a corpus.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("HTTP {status}")]
    Status { status: u16 },
    #[error("request failed: {0}")]
    Network(String),
    #[error("request timed out after {}s", .0.as_secs())]
    Timeout(Duration),
    #[error("network support is disabled in this build")]
    NetworkDisabled,
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("{0}")]
    Shape(String),
}

impl LoadError {
    pub fn status(&self) -> Option<u16> {
        match self {
            LoadError::Status { status } => Some(*status),
            _ => None,
        }
    }
}
