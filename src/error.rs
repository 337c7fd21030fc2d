/// Error types for shelldock
///
/// Every store and collaborator failure funnels into `StoreError`.
/// Uses thiserror for ergonomic error handling.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Main error type for shelldock operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Config directory for a component could not be created
    #[error("Could not create config directory {}: {source}", .path.display())]
    PathResolution {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Component name would escape the config root
    #[error("Invalid component name: {0:?}")]
    InvalidComponent(String),

    /// Reading or writing a document file failed
    #[error("IO error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Another process held the component lock for too long
    #[error("Timed out after {waited:?} waiting for lock on {}", .path.display())]
    LockTimeout { path: PathBuf, waited: Duration },

    /// Document on disk is not a JSON object. Recovered internally, never returned by `load`.
    #[error("Corrupted document at {}: {source}", .path.display())]
    Corruption {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Serialization/deserialization of a typed record
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Alias, template or project name the collaborators refuse to store
    #[error("Invalid name: {0}")]
    InvalidName(String),

    /// Alias, template or project not present in its document
    #[error("Not found: {0}")]
    NotFound(String),
}

/// Result type alias for shelldock operations
pub type Result<T> = std::result::Result<T, StoreError>;

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.into(),
            source,
        }
    }

    /// Convert StoreError to a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            StoreError::PathResolution { path, source } => format!(
                "Could not create {}. Check permissions or set SHELLDOCK_HOME. Details: {}",
                path.display(),
                source
            ),
            StoreError::InvalidComponent(name) => {
                format!("'{}' is not a valid component name", name)
            }
            StoreError::Io { path, source } => format!(
                "File system error on {}. Check permissions and free space. Details: {}",
                path.display(),
                source
            ),
            StoreError::LockTimeout { waited, .. } => format!(
                "Another shell is busy updating the same data (waited {:.1}s). Try again.",
                waited.as_secs_f64()
            ),
            StoreError::Corruption { path, .. } => {
                format!("Data file {} was corrupted and has been reset", path.display())
            }
            StoreError::Serialization(e) => format!("Data format error: {}", e),
            StoreError::Config(msg) => format!("Configuration issue: {}", msg),
            StoreError::InvalidName(reason) => format!("Invalid name: {}", reason),
            StoreError::NotFound(what) => format!("'{}' not found", what),
        }
    }
}
