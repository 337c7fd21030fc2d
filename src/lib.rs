/// shelldock library
///
/// Crash-safe, process-safe JSON document store plus the bookmark,
/// template and Unity project commands built on it.

pub mod config;
pub mod core;
pub mod error;
pub mod logging;
pub mod store;

// Re-exports for convenience
pub use config::StoreConfig;
pub use error::{Result, StoreError};
pub use store::{Change, Document, DocumentStore, MutateOutcome};
