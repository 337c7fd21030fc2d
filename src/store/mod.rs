/// Local document store
///
/// One JSON object per component, shared by every shell the user has open.
/// Survives corruption, never exposes a half-written file and serializes
/// read-modify-write sequences across processes.

pub mod cache;
pub mod document_store;
pub mod fs;
pub mod lock;
pub mod mutator;
pub mod path_resolver;
pub mod recovery;

pub use cache::DocumentCache;
pub use document_store::DocumentStore;
pub use fs::{FileStamp, FileSystem, OsFileSystem};
pub use lock::LockHandle;
pub use mutator::{Change, MutateOutcome};
pub use path_resolver::PathResolver;
pub use recovery::CorruptionRecovery;

/// A component's document. Record values are opaque to the store.
pub type Document = serde_json::Map<String, serde_json::Value>;

/// Keys come out sorted (`Map` is a BTreeMap), so equal documents serialize identically
pub(crate) fn serialize(document: &Document) -> serde_json::Result<Vec<u8>> {
    serde_json::to_vec_pretty(document)
}
