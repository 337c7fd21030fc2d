/// Atomic read-modify-write for documents
///
/// `mutate` takes the component lock, rereads the file from disk (never the
/// cache), applies the caller's change and saves it before letting go.
/// This is what keeps two shells bumping the same counter from losing an
/// increment.

use crate::error::{Result, StoreError};
use crate::store::fs::FileSystem;
use crate::store::lock::LockHandle;
use crate::store::{Document, DocumentStore};

/// What a mutation did to the document it was handed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
    Modified,
    /// Nothing to write. Any edits made to the document are discarded.
    Unchanged,
}

impl From<bool> for Change {
    fn from(changed: bool) -> Self {
        if changed {
            Change::Modified
        } else {
            Change::Unchanged
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MutateOutcome {
    pub changed: bool,
    /// Document as committed, or as found when unchanged
    pub document: Document,
}

impl<F: FileSystem> DocumentStore<F> {
    /// Apply `mutation` to the latest on-disk document under the component lock
    ///
    /// Waits at most `lock_timeout()` for other processes. The lock is
    /// released on every exit path, including panics inside `mutation`.
    ///
    /// # Returns
    /// * `Ok(MutateOutcome)` - Whether anything was written, plus the resulting document
    /// * `Err(StoreError::LockTimeout)` - Nothing was read or written
    /// * `Err(StoreError::Io)` - Save failed; the previous document is intact
    ///
    /// # Examples
    /// ```no_run
    /// use shelldock_lib::{Change, DocumentStore, StoreConfig};
    /// use serde_json::json;
    ///
    /// # fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let mut store = DocumentStore::new(StoreConfig::from_env()?);
    /// let outcome = store.mutate("quickjump", |doc| {
    ///     doc.insert("docs".to_string(), json!({"path": "/tmp", "useCount": 0}));
    ///     Change::Modified
    /// })?;
    /// assert!(outcome.changed);
    /// # Ok(())
    /// # }
    /// ```
    pub fn mutate<M>(&mut self, component: &str, mutation: M) -> Result<MutateOutcome>
    where
        M: FnOnce(&mut Document) -> Change,
    {
        self.try_mutate(component, |doc| Ok::<_, StoreError>(mutation(doc)))
    }

    /// Like [`mutate`](Self::mutate), but the mutation may fail
    ///
    /// An `Err` from `mutation` aborts without writing and is returned as is.
    pub fn try_mutate<M, E>(&mut self, component: &str, mutation: M) -> std::result::Result<MutateOutcome, E>
    where
        M: FnOnce(&mut Document) -> std::result::Result<Change, E>,
        E: From<StoreError>,
    {
        let path = self.resolve(component)?;
        let _lock = LockHandle::acquire(&path, self.lock_timeout())?;

        let current = self.load_locked(path.clone())?;
        let mut working = current.clone();

        match mutation(&mut working)? {
            Change::Unchanged => {
                tracing::debug!("No change to {}", component);
                Ok(MutateOutcome {
                    changed: false,
                    document: current,
                })
            }
            Change::Modified => {
                self.save_at(path, &working)?;
                Ok(MutateOutcome {
                    changed: true,
                    document: working,
                })
            }
        }
    }
}
