/// Document store
///
/// `load` and `save` for per-component JSON documents. Reads are served
/// from a process-local cache while the file's stamp is unchanged; writes
/// always go through temp file + rename.

use crate::config::StoreConfig;
use crate::error::{Result, StoreError};
use crate::store::cache::DocumentCache;
use crate::store::fs::{write_atomic, FileStamp, FileSystem, OsFileSystem};
use crate::store::lock::LockHandle;
use crate::store::path_resolver::PathResolver;
use crate::store::recovery::CorruptionRecovery;
use crate::store::{serialize, Document};
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Crash-safe JSON document store
///
/// Single-threaded by design: each shell process owns one store. Other
/// processes are kept coherent through file stamps, and read-modify-write
/// sequences go through [`DocumentStore::mutate`].
pub struct DocumentStore<F: FileSystem = OsFileSystem> {
    resolver: PathResolver,
    cache: DocumentCache,
    fs: F,
    lock_timeout: Duration,
}

impl DocumentStore<OsFileSystem> {
    /// Create a store on the real file system
    ///
    /// # Examples
    /// ```no_run
    /// use shelldock_lib::{DocumentStore, StoreConfig};
    ///
    /// # fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let mut store = DocumentStore::new(StoreConfig::from_env()?);
    /// let bookmarks = store.load("quickjump")?;
    /// println!("{} bookmarks", bookmarks.len());
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(config: StoreConfig) -> Self {
        Self::with_fs(config, OsFileSystem)
    }

    /// Like [`new`](Self::new), but makes sure the config root can be created first
    ///
    /// # Returns
    /// * `Ok(DocumentStore)` - Store whose root directory exists
    /// * `Err(StoreError::PathResolution)` - If the root cannot be created
    pub fn open(config: StoreConfig) -> Result<Self> {
        std::fs::create_dir_all(&config.root).map_err(|source| StoreError::PathResolution {
            path: config.root.clone(),
            source,
        })?;
        Ok(Self::new(config))
    }
}

impl<F: FileSystem> DocumentStore<F> {
    pub fn with_fs(config: StoreConfig, fs: F) -> Self {
        Self {
            resolver: PathResolver::new(&config),
            cache: DocumentCache::new(),
            fs,
            lock_timeout: config.lock_timeout,
        }
    }

    /// Load a component's document
    ///
    /// A missing file is an empty document. Unparsable content is backed
    /// up and replaced by an empty document instead of failing.
    ///
    /// # Returns
    /// * `Ok(Document)` - A copy the caller may modify freely
    /// * `Err(StoreError)` - If the path cannot be resolved or the file cannot be read
    pub fn load(&mut self, component: &str) -> Result<Document> {
        let path = self.resolver.resolve(component)?;
        let stamp = self.stamp(&path)?;

        if let Some(document) = self.cache.get(&path, stamp) {
            tracing::debug!("Cache hit for {}", path.display());
            return Ok(document);
        }

        self.read_through(path, stamp, false)
    }

    /// Load straight from disk, ignoring and then refreshing the cache
    pub fn load_fresh(&mut self, component: &str) -> Result<Document> {
        let path = self.resolver.resolve(component)?;
        let stamp = self.stamp(&path)?;
        self.read_through(path, stamp, false)
    }

    /// Replace a component's document
    ///
    /// On failure the file and the cache are exactly as before the call.
    pub fn save(&mut self, component: &str, document: &Document) -> Result<()> {
        let path = self.resolver.resolve(component)?;
        self.save_at(path, document)
    }

    /// Document path for a component, creating its directory
    pub fn resolve(&self, component: &str) -> Result<PathBuf> {
        self.resolver.resolve(component)
    }

    pub fn lock_timeout(&self) -> Duration {
        self.lock_timeout
    }

    pub fn set_lock_timeout(&mut self, timeout: Duration) {
        self.lock_timeout = timeout;
    }

    pub fn file_system(&self) -> &F {
        &self.fs
    }

    pub(crate) fn save_at(&mut self, path: PathBuf, document: &Document) -> Result<()> {
        let bytes = serialize(document)?;

        let stamp = write_atomic(&self.fs, &path, &bytes).map_err(|e| StoreError::io(&path, e))?;

        tracing::debug!("Saved {} ({} bytes)", path.display(), bytes.len());
        self.cache.put(path, document.clone(), Some(stamp));

        Ok(())
    }

    /// `load_fresh` for a caller already holding the lock on `path`
    pub(crate) fn load_locked(&mut self, path: PathBuf) -> Result<Document> {
        let stamp = self.stamp(&path)?;
        self.read_through(path, stamp, true)
    }

    fn stamp(&self, path: &Path) -> Result<Option<FileStamp>> {
        self.fs.stamp(path).map_err(|e| StoreError::io(path, e))
    }

    fn read_through(
        &mut self,
        path: PathBuf,
        stamp: Option<FileStamp>,
        lock_held: bool,
    ) -> Result<Document> {
        tracing::debug!("Reading {}", path.display());

        let bytes = match stamp {
            None => None,
            Some(_) => match self.fs.read(&path) {
                Ok(bytes) => Some(bytes),
                // Deleted between stat and read
                Err(e) if e.kind() == io::ErrorKind::NotFound => None,
                Err(e) => return Err(StoreError::io(&path, e)),
            },
        };

        let Some(bytes) = bytes else {
            self.cache.put(path, Document::new(), None);
            return Ok(Document::new());
        };

        // Someone truncated the file by hand; nothing to preserve
        if bytes.iter().all(u8::is_ascii_whitespace) {
            self.cache.put(path, Document::new(), stamp);
            return Ok(Document::new());
        }

        match serde_json::from_slice::<Document>(&bytes) {
            Ok(document) => {
                self.cache.put(path, document.clone(), stamp);
                Ok(document)
            }
            Err(e) if lock_held => {
                let document = CorruptionRecovery::new(&self.fs).recover(&path, &bytes, e);

                // Reset may have failed on a read-only dir; then the corrupt file's stamp
                // is still current and caching against it avoids a second backup.
                let current = self.fs.stamp(&path).unwrap_or(stamp);
                self.cache.put(path, document.clone(), current);
                Ok(document)
            }
            Err(e) => match LockHandle::acquire(&path, self.lock_timeout) {
                // Another process may have fixed or rewritten the file since it was
                // read, so start over under the lock instead of resetting blindly.
                Ok(_lock) => {
                    let stamp = self.stamp(&path)?;
                    self.read_through(path, stamp, true)
                }
                Err(lock_error) => {
                    tracing::warn!("Not resetting {}: {}", path.display(), lock_error);
                    let document = CorruptionRecovery::new(&self.fs).preserve(&path, &bytes, e);
                    self.cache.put(path, document.clone(), stamp);
                    Ok(document)
                }
            },
        }
    }
}
