/// Process-local document cache
///
/// One instance per store. An entry is only served while the file still
/// carries the stamp it had when the entry was stored, which is how writes
/// by other shells become visible.

use crate::store::fs::FileStamp;
use crate::store::Document;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
struct CacheEntry {
    document: Document,
    /// `None` records that the file was absent
    stamp: Option<FileStamp>,
}

#[derive(Debug, Default)]
pub struct DocumentCache {
    entries: HashMap<PathBuf, CacheEntry>,
}

impl DocumentCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the cached document if `stamp` matches the stored one exactly
    pub fn get(&self, path: &Path, stamp: Option<FileStamp>) -> Option<Document> {
        self.entries
            .get(path)
            .filter(|entry| entry.stamp == stamp)
            .map(|entry| entry.document.clone())
    }

    pub fn put(&mut self, path: PathBuf, document: Document, stamp: Option<FileStamp>) {
        self.entries.insert(path, CacheEntry { document, stamp });
    }

    pub fn invalidate(&mut self, path: &Path) {
        self.entries.remove(path);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
