/// Corruption recovery
///
/// A document that no longer parses must not lock the user out of a
/// command forever. The bad bytes are kept next to the original as
/// `<path>.backup.<yyyyMMddTHHmmss>` and the document starts over empty.

use crate::error::StoreError;
use crate::store::fs::{write_atomic, FileSystem};
use crate::store::{serialize, Document};
use chrono::{DateTime, Utc};
use std::io;
use std::path::{Path, PathBuf};

const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%dT%H%M%S";

// Several corruptions within the same second get a numeric suffix
const MAX_BACKUP_ATTEMPTS: u32 = 100;

pub struct CorruptionRecovery<'a, F: FileSystem + ?Sized> {
    fs: &'a F,
}

impl<'a, F: FileSystem + ?Sized> CorruptionRecovery<'a, F> {
    pub fn new(fs: &'a F) -> Self {
        Self { fs }
    }

    /// Back up `raw`, reset the file to `{}` and hand back an empty document
    ///
    /// The caller must hold the component lock and `raw` must be what is
    /// currently on disk. Never fails. Backup and reset are best effort and
    /// only logged when they go wrong, so a read-only config dir still yields
    /// a usable document.
    pub fn recover(&self, path: &Path, raw: &[u8], error: serde_json::Error) -> Document {
        self.recover_at(path, raw, error, Utc::now())
    }

    /// Back up `raw` but leave the file itself alone
    ///
    /// For when the lock could not be taken: resetting then could clobber a
    /// write another process committed in the meantime.
    pub fn preserve(&self, path: &Path, raw: &[u8], error: serde_json::Error) -> Document {
        self.report(path, raw, error, Utc::now());
        Document::new()
    }

    pub(crate) fn recover_at(
        &self,
        path: &Path,
        raw: &[u8],
        error: serde_json::Error,
        now: DateTime<Utc>,
    ) -> Document {
        self.report(path, raw, error, now);

        let empty = Document::new();
        let reset = serialize(&empty)
            .map_err(io::Error::from)
            .and_then(|bytes| write_atomic(self.fs, path, &bytes));
        if let Err(e) = reset {
            tracing::warn!("Could not reset {}: {}", path.display(), e);
        }

        empty
    }

    fn report(&self, path: &Path, raw: &[u8], error: serde_json::Error, now: DateTime<Utc>) {
        let corruption = StoreError::Corruption {
            path: path.to_path_buf(),
            source: error,
        };
        tracing::warn!("{}; treating it as an empty document", corruption);

        match self.write_backup(path, raw, now) {
            Ok(backup) => tracing::warn!("Kept unreadable content in {}", backup.display()),
            Err(e) => tracing::warn!("Could not back up {}: {}", path.display(), e),
        }
    }

    fn write_backup(&self, path: &Path, raw: &[u8], now: DateTime<Utc>) -> io::Result<PathBuf> {
        let base = backup_path(path, now);
        let mut candidate = base.clone();

        for attempt in 1..=MAX_BACKUP_ATTEMPTS {
            match self.fs.write_new(&candidate, raw) {
                Ok(()) => return Ok(candidate),
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                    candidate = PathBuf::from(format!("{}.{}", base.display(), attempt));
                }
                Err(e) => return Err(e),
            }
        }

        Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("too many backups named {}", base.display()),
        ))
    }
}

/// `<path>.backup.<yyyyMMddTHHmmss>` in UTC
pub fn backup_path(path: &Path, now: DateTime<Utc>) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(format!(".backup.{}", now.format(BACKUP_TIMESTAMP_FORMAT)));
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::fs::{FileStamp, OsFileSystem};
    use chrono::TimeZone;
    use std::fs;
    use tempfile::TempDir;

    fn parse_error(raw: &[u8]) -> serde_json::Error {
        serde_json::from_slice::<Document>(raw).unwrap_err()
    }

    fn backups_in(dir: &Path) -> Vec<PathBuf> {
        let mut found: Vec<PathBuf> = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().path())
            .filter(|p| p.to_string_lossy().contains(".backup."))
            .collect();
        found.sort();
        found
    }

    /// Accepts reads and stamps, refuses every write
    struct ReadOnlyFs;

    impl FileSystem for ReadOnlyFs {
        fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
            fs::read(path)
        }
        fn stamp(&self, path: &Path) -> io::Result<Option<FileStamp>> {
            OsFileSystem.stamp(path)
        }
        fn write_new(&self, _path: &Path, _bytes: &[u8]) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "read-only"))
        }
        fn rename(&self, _from: &Path, _to: &Path) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "read-only"))
        }
        fn remove(&self, _path: &Path) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "read-only"))
        }
    }

    #[test]
    fn test_backup_path_format() {
        let now = Utc.with_ymd_and_hms(2026, 3, 7, 9, 5, 1).unwrap();
        let path = backup_path(Path::new("/cfg/quickjump/store.json"), now);
        assert_eq!(
            path,
            PathBuf::from("/cfg/quickjump/store.json.backup.20260307T090501")
        );
    }

    #[test]
    fn test_recover_backs_up_and_resets() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("store.json");
        let raw = b"{\"docs\": {\"path\": ";
        fs::write(&path, raw).unwrap();

        let doc = CorruptionRecovery::new(&OsFileSystem).recover(&path, raw, parse_error(raw));

        assert!(doc.is_empty());
        assert_eq!(fs::read_to_string(&path).unwrap(), "{}");

        let backups = backups_in(temp.path());
        assert_eq!(backups.len(), 1);
        assert_eq!(fs::read(&backups[0]).unwrap(), raw);
    }

    #[test]
    fn test_same_second_backups_do_not_overwrite() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("store.json");
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let recovery = CorruptionRecovery::new(&OsFileSystem);

        recovery.recover_at(&path, b"first", parse_error(b"first"), now);
        recovery.recover_at(&path, b"second", parse_error(b"second"), now);

        let backups = backups_in(temp.path());
        assert_eq!(backups.len(), 2);
        assert_eq!(fs::read(&backups[0]).unwrap(), b"first");
        assert_eq!(fs::read(&backups[1]).unwrap(), b"second");
    }

    #[test]
    fn test_recover_on_read_only_fs_still_returns_empty() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("store.json");
        fs::write(&path, "[1, 2").unwrap();

        let raw = b"[1, 2";
        let doc = CorruptionRecovery::new(&ReadOnlyFs).recover(&path, raw, parse_error(raw));

        assert!(doc.is_empty());
        // Original left alone, no backup written
        assert_eq!(fs::read_to_string(&path).unwrap(), "[1, 2");
        assert!(backups_in(temp.path()).is_empty());
    }

    #[test]
    fn test_preserve_backs_up_without_reset() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("store.json");
        let raw = b"{ not json";
        fs::write(&path, raw).unwrap();

        let doc = CorruptionRecovery::new(&OsFileSystem).preserve(&path, raw, parse_error(raw));

        assert!(doc.is_empty());
        assert_eq!(fs::read(&path).unwrap(), raw);
        let backups = backups_in(temp.path());
        assert_eq!(backups.len(), 1);
        assert_eq!(fs::read(&backups[0]).unwrap(), raw);
    }
}
