/// File system seam for the document store
///
/// All disk access in the store goes through `FileSystem`, so tests can
/// count reads or fail a rename halfway through a save.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::SystemTime;

/// Identity of a file version, compared on every cached access
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileStamp {
    pub modified: SystemTime,
    pub len: u64,
}

pub trait FileSystem {
    /// Read the whole file
    fn read(&self, path: &Path) -> io::Result<Vec<u8>>;

    /// Current stamp of the file, `None` if it does not exist
    fn stamp(&self, path: &Path) -> io::Result<Option<FileStamp>>;

    /// Create a file that must not exist yet, write it and flush it to disk
    fn write_new(&self, path: &Path, bytes: &[u8]) -> io::Result<()>;

    /// Replace `to` with `from` in one step
    fn rename(&self, from: &Path, to: &Path) -> io::Result<()>;

    fn remove(&self, path: &Path) -> io::Result<()>;
}

/// The real file system
#[derive(Debug, Clone, Copy, Default)]
pub struct OsFileSystem;

impl FileSystem for OsFileSystem {
    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        fs::read(path)
    }

    fn stamp(&self, path: &Path) -> io::Result<Option<FileStamp>> {
        match fs::metadata(path) {
            Ok(meta) => Ok(Some(FileStamp {
                modified: meta.modified()?,
                len: meta.len(),
            })),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn write_new(&self, path: &Path, bytes: &[u8]) -> io::Result<()> {
        let mut file = OpenOptions::new().write(true).create_new(true).open(path)?;
        file.write_all(bytes)?;
        file.sync_all()
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        fs::rename(from, to)?;

        // Persist the directory entry too. Not every platform lets us open a directory.
        #[cfg(unix)]
        {
            if let Some(dir) = to.parent().and_then(|parent| fs::File::open(parent).ok()) {
                let _ = dir.sync_all();
            }
        }

        Ok(())
    }

    fn remove(&self, path: &Path) -> io::Result<()> {
        fs::remove_file(path)
    }
}

static TEMP_SEQ: AtomicU64 = AtomicU64::new(0);

/// Sibling temp path: hidden, `.tmp` suffixed, unique per process and call
pub(crate) fn temp_path_for(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let seq = TEMP_SEQ.fetch_add(1, Ordering::Relaxed);
    path.with_file_name(format!(".{}.{}.{}.tmp", name, std::process::id(), seq))
}

/// Write `bytes` to a temp file next to `path`, then rename it over `path`
///
/// Readers only ever see the old content or the new content. If anything
/// fails the temp file is removed (best effort) and `path` is untouched.
///
/// Returns the stamp of the committed file. It is taken from the temp file
/// before the rename, which moves the same inode and keeps its mtime, so a
/// concurrent writer replacing `path` afterwards cannot be mistaken for us.
pub fn write_atomic<F: FileSystem + ?Sized>(
    fs: &F,
    path: &Path,
    bytes: &[u8],
) -> io::Result<FileStamp> {
    let temp = temp_path_for(path);

    let result = fs.write_new(&temp, bytes).and_then(|()| {
        let stamp = fs.stamp(&temp)?.ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, "temp file vanished before rename")
        })?;
        fs.rename(&temp, path)?;
        Ok(stamp)
    });

    if result.is_err() {
        if let Err(cleanup) = fs.remove(&temp) {
            if cleanup.kind() != io::ErrorKind::NotFound {
                tracing::warn!("Could not remove temp file {}: {}", temp.display(), cleanup);
            }
        }
    }

    result
}
