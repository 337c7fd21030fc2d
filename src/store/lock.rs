/// Cross-process advisory lock for one component
///
/// Backed by an exclusive `fs2` lock on `<document>.lock`. Every shell that
/// mutates the component takes the same lock, so at most one read-modify-write
/// is in flight per component. Dropping the handle releases it.

use crate::error::{Result, StoreError};
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

const INITIAL_BACKOFF: Duration = Duration::from_millis(10);
const MAX_BACKOFF: Duration = Duration::from_millis(100);

#[derive(Debug)]
pub struct LockHandle {
    file: File,
    path: PathBuf,
}

impl LockHandle {
    /// Acquire the lock guarding `document`, retrying until `timeout` has passed
    ///
    /// The lock file itself is never removed: unlinking it while another
    /// process waits on the old inode would let a third process lock a new
    /// one and both would believe they hold the lock.
    ///
    /// # Returns
    /// * `Ok(LockHandle)` - Lock held until the handle is dropped
    /// * `Err(StoreError::LockTimeout)` - If another process kept it past `timeout`
    /// * `Err(StoreError::Io)` - If the lock file cannot be opened or locked
    pub fn acquire(document: &Path, timeout: Duration) -> Result<Self> {
        let path = lock_path_for(document);
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(&path)
            .map_err(|e| StoreError::io(&path, e))?;

        let start = Instant::now();
        let mut attempt = 0u32;

        loop {
            match FileExt::try_lock_exclusive(&file) {
                Ok(()) => {
                    tracing::debug!(
                        "Locked {} after {} attempt(s)",
                        path.display(),
                        attempt + 1
                    );
                    return Ok(Self { file, path });
                }
                Err(e) if is_contended(&e) => {}
                Err(e) => return Err(StoreError::io(&path, e)),
            }

            let waited = start.elapsed();
            if waited >= timeout {
                return Err(StoreError::LockTimeout {
                    path: document.to_path_buf(),
                    waited,
                });
            }

            thread::sleep(backoff(attempt).min(timeout - waited));
            attempt += 1;
        }
    }

    /// Path of the lock file, not the document
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for LockHandle {
    fn drop(&mut self) {
        // Closing the file would release it as well
        if let Err(e) = FileExt::unlock(&self.file) {
            tracing::warn!("Could not unlock {}: {}", self.path.display(), e);
        }
    }
}

/// `<document>.lock`, next to the document
pub fn lock_path_for(document: &Path) -> PathBuf {
    let mut name = document.as_os_str().to_owned();
    name.push(".lock");
    PathBuf::from(name)
}

fn is_contended(err: &io::Error) -> bool {
    err.kind() == io::ErrorKind::WouldBlock
        || err.raw_os_error() == fs2::lock_contended_error().raw_os_error()
}

/// Exponential backoff with jitter so waiting shells don't retry in lockstep
fn backoff(attempt: u32) -> Duration {
    let base = INITIAL_BACKOFF
        .saturating_mul(1 << attempt.min(4))
        .min(MAX_BACKOFF);

    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .subsec_nanos() as u64;
    let jitter_range = base.as_millis() as u64 / 2 + 1;

    base + Duration::from_millis((nanos ^ u64::from(std::process::id())) % jitter_range)
}
