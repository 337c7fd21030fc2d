/// Store configuration
///
/// Decides where component documents live and how long `mutate` waits
/// for another shell to finish. Everything comes from the environment so
/// shell hooks need no flags.

use crate::error::{Result, StoreError};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Overrides the config root when set to a non-empty path
pub const HOME_ENV: &str = "SHELLDOCK_HOME";

/// Lock wait bound in milliseconds
pub const LOCK_TIMEOUT_ENV: &str = "SHELLDOCK_LOCK_TIMEOUT_MS";

/// Directory name used under the platform config dir or temp dir
const APP_DIR: &str = "shelldock";

/// Every component stores its document under this name
pub const DEFAULT_FILE_NAME: &str = "store.json";

/// Long enough for a burst of shells, short enough that a hung one is noticed
pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub root: PathBuf,
    pub file_name: String,
    pub lock_timeout: Duration,
}

impl StoreConfig {
    /// Config rooted at an explicit directory with default settings
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self {
            root: root.into(),
            file_name: DEFAULT_FILE_NAME.to_string(),
            lock_timeout: DEFAULT_LOCK_TIMEOUT,
        }
    }

    /// Build the config from the process environment
    ///
    /// Root: `SHELLDOCK_HOME`, then the platform user-config directory,
    /// then the temp directory. Lock timeout: `SHELLDOCK_LOCK_TIMEOUT_MS`.
    ///
    /// # Returns
    /// * `Ok(StoreConfig)` - Resolved configuration
    /// * `Err(StoreError::Config)` - If the timeout variable is not a number
    pub fn from_env() -> Result<Self> {
        let mut config = Self::new(default_root());

        if let Ok(raw) = env::var(LOCK_TIMEOUT_ENV) {
            config.lock_timeout = parse_timeout(&raw)?;
        }

        Ok(config)
    }

    pub fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = timeout;
        self
    }

    pub fn with_file_name<S: Into<String>>(mut self, file_name: S) -> Self {
        self.file_name = file_name.into();
        self
    }
}

fn default_root() -> PathBuf {
    match env::var_os(HOME_ENV) {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => dirs::config_dir()
            .map(|dir| dir.join(APP_DIR))
            .unwrap_or_else(|| env::temp_dir().join(APP_DIR)),
    }
}

fn parse_timeout(raw: &str) -> Result<Duration> {
    raw.trim()
        .parse::<u64>()
        .map(Duration::from_millis)
        .map_err(|_| {
            StoreError::Config(format!(
                "{} must be a whole number of milliseconds, got {:?}",
                LOCK_TIMEOUT_ENV, raw
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_uses_defaults() {
        let config = StoreConfig::new("/tmp/shelldock-test");
        assert_eq!(config.root, PathBuf::from("/tmp/shelldock-test"));
        assert_eq!(config.file_name, DEFAULT_FILE_NAME);
        assert_eq!(config.lock_timeout, DEFAULT_LOCK_TIMEOUT);
    }

    #[test]
    fn test_builders() {
        let config = StoreConfig::new("/tmp/x")
            .with_lock_timeout(Duration::from_millis(250))
            .with_file_name("data.json");
        assert_eq!(config.lock_timeout, Duration::from_millis(250));
        assert_eq!(config.file_name, "data.json");
    }

    #[test]
    fn test_parse_timeout() {
        assert_eq!(parse_timeout("1500").unwrap(), Duration::from_millis(1500));
        assert_eq!(parse_timeout(" 20 ").unwrap(), Duration::from_millis(20));
        assert!(matches!(parse_timeout("soon"), Err(StoreError::Config(_))));
        assert!(parse_timeout("-5").is_err());
    }

    #[test]
    fn test_default_root_is_absolute_or_named() {
        // Should not panic and should always end in something usable
        let root = default_root();
        assert!(!root.as_os_str().is_empty());
    }
}
