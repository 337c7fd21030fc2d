/// Logging setup for the shelldock binary
///
/// Everything goes to stderr so that stdout can be captured by shell
/// functions like `cd "$(shelldock jump go docs)"`.

use tracing_subscriber::{fmt, EnvFilter};

/// Filter directives are read from this variable, e.g. `SHELLDOCK_LOG=debug`
pub const LOG_ENV: &str = "SHELLDOCK_LOG";

const DEFAULT_FILTER: &str = "warn";

/// Install the global subscriber. Safe to call more than once.
pub fn init() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .try_init();
}
