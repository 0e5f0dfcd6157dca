//! File logging for the TUI and CLI.
//!
//! Stdout belongs to the terminal UI, so events go to `mandala.log` in the
//! data directory. The filter comes from `MANDALA_LOG` (default `info`).
//! Initialization is idempotent and never panics.

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};

use tracing_subscriber::EnvFilter;

pub const LOG_FILE: &str = "mandala.log";
pub const LOG_ENV: &str = "MANDALA_LOG";
const DEFAULT_FILTER: &str = "info";

static LOG_PATH: OnceLock<PathBuf> = OnceLock::new();

/// Install the global subscriber writing to `<data_dir>/mandala.log`.
///
/// Returns the log file path. A second call is a no-op returning the path
/// from the first one.
pub fn init_logging(data_dir: &Path) -> Result<PathBuf, String> {
    if let Some(path) = LOG_PATH.get() {
        return Ok(path.clone());
    }

    fs::create_dir_all(data_dir)
        .map_err(|e| format!("failed to create log directory `{}`: {e}", data_dir.display()))?;
    let path = data_dir.join(LOG_FILE);
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .map_err(|e| format!("failed to open log file `{}`: {e}", path.display()))?;

    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .try_init()
        .map_err(|e| format!("failed to install logger: {e}"))?;

    let path = LOG_PATH.get_or_init(|| path).clone();
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        log = %path.display(),
        "logging started"
    );
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn init_is_idempotent() {
        let tmp = TempDir::new().unwrap();
        let first = init_logging(tmp.path());
        // Another test binary thread may have installed a global subscriber
        // first; either way a second call must not panic or change the path.
        if let Ok(path) = first {
            assert_eq!(path, tmp.path().join(LOG_FILE));
            let other = TempDir::new().unwrap();
            assert_eq!(init_logging(other.path()).unwrap(), path);
        }
    }
}
