//! Diagnostic log setup.
//!
//! The terminal belongs to the UI, so tracing output goes to a file: `--log-file` when given,
//! otherwise `storeview.log` in the cache directory. `STOREVIEW_LOG` takes an `EnvFilter`
//! directive (e.g. `storeview=debug`).

use color_eyre::Result;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

use crate::cache::{CacheManager, LOG_FILE};

pub const LOG_ENV: &str = "STOREVIEW_LOG";
const DEFAULT_DIRECTIVE: &str = "storeview=info";

/// Resolve the log path: explicit path, or the cache-managed default.
pub fn log_path(explicit: Option<&Path>, cache: &CacheManager) -> Result<PathBuf> {
    match explicit {
        Some(path) => Ok(path.to_path_buf()),
        None => {
            cache.ensure_cache_dir()?;
            Ok(cache.cache_file(LOG_FILE))
        }
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE))
}

/// Install the global subscriber writing to `path` (appending).
pub fn init(path: &Path) -> Result<()> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_thread_names(true)
        .try_init()
        .map_err(|e| color_eyre::eyre::eyre!("Could not install logger: {}", e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_path_prefers_explicit() {
        let dir = tempfile::tempdir().unwrap();
        let cache = CacheManager::with_dir(dir.path().join("cache"));
        let explicit = dir.path().join("custom.log");
        assert_eq!(log_path(Some(&explicit), &cache).unwrap(), explicit);
        assert!(!cache.cache_dir().exists());
    }

    #[test]
    fn test_log_path_defaults_to_cache() {
        let dir = tempfile::tempdir().unwrap();
        let cache = CacheManager::with_dir(dir.path().join("cache"));
        let path = log_path(None, &cache).unwrap();
        assert_eq!(path, cache.cache_file(LOG_FILE));
        assert!(cache.cache_dir().exists());
    }
}
