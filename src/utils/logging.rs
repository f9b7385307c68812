//! Diagnostic logging to a file.
//!
//! The terminal belongs to the UI while twig runs, so tracing output only
//! goes to a file and only when one is requested.

use std::env;
use std::fs::OpenOptions;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

/// Environment variable holding the tracing filter directives.
pub const LOG_FILTER_ENV: &str = "TWIG_LOG";
/// Environment variable naming the log file when `--log` is not given.
pub const LOG_FILE_ENV: &str = "TWIG_LOG_FILE";

const DEFAULT_FILTER: &str = "info";

/// Pick the log file: the command line wins over the environment.
pub fn resolve_log_path(cli_path: Option<PathBuf>) -> Option<PathBuf> {
    cli_path.or_else(|| {
        env::var_os(LOG_FILE_ENV)
            .filter(|value| !value.is_empty())
            .map(PathBuf::from)
    })
}

fn filter_from_env() -> EnvFilter {
    EnvFilter::try_from_env(LOG_FILTER_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install a global subscriber appending to `path`.
///
/// Returns `Ok(false)` when no path was given or a subscriber is already
/// installed.
pub fn init(path: Option<&Path>) -> io::Result<bool> {
    let Some(path) = path else {
        return Ok(false);
    };

    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter_from_env())
        .with_ansi(false)
        .with_thread_names(true)
        .with_writer(Mutex::new(file))
        .try_init()
        .is_ok();

    if installed {
        tracing::info!(path = %path.display(), "Logging started");
    }
    Ok(installed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn command_line_path_wins() {
        let path = PathBuf::from("/tmp/from-cli.log");
        assert_eq!(resolve_log_path(Some(path.clone())), Some(path));
    }

    #[test]
    fn no_path_installs_nothing() {
        assert!(!init(None).unwrap());
    }

    #[test]
    fn log_file_is_created() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("twig.log");
        init(Some(&path)).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn unwritable_path_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing").join("twig.log");
        assert!(init(Some(&path)).is_err());
    }
}
