//! Tracing setup
//!
//! The terminal belongs to the game, so logs go to a file:
//! `$XDG_STATE_HOME/zerfall/logs/zerfall-{PID}.log` (typically
//! `~/.local/state/zerfall/logs/`), or the temp dir as a last resort.

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// Get the log directory, creating it if necessary
pub fn log_dir() -> PathBuf {
    let dir = xdg_log_dir().unwrap_or_else(|| std::env::temp_dir().join("zerfall-logs"));
    if fs::create_dir_all(&dir).is_err() {
        return std::env::temp_dir().join("zerfall-logs");
    }
    dir
}

fn xdg_log_dir() -> Option<PathBuf> {
    if let Ok(state_home) = std::env::var("XDG_STATE_HOME") {
        let path = PathBuf::from(state_home);
        if path.is_absolute() {
            return Some(path.join("zerfall").join("logs"));
        }
    }
    dirs::home_dir().map(|home| home.join(".local").join("state").join("zerfall").join("logs"))
}

/// Log file for this process
pub fn main_log_path() -> PathBuf {
    log_dir().join(format!("zerfall-{}.log", std::process::id()))
}

/// Build a file-backed subscriber. RUST_LOG wins over the `info` default.
pub fn build_subscriber(log_file: File) -> impl tracing::Subscriber + Send + Sync {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt_layer = fmt::layer().with_ansi(false).with_writer(Arc::new(log_file));

    tracing_subscriber::registry().with(fmt_layer).with(env_filter)
}

/// Install the global subscriber. Returns the log path, or None if the
/// file could not be created (the game runs fine without logs).
pub fn init(path: Option<&Path>) -> Option<PathBuf> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(main_log_path);
    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }
    let log_file = File::create(&path).ok()?;
    build_subscriber(log_file).try_init().ok()?;
    Some(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_subscriber_writes_to_file() {
        let log_file = NamedTempFile::new().unwrap();
        let subscriber = build_subscriber(log_file.reopen().unwrap());

        tracing::subscriber::with_default(subscriber, || {
            tracing::warn!("terminal integrity at 3%");
        });

        let contents = fs::read_to_string(log_file.path()).unwrap();
        assert!(contents.contains("WARN"));
        assert!(contents.contains("terminal integrity at 3%"));
    }

    #[test]
    fn test_main_log_path_is_per_process() {
        let path = main_log_path();
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert_eq!(name, format!("zerfall-{}.log", std::process::id()));
    }
}
