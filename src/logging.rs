//! Tracing subscriber setup.
//!
//! The CLI owns the terminal, so log lines go to `~/.fomo/logs/fomo.log`
//! instead of interleaving with chat output. `RUST_LOG` overrides the level.

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

const LOG_DIR: &str = ".fomo/logs";
const LOG_FILE: &str = "fomo.log";

/// Default log file location, if a home directory exists.
pub fn default_log_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(LOG_DIR).join(LOG_FILE))
}

fn open_log_file(path: &Path) -> std::io::Result<File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

/// Install the global subscriber writing to the default log file.
///
/// Falls back to stderr when the file cannot be opened. Returns the path
/// being written to, if any. Calling it twice is a no-op.
pub fn init_logging(level: &str) -> Option<PathBuf> {
    init_logging_at(default_log_path(), level)
}

/// Install the global subscriber writing to `path`, or stderr for `None`.
pub fn init_logging_at(path: Option<PathBuf>, level: &str) -> Option<PathBuf> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let file = path
        .as_deref()
        .and_then(|p| open_log_file(p).ok());

    match file {
        Some(file) => {
            let subscriber = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(true)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .compact();
            // set_global_default is a no-op if already set
            let _ = subscriber.try_init();
            path
        }
        None => {
            let subscriber = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(true)
                .with_writer(std::io::stderr)
                .compact();
            let _ = subscriber.try_init();
            None
        }
    }
}
