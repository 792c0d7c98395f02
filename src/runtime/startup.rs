use std::fs::{self, OpenOptions};
use std::path::PathBuf;

use env_logger::{Builder, Env, Target};

use crate::config::{LogSettings, default_log_path};

/// Route `log` output to a file so it does not draw over the TUI.
///
/// `RUST_LOG` wins over `log.level`. Returns the log file path, or `None`
/// when no file could be opened (logging stays off in that case).
pub fn init_logging(settings: &LogSettings) -> Option<PathBuf> {
    let path = settings
        .file
        .as_ref()
        .map(PathBuf::from)
        .or_else(default_log_path)?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).ok()?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .ok()?;

    Builder::from_env(Env::default().default_filter_or(settings.level.as_str()))
        .target(Target::Pipe(Box::new(file)))
        .format_timestamp_millis()
        .try_init()
        .ok()?;

    Some(path)
}
