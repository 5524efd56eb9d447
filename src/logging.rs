use crate::error::ConfigError;
use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

// stdout belongs to the terminal UI, so logs go to a file.
pub fn init(log_file: &Path) -> Result<(), ConfigError> {
    let to_error = |source| ConfigError::LogFile {
        path: log_file.to_path_buf(),
        source,
    };

    if let Some(parent) = log_file.parent() {
        fs::create_dir_all(parent).map_err(to_error)?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file)
        .map_err(to_error)?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}
