use crate::error::ConfigError;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_API_URL: &str = "http://localhost:8000/api";
pub const API_URL_ENV: &str = "TASKS_API_URL";
const APP_DIR: &str = "tasklist-tui";

// config.toml
#[derive(Debug, Default, Deserialize, PartialEq)]
struct FileConfig {
    api_url: Option<String>,
    log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub api_url: String,
    pub log_file: PathBuf,
}

impl Config {
    /// Reads `<config_dir>/tasklist-tui/config.toml` when present, then applies the
    /// `TASKS_API_URL` override. Call after `.env` has been loaded.
    pub fn load() -> Result<Config, ConfigError> {
        let file = match dirs::config_dir().map(|dir| dir.join(APP_DIR).join("config.toml")) {
            Some(path) if path.exists() => Some(read_file(&path)?),
            _ => None,
        };
        Ok(Config::resolve(file, env::var(API_URL_ENV).ok()))
    }

    fn resolve(file: Option<FileConfig>, env_url: Option<String>) -> Config {
        let file = file.unwrap_or_default();
        let api_url = env_url
            .filter(|url| !url.trim().is_empty())
            .or(file.api_url)
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        Config {
            api_url: api_url.trim().trim_end_matches('/').to_string(),
            log_file: file.log_file.unwrap_or_else(default_log_file),
        }
    }
}

fn read_file(path: &Path) -> Result<FileConfig, ConfigError> {
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_file(&raw, path)
}

fn parse_file(raw: &str, path: &Path) -> Result<FileConfig, ConfigError> {
    toml::from_str(raw).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn default_log_file() -> PathBuf {
    dirs::data_local_dir()
        .map(|dir| dir.join(APP_DIR))
        .unwrap_or_else(env::temp_dir)
        .join("tasklist.log")
}
