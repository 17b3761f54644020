//! Configuration loading and path resolution.
//!
//! Configuration lives in an optional `config.toml` under the runtime root.
//! Every section is `#[serde(default)]`, so a missing or empty file yields
//! the built-in defaults.

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;

use crate::api::parse_base_url;

/// Directory under the local application data folder holding the game logs.
const GAME_LOG_SUBDIR: [&str; 3] = ["DeadByDaylight", "Saved", "Logs"];

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Watched log file.
    #[serde(default)]
    pub log: LogConfig,

    /// Remote API hosts.
    #[serde(default)]
    pub api: ApiConfig,
}

/// Location of the watched game log.
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// Directory override. Defaults to the game's log directory under the
    /// local application data folder.
    #[serde(default)]
    pub directory: Option<PathBuf>,

    /// Name of the tracked file inside the directory.
    #[serde(default = "default_log_file_name")]
    pub file_name: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            directory: None,
            file_name: default_log_file_name(),
        }
    }
}

impl LogConfig {
    /// The directory to watch: the override, or the game's default.
    ///
    /// # Errors
    ///
    /// Returns an error if no override is set and the local data directory
    /// cannot be determined.
    pub fn resolve_directory(&self) -> anyhow::Result<PathBuf> {
        match &self.directory {
            Some(dir) => Ok(dir.clone()),
            None => default_log_directory(),
        }
    }
}

/// Base URLs of the remote hosts.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Host serving the character and customization tables.
    #[serde(default = "default_metadata_base_url")]
    pub metadata_base_url: String,

    /// Authenticated session host. Guest re-authentication applies to
    /// requests against this host only.
    #[serde(default = "default_session_base_url")]
    pub session_base_url: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            metadata_base_url: default_metadata_base_url(),
            session_base_url: default_session_base_url(),
        }
    }
}

impl Config {
    /// Check values serde cannot check.
    ///
    /// # Errors
    ///
    /// Returns an error if a base URL is unusable or the log file name is
    /// empty or contains a path separator.
    pub fn validate(&self) -> anyhow::Result<()> {
        parse_base_url(&self.api.metadata_base_url).context("invalid api.metadata_base_url")?;
        parse_base_url(&self.api.session_base_url).context("invalid api.session_base_url")?;

        let name = self.log.file_name.as_str();
        if name.is_empty() || Path::new(name).file_name().and_then(|n| n.to_str()) != Some(name) {
            anyhow::bail!("log.file_name must be a bare file name, got '{name}'");
        }

        Ok(())
    }
}

// Default value functions for serde.

fn default_log_file_name() -> String {
    "DeadByDaylight.log".to_owned()
}

fn default_metadata_base_url() -> String {
    "https://dbd-stats.info".to_owned()
}

fn default_session_base_url() -> String {
    "https://steam.live.bhvrdbd.com".to_owned()
}

/// Load configuration from a TOML file. A missing file yields defaults.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read, parsed or
/// validated.
pub fn load_config(path: &Path) -> anyhow::Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }

    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config at {}", path.display()))?;
    let config: Config = toml::from_str(&contents)
        .with_context(|| format!("failed to parse config at {}", path.display()))?;
    config.validate()?;
    Ok(config)
}

/// Filesystem locations owned by this tool.
#[derive(Debug, Clone)]
pub struct RuntimePaths {
    /// Root directory (`<local data>/lobby-info`).
    pub root: PathBuf,
    /// Default config file.
    pub config_toml: PathBuf,
    /// Directory for this tool's own rotated logs.
    pub logs_dir: PathBuf,
}

/// Resolve [`RuntimePaths`] under the local application data folder.
///
/// # Errors
///
/// Returns an error if the local data directory cannot be determined.
pub fn runtime_paths() -> anyhow::Result<RuntimePaths> {
    let root = local_data_dir()?.join(env!("CARGO_PKG_NAME"));
    Ok(RuntimePaths {
        config_toml: root.join("config.toml"),
        logs_dir: root.join("logs"),
        root,
    })
}

/// The game's log directory: `<local data>/DeadByDaylight/Saved/Logs`.
///
/// # Errors
///
/// Returns an error if the local data directory cannot be determined.
pub fn default_log_directory() -> anyhow::Result<PathBuf> {
    let mut dir = local_data_dir()?;
    dir.extend(GAME_LOG_SUBDIR);
    Ok(dir)
}

fn local_data_dir() -> anyhow::Result<PathBuf> {
    let dirs = directories::BaseDirs::new()
        .ok_or_else(|| anyhow::anyhow!("cannot determine home directory"))?;
    Ok(dirs.data_local_dir().to_path_buf())
}
