//! Configuration loading and management
//!
//! Configuration is loaded from `~/.config/tally/config.toml`
//!
//! This module follows the XDG Base Directory Specification:
//! - Config: `$XDG_CONFIG_HOME/tally/` (~/.config/tally/)
//! - Data: `$XDG_DATA_HOME/tally/` (~/.local/share/tally/)
//! - State/Logs: `$XDG_STATE_HOME/tally/` (~/.local/state/tally/)

use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::PathBuf;

/// Returns a best-effort home directory path.
fn home_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Returns XDG_CONFIG_HOME or ~/.config
fn xdg_config_home() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".config"))
}

/// Returns XDG_DATA_HOME or ~/.local/share
fn xdg_data_home() -> PathBuf {
    std::env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/share"))
}

/// Returns XDG_STATE_HOME or ~/.local/state
fn xdg_state_home() -> PathBuf {
    std::env::var("XDG_STATE_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/state"))
}

/// Main configuration struct
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Remote mirror configuration (optional)
    #[serde(default)]
    pub mirror: MirrorConfig,
}

/// Logging configuration
#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Maximum number of log files to keep
    #[serde(default = "default_max_log_files")]
    pub max_files: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            max_files: default_max_log_files(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_log_files() -> usize {
    5
}

/// Remote mirror configuration
///
/// When enabled, every local write is also pushed to a hosted backend on
/// a best-effort basis. The mirror never blocks or fails local
/// operations; a push is attempted once and a failure is only logged.
#[derive(Debug, Deserialize, Clone)]
pub struct MirrorConfig {
    /// Enable/disable remote mirroring
    #[serde(default)]
    pub enabled: bool,

    /// Backend base URL (e.g. `https://tally.example.com/api`)
    pub server_url: Option<String>,

    /// Account identifier attached to mirrored writes
    pub user_id: Option<String>,

    /// API key (bearer token)
    pub api_key: Option<String>,

    /// HTTP request timeout in seconds
    #[serde(default = "default_mirror_timeout")]
    pub timeout_secs: u64,
}

impl Default for MirrorConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            server_url: None,
            user_id: None,
            api_key: None,
            timeout_secs: default_mirror_timeout(),
        }
    }
}

impl MirrorConfig {
    /// Check if the mirror is properly configured and enabled
    pub fn is_ready(&self) -> bool {
        self.enabled && self.server_url.is_some() && self.user_id.is_some()
    }

    /// Validate configuration, returning error message if invalid
    pub fn validate(&self) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }

        if self.server_url.is_none() {
            return Err(Error::Config(
                "mirror.server_url is required when mirror is enabled".to_string(),
            ));
        }
        if self.user_id.is_none() {
            return Err(Error::Config(
                "mirror.user_id is required when mirror is enabled".to_string(),
            ));
        }
        Ok(())
    }
}

fn default_mirror_timeout() -> u64 {
    10
}

impl Config {
    /// Load configuration from the default path
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if !config_path.exists() {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            return Ok(Config::default());
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &PathBuf) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read config file {:?}: {}", path, e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;

        Ok(config)
    }

    /// Returns the default config file path
    ///
    /// `$XDG_CONFIG_HOME/tally/config.toml` (~/.config/tally/config.toml)
    pub fn config_path() -> PathBuf {
        xdg_config_home().join("tally").join("config.toml")
    }

    /// Returns the data directory path (for the SQLite database)
    ///
    /// `$XDG_DATA_HOME/tally/` (~/.local/share/tally/)
    pub fn data_dir() -> PathBuf {
        xdg_data_home().join("tally")
    }

    /// Returns the state directory path (for logs)
    ///
    /// `$XDG_STATE_HOME/tally/` (~/.local/state/tally/)
    pub fn state_dir() -> PathBuf {
        xdg_state_home().join("tally")
    }

    /// Returns the database file path
    ///
    /// `$XDG_DATA_HOME/tally/data.db` (~/.local/share/tally/data.db)
    pub fn database_path() -> PathBuf {
        Self::data_dir().join("data.db")
    }

    /// Returns the log file path
    ///
    /// `$XDG_STATE_HOME/tally/tally.log` (~/.local/state/tally/tally.log)
    pub fn log_path() -> PathBuf {
        Self::state_dir().join("tally.log")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.logging.level, "info");
        assert!(!config.mirror.enabled);
        assert!(!config.mirror.is_ready());
    }

    #[test]
    fn test_parse_config() {
        let toml = r#"
[logging]
level = "debug"

[mirror]
enabled = true
server_url = "https://tally.example.com/api"
user_id = "u-123"
api_key = "tk_live_xxxx"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.logging.level, "debug");
        assert!(config.mirror.enabled);
        assert_eq!(
            config.mirror.server_url.as_deref(),
            Some("https://tally.example.com/api")
        );
        assert!(config.mirror.is_ready());
    }

    #[test]
    fn test_mirror_config_validation() {
        // Disabled config is always valid
        let config = MirrorConfig::default();
        assert!(config.validate().is_ok());

        // Enabled without a server should fail
        let config = MirrorConfig {
            enabled: true,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        // Enabled with server and user should pass
        let config = MirrorConfig {
            enabled: true,
            server_url: Some("https://tally.example.com".to_string()),
            user_id: Some("u-1".to_string()),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
        assert!(config.is_ready());
    }
}
