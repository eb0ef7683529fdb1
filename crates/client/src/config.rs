// Rewind - Time-Travel Debugger Client
// Copyright (C) 2024 Zhuo Zhang and Wuqi Zhang
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Configuration management for the Rewind client

use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use eyre::{Context, Result};
use rewind_common::{REWIND_CONFIG, REWIND_ORACLE_URL};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Client configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Connection to the replay service
    #[serde(default)]
    pub oracle: OracleConfig,
    /// Inline preview settings
    #[serde(default)]
    pub previews: PreviewConfig,
}

/// Oracle connection configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OracleConfig {
    /// JSON-RPC endpoint
    pub url: String,
    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self { url: "http://localhost:3030".to_string(), request_timeout_secs: 30 }
    }
}

/// Inline preview configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreviewConfig {
    /// Compute inline previews on pause
    pub enabled: bool,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl Config {
    /// Get the config file path (`$REWIND_CONFIG`, else `~/.rewind.toml`)
    pub fn config_path() -> Result<PathBuf> {
        if let Ok(path) = std::env::var(REWIND_CONFIG) {
            return Ok(PathBuf::from(path));
        }
        let home =
            dirs::home_dir().ok_or_else(|| eyre::eyre!("Unable to determine home directory"))?;
        Ok(home.join(".rewind.toml"))
    }

    /// Load configuration from file, creating default if it doesn't exist
    pub fn load() -> Result<Self> {
        Self::load_from_path(&Self::config_path()?)
    }

    /// Load configuration from `path`, creating default if it doesn't exist
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!("Config file not found, creating default at {:?}", path);
            let default_config = Self::default();
            default_config.save_to_path(path)?;
            return Ok(default_config);
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path:?}"))?;

        let config: Self =
            toml::from_str(&content).with_context(|| "Failed to parse config file as TOML")?;

        debug!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Save configuration to the default path
    pub fn save(&self) -> Result<()> {
        self.save_to_path(&Self::config_path()?)
    }

    /// Save configuration to `path`
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        let content =
            toml::to_string_pretty(self).with_context(|| "Failed to serialize config to TOML")?;

        fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {path:?}"))?;

        debug!("Saved configuration to {:?}", path);
        Ok(())
    }

    /// Oracle URL, `$REWIND_ORACLE_URL` taking precedence over the file
    pub fn oracle_url(&self) -> String {
        std::env::var(REWIND_ORACLE_URL).unwrap_or_else(|_| self.oracle.url.clone())
    }

    /// Per-request timeout
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.oracle.request_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::TempDir;

    #[test]
    fn test_load_creates_default_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("rewind.toml");

        let config = Config::load_from_path(&path).unwrap();
        assert_eq!(config, Config::default());
        assert!(path.exists());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("rewind.toml");

        let mut config = Config::default();
        config.oracle.url = "http://replay.local:9000".to_string();
        config.previews.enabled = false;
        config.save_to_path(&path).unwrap();

        assert_eq!(Config::load_from_path(&path).unwrap(), config);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("rewind.toml");
        fs::write(&path, "[previews]\nenabled = false\n").unwrap();

        let config = Config::load_from_path(&path).unwrap();
        assert!(!config.previews.enabled);
        assert_eq!(config.oracle, OracleConfig::default());
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("rewind.toml");
        fs::write(&path, "oracle = 3").unwrap();

        assert!(Config::load_from_path(&path).is_err());
    }

    #[test]
    #[serial]
    fn test_env_overrides() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("custom.toml");

        std::env::set_var(REWIND_CONFIG, &path);
        std::env::set_var(REWIND_ORACLE_URL, "http://override:1");

        assert_eq!(Config::config_path().unwrap(), path);
        assert_eq!(Config::default().oracle_url(), "http://override:1");

        std::env::remove_var(REWIND_CONFIG);
        std::env::remove_var(REWIND_ORACLE_URL);
        assert_eq!(Config::default().oracle_url(), "http://localhost:3030");
    }
}
