//! CLI configuration.
//!
//! Operator defaults and credentials live in a YAML file, `~/.spot_config`
//! unless `--spot-config` or `SPOT_CONFIG` names another one. This module
//! only reads it; operators write it by hand:
//!
//! ```yaml
//! org: acme
//! access_token: <token>
//! refresh_token: <token>
//! region: us-central-ord-1
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ProvisionError;

/// File name of the CLI configuration inside the home directory.
pub const CONFIG_FILE_NAME: &str = ".spot_config";

/// Control plane used when `SPOT_BASE_URL` is not set.
pub const DEFAULT_BASE_URL: &str = "https://spot.rackspace.com";

/// Request timeout for control-plane calls.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Operator defaults and credentials.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpotConfig {
    /// Default organization.
    #[serde(default)]
    pub org: String,
    #[serde(default)]
    pub refresh_token: String,
    #[serde(default)]
    pub access_token: String,
    /// Default region.
    #[serde(default)]
    pub region: String,
    /// Kubernetes version the wizard preselects.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kubernetes_version: Option<String>,
    /// CNI plugin the wizard preselects.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cni: Option<String>,
}

impl SpotConfig {
    /// `~/.spot_config`, if a home directory can be resolved.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(CONFIG_FILE_NAME))
    }

    /// Load configuration from `path`.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ProvisionError> {
        let content = std::fs::read_to_string(path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                ProvisionError::ParseFile {
                    path: path.to_path_buf(),
                    reason: "spot config not found; create it with your org, access_token \
                             and region, or point --spot-config / SPOT_CONFIG at one"
                        .into(),
                }
            } else {
                ProvisionError::ConfigFile {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;

        let config: Self = serde_yaml::from_str(&content).map_err(|e| ProvisionError::ParseFile {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        debug!(path = %path.display(), org = %config.org, "Loaded CLI configuration");
        Ok(config)
    }

    /// Load from an explicit path, or from the default location.
    ///
    /// # Errors
    /// Returns an error if no path can be determined or loading fails.
    pub fn load_from(path: Option<&Path>) -> Result<Self, ProvisionError> {
        match path {
            Some(path) => Self::load(path),
            None => {
                let path = Self::default_path().ok_or_else(|| {
                    ProvisionError::validation("config", "cannot determine home directory")
                })?;
                Self::load(&path)
            }
        }
    }
}

/// Where and how to reach the control plane.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl ClientSettings {
    /// Settings from the environment (`SPOT_BASE_URL`), falling back to defaults.
    #[must_use]
    pub fn from_env() -> Self {
        let mut settings = Self::default();
        if let Ok(url) = std::env::var("SPOT_BASE_URL") {
            if !url.trim().is_empty() {
                settings.base_url = url.trim().to_string();
            }
        }
        settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(
            &path,
            "org: acme\nrefresh_token: r\naccess_token: a\nregion: uk-lon-1\ncni: cilium\n",
        )
        .unwrap();

        let config = SpotConfig::load(&path).unwrap();
        assert_eq!(config.org, "acme");
        assert_eq!(config.region, "uk-lon-1");
        assert_eq!(config.access_token, "a");
        assert_eq!(config.cni.as_deref(), Some("cilium"));
        assert_eq!(config.kubernetes_version, None);
    }

    #[test]
    fn test_missing_config_says_how_to_provide_one() {
        let dir = tempfile::tempdir().unwrap();
        let err = SpotConfig::load(&dir.path().join("absent")).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("SPOT_CONFIG"));
        assert!(!message.contains("configure"));
    }

    #[test]
    fn test_malformed_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "org: [unterminated\n").unwrap();
        assert!(matches!(
            SpotConfig::load(&path),
            Err(ProvisionError::ParseFile { .. })
        ));
    }

    #[test]
    fn test_client_settings_default() {
        let settings = ClientSettings::default();
        assert_eq!(settings.base_url, DEFAULT_BASE_URL);
        assert_eq!(settings.timeout, Duration::from_secs(30));
    }
}
