//! CLI configuration
//!
//! Sources, lowest precedence first: built-in defaults, `config.toml` in the
//! config directory, `MEDIBOOK_*` environment variables, command-line flags.

use anyhow::{Context, Result};
use medibook_http::DEFAULT_BASE_URL;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

const ENV_PREFIX: &str = "MEDIBOOK";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CliConfig {
    /// Base URL of the booking API
    pub api_url: String,
    /// Transport timeout for each request
    pub timeout_secs: u64,
    /// Where tokens and logs live; platform default when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_dir: Option<PathBuf>,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            state_dir: None,
        }
    }
}

/// Values given on the command line
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub api_url: Option<String>,
    pub timeout_secs: Option<u64>,
    pub state_dir: Option<PathBuf>,
}

impl CliConfig {
    /// Load configuration from every source
    pub fn load(config_file: &Path, overrides: &Overrides) -> Result<Self> {
        let defaults = Self::default();

        let settings = config::Config::builder()
            .set_default("api_url", defaults.api_url)?
            .set_default("timeout_secs", defaults.timeout_secs)?
            .add_source(config::File::from(config_file).required(false))
            .add_source(config::Environment::with_prefix(ENV_PREFIX))
            .set_override_option("api_url", overrides.api_url.clone())?
            .set_override_option("timeout_secs", overrides.timeout_secs)?
            .set_override_option(
                "state_dir",
                overrides
                    .state_dir
                    .as_ref()
                    .map(|dir| dir.to_string_lossy().into_owned()),
            )?
            .build()
            .with_context(|| {
                format!("Failed to load configuration from {}", config_file.display())
            })?;

        Ok(settings.try_deserialize()?)
    }

    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Write this configuration as TOML
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_file() {
        let tmp = tempfile::tempdir().unwrap();
        let missing = tmp.path().join("missing.toml");
        let config = CliConfig::load(&missing, &Overrides::default()).unwrap();

        assert_eq!(config.timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert!(config.state_dir.is_none());
    }

    #[test]
    fn test_file_then_flags() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(
            &path,
            "api_url = \"https://api.medibook.test/api\"\ntimeout_secs = 5\n",
        )
        .unwrap();

        let config = CliConfig::load(&path, &Overrides::default()).unwrap();
        assert_eq!(config.timeout(), Duration::from_secs(5));

        let overrides = Overrides {
            timeout_secs: Some(12),
            state_dir: Some(tmp.path().join("state")),
            ..Overrides::default()
        };
        let config = CliConfig::load(&path, &overrides).unwrap();
        assert_eq!(config.timeout_secs, 12);
        assert_eq!(config.state_dir, Some(tmp.path().join("state")));
    }

    #[test]
    fn test_save_round_trips_through_load() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("nested/config.toml");
        let config = CliConfig {
            api_url: "http://10.0.0.5:3000/api".into(),
            timeout_secs: 9,
            state_dir: None,
        };
        config.save(&path).unwrap();

        let loaded = CliConfig::load(&path, &Overrides::default()).unwrap();
        assert_eq!(loaded.timeout_secs, 9);
    }
}
