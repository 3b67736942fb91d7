use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::debug;

use dbquery_core::Config;

/// CLI configuration loaded from TOML file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CliConfig {
    /// API base URL, including the `/api/v1` prefix
    #[serde(default)]
    pub server_url: Option<String>,

    /// Request timeout in seconds
    #[serde(default)]
    pub timeout_secs: Option<u64>,

    /// Model used for `ask` when none is given on the command line
    #[serde(default)]
    pub default_model: Option<String>,
}

impl CliConfig {
    /// Return the default config directory path: ~/.config/dbquery/
    pub fn default_config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("could not determine user config directory")?
            .join("dbquery");
        Ok(config_dir)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        Ok(Self::default_config_dir()?.join("config.toml"))
    }

    /// Load config from the given path, or the default path.
    /// A missing file yields the defaults, which are written out for next time.
    pub fn load(path: Option<&str>) -> Result<Self> {
        let config_path = match path {
            Some(p) => PathBuf::from(p),
            None => Self::default_config_path()?,
        };

        if config_path.exists() {
            debug!(?config_path, "Loading config");
            let content = std::fs::read_to_string(&config_path)
                .with_context(|| format!("failed to read config: {}", config_path.display()))?;
            toml::from_str(&content)
                .with_context(|| format!("failed to parse config: {}", config_path.display()))
        } else {
            debug!(?config_path, "Config file not found, using defaults");
            let config = Self::default();
            if let Some(parent) = config_path.parent() {
                std::fs::create_dir_all(parent).ok();
            }
            let toml_str = toml::to_string_pretty(&config)
                .context("failed to serialize default config")?;
            std::fs::write(&config_path, toml_str).ok();
            Ok(config)
        }
    }

    /// Merge flags, environment and this file into the effective settings.
    /// Priority: command line > environment > config file > built-in default.
    pub fn resolve(
        &self,
        env: &Config,
        server_override: Option<&str>,
        timeout_override: Option<u64>,
    ) -> Config {
        let mut resolved = env.clone();
        resolved.api_url = server_override
            .map(str::to_string)
            .or_else(|| env.api_url.clone())
            .or_else(|| self.server_url.clone());
        resolved.timeout_secs = timeout_override
            .or(env.timeout_secs)
            .or(self.timeout_secs);
        resolved.default_model = env.default_model.clone().or_else(|| self.default_model.clone());
        resolved
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_empty() {
        let config = CliConfig::default();
        assert!(config.server_url.is_none());
        assert!(config.default_model.is_none());
    }

    #[test]
    fn test_flag_beats_env_and_file() {
        let file = CliConfig {
            server_url: Some("http://file:1/api/v1".into()),
            ..Default::default()
        };
        let env = Config {
            api_url: Some("http://env:2/api/v1".into()),
            ..Default::default()
        };

        let resolved = file.resolve(&env, Some("http://flag:3/api/v1"), None);
        assert_eq!(resolved.api_url(), "http://flag:3/api/v1");

        let resolved = file.resolve(&env, None, None);
        assert_eq!(resolved.api_url(), "http://env:2/api/v1");

        let resolved = file.resolve(&Config::default(), None, None);
        assert_eq!(resolved.api_url(), "http://file:1/api/v1");
    }

    #[test]
    fn test_builtin_default_url() {
        let resolved = CliConfig::default().resolve(&Config::default(), None, None);
        assert_eq!(resolved.api_url(), dbquery_core::config::DEFAULT_API_URL);
    }

    #[test]
    fn test_timeout_flag_and_file_model() {
        let file = CliConfig {
            default_model: Some("kimi-k2".into()),
            ..Default::default()
        };
        let resolved = file.resolve(&Config::default(), None, Some(5));
        assert_eq!(resolved.timeout_secs(), 5);
        assert_eq!(resolved.default_model.as_deref(), Some("kimi-k2"));
    }

    #[test]
    fn test_timeout_precedence_matches_url() {
        let file = CliConfig {
            timeout_secs: Some(10),
            ..Default::default()
        };
        let env = Config {
            timeout_secs: Some(20),
            ..Default::default()
        };

        assert_eq!(file.resolve(&env, None, Some(5)).timeout_secs(), 5);
        assert_eq!(file.resolve(&env, None, None).timeout_secs(), 20);
        assert_eq!(file.resolve(&Config::default(), None, None).timeout_secs(), 10);
        assert_eq!(
            CliConfig::default().resolve(&Config::default(), None, None).timeout_secs(),
            dbquery_core::config::DEFAULT_TIMEOUT_SECS
        );
    }

    #[test]
    fn test_load_writes_defaults_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let path_str = path.to_str().unwrap();

        let config = CliConfig::load(Some(path_str)).unwrap();
        assert_eq!(config, CliConfig::default());
        assert!(path.exists());
    }

    #[test]
    fn test_load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "server_url = \"http://db-query.internal/api/v1\"\ntimeout_secs = 10\n",
        )
        .unwrap();

        let config = CliConfig::load(path.to_str()).unwrap();
        assert_eq!(config.server_url.as_deref(), Some("http://db-query.internal/api/v1"));
        assert_eq!(config.timeout_secs, Some(10));
        assert!(config.default_model.is_none());
    }

    #[test]
    fn test_load_rejects_bad_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "timeout_secs = \"soon\"").unwrap();
        assert!(CliConfig::load(path.to_str()).is_err());
    }
}
