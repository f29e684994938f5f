//! Client configuration.
//!
//! Values are layered: command-line overrides, then the process environment
//! (including a `.env` file), then `~/.config/pitchside/config.json`, then
//! built-in defaults. Nothing here fails: anything missing or malformed falls
//! back to the next layer.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::model::ModelId;

pub const DEFAULT_API_URL: &str = "http://localhost:8000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub const ENV_API_URL: &str = "PITCHSIDE_API_URL";
pub const ENV_SERVER_AVAILABLE: &str = "PITCHSIDE_SERVER_AVAILABLE";
pub const ENV_DEFAULT_MODEL: &str = "PITCHSIDE_DEFAULT_MODEL";
pub const ENV_REQUEST_TIMEOUT: &str = "PITCHSIDE_REQUEST_TIMEOUT_SECS";

/// Persisted user preferences.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_available: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::get_config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }

        let config_content = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&config_content)?;
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Create config directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let config_content = serde_json::to_string_pretty(self)?;
        fs::write(path, config_content)?;
        Ok(())
    }

    pub fn save_default_model(model: ModelId) -> Result<PathBuf> {
        let path = Self::get_config_path()?;
        let mut config = Self::load_from(&path).unwrap_or_else(|_| Self::new());
        config.default_model = Some(model.as_str().to_string());
        config.save_to(&path)?;
        Ok(path)
    }

    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir =
            dirs::config_dir().ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("pitchside").join("config.json"))
    }
}

/// Values that take precedence over the config file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overrides {
    pub api_url: Option<String>,
    pub server_available: Option<bool>,
    pub default_model: Option<ModelId>,
    pub request_timeout_secs: Option<u64>,
}

impl Overrides {
    pub fn from_env() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let default_model = lookup(ENV_DEFAULT_MODEL).and_then(|raw| match raw.parse() {
            Ok(model) => Some(model),
            Err(e) => {
                debug!("ignoring {}: {}", ENV_DEFAULT_MODEL, e);
                None
            }
        });

        Self {
            api_url: lookup(ENV_API_URL).filter(|raw| usable_url(raw).is_some()),
            server_available: lookup(ENV_SERVER_AVAILABLE).map(|raw| parse_flag(&raw)),
            default_model,
            request_timeout_secs: lookup(ENV_REQUEST_TIMEOUT)
                .and_then(|raw| raw.trim().parse().ok())
                .filter(|secs| *secs > 0),
        }
    }

    /// Fill unset fields from `fallback`.
    pub fn or(self, fallback: Overrides) -> Overrides {
        Overrides {
            api_url: self
                .api_url
                .filter(|url| usable_url(url).is_some())
                .or(fallback.api_url),
            server_available: self.server_available.or(fallback.server_available),
            default_model: self.default_model.or(fallback.default_model),
            request_timeout_secs: self
                .request_timeout_secs
                .filter(|secs| *secs > 0)
                .or(fallback.request_timeout_secs),
        }
    }
}

/// Resolved, read-only settings handed to the chat controller.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub api_endpoint: String,
    pub server_available: bool,
    pub default_model: ModelId,
    pub request_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::resolve(&Config::new(), &Overrides::default())
    }
}

impl ClientConfig {
    /// Load everything: `.env`, environment, config file, then `cli` on top.
    pub fn load(cli: Overrides) -> Self {
        load_dotenv();

        let file = Config::load().unwrap_or_else(|e| {
            warn!("ignoring unreadable config file: {}", e);
            Config::new()
        });

        Self::resolve(&file, &cli.or(Overrides::from_env()))
    }

    pub fn resolve(file: &Config, overrides: &Overrides) -> Self {
        let api_endpoint = overrides
            .api_url
            .as_deref()
            .and_then(usable_url)
            .or_else(|| file.api_url.as_deref().and_then(usable_url))
            .unwrap_or(DEFAULT_API_URL)
            .to_string();

        let server_available = overrides
            .server_available
            .or(file.server_available)
            .unwrap_or(false);

        let default_model = overrides
            .default_model
            .or_else(|| file.default_model.as_deref().and_then(|m| m.parse().ok()))
            .unwrap_or_default();

        let timeout_secs = overrides
            .request_timeout_secs
            .filter(|secs| *secs > 0)
            .or(file.request_timeout_secs.filter(|secs| *secs > 0))
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        Self {
            api_endpoint,
            server_available,
            default_model,
            request_timeout: Duration::from_secs(timeout_secs),
        }
    }

    pub fn chat_url(&self) -> String {
        format!("{}/api/chat", self.api_endpoint)
    }
}

/// Read `.env` from the working directory into the process environment.
/// Variables already set are left alone, so calling this more than once is harmless.
pub fn load_dotenv() -> Option<PathBuf> {
    match dotenvy::dotenv() {
        Ok(path) => {
            debug!("loaded environment from {}", path.display());
            Some(path)
        }
        Err(e) if e.not_found() => None,
        Err(e) => {
            warn!("ignoring unreadable .env: {}", e);
            None
        }
    }
}

/// Like [`load_dotenv`], for an explicit file.
pub fn load_dotenv_from(path: &Path) -> Result<()> {
    dotenvy::from_path(path)?;
    debug!("loaded environment from {}", path.display());
    Ok(())
}

/// Trimmed base URL without trailing slashes, or `None` if nothing is left.
fn usable_url(raw: &str) -> Option<&str> {
    let url = raw.trim().trim_end_matches('/');
    (!url.is_empty()).then_some(url)
}

/// Lenient boolean parsing for environment flags. Anything unrecognized is false.
pub fn parse_flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "true" | "1" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults_when_nothing_set() {
        let config = ClientConfig::resolve(&Config::new(), &Overrides::default());
        assert_eq!(config.api_endpoint, "http://localhost:8000");
        assert!(!config.server_available);
        assert_eq!(config.default_model, ModelId::Gpt35Turbo);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.chat_url(), "http://localhost:8000/api/chat");
    }

    #[test]
    fn test_parse_flag() {
        for raw in ["true", "TRUE", " 1 ", "yes", "On"] {
            assert!(parse_flag(raw), "{raw} should be true");
        }
        for raw in ["false", "0", "", "maybe"] {
            assert!(!parse_flag(raw), "{raw} should be false");
        }
    }

    #[test]
    fn test_env_overrides_file() {
        let env = vars(&[
            (ENV_API_URL, "https://analysis.example.com/"),
            (ENV_SERVER_AVAILABLE, "true"),
            (ENV_DEFAULT_MODEL, "llama2"),
            (ENV_REQUEST_TIMEOUT, "5"),
        ]);
        let overrides = Overrides::from_vars(|k| env.get(k).cloned());
        let file = Config {
            api_url: Some("http://10.0.0.2:8000".to_string()),
            server_available: Some(false),
            default_model: Some("gpt-4".to_string()),
            request_timeout_secs: Some(60),
        };

        let config = ClientConfig::resolve(&file, &overrides);
        assert_eq!(config.api_endpoint, "https://analysis.example.com");
        assert!(config.server_available);
        assert_eq!(config.default_model, ModelId::Llama2);
        assert_eq!(config.request_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let env = vars(&[
            (ENV_API_URL, "  "),
            (ENV_DEFAULT_MODEL, "gpt-5"),
            (ENV_REQUEST_TIMEOUT, "soon"),
        ]);
        let overrides = Overrides::from_vars(|k| env.get(k).cloned());
        let file = Config {
            default_model: Some("not-a-model".to_string()),
            request_timeout_secs: Some(0),
            ..Config::new()
        };

        let config = ClientConfig::resolve(&file, &overrides);
        assert_eq!(config.api_endpoint, DEFAULT_API_URL);
        assert_eq!(config.default_model, ModelId::Gpt35Turbo);
        assert_eq!(config.request_timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
    }

    #[test]
    fn test_blank_or_zero_env_falls_back_to_file() {
        let env = vars(&[(ENV_API_URL, ""), (ENV_REQUEST_TIMEOUT, "0")]);
        let overrides = Overrides::from_vars(|k| env.get(k).cloned());
        assert_eq!(overrides, Overrides::default());

        let file = Config {
            api_url: Some("http://10.0.0.2:8000/".to_string()),
            request_timeout_secs: Some(60),
            ..Config::new()
        };
        let config = ClientConfig::resolve(&file, &overrides);
        assert_eq!(config.api_endpoint, "http://10.0.0.2:8000");
        assert_eq!(config.request_timeout, Duration::from_secs(60));

        // The same values arriving directly as overrides are skipped too.
        let direct = Overrides {
            api_url: Some(" / ".to_string()),
            request_timeout_secs: Some(0),
            ..Overrides::default()
        };
        let config = ClientConfig::resolve(&file, &direct);
        assert_eq!(config.api_endpoint, "http://10.0.0.2:8000");
        assert_eq!(config.request_timeout, Duration::from_secs(60));
    }

    #[test]
    fn test_blank_cli_url_does_not_hide_env() {
        let cli = Overrides {
            api_url: Some(String::new()),
            request_timeout_secs: Some(0),
            ..Overrides::default()
        };
        let env = Overrides {
            api_url: Some("http://127.0.0.1:9000".to_string()),
            request_timeout_secs: Some(12),
            ..Overrides::default()
        };

        let merged = cli.or(env);
        assert_eq!(merged.api_url.as_deref(), Some("http://127.0.0.1:9000"));
        assert_eq!(merged.request_timeout_secs, Some(12));
    }

    #[test]
    fn test_dotenv_file_sets_process_env() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        fs::write(&path, "PITCHSIDE_DOTENV_TEST_LOG=pitchside=debug\n").unwrap();

        load_dotenv_from(&path).unwrap();
        assert_eq!(
            std::env::var("PITCHSIDE_DOTENV_TEST_LOG").unwrap(),
            "pitchside=debug"
        );
        assert!(load_dotenv_from(&dir.path().join("missing.env")).is_err());
    }

    #[test]
    fn test_cli_beats_env() {
        let cli = Overrides {
            server_available: Some(false),
            ..Overrides::default()
        };
        let env = Overrides {
            api_url: Some("http://127.0.0.1:9000".to_string()),
            server_available: Some(true),
            ..Overrides::default()
        };

        let merged = cli.or(env);
        assert_eq!(merged.server_available, Some(false));
        assert_eq!(merged.api_url.as_deref(), Some("http://127.0.0.1:9000"));
    }

    #[test]
    fn test_config_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        assert_eq!(Config::load_from(&path).unwrap(), Config::new());

        let config = Config {
            default_model: Some("claude-3-opus".to_string()),
            server_available: Some(true),
            ..Config::new()
        };
        config.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap(), config);
    }
}
