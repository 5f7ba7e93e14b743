//! Client configuration from environment variables.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

pub const ENV_COORDINATOR_URL: &str = "COORDINATOR_URL";
pub const ENV_SAVE_PATH: &str = "HEXRACE_SAVE_PATH";
pub const ENV_USERNAME: &str = "HEXRACE_USERNAME";
pub const ENV_CATEGORY: &str = "HEXRACE_CATEGORY";
pub const ENV_POLL_MS: &str = "HEXRACE_POLL_MS";
pub const ENV_TIMEOUT_MS: &str = "HEXRACE_TIMEOUT_MS";

const DEFAULT_COORDINATOR_URL: &str = "http://127.0.0.1:8787";
const DEFAULT_SAVE_PATH: &str = "hexrace-save.json";
const DEFAULT_USERNAME: &str = "explorer";
const DEFAULT_CATEGORY: &str = "default";
const DEFAULT_POLL_MS: u64 = 2_000;
const DEFAULT_TIMEOUT_MS: u64 = 5_000;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{key} must be a positive number of milliseconds, got {value:?}")]
    InvalidMillis { key: &'static str, value: String },

    #[error("{key} must not be empty")]
    Empty { key: &'static str },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub coordinator_url: String,
    pub save_path: PathBuf,
    pub username: String,
    /// Matchmaking pool
    pub category: String,
    pub poll_interval: Duration,
    pub request_timeout: Duration,
}

impl ClientConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_with(|key| std::env::var(key).ok())
    }

    fn from_env_with<F>(mut getter: F) -> Result<Self, ConfigError>
    where
        F: FnMut(&'static str) -> Option<String>,
    {
        let mut text = |key: &'static str, default: &str| -> Result<String, ConfigError> {
            match getter(key) {
                None => Ok(default.to_string()),
                Some(value) if value.trim().is_empty() => Err(ConfigError::Empty { key }),
                Some(value) => Ok(value.trim().to_string()),
            }
        };

        let coordinator_url = text(ENV_COORDINATOR_URL, DEFAULT_COORDINATOR_URL)?
            .trim_end_matches('/')
            .to_string();
        let save_path = PathBuf::from(text(ENV_SAVE_PATH, DEFAULT_SAVE_PATH)?);
        let username = text(ENV_USERNAME, DEFAULT_USERNAME)?;
        let category = text(ENV_CATEGORY, DEFAULT_CATEGORY)?;
        let poll_ms = text(ENV_POLL_MS, &DEFAULT_POLL_MS.to_string())?;
        let timeout_ms = text(ENV_TIMEOUT_MS, &DEFAULT_TIMEOUT_MS.to_string())?;

        Ok(Self {
            coordinator_url,
            save_path,
            username,
            category,
            poll_interval: parse_millis(ENV_POLL_MS, &poll_ms)?,
            request_timeout: parse_millis(ENV_TIMEOUT_MS, &timeout_ms)?,
        })
    }
}

fn parse_millis(key: &'static str, value: &str) -> Result<Duration, ConfigError> {
    match value.parse::<u64>() {
        Ok(ms) if ms > 0 => Ok(Duration::from_millis(ms)),
        _ => Err(ConfigError::InvalidMillis {
            key,
            value: value.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn config_from(vars: &[(&'static str, &str)]) -> Result<ClientConfig, ConfigError> {
        let vars: HashMap<&str, String> = vars.iter().map(|(k, v)| (*k, v.to_string())).collect();
        ClientConfig::from_env_with(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(
            config,
            ClientConfig {
                coordinator_url: "http://127.0.0.1:8787".to_string(),
                save_path: PathBuf::from("hexrace-save.json"),
                username: "explorer".to_string(),
                category: "default".to_string(),
                poll_interval: Duration::from_secs(2),
                request_timeout: Duration::from_secs(5),
            }
        );
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            (ENV_COORDINATOR_URL, "https://race.example.org/api/"),
            (ENV_USERNAME, " mapmaker "),
            (ENV_POLL_MS, "750"),
        ])
        .unwrap();
        assert_eq!(config.coordinator_url, "https://race.example.org/api");
        assert_eq!(config.username, "mapmaker");
        assert_eq!(config.poll_interval, Duration::from_millis(750));
    }

    #[test]
    fn test_invalid_values() {
        assert_eq!(
            config_from(&[(ENV_TIMEOUT_MS, "soon")]),
            Err(ConfigError::InvalidMillis {
                key: ENV_TIMEOUT_MS,
                value: "soon".to_string()
            })
        );
        assert!(config_from(&[(ENV_POLL_MS, "0")]).is_err());
        assert_eq!(
            config_from(&[(ENV_CATEGORY, "  ")]),
            Err(ConfigError::Empty { key: ENV_CATEGORY })
        );
    }
}
