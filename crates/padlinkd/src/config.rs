use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use url::Url;

use padlink_service::ServiceConfig;
use padlink_session::DEFAULT_POLL_INTERVAL;

const DEFAULT_NAMESPACE: &str = "xbox";
const DEFAULT_TIMEOUT_MS: u64 = 5_000;
const DEFAULT_RECONNECT_SECS: u64 = 5;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("yaml deserialize error: {0}")]
    YamlDeserializeError(#[from] serde_yaml::Error),
    #[error("unsupported version: {0}")]
    UnsupportedVersion(u8),
    #[error("invalid server url {0}: {1}")]
    InvalidUrl(String, String),
    #[error("{0} must be greater than zero")]
    NotPositive(&'static str),

    #[error("environment variable not set: {0}")]
    EnvVarNotSet(String),
    #[error("config not found: {0}")]
    ConfigNotFound(String),
    #[error("path is not a directory: {0}")]
    PathIsNotDirectory(String),
    #[error("path error: {0}")]
    PathError(#[from] std::io::Error),
}

/// Resolved daemon configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub service: ServiceConfig,
    pub poll_interval: Duration,
    /// Reconnect delay of the push listener, `None` when push is disabled.
    pub push_reconnect: Option<Duration>,
}

/// Parse yaml config.
pub fn parse_config(input: &str) -> Result<Config, ConfigError> {
    let version = parse_version(input)?;
    match version {
        1 => {
            let config: ConfigV1 = serde_yaml::from_str(input)?;
            config.into_config()
        }
        _ => Err(ConfigError::UnsupportedVersion(version)),
    }
}

#[derive(Debug, Clone, Deserialize)]
struct VersionedConfig {
    version: u8,
}

fn parse_version(input: &str) -> Result<u8, ConfigError> {
    let raw: VersionedConfig = serde_yaml::from_str(input)?;
    Ok(raw.version)
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigV1 {
    #[allow(dead_code)]
    version: u8,
    server: ServerV1,
    #[serde(default)]
    session: SessionV1,
    #[serde(default)]
    push: PushV1,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ServerV1 {
    url: String,
    #[serde(default)]
    api_key: Option<String>,
    #[serde(default = "default_timeout_ms")]
    timeout_ms: u64,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields, default)]
struct SessionV1 {
    namespace: String,
    poll_interval_secs: u64,
}

impl Default for SessionV1 {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            poll_interval_secs: DEFAULT_POLL_INTERVAL.as_secs(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields, default)]
struct PushV1 {
    enabled: bool,
    reconnect_secs: u64,
}

impl Default for PushV1 {
    fn default() -> Self {
        Self {
            enabled: true,
            reconnect_secs: DEFAULT_RECONNECT_SECS,
        }
    }
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

fn positive(value: u64, field: &'static str) -> Result<u64, ConfigError> {
    if value == 0 {
        return Err(ConfigError::NotPositive(field));
    }
    Ok(value)
}

impl ConfigV1 {
    fn into_config(self) -> Result<Config, ConfigError> {
        let base_url = Url::parse(&self.server.url)
            .map_err(|err| ConfigError::InvalidUrl(self.server.url.clone(), err.to_string()))?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidUrl(
                self.server.url,
                "expected an http or https url".to_string(),
            ));
        }
        let timeout = positive(self.server.timeout_ms, "server.timeout_ms")?;
        let poll = positive(self.session.poll_interval_secs, "session.poll_interval_secs")?;
        let push_reconnect = if self.push.enabled {
            let secs = positive(self.push.reconnect_secs, "push.reconnect_secs")?;
            Some(Duration::from_secs(secs))
        } else {
            None
        };
        let api_key = self.server.api_key.filter(|key| !key.is_empty());

        Ok(Config {
            service: ServiceConfig {
                base_url,
                api_key,
                namespace: self.session.namespace,
                timeout: Duration::from_millis(timeout),
            },
            poll_interval: Duration::from_secs(poll),
            push_reconnect,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_config_uses_defaults() {
        let yaml = r#"
version: 1
server:
  url: http://octopi.local
"#;
        let config = parse_config(yaml).unwrap();
        assert_eq!(config.service.namespace, "xbox");
        assert_eq!(config.service.api_key, None);
        assert_eq!(config.service.timeout, Duration::from_millis(5_000));
        assert_eq!(config.poll_interval, Duration::from_secs(30));
        assert_eq!(config.push_reconnect, Some(Duration::from_secs(5)));
    }

    #[test]
    fn full_config() {
        let yaml = r#"
version: 1
server:
  url: https://printer.example.org/octoprint
  api_key: SECRET
  timeout_ms: 1500
session:
  namespace: gamepad
  poll_interval_secs: 10
push:
  enabled: false
"#;
        let config = parse_config(yaml).unwrap();
        assert_eq!(config.service.api_key.as_deref(), Some("SECRET"));
        assert_eq!(config.service.namespace, "gamepad");
        assert_eq!(config.service.timeout, Duration::from_millis(1500));
        assert_eq!(config.poll_interval, Duration::from_secs(10));
        assert_eq!(config.push_reconnect, None);
    }

    #[test]
    fn empty_api_key_is_ignored() {
        let yaml = "version: 1\nserver:\n  url: http://octopi.local\n  api_key: \"\"\n";
        assert_eq!(parse_config(yaml).unwrap().service.api_key, None);
    }

    #[test]
    fn version_is_required() {
        let yaml = "server:\n  url: http://octopi.local\n";
        assert!(matches!(
            parse_config(yaml),
            Err(ConfigError::YamlDeserializeError(_))
        ));
    }

    #[test]
    fn unsupported_version() {
        let yaml = "version: 2\nserver:\n  url: http://octopi.local\n";
        assert!(matches!(
            parse_config(yaml),
            Err(ConfigError::UnsupportedVersion(2))
        ));
    }

    #[test]
    fn zero_poll_interval_is_rejected() {
        let yaml = r#"
version: 1
server:
  url: http://octopi.local
session:
  poll_interval_secs: 0
"#;
        assert!(matches!(
            parse_config(yaml),
            Err(ConfigError::NotPositive("session.poll_interval_secs"))
        ));
    }

    #[test]
    fn non_http_url_is_rejected() {
        let yaml = "version: 1\nserver:\n  url: ftp://octopi.local\n";
        assert!(matches!(
            parse_config(yaml),
            Err(ConfigError::InvalidUrl(_, _))
        ));
        let yaml = "version: 1\nserver:\n  url: not a url\n";
        assert!(matches!(
            parse_config(yaml),
            Err(ConfigError::InvalidUrl(_, _))
        ));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let yaml = "version: 1\nserver:\n  url: http://octopi.local\n  port: 80\n";
        assert!(matches!(
            parse_config(yaml),
            Err(ConfigError::YamlDeserializeError(_))
        ));
    }
}
