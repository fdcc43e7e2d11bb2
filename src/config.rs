use std::fs;

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Startup configuration. Loaded once in `main` and immutable afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub system: SystemConfig,
    pub webhook: WebhookConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_web_dir")]
    pub web_dir: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    12850
}

fn default_web_dir() -> String {
    "web".to_string()
}

/// The external automation endpoint that performs transcription and
/// scoring.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookConfig {
    pub url: String,
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)?;

        let path_lower = path.to_lowercase();
        if path_lower.ends_with(".json") {
            Ok(serde_json::from_str(&content)?)
        } else {
            Ok(serde_yaml::from_str(&content)?)
        }
    }
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            web_dir: default_web_dir(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn yaml_with_defaults() {
        let config: Config = serde_yaml::from_str(
            "webhook:\n  url: https://example.test/webhook/practice\n",
        )
        .unwrap();
        assert_eq!(config.webhook.url, "https://example.test/webhook/practice");
        assert_eq!(config.system.port, default_port());
        assert_eq!(config.system.web_dir, "web");
    }

    #[test]
    fn yaml_overrides() {
        let config: Config = serde_yaml::from_str(
            "system:\n  host: 127.0.0.1\n  port: 9000\nwebhook:\n  url: http://localhost:5678/hook\n",
        )
        .unwrap();
        assert_eq!(config.system.host, "127.0.0.1");
        assert_eq!(config.system.port, 9000);
    }

    #[test]
    fn missing_webhook_url_is_an_error() {
        assert!(serde_yaml::from_str::<Config>("system:\n  port: 9000\n").is_err());
    }
}
