//! Configuration management
//!
//! Settings come from an optional TOML file; anything not set falls back to
//! the defaults below. The bot token is taken from `token` when present,
//! otherwise from the credential file (see [`crate::credentials`]).
//!
//! ```toml
//! api_base_url = "https://slack.com/api"
//! timeout_secs = 30
//! credentials_path = "/etc/slackbot/slack.json"
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::credentials::Credentials;
use crate::error::{Error, Result};

/// Messenger configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlackbotConfig {
    /// Slack Web API base URL
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// HTTP request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Credential file override (defaults to `<home>/Credentials/slack.json`)
    #[serde(default)]
    pub credentials_path: Option<PathBuf>,

    /// Explicit bot token; bypasses the credential file
    #[serde(default, skip_serializing)]
    pub token: Option<String>,
}

impl Default for SlackbotConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            timeout_secs: default_timeout_secs(),
            credentials_path: None,
            token: None,
        }
    }
}

fn default_api_base_url() -> String {
    "https://slack.com/api".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl SlackbotConfig {
    /// Configuration with an explicit token and default everything else
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
            ..Self::default()
        }
    }

    /// Load configuration from a TOML file
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: SlackbotConfig =
            toml::from_str(content).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings no client can work with
    pub fn validate(&self) -> Result<()> {
        if self.api_base_url.trim().is_empty() {
            return Err(Error::Config("api_base_url must not be empty".to_string()));
        }
        if self.timeout_secs == 0 {
            return Err(Error::Config("timeout_secs must be positive".to_string()));
        }
        Ok(())
    }

    /// Bot token: the explicit one if set, else read from the credential file
    pub fn resolve_token(&self) -> Result<String> {
        if let Some(token) = self.token.as_deref().filter(|t| !t.trim().is_empty()) {
            return Ok(token.to_string());
        }

        let credentials = match &self.credentials_path {
            Some(path) => Credentials::load(path)?,
            None => Credentials::load_default()?,
        };
        Ok(credentials.token)
    }

    /// API base URL without a trailing slash
    pub fn base_url(&self) -> &str {
        self.api_base_url.trim_end_matches('/')
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_config_default() {
        let config = SlackbotConfig::default();
        assert_eq!(config.api_base_url, "https://slack.com/api");
        assert_eq!(config.timeout_secs, 30);
        assert!(config.credentials_path.is_none());
        assert!(config.token.is_none());
    }

    #[test]
    fn test_toml_config_parsing() {
        let toml_content = r#"
api_base_url = "http://localhost:8080/api/"
timeout_secs = 5
credentials_path = "/tmp/slack.json"
"#;

        let config = SlackbotConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.base_url(), "http://localhost:8080/api");
        assert_eq!(config.timeout_secs, 5);
        assert_eq!(config.credentials_path, Some(PathBuf::from("/tmp/slack.json")));
    }

    #[test]
    fn test_toml_partial_uses_defaults() {
        let config = SlackbotConfig::from_toml_str("timeout_secs = 10").unwrap();
        assert_eq!(config.api_base_url, "https://slack.com/api");
        assert_eq!(config.timeout_secs, 10);
    }

    #[test]
    fn test_toml_rejects_zero_timeout() {
        let result = SlackbotConfig::from_toml_str("timeout_secs = 0");
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_validate_struct_literal() {
        let config = SlackbotConfig {
            timeout_secs: 0,
            ..SlackbotConfig::default()
        };
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        let config = SlackbotConfig {
            api_base_url: " ".to_string(),
            ..SlackbotConfig::default()
        };
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        assert!(SlackbotConfig::default().validate().is_ok());
    }

    #[test]
    fn test_from_toml_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "api_base_url = \"http://127.0.0.1:9/api\"").unwrap();

        let config = SlackbotConfig::from_toml_file(file.path()).unwrap();
        assert_eq!(config.api_base_url, "http://127.0.0.1:9/api");
    }

    #[test]
    fn test_resolve_explicit_token() {
        let config = SlackbotConfig::with_token("xoxb-explicit");
        assert_eq!(config.resolve_token().unwrap(), "xoxb-explicit");
    }

    #[test]
    fn test_resolve_token_from_credentials_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("slack.json");
        std::fs::write(&path, r#"{"token": "xoxb-from-file"}"#).unwrap();

        let config = SlackbotConfig {
            credentials_path: Some(path),
            ..SlackbotConfig::default()
        };
        assert_eq!(config.resolve_token().unwrap(), "xoxb-from-file");
    }

    #[test]
    fn test_resolve_token_missing_credentials() {
        let dir = tempfile::tempdir().unwrap();
        let config = SlackbotConfig {
            credentials_path: Some(dir.path().join("absent.json")),
            ..SlackbotConfig::default()
        };
        assert!(matches!(config.resolve_token(), Err(Error::CredentialLoad(_))));
    }

    #[test]
    fn test_token_not_serialized() {
        let config = SlackbotConfig::with_token("xoxb-secret");
        let rendered = toml::to_string(&config).unwrap();
        assert!(!rendered.contains("xoxb-secret"));
    }
}
