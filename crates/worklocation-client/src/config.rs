//! Client configuration.
//!
//! All settings live in `config.toml`, by default at
//! `~/.config/worklocation/config.toml`:
//!
//! ```toml
//! debug = false
//! timeout_secs = 30
//!
//! [calendar]
//! calendar_id = "primary"
//! update_interval_minutes = 5
//! none_outside_hours = false
//!
//! [auth]
//! access_token = "env::WORKLOCATION_TOKEN"
//! # or: token_path = "/path/to/token.json"
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use worklocation_core::WorkingLocationOptions;
use worklocation_providers::{CredentialProvider, StaticToken, TokenFile};

use crate::cli::Cli;
use crate::secret;

/// Configuration for the worklocation client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Debug mode.
    pub debug: bool,

    /// Timeout for one poll, in seconds.
    pub timeout_secs: u64,

    /// Calendar source options.
    pub calendar: WorkingLocationOptions,

    /// Credential settings.
    pub auth: AuthSettings,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            debug: false,
            timeout_secs: Self::DEFAULT_TIMEOUT_SECS,
            calendar: WorkingLocationOptions::default(),
            auth: AuthSettings::default(),
        }
    }
}

/// Where the bearer token comes from.
///
/// `access_token` wins over `token_path` when both are set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthSettings {
    /// Bearer token (supports `pass::` and `env::` prefixes).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,

    /// JSON token file with `access_token` and optional `expires_at`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_path: Option<PathBuf>,
}

impl AuthSettings {
    /// Returns the token file path, falling back to the data directory.
    pub fn token_path(&self) -> PathBuf {
        self.token_path
            .clone()
            .unwrap_or_else(|| ClientConfig::default_data_dir().join("token.json"))
    }

    /// Builds the credential provider for these settings.
    pub fn credential_provider(&self) -> Result<Arc<dyn CredentialProvider>, String> {
        match self.access_token.as_deref() {
            Some(value) => {
                let token = secret::resolve(value)?;
                Ok(Arc::new(StaticToken::new(token)))
            }
            None => Ok(Arc::new(TokenFile::new(self.token_path()))),
        }
    }
}

impl ClientConfig {
    /// Default poll timeout in seconds.
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

    /// Loads configuration from the default path, or defaults if absent.
    pub fn load() -> Result<Self, String> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Loads configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("failed to read config {}: {}", path.display(), e))?;
        Self::parse(&content)
    }

    /// Parses TOML content.
    pub fn parse(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| format!("failed to parse config: {}", e))
    }

    /// Applies command-line overrides.
    pub fn apply_cli(&mut self, cli: &Cli) {
        if cli.debug {
            self.debug = true;
        }
        if let Some(ref calendar_id) = cli.calendar_id {
            self.calendar.calendar_id = calendar_id.clone();
        }
        if cli.none_outside_hours {
            self.calendar.none_outside_hours = true;
        }
        if let Some(timeout) = cli.timeout {
            self.timeout_secs = timeout;
        }
    }

    /// Returns the poll timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }

    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        Self::default_config_dir().join("config.toml")
    }

    /// Returns the default configuration directory.
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("worklocation")
    }

    /// Returns the default data directory path.
    pub fn default_data_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("worklocation")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn empty_file_is_default() {
        let config = ClientConfig::parse("").unwrap();
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.calendar.calendar_id, "primary");
        assert_eq!(config.calendar.update_interval_minutes, 5);
        assert!(!config.calendar.none_outside_hours);
        assert_eq!(config.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn full_config() {
        let config = ClientConfig::parse(
            r#"
            debug = true
            timeout_secs = 10

            [calendar]
            calendar_id = "team@group.calendar.google.com"
            update_interval_minutes = 15
            none_outside_hours = true

            [auth]
            token_path = "/tmp/token.json"
            "#,
        )
        .unwrap();

        assert!(config.debug);
        assert_eq!(config.timeout_secs, 10);
        assert_eq!(config.calendar.calendar_id, "team@group.calendar.google.com");
        assert_eq!(config.calendar.update_interval_minutes, 15);
        assert!(config.calendar.none_outside_hours);
        assert_eq!(config.auth.token_path(), PathBuf::from("/tmp/token.json"));
    }

    #[test]
    fn historical_option_names_are_accepted() {
        let config = ClientConfig::parse(
            r#"
            [calendar]
            update_interval = 2
            consider_none_outside_hours = true
            "#,
        )
        .unwrap();

        assert_eq!(config.calendar.update_interval_minutes, 2);
        assert!(config.calendar.none_outside_hours);
    }

    #[test]
    fn invalid_toml_errors() {
        let err = ClientConfig::parse("[calendar\n").unwrap_err();
        assert!(err.contains("failed to parse config"));
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[calendar]\ncalendar_id = \"work\"\n").unwrap();

        let config = ClientConfig::load_from(&path).unwrap();
        assert_eq!(config.calendar.calendar_id, "work");

        let missing = dir.path().join("missing.toml");
        assert!(ClientConfig::load_from(&missing).is_err());
    }

    #[test]
    fn default_token_path_is_in_data_dir() {
        let auth = AuthSettings::default();
        assert!(auth.token_path().ends_with("worklocation/token.json"));
    }

    #[test]
    fn access_token_reference_is_resolved() {
        unsafe {
            std::env::set_var("_WORKLOCATION_CONFIG_TEST_TOKEN", "tok");
        }
        let auth = AuthSettings {
            access_token: Some("env::_WORKLOCATION_CONFIG_TEST_TOKEN".into()),
            token_path: None,
        };
        assert!(auth.credential_provider().is_ok());
        unsafe {
            std::env::remove_var("_WORKLOCATION_CONFIG_TEST_TOKEN");
        }

        let auth = AuthSettings {
            access_token: Some("env::_WORKLOCATION_CONFIG_MISSING_TOKEN".into()),
            token_path: None,
        };
        assert!(auth.credential_provider().is_err());
    }

    #[test]
    fn cli_overrides_config() {
        let cli = Cli::parse_from([
            "worklocation",
            "--calendar-id",
            "other",
            "--none-outside-hours",
            "--debug",
            "--timeout",
            "5",
        ]);
        let mut config = ClientConfig::default();
        config.apply_cli(&cli);

        assert!(config.debug);
        assert_eq!(config.calendar.calendar_id, "other");
        assert!(config.calendar.none_outside_hours);
        assert_eq!(config.timeout_secs, 5);
    }

    #[test]
    fn dump_round_trips_through_toml() {
        let config = ClientConfig {
            auth: AuthSettings {
                access_token: Some("env::TOKEN".into()),
                token_path: None,
            },
            ..Default::default()
        };
        let text = toml::to_string_pretty(&config).unwrap();
        assert!(!text.contains("token_path"));
        assert_eq!(ClientConfig::parse(&text).unwrap(), config);
    }
}
