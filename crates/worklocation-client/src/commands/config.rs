//! Configuration commands.

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::secret;

/// Dump the effective configuration to stdout.
pub fn dump(config: &ClientConfig) -> ClientResult<()> {
    let toml_str = toml::to_string_pretty(config)
        .map_err(|e| ClientError::Config(format!("failed to serialize config: {}", e)))?;
    println!("# config.toml ({})", ClientConfig::default_path().display());
    println!("{}", toml_str);
    Ok(())
}

/// Validate the configuration and that a credential can be located.
pub fn validate(config: &ClientConfig) -> ClientResult<()> {
    config
        .calendar
        .validate()
        .map_err(|e| ClientError::Config(e.to_string()))?;

    match config.auth.access_token.as_deref() {
        Some(value) => {
            let token = secret::resolve(value)
                .map_err(|e| ClientError::Config(format!("invalid access_token: {}", e)))?;
            if token.trim().is_empty() {
                return Err(ClientError::Config("access_token is empty".to_string()));
            }
            if secret::is_reference(value) {
                println!("access_token reference resolves.");
            }
        }
        None => {
            let path = config.auth.token_path();
            if !path.exists() {
                return Err(ClientError::AuthRequired(format!(
                    "token file not found: {}",
                    path.display()
                )));
            }
            println!("token file: {}", path.display());
        }
    }

    println!("Configuration is valid.");
    Ok(())
}

/// Show the configuration file path.
pub fn path() -> ClientResult<()> {
    println!("config: {}", ClientConfig::default_path().display());
    Ok(())
}
