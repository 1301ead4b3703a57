//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;

use crate::config::schema::GatewayConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Load the gateway configuration.
///
/// Reads the TOML file when a path is given (defaults otherwise), applies
/// backend-URL environment overrides, then validates. Validation failure
/// here is the only fatal error class in the process.
pub fn load_config(path: Option<&Path>) -> Result<GatewayConfig, ConfigError> {
    let mut config = match path {
        Some(path) => {
            let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
            toml::from_str(&content).map_err(ConfigError::Parse)?
        }
        None => GatewayConfig::default(),
    };

    apply_env_overrides(&mut config);
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Environment variables override (or fill in) the backend base URLs, the
/// deployment convention the gateway is shipped with.
fn apply_env_overrides(config: &mut GatewayConfig) {
    let overrides = [
        ("FLIGHTS_SERVICE_URL", &mut config.backends.flights_url),
        ("TICKETS_SERVICE_URL", &mut config.backends.tickets_url),
        ("PRIVILEGES_SERVICE_URL", &mut config.backends.privileges_url),
    ];
    for (var, slot) in overrides {
        if let Ok(value) = std::env::var(var) {
            if !value.is_empty() {
                *slot = value;
            }
        }
    }
}
