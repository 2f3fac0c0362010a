//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use crate::config::schema::GatewayConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable overriding `correlation.timeout_secs`.
pub const TIMEOUT_ENV: &str = "GATEWAY_TIMEOUT_SECS";

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Env { var: &'static str, value: String },
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Env { var, value } => write!(f, "Invalid value for {}: '{}'", var, value),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 { write!(f, ", ")?; }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<GatewayConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    parse_config(&content)
}

/// Parse, apply environment overrides, and validate.
pub fn parse_config(content: &str) -> Result<GatewayConfig, ConfigError> {
    let config: GatewayConfig = toml::from_str(content).map_err(ConfigError::Parse)?;
    finalize(config)
}

/// Apply environment overrides to `config` and validate the result.
pub fn finalize(config: GatewayConfig) -> Result<GatewayConfig, ConfigError> {
    let config = apply_overrides(config, |var| std::env::var(var).ok())?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

fn apply_overrides<F>(mut config: GatewayConfig, lookup: F) -> Result<GatewayConfig, ConfigError>
where
    F: Fn(&'static str) -> Option<String>,
{
    if let Some(value) = lookup(TIMEOUT_ENV) {
        config.correlation.timeout_secs = value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Env { var: TIMEOUT_ENV, value })?;
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_override() {
        let config = apply_overrides(GatewayConfig::default(), |var| {
            (var == TIMEOUT_ENV).then(|| "45".to_string())
        })
        .unwrap();
        assert_eq!(config.correlation.timeout_secs, 45);
    }

    #[test]
    fn test_bad_override_rejected() {
        let err = apply_overrides(GatewayConfig::default(), |_| Some("soon".to_string())).unwrap_err();
        assert!(matches!(err, ConfigError::Env { var: TIMEOUT_ENV, .. }));
    }

    #[test]
    fn test_invalid_values_report_validation() {
        let err = parse_config("[correlation]\ntimeout_secs = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().starts_with("Validation failed: "));
    }

    #[test]
    fn test_syntax_error_reported() {
        let err = parse_config("[correlation\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_config(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
