//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root configuration for the gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Callback correlation settings.
    pub correlation: CorrelationConfig,

    /// Downstream service receiving forwarded requests.
    pub downstream: DownstreamConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    #[serde(default)]
    pub admin: AdminConfig,

    #[serde(default)]
    pub security: SecurityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:80").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:80".to_string(),
        }
    }
}

/// Correlation settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CorrelationConfig {
    /// Seconds to wait for a callback before answering 504.
    pub timeout_secs: u64,
}

impl CorrelationConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for CorrelationConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 5 * 60,
        }
    }
}

/// Downstream service configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DownstreamConfig {
    /// API base URL.
    pub base_url: String,

    /// Path appended to `base_url` for forwarded messages.
    pub messages_path: String,

    /// Timeout for the forward call itself, in seconds.
    pub request_timeout_secs: u64,
}

impl DownstreamConfig {
    /// Full URL forwarded requests are posted to.
    pub fn endpoint(&self) -> Result<url::Url, url::ParseError> {
        let base = self.base_url.trim_end_matches('/');
        let path = self.messages_path.trim_start_matches('/');
        format!("{}/{}", base, path).parse()
    }
}

impl Default for DownstreamConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.maiagent.ai/api/v1".to_string(),
            messages_path: "/messages/".to_string(),
            request_timeout_secs: 30,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Admin API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Enable admin API.
    pub enabled: bool,

    /// API key for authentication (Bearer token).
    pub api_key: String,

    /// Admin API bind address.
    pub bind_address: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            api_key: String::new(),
            bind_address: "127.0.0.1:8081".to_string(),
        }
    }
}

/// Request hardening configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Maximum body size in bytes, for submits and callbacks.
    pub max_body_size: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_body_size: 2 * 1024 * 1024, // 2MB
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GatewayConfig::default();
        assert_eq!(config.correlation.timeout(), Duration::from_secs(300));
        assert_eq!(
            config.downstream.endpoint().unwrap().as_str(),
            "https://api.maiagent.ai/api/v1/messages/"
        );
        assert!(!config.admin.enabled);
    }

    #[test]
    fn test_partial_toml() {
        let config: GatewayConfig = toml::from_str(
            r#"
            [correlation]
            timeout_secs = 12

            [downstream]
            base_url = "http://127.0.0.1:9000/api/"

            [observability]
            log_format = "json"
            "#,
        )
        .unwrap();

        assert_eq!(config.correlation.timeout_secs, 12);
        assert_eq!(config.observability.log_format, LogFormat::Json);
        assert_eq!(config.listener.bind_address, "0.0.0.0:80");
        assert_eq!(
            config.downstream.endpoint().unwrap().as_str(),
            "http://127.0.0.1:9000/api/messages/"
        );
    }
}
