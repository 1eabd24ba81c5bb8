//! Core configuration structures for the multiswap settlement engine

use serde::{Deserialize, Serialize};

/// Main application configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Logging configuration
    pub logging: LoggingConfig,

    /// Engine identity and fee settings
    pub engine: EngineConfig,

    /// Metrics server configuration
    pub metrics: MetricsConfig,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error); `RUST_LOG` takes precedence
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output
    #[serde(default)]
    pub json: bool,
}

/// Settlement engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Address under which the engine holds assets
    #[serde(default)]
    pub address: String,

    /// Sole identity allowed to run admin operations
    #[serde(default)]
    pub controller: String,

    /// Address protocol fees are paid to
    #[serde(default)]
    pub fee_recipient: String,

    /// Protocol fee in basis points, capped at 100 (1%)
    #[serde(default = "default_fee_rate_bps")]
    pub fee_rate_bps: u16,

    /// Start with settlement paused
    #[serde(default)]
    pub start_paused: bool,
}

/// Metrics configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Serve Prometheus metrics over HTTP
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Socket address for the metrics server
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
}

impl AppConfig {
    /// Ready-to-run configuration for local development
    pub fn local() -> Self {
        Self {
            engine: EngineConfig {
                address: "multiswap-engine".to_string(),
                controller: "multiswap-controller".to_string(),
                fee_recipient: "multiswap-treasury".to_string(),
                ..Default::default()
            },
            metrics: MetricsConfig {
                listen_addr: "127.0.0.1:9100".to_string(),
                ..Default::default()
            },
            ..Default::default()
        }
    }
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_fee_rate_bps() -> u16 {
    multiswap_types::DEFAULT_FEE_BPS
}

fn default_listen_addr() -> String {
    "0.0.0.0:9100".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            address: String::new(),
            controller: String::new(),
            fee_recipient: String::new(),
            fee_rate_bps: default_fee_rate_bps(),
            start_paused: false,
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            listen_addr: default_listen_addr(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.logging.level, "info");
        assert!(!config.logging.json);
        assert_eq!(config.engine.fee_rate_bps, 10);
        assert!(!config.engine.start_paused);
        assert!(config.metrics.enabled);
        assert_eq!(config.metrics.listen_addr, "0.0.0.0:9100");
    }

    #[test]
    fn test_missing_sections_take_defaults() {
        let config: AppConfig = serde_json::from_str(r#"{"engine": {"address": "e"}}"#).unwrap();
        assert_eq!(config.engine.address, "e");
        assert_eq!(config.engine.fee_rate_bps, 10);
        assert_eq!(config.logging, LoggingConfig::default());
        assert_eq!(config.metrics, MetricsConfig::default());
    }
}
