//! Configuration validation

use crate::{AppConfig, ConfigError, Result};
use multiswap_types::MAX_FEE_BPS;
use std::net::SocketAddr;

/// Validation error details
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate the entire application configuration
pub fn validate_config(config: &AppConfig) -> Result<()> {
    let mut errors = Vec::new();

    // Validate logging config
    if let Err(e) = validate_log_level(&config.logging.level) {
        errors.push(e);
    }

    // Validate engine config
    for (field, value) in [
        ("engine.address", &config.engine.address),
        ("engine.controller", &config.engine.controller),
        ("engine.fee_recipient", &config.engine.fee_recipient),
    ] {
        if value.trim().is_empty() {
            errors.push(ValidationError::new(field, "address is required"));
        }
    }

    if config.engine.fee_rate_bps > MAX_FEE_BPS {
        errors.push(ValidationError::new(
            "engine.fee_rate_bps",
            format!("must be <= {MAX_FEE_BPS} (1%)"),
        ));
    }

    // Validate metrics config
    if config.metrics.enabled {
        if let Err(e) = validate_listen_addr(&config.metrics.listen_addr) {
            errors.push(ValidationError::new("metrics.listen_addr", e));
        }
    }

    // Return all errors if any were found
    if !errors.is_empty() {
        let error_msg = errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ");
        return Err(ConfigError::ValidationError(error_msg));
    }

    Ok(())
}

/// Validate a socket address such as `0.0.0.0:9100`
pub fn validate_listen_addr(addr: &str) -> std::result::Result<SocketAddr, String> {
    if addr.is_empty() {
        return Err("listen address cannot be empty".to_string());
    }
    addr.parse::<SocketAddr>()
        .map_err(|e| format!("invalid listen address '{addr}': {e}"))
}

/// Validate log level
fn validate_log_level(level: &str) -> std::result::Result<(), ValidationError> {
    match level.to_lowercase().as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ValidationError::new(
            "logging.level",
            format!(
                "invalid log level '{level}', must be one of: trace, debug, info, warn, error"
            ),
        )),
    }
}
