//! Configuration loading from multiple sources

use crate::{AppConfig, ConfigError, Result};
use config::{Config, ConfigBuilder, Environment, File, FileFormat};
use std::path::Path;
use tracing::debug;

/// Default prefix for environment overrides
pub const ENV_PREFIX: &str = "MULTISWAP";

/// Separator between nested keys in environment variable names
pub const ENV_SEPARATOR: &str = "__";

/// Configuration loader with support for multiple formats and sources
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from a file
    ///
    /// Supports TOML, YAML, and JSON formats based on file extension
    pub fn from_file(path: &Path) -> Result<AppConfig> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| ConfigError::LoadError("No file extension found".to_string()))?;

        let content = std::fs::read_to_string(path)?;
        debug!(path = %path.display(), extension, "loading config file");

        match extension {
            "toml" => Self::from_toml(&content),
            "yaml" | "yml" => Self::from_yaml(&content),
            "json" => Self::from_json(&content),
            _ => Err(ConfigError::LoadError(format!(
                "Unsupported file extension: {}",
                extension
            ))),
        }
    }

    /// Load configuration from TOML string
    pub fn from_toml(content: &str) -> Result<AppConfig> {
        toml::from_str(content).map_err(ConfigError::from)
    }

    /// Load configuration from YAML string
    pub fn from_yaml(content: &str) -> Result<AppConfig> {
        serde_yaml::from_str(content).map_err(ConfigError::from)
    }

    /// Load configuration from JSON string
    pub fn from_json(content: &str) -> Result<AppConfig> {
        serde_json::from_str(content).map_err(ConfigError::from)
    }

    /// Load configuration from environment variables
    ///
    /// Uses default prefix "MULTISWAP"
    pub fn from_env() -> Result<AppConfig> {
        Self::from_env_with_prefix(ENV_PREFIX)
    }

    /// Load configuration from environment variables with custom prefix
    ///
    /// Environment variables should be in the format: PREFIX_SECTION__KEY
    /// For example: MULTISWAP_ENGINE__FEE_RATE_BPS=5
    ///
    /// Anything not set falls back to its default.
    pub fn from_env_with_prefix(prefix: &str) -> Result<AppConfig> {
        Self::builder().add_env(prefix).build()
    }

    /// Merge two configurations, with overlay taking precedence
    ///
    /// Sections are replaced whole; string fields left empty in the
    /// overlay's engine section keep the base value.
    pub fn merge(base: AppConfig, overlay: AppConfig) -> AppConfig {
        let pick = |base: String, overlay: String| if overlay.is_empty() { base } else { overlay };

        AppConfig {
            logging: overlay.logging,
            engine: crate::EngineConfig {
                address: pick(base.engine.address, overlay.engine.address),
                controller: pick(base.engine.controller, overlay.engine.controller),
                fee_recipient: pick(base.engine.fee_recipient, overlay.engine.fee_recipient),
                fee_rate_bps: overlay.engine.fee_rate_bps,
                start_paused: overlay.engine.start_paused,
            },
            metrics: overlay.metrics,
        }
    }

    /// Load configuration from file with environment variable overrides
    ///
    /// 1. Loads base configuration from file
    /// 2. Overlays environment variables with the given prefix, key by key
    pub fn from_file_with_env(path: &Path, env_prefix: &str) -> Result<AppConfig> {
        if !path.exists() {
            return Err(ConfigError::LoadError(format!(
                "Config file not found: {}",
                path.display()
            )));
        }
        Self::builder()
            .add_file(path, true)
            .add_env(env_prefix)
            .build()
    }

    /// Build configuration using the config crate's builder pattern
    ///
    /// This allows for more complex configuration scenarios with multiple sources
    pub fn builder() -> ConfigLoaderBuilder {
        ConfigLoaderBuilder {
            builder: Config::builder(),
        }
    }
}

/// Builder for complex configuration loading scenarios
pub struct ConfigLoaderBuilder {
    builder: ConfigBuilder<config::builder::DefaultState>,
}

impl ConfigLoaderBuilder {
    /// Add a configuration file source
    pub fn add_file(mut self, path: &Path, required: bool) -> Self {
        let format = match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => FileFormat::Yaml,
            Some("json") => FileFormat::Json,
            _ => FileFormat::Toml, // Default to TOML
        };

        self.builder = self
            .builder
            .add_source(File::from(path).format(format).required(required));
        self
    }

    /// Add environment variable source with prefix
    pub fn add_env(mut self, prefix: &str) -> Self {
        self.builder = self.builder.add_source(
            Environment::with_prefix(prefix)
                .prefix_separator("_")
                .separator(ENV_SEPARATOR)
                .try_parsing(true),
        );
        self
    }

    /// Set a default value for a key such as `engine.fee_rate_bps`
    pub fn set_default(mut self, key: &str, value: &str) -> Result<Self> {
        self.builder = self.builder.set_default(key, value)?;
        Ok(self)
    }

    /// Build the final configuration
    pub fn build(self) -> Result<AppConfig> {
        let config = self.builder.build()?;
        config.try_deserialize().map_err(ConfigError::from)
    }
}
