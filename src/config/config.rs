//! Configuration for ToolSpec

use crate::config::environment::{EnvVars, EnvironmentOverrides};
use crate::error::{Result, ToolSpecError};
use crate::openapi::ExtractOptions;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// How operations are turned into parameter trees
    #[serde(default)]
    pub extraction: ExtractOptions,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (json, text)
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl LoggingConfig {
    /// Validate logging configuration
    pub fn validate(&self) -> Result<()> {
        match self.level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(ToolSpecError::config(format!(
                    "Invalid log level: '{}'. Valid levels: trace, debug, info, warn, error",
                    self.level
                )))
            }
        }

        match self.format.to_lowercase().as_str() {
            "json" | "text" => {}
            _ => {
                return Err(ToolSpecError::config(format!(
                    "Invalid log format: '{}'. Valid formats: json, text",
                    self.format
                )))
            }
        }

        Ok(())
    }
}

impl Config {
    /// Load .env files in order of precedence
    fn load_env_files() {
        let env = std::env::var(EnvVars::ENVIRONMENT).unwrap_or_else(|_| "development".to_string());

        // each file overrides the previous
        let env_specific_file = format!(".env.{}", env);
        let env_files = [".env", env_specific_file.as_str(), ".env.local"];

        for env_file in env_files {
            match dotenvy::from_filename(env_file) {
                Ok(_) => {
                    tracing::info!("Loaded environment variables from {}", env_file);
                }
                Err(e) if e.not_found() => {
                    tracing::debug!("No {} file found, skipping", env_file);
                }
                Err(e) => {
                    tracing::warn!("Failed to load {}: {}", env_file, e);
                }
            }
        }

        tracing::debug!("Environment: {}", env);
    }

    /// Load configuration from file with environment variable overrides
    ///
    /// Precedence: defaults < file < environment.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::load_env_files();

        let mut config = Self::from_file(path)?;
        EnvironmentOverrides::load()?.apply(&mut config);

        config.validate()?;
        Ok(config)
    }

    /// Read a YAML configuration file, falling back to defaults if it does not exist
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::debug!("Config file {} not found, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;

        // an empty file is a valid, all-default configuration
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        Ok(serde_yaml::from_str(&content)?)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.logging.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::openapi::{BodyStyle, ParameterNaming};

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.extraction, ExtractOptions::default());
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, "text");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_partial_yaml() {
        let config: Config = serde_yaml::from_str("extraction:\n  body: wrap\n  naming: bare\n").unwrap();
        assert_eq!(config.extraction.body, BodyStyle::Wrap);
        assert_eq!(config.extraction.naming, ParameterNaming::Bare);
        assert_eq!(config.logging, LoggingConfig::default());
    }

    #[test]
    fn test_invalid_logging() {
        let mut config = Config::default();
        config.logging.level = "verbose".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.logging.format = "pretty".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.logging.level = "DEBUG".to_string();
        assert!(config.validate().is_ok());
    }
}
