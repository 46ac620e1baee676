//! Environment variable integration for ToolSpec configuration

use crate::config::Config;
use crate::error::{Result, ToolSpecError};
use crate::openapi::{BodyStyle, KeyOrder, MatchMode, ParameterNaming};
use std::env;
use std::fmt::Display;
use std::str::FromStr;
use tracing::{debug, warn};

/// Environment variable names used by ToolSpec
pub struct EnvVars;

impl EnvVars {
    pub const ENVIRONMENT: &'static str = "TOOLSPEC_ENV";
    pub const PARAMETER_NAMING: &'static str = "TOOLSPEC_PARAMETER_NAMING";
    pub const BODY_STYLE: &'static str = "TOOLSPEC_BODY_STYLE";
    pub const MATCH_MODE: &'static str = "TOOLSPEC_MATCH_MODE";
    pub const KEY_ORDER: &'static str = "TOOLSPEC_KEY_ORDER";
    pub const LOG_LEVEL: &'static str = "TOOLSPEC_LOG_LEVEL";
    pub const LOG_FORMAT: &'static str = "TOOLSPEC_LOG_FORMAT";
}

/// Environment configuration overrides
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvironmentOverrides {
    pub parameter_naming: Option<ParameterNaming>,
    pub body_style: Option<BodyStyle>,
    pub match_mode: Option<MatchMode>,
    pub key_order: Option<KeyOrder>,
    pub log_level: Option<String>,
    pub log_format: Option<String>,
}

impl EnvironmentOverrides {
    /// Load overrides from the process environment
    pub fn load() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load overrides from an arbitrary variable lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let value = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let overrides = EnvironmentOverrides {
            parameter_naming: parse_var(EnvVars::PARAMETER_NAMING, value(EnvVars::PARAMETER_NAMING))?,
            body_style: parse_var(EnvVars::BODY_STYLE, value(EnvVars::BODY_STYLE))?,
            match_mode: parse_var(EnvVars::MATCH_MODE, value(EnvVars::MATCH_MODE))?,
            key_order: parse_var(EnvVars::KEY_ORDER, value(EnvVars::KEY_ORDER))?,
            log_level: value(EnvVars::LOG_LEVEL),
            log_format: value(EnvVars::LOG_FORMAT),
        };

        if let Some(level) = &overrides.log_level {
            debug!("Environment override: {}={}", EnvVars::LOG_LEVEL, level);
        }
        if let Some(format) = &overrides.log_format {
            debug!("Environment override: {}={}", EnvVars::LOG_FORMAT, format);
        }
        Ok(overrides)
    }

    /// Apply these overrides on top of a loaded configuration
    pub fn apply(self, config: &mut Config) {
        if let Some(naming) = self.parameter_naming {
            config.extraction.naming = naming;
        }
        if let Some(body) = self.body_style {
            config.extraction.body = body;
        }
        if let Some(matching) = self.match_mode {
            config.extraction.matching = matching;
        }
        if let Some(order) = self.key_order {
            config.extraction.order = order;
        }
        if let Some(level) = self.log_level {
            config.logging.level = level;
        }
        if let Some(format) = self.log_format {
            config.logging.format = format;
        }
    }
}

fn parse_var<T>(name: &str, raw: Option<String>) -> Result<Option<T>>
where
    T: FromStr<Err = ToolSpecError> + Display,
{
    let Some(raw) = raw else {
        return Ok(None);
    };

    match raw.parse::<T>() {
        Ok(value) => {
            debug!("Environment override: {}={}", name, value);
            Ok(Some(value))
        }
        Err(e) => {
            warn!("Invalid {}: {} ({})", name, raw, e);
            Err(ToolSpecError::config(format!("Invalid {}: {}", name, raw)))
        }
    }
}
