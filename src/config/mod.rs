//! Configuration module for ToolSpec
//!
//! This module provides configuration management and loading utilities.

mod config;
mod environment;

pub use config::{Config, LoggingConfig};
pub use environment::{EnvVars, EnvironmentOverrides};
