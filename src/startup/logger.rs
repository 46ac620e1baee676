//! Logging setup and startup information

use crate::config::{Config, EnvironmentOverrides};
use crate::error::{Result, ToolSpecError};
use std::path::Path;
use tracing::info;

/// Install the global tracing subscriber
///
/// `RUST_LOG` takes precedence over the configured level. Logs go to stderr so
/// command output on stdout stays machine-readable.
pub fn init_logging(level: &str, format: &str) -> Result<()> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let registry = tracing_subscriber::registry().with(env_filter);

    let installed = if format.eq_ignore_ascii_case("json") {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .try_init()
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_file(true)
                    .with_line_number(true)
                    .with_writer(std::io::stderr),
            )
            .try_init()
    };

    installed.map_err(|e| ToolSpecError::config(format!("Failed to initialize logging: {}", e)))
}

/// Startup logger for the resolved configuration
pub struct StartupLogger;

impl StartupLogger {
    /// Display the resolved configuration
    pub fn display_startup_info(config: &Config, config_path: &Path, overrides: &EnvironmentOverrides, version: &str) {
        info!("🚀 ToolSpec v{} starting...", version);

        info!("📁 Configuration Resolution:");
        if config_path.exists() {
            info!("   Config file: {:?} ✅", config_path);
        } else {
            info!("   Config file: built-in defaults (no config file found)");
        }

        let summary = Self::override_summary(overrides);
        if !summary.is_empty() {
            info!("🔧 Environment Overrides:");
            for line in summary {
                info!("   ✅ {}", line);
            }
        }

        let extraction = &config.extraction;
        info!("🎯 Extraction:");
        info!("   Parameter naming: {}", extraction.naming);
        info!("   Body style: {}", extraction.body);
        info!("   Match mode: {}", extraction.matching);
        info!("   Key order: {}", extraction.order);
        info!("   Logging: {} ({})", config.logging.level, config.logging.format);
    }

    fn override_summary(overrides: &EnvironmentOverrides) -> Vec<String> {
        let mut summary = Vec::new();
        if let Some(naming) = overrides.parameter_naming {
            summary.push(format!("TOOLSPEC_PARAMETER_NAMING={}", naming));
        }
        if let Some(body) = overrides.body_style {
            summary.push(format!("TOOLSPEC_BODY_STYLE={}", body));
        }
        if let Some(matching) = overrides.match_mode {
            summary.push(format!("TOOLSPEC_MATCH_MODE={}", matching));
        }
        if let Some(order) = overrides.key_order {
            summary.push(format!("TOOLSPEC_KEY_ORDER={}", order));
        }
        if let Some(level) = &overrides.log_level {
            summary.push(format!("TOOLSPEC_LOG_LEVEL={}", level));
        }
        if let Some(format) = &overrides.log_format {
            summary.push(format!("TOOLSPEC_LOG_FORMAT={}", format));
        }
        summary
    }
}
