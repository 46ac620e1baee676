use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use toolspec::config::{Config, EnvironmentOverrides};
use toolspec::openapi::{BodyStyle, ExtractOptions, KeyOrder, MatchMode, ParameterNaming, ToolSchema};
use toolspec::startup::{init_logging, StartupLogger};
use tracing::{debug, error, info};

#[derive(Parser)]
#[command(name = env!("CARGO_PKG_NAME"))]
#[command(about = env!("CARGO_PKG_DESCRIPTION"))]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = toolspec::DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error), overrides the configuration
    #[arg(short, long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Check that a document is a valid tool schema
    Validate {
        /// OpenAPI document (JSON or YAML)
        #[arg(short, long, value_name = "FILE")]
        spec: PathBuf,
    },
    /// List the actions of a tool schema
    Actions {
        /// OpenAPI document (JSON or YAML)
        #[arg(short, long, value_name = "FILE")]
        spec: PathBuf,
    },
    /// Extract the input and output parameters of one operation
    Extract {
        /// OpenAPI document (JSON or YAML)
        #[arg(short, long, value_name = "FILE")]
        spec: PathBuf,

        /// Operation id (or summary with --match-summary)
        #[arg(short, long)]
        operation: String,

        /// Parameter naming (located, bare)
        #[arg(long)]
        naming: Option<ParameterNaming>,

        /// Body representation (flatten, wrap)
        #[arg(long)]
        body: Option<BodyStyle>,

        /// Fall back to matching the operation summary
        #[arg(long)]
        match_summary: bool,

        /// Sort paths, properties, media types and responses
        #[arg(long)]
        sorted: bool,
    },
    /// Describe every action of a tool schema
    Describe {
        /// OpenAPI document (JSON or YAML)
        #[arg(short, long, value_name = "FILE")]
        spec: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load(&cli.config).context("Failed to load configuration")?;
    if let Some(level) = &cli.log_level {
        config.logging.level = level.clone();
        config.validate()?;
    }

    init_logging(&config.logging.level, &config.logging.format)?;
    let overrides = EnvironmentOverrides::load()?;
    StartupLogger::display_startup_info(&config, &cli.config, &overrides, toolspec::VERSION);

    if let Err(e) = run(cli.command, config.extraction) {
        error!("❌ {:#}", e);
        return Err(e);
    }
    Ok(())
}

fn run(command: Command, defaults: ExtractOptions) -> Result<()> {
    match command {
        Command::Validate { spec } => {
            let schema = load_schema(&spec, defaults)?;
            info!("✅ {} is a valid tool schema", spec.display());
            print_json(&serde_json::json!({
                "valid": true,
                "title": schema.document().spec().info.title,
                "actions": schema.actions().len(),
            }))
        }
        Command::Actions { spec } => print_json(&load_schema(&spec, defaults)?.actions()),
        Command::Extract {
            spec,
            operation,
            naming,
            body,
            match_summary,
            sorted,
        } => {
            let mut options = defaults;
            if let Some(naming) = naming {
                options = options.with_naming(naming);
            }
            if let Some(body) = body {
                options = options.with_body(body);
            }
            if match_summary {
                options = options.with_matching(MatchMode::OperationIdOrSummary);
            }
            if sorted {
                options = options.with_order(KeyOrder::Lexicographic);
            }
            debug!("Extracting '{}' with {:?}", operation, options);

            let schema = load_schema(&spec, options)?;
            print_json(&schema.tool_detail(&operation)?)
        }
        Command::Describe { spec } => print_json(&load_schema(&spec, defaults)?.tool_details()?),
    }
}

fn load_schema(path: &Path, options: ExtractOptions) -> Result<ToolSchema> {
    let raw = std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    ToolSchema::from_slice(&raw, options).with_context(|| format!("Invalid tool schema {}", path.display()))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
