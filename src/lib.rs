//! ToolSpec - OpenAPI introspection for agent and workflow tools
//!
//! This crate turns the operations of an OpenAPI 3.x document into typed
//! parameter trees describing what a tool call takes and what it returns.
//! Documents are validated as tool schemas first: they must declare servers and
//! give every operation an id.

pub mod config;
pub mod error;
pub mod openapi;
pub mod startup;

pub use config::{Config, LoggingConfig};
pub use error::{Result, SchemaViolation, ToolSpecError};
pub use openapi::{
    extract_io, validate, validate_schema, ActionInfo, BodyStyle, ExtractOptions, KeyOrder, MatchMode,
    OperationIo, ParameterNaming, ParameterNode, SchemaDocument, ToolDetail, ToolSchema,
};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default configuration file name
pub const DEFAULT_CONFIG_FILE: &str = "toolspec.yaml";
