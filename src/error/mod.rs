//! Error handling module for ToolSpec
//!
//! This module provides the error taxonomy shared by loading, validation and extraction.

mod error;

// Re-export the main error types and utilities
pub use error::{Result, SchemaViolation, ToolSpecError};
