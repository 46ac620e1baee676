//! Error types and handling for ToolSpec

use std::fmt;
use thiserror::Error;

/// Result type alias for ToolSpec operations
pub type Result<T> = std::result::Result<T, ToolSpecError>;

/// Main error type for ToolSpec
#[derive(Error, Debug)]
pub enum ToolSpecError {
    /// The raw document could not be parsed as an OpenAPI 3.x document
    #[error("Malformed document: {message}")]
    MalformedDocument { message: String },

    /// A structural precondition of a tool schema is violated
    #[error("Schema invalid: {0}")]
    SchemaInvalid(SchemaViolation),

    /// The requested operation is absent from an otherwise valid document
    #[error("Operation not found: {identifier}")]
    OperationNotFound { identifier: String },

    /// A schema refers back to itself on the current expansion path
    #[error("Cyclic schema reference: {reference}")]
    CyclicSchema { reference: String },

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing errors
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// The reason a document was rejected as a tool schema
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaViolation {
    /// No document was supplied
    NilDocument,
    /// The document declares no servers, so tools have no base URL
    ServersEmpty,
    /// An operation has no operation id
    MissingOperationId { path: String, method: String },
    /// Two operations share an operation id
    DuplicateOperationId {
        operation_id: String,
        first: String,
        second: String,
    },
    /// A local `$ref` names nothing in the document
    UnresolvedReference { reference: String },
    /// Any other structural OpenAPI violation
    Structural(String),
}

impl fmt::Display for SchemaViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaViolation::NilDocument => write!(f, "nil document"),
            SchemaViolation::ServersEmpty => write!(f, "servers empty"),
            SchemaViolation::MissingOperationId { path, method } => {
                write!(f, "operation missing id: path({}) method({})", path, method)
            }
            SchemaViolation::DuplicateOperationId { operation_id, first, second } => write!(
                f,
                "operations {} and {} have the same operation id {:?}",
                first, second, operation_id
            ),
            SchemaViolation::UnresolvedReference { reference } => {
                write!(f, "unresolved reference {}", reference)
            }
            SchemaViolation::Structural(message) => write!(f, "{}", message),
        }
    }
}

impl ToolSpecError {
    /// Create a malformed document error
    pub fn malformed<S: Into<String>>(message: S) -> Self {
        Self::MalformedDocument {
            message: message.into(),
        }
    }

    /// Create a schema validation error
    pub fn invalid(violation: SchemaViolation) -> Self {
        Self::SchemaInvalid(violation)
    }

    /// Create a structural schema validation error
    pub fn structural<S: Into<String>>(message: S) -> Self {
        Self::SchemaInvalid(SchemaViolation::Structural(message.into()))
    }

    /// Create an operation-not-found error
    pub fn operation_not_found<S: Into<String>>(identifier: S) -> Self {
        Self::OperationNotFound {
            identifier: identifier.into(),
        }
    }

    /// Create a cyclic schema error
    pub fn cyclic<S: Into<String>>(reference: S) -> Self {
        Self::CyclicSchema {
            reference: reference.into(),
        }
    }

    /// Create a configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// The schema violation carried by this error, if any
    pub fn violation(&self) -> Option<&SchemaViolation> {
        match self {
            ToolSpecError::SchemaInvalid(violation) => Some(violation),
            _ => None,
        }
    }

    /// Whether the caller can fix this error by correcting the document
    pub fn is_user_correctable(&self) -> bool {
        matches!(
            self,
            ToolSpecError::MalformedDocument { .. }
                | ToolSpecError::SchemaInvalid(_)
                | ToolSpecError::OperationNotFound { .. }
                | ToolSpecError::CyclicSchema { .. }
        )
    }

    /// Get the error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            ToolSpecError::MalformedDocument { .. } => "malformed_document",
            ToolSpecError::SchemaInvalid(_) => "schema_invalid",
            ToolSpecError::OperationNotFound { .. } => "operation_not_found",
            ToolSpecError::CyclicSchema { .. } => "cyclic_schema",
            ToolSpecError::Config { .. } => "config",
            ToolSpecError::Io(_) => "io",
            ToolSpecError::Yaml(_) => "yaml",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_violation_messages() {
        assert_eq!(SchemaViolation::NilDocument.to_string(), "nil document");
        assert_eq!(SchemaViolation::ServersEmpty.to_string(), "servers empty");

        let missing = SchemaViolation::MissingOperationId {
            path: "/users".to_string(),
            method: "GET".to_string(),
        };
        assert_eq!(missing.to_string(), "operation missing id: path(/users) method(GET)");
    }

    #[test]
    fn test_error_categories() {
        assert_eq!(ToolSpecError::malformed("bad").category(), "malformed_document");
        assert_eq!(ToolSpecError::invalid(SchemaViolation::ServersEmpty).category(), "schema_invalid");
        assert_eq!(ToolSpecError::operation_not_found("x").category(), "operation_not_found");
        assert_eq!(ToolSpecError::cyclic("#/components/schemas/Node").category(), "cyclic_schema");
        assert_eq!(ToolSpecError::config("bad").category(), "config");

        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        assert_eq!(ToolSpecError::from(io).category(), "io");

        let yaml = serde_yaml::from_str::<Vec<u32>>("{").unwrap_err();
        let err = ToolSpecError::from(yaml);
        assert_eq!(err.category(), "yaml");
        assert!(!err.is_user_correctable());
    }

    #[test]
    fn test_user_correctable() {
        assert!(ToolSpecError::operation_not_found("listPets").is_user_correctable());
        assert!(!ToolSpecError::config("bad level").is_user_correctable());

        let err = ToolSpecError::structural("array schema must declare items");
        assert_eq!(
            err.violation(),
            Some(&SchemaViolation::Structural("array schema must declare items".to_string()))
        );
        assert_eq!(err.to_string(), "Schema invalid: array schema must declare items");
    }
}
