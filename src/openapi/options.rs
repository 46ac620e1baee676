//! Extraction options
//!
//! The tool system historically produced parameter trees in two shapes: workflow
//! tool details prefixed parameter names with their location and flattened the
//! request body, while the older tool-detail path used bare names and wrapped the
//! body in a single `body` node. Both are kept here as explicit options.

use crate::error::ToolSpecError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How top-level operation parameters are named
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterNaming {
    /// `<location>.<name>`, e.g. `query.id`
    #[default]
    Located,
    /// The parameter name as declared
    Bare,
}

/// How request and response bodies are represented
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyStyle {
    /// Body properties become top-level nodes
    #[default]
    Flatten,
    /// The request body becomes one `body` node; non-object responses become one
    /// node named by their status code
    Wrap,
}

/// How an identifier is matched against operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    /// Match the operation id only
    #[default]
    OperationId,
    /// Match the operation id, falling back to the operation summary
    OperationIdOrSummary,
}

/// Iteration order over paths, properties, media types and responses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyOrder {
    /// Declaration order in the source document
    #[default]
    Declared,
    /// Keys sorted lexicographically
    Lexicographic,
}

impl KeyOrder {
    /// Apply this order to keyed entries collected in declaration order
    pub fn arrange<K: AsRef<str>, V>(self, mut entries: Vec<(K, V)>) -> Vec<(K, V)> {
        if self == KeyOrder::Lexicographic {
            entries.sort_by(|(a, _), (b, _)| a.as_ref().cmp(b.as_ref()));
        }
        entries
    }
}

/// Options for turning an operation into parameter trees
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ExtractOptions {
    #[serde(default)]
    pub naming: ParameterNaming,
    #[serde(default)]
    pub body: BodyStyle,
    #[serde(default)]
    pub matching: MatchMode,
    #[serde(default)]
    pub order: KeyOrder,
}

impl ExtractOptions {
    pub fn with_naming(mut self, naming: ParameterNaming) -> Self {
        self.naming = naming;
        self
    }

    pub fn with_body(mut self, body: BodyStyle) -> Self {
        self.body = body;
        self
    }

    pub fn with_matching(mut self, matching: MatchMode) -> Self {
        self.matching = matching;
        self
    }

    pub fn with_order(mut self, order: KeyOrder) -> Self {
        self.order = order;
        self
    }
}

macro_rules! option_names {
    ($ty:ident { $($variant:ident => $name:literal),+ $(,)? }) => {
        impl $ty {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($ty::$variant => $name),+
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = ToolSpecError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_lowercase().replace('-', "_").as_str() {
                    $($name => Ok($ty::$variant),)+
                    other => Err(ToolSpecError::config(format!(
                        "Invalid {}: {} (valid options: {})",
                        stringify!($ty),
                        other,
                        [$($name),+].join(", ")
                    ))),
                }
            }
        }
    };
}

option_names!(ParameterNaming { Located => "located", Bare => "bare" });
option_names!(BodyStyle { Flatten => "flatten", Wrap => "wrap" });
option_names!(MatchMode { OperationId => "operation_id", OperationIdOrSummary => "operation_id_or_summary" });
option_names!(KeyOrder { Declared => "declared", Lexicographic => "lexicographic" });
