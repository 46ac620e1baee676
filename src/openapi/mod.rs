//! OpenAPI introspection and tool parameter derivation

pub mod assembler;
pub mod catalog;
pub mod classify;
pub mod document;
pub mod locator;
pub mod options;
pub mod tree;
pub mod types;
pub mod validator;
pub mod walk;

pub use assembler::OperationIoAssembler;
pub use catalog::{extract_io, ToolSchema};
pub use classify::{classify_schema, SchemaLink, SchemaView, TypeTag};
pub use document::{ComponentKind, SchemaDocument};
pub use locator::{find_operation, locate, operations, LocatedOperation};
pub use options::{BodyStyle, ExtractOptions, KeyOrder, MatchMode, ParameterNaming};
pub use tree::{build_children, ParameterTreeBuilder};
pub use types::{ActionInfo, OperationIo, ParameterNode, ToolDetail};
pub use validator::{validate, validate_schema};
