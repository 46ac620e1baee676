//! Tool catalog
//!
//! [`ToolSchema`] is the entry point used when a custom tool is registered or
//! invoked: the raw document is loaded and validated once, after which actions and
//! their parameter trees can be listed or extracted.

use crate::error::Result;
use crate::openapi::assembler::OperationIoAssembler;
use crate::openapi::document::SchemaDocument;
use crate::openapi::locator::operations;
use crate::openapi::options::ExtractOptions;
use crate::openapi::types::{ActionInfo, OperationIo, ToolDetail};
use crate::openapi::validator::validate_schema;
use rayon::prelude::*;
use tracing::{debug, info};

/// A validated tool schema
#[derive(Debug, Clone)]
pub struct ToolSchema {
    document: SchemaDocument,
    options: ExtractOptions,
}

impl ToolSchema {
    /// Load and validate raw document bytes
    pub fn from_slice(raw: &[u8], options: ExtractOptions) -> Result<Self> {
        let document = validate_schema(raw)?;
        info!(
            "📋 Loaded tool schema '{}' ({} actions)",
            document.spec().info.title,
            operations(&document, options.order).len()
        );
        Ok(Self { document, options })
    }

    pub fn document(&self) -> &SchemaDocument {
        &self.document
    }

    pub fn options(&self) -> ExtractOptions {
        self.options
    }

    /// One entry per operation
    pub fn actions(&self) -> Vec<ActionInfo> {
        operations(&self.document, self.options.order)
            .into_iter()
            .map(|located| ActionInfo {
                name: located.operation_id().to_string(),
                desc: located.operation.description.clone().unwrap_or_default(),
                method: located.method.to_string(),
                path: located.path.to_string(),
            })
            .collect()
    }

    /// Inputs and outputs of one operation
    pub fn extract_io(&self, identifier: &str) -> Result<OperationIo> {
        OperationIoAssembler::new(&self.document, self.options).extract(identifier)
    }

    /// Workflow-facing detail of one operation
    pub fn tool_detail(&self, identifier: &str) -> Result<ToolDetail> {
        Ok(ToolDetail::new(identifier, self.extract_io(identifier)?))
    }

    /// Details of every operation, in action order
    ///
    /// Operations are extracted in parallel; the first failure is returned.
    pub fn tool_details(&self) -> Result<Vec<ToolDetail>> {
        let identifiers: Vec<String> = self.actions().into_iter().map(|action| action.name).collect();
        let details = identifiers
            .par_iter()
            .map(|identifier| self.tool_detail(identifier))
            .collect::<Result<Vec<_>>>()?;

        debug!("Described {} actions", details.len());
        Ok(details)
    }
}

/// Load, validate and extract one operation from raw document bytes
pub fn extract_io(raw: &[u8], identifier: &str, options: ExtractOptions) -> Result<OperationIo> {
    let document = SchemaDocument::load(raw)?;
    OperationIoAssembler::new(&document, options).extract(identifier)
}
