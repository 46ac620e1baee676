//! Tool schema validation
//!
//! A document is accepted as a tool schema only if it passes three tool-specific
//! preconditions followed by a structural OpenAPI pass. Checks run in a fixed
//! order and the first violation is reported.

use crate::error::{Result, SchemaViolation, ToolSpecError};
use crate::openapi::classify::SchemaView;
use crate::openapi::document::SchemaDocument;
use crate::openapi::locator::{operations, LocatedOperation};
use crate::openapi::options::KeyOrder;
use crate::openapi::walk::{walk_document, Visit};
use openapiv3::Parameter;
use std::collections::HashMap;
use tracing::{debug, warn};

/// Validate a document as a tool schema
pub fn validate(document: Option<&SchemaDocument>) -> Result<()> {
    let result = match document {
        None => Err(ToolSpecError::invalid(SchemaViolation::NilDocument)),
        Some(document) => check_document(document),
    };

    match &result {
        Ok(()) => debug!("Tool schema passed validation"),
        Err(e) => warn!("Tool schema rejected: {}", e),
    }
    result
}

/// Load raw document bytes and validate them as a tool schema
pub fn validate_schema(raw: &[u8]) -> Result<SchemaDocument> {
    let document = SchemaDocument::load(raw)?;
    validate(Some(&document))?;
    Ok(document)
}

impl SchemaDocument {
    /// Validate this document as a tool schema
    pub fn validate(&self) -> Result<()> {
        validate(Some(self))
    }
}

fn check_document(document: &SchemaDocument) -> Result<()> {
    let spec = document.spec();

    if spec.servers.is_empty() {
        return Err(ToolSpecError::invalid(SchemaViolation::ServersEmpty));
    }

    let located = operations(document, KeyOrder::Declared);
    if let Some(missing) = located.iter().find(|op| op.operation_id().is_empty()) {
        return Err(ToolSpecError::invalid(SchemaViolation::MissingOperationId {
            path: missing.path.to_string(),
            method: missing.method.to_string(),
        }));
    }

    check_info(document)?;
    check_servers(document)?;
    check_paths(document)?;
    check_unique_ids(&located)?;
    check_responses(&located)?;
    check_parameters(document, &located)?;
    check_references(document)?;
    check_array_items(document)
}

fn check_info(document: &SchemaDocument) -> Result<()> {
    let info = &document.spec().info;
    if info.title.trim().is_empty() {
        return Err(ToolSpecError::structural("info.title must not be empty"));
    }
    if info.version.trim().is_empty() {
        return Err(ToolSpecError::structural("info.version must not be empty"));
    }
    Ok(())
}

fn check_servers(document: &SchemaDocument) -> Result<()> {
    for (index, server) in document.spec().servers.iter().enumerate() {
        if server.url.trim().is_empty() {
            return Err(ToolSpecError::structural(format!("servers[{}] has an empty url", index)));
        }
    }
    Ok(())
}

fn check_paths(document: &SchemaDocument) -> Result<()> {
    for path in document.spec().paths.paths.keys() {
        if !path.starts_with('/') {
            return Err(ToolSpecError::structural(format!("path '{}' must start with '/'", path)));
        }
    }
    Ok(())
}

fn check_unique_ids(located: &[LocatedOperation<'_>]) -> Result<()> {
    let mut seen: HashMap<&str, String> = HashMap::new();
    for op in located {
        let here = format!("{} {}", op.method, op.path);
        if let Some(first) = seen.get(op.operation_id()) {
            return Err(ToolSpecError::invalid(SchemaViolation::DuplicateOperationId {
                operation_id: op.operation_id().to_string(),
                first: first.clone(),
                second: here,
            }));
        }
        seen.insert(op.operation_id(), here);
    }
    Ok(())
}

fn check_responses(located: &[LocatedOperation<'_>]) -> Result<()> {
    for op in located {
        let responses = &op.operation.responses;
        if responses.default.is_none() && responses.responses.is_empty() {
            return Err(ToolSpecError::structural(format!(
                "operation {} declares no responses",
                op.operation_id()
            )));
        }
    }
    Ok(())
}

fn check_parameters(document: &SchemaDocument, located: &[LocatedOperation<'_>]) -> Result<()> {
    for op in located {
        // unresolvable references are reported by the reference pass
        let declared: Vec<&Parameter> = op
            .path_item
            .parameters
            .iter()
            .chain(op.operation.parameters.iter())
            .filter_map(|parameter| document.parameter(parameter).ok())
            .collect();

        for parameter in &declared {
            let data = parameter.parameter_data_ref();
            if data.name.trim().is_empty() {
                return Err(ToolSpecError::structural(format!(
                    "operation {} has a parameter without a name",
                    op.operation_id()
                )));
            }
            if matches!(parameter, Parameter::Path { .. }) && !data.required {
                return Err(ToolSpecError::structural(format!(
                    "path parameter '{}' of operation {} must be required",
                    data.name,
                    op.operation_id()
                )));
            }
        }

        for variable in template_variables(op.path) {
            let is_declared = declared.iter().any(|parameter| {
                matches!(parameter, Parameter::Path { .. }) && parameter.parameter_data_ref().name == variable
            });
            if !is_declared {
                return Err(ToolSpecError::structural(format!(
                    "path template variable '{}' in {} is not declared by operation {}",
                    variable,
                    op.path,
                    op.operation_id()
                )));
            }
        }
    }
    Ok(())
}

fn check_references(document: &SchemaDocument) -> Result<()> {
    let mut references = Vec::new();
    walk_document(document.spec(), &mut |visit| {
        if let Visit::Reference { reference, kind, .. } = visit {
            references.push((reference, kind));
        }
    });

    for (reference, kind) in references {
        document.check_reference(reference, kind)?;
    }
    Ok(())
}

fn check_array_items(document: &SchemaDocument) -> Result<()> {
    let mut missing = None;
    walk_document(document.spec(), &mut |visit| {
        if let Visit::Schema { schema, at } = visit {
            let view = SchemaView::of(schema);
            if missing.is_none() && view.is_type("array") && view.items.is_none() {
                missing = Some(at);
            }
        }
    });

    match missing {
        Some(at) => Err(ToolSpecError::structural(format!("array schema at {} must declare items", at))),
        None => Ok(()),
    }
}

/// Names of the `{variable}` segments of a path template
fn template_variables(path: &str) -> Vec<&str> {
    let mut variables = Vec::new();
    let mut rest = path;
    while let Some(start) = rest.find('{') {
        let Some(len) = rest[start + 1..].find('}') else {
            break;
        };
        variables.push(&rest[start + 1..start + 1 + len]);
        rest = &rest[start + 1 + len + 1..];
    }
    variables
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn document(value: serde_json::Value) -> SchemaDocument {
        SchemaDocument::load(value.to_string().as_bytes()).unwrap()
    }

    fn base() -> serde_json::Value {
        json!({
            "openapi": "3.0.0",
            "info": {"title": "Tools", "version": "1.0"},
            "servers": [{"url": "https://api.example.com"}],
            "paths": {
                "/items/{id}": {
                    "get": {
                        "operationId": "getItem",
                        "parameters": [
                            {"name": "id", "in": "path", "required": true, "schema": {"type": "string"}}
                        ],
                        "responses": {"200": {"description": "ok"}}
                    }
                }
            }
        })
    }

    fn violation(value: serde_json::Value) -> SchemaViolation {
        document(value).validate().unwrap_err().violation().cloned().unwrap()
    }

    #[test]
    fn test_valid_document() {
        assert!(document(base()).validate().is_ok());
    }

    #[test]
    fn test_nil_document() {
        let err = validate(None).unwrap_err();
        assert_eq!(err.violation(), Some(&SchemaViolation::NilDocument));
    }

    #[test]
    fn test_servers_empty_wins_over_everything_else() {
        let mut value = base();
        value["servers"] = json!([]);
        value["paths"]["/items/{id}"]["get"]["operationId"] = json!("");
        assert_eq!(violation(value), SchemaViolation::ServersEmpty);
    }

    #[test]
    fn test_missing_operation_id() {
        let mut value = base();
        value["paths"]["/items/{id}"]["delete"] = json!({
            "parameters": [{"name": "id", "in": "path", "required": true, "schema": {"type": "string"}}],
            "responses": {"204": {"description": "gone"}}
        });
        assert_eq!(
            violation(value),
            SchemaViolation::MissingOperationId {
                path: "/items/{id}".to_string(),
                method: "DELETE".to_string()
            }
        );
    }

    #[test]
    fn test_duplicate_operation_id() {
        let mut value = base();
        value["paths"]["/other"] = json!({
            "post": {"operationId": "getItem", "responses": {"200": {"description": "ok"}}}
        });
        assert!(matches!(
            violation(value),
            SchemaViolation::DuplicateOperationId { ref operation_id, .. } if operation_id == "getItem"
        ));
    }

    #[test]
    fn test_undeclared_template_variable() {
        let mut value = base();
        value["paths"]["/items/{id}"]["get"]["parameters"] = json!([]);
        assert!(matches!(violation(value), SchemaViolation::Structural(ref m) if m.contains("'id'")));
    }

    #[test]
    fn test_path_item_parameters_satisfy_template() {
        let mut value = base();
        value["paths"]["/items/{id}"]["parameters"] = value["paths"]["/items/{id}"]["get"]["parameters"].clone();
        value["paths"]["/items/{id}"]["get"]["parameters"] = json!([]);
        assert!(document(value).validate().is_ok());
    }

    #[test]
    fn test_unresolved_reference() {
        let mut value = base();
        value["paths"]["/items/{id}"]["get"]["responses"]["200"]["content"] = json!({
            "application/json": {"schema": {"$ref": "#/components/schemas/Missing"}}
        });
        assert_eq!(
            violation(value),
            SchemaViolation::UnresolvedReference {
                reference: "#/components/schemas/Missing".to_string()
            }
        );
    }

    #[test]
    fn test_array_without_items() {
        let mut value = base();
        value["components"] = json!({"schemas": {"Tags": {"type": "array"}}});
        assert!(matches!(
            violation(value),
            SchemaViolation::Structural(ref m) if m.contains("components.schemas.Tags")
        ));
    }

    #[test]
    fn test_validate_schema_rejects_malformed_bytes() {
        let err = validate_schema(b"::: not a document").unwrap_err();
        assert!(matches!(err, ToolSpecError::MalformedDocument { .. }));
    }

    #[test]
    fn test_template_variables() {
        assert_eq!(template_variables("/a/{x}/b/{y}"), vec!["x", "y"]);
        assert!(template_variables("/plain").is_empty());
        assert!(template_variables("/broken/{x").is_empty());
    }
}
