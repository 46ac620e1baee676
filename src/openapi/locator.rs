//! Operation lookup

use crate::error::{Result, ToolSpecError};
use crate::openapi::document::SchemaDocument;
use crate::openapi::options::{KeyOrder, MatchMode};
use openapiv3::{Operation, PathItem, ReferenceOr};
use tracing::debug;

/// One operation together with where it lives in the document
#[derive(Debug, Clone, Copy)]
pub struct LocatedOperation<'a> {
    pub path: &'a str,
    /// Upper-case HTTP method
    pub method: &'static str,
    pub path_item: &'a PathItem,
    pub operation: &'a Operation,
}

impl LocatedOperation<'_> {
    pub fn operation_id(&self) -> &str {
        self.operation.operation_id.as_deref().unwrap_or("")
    }
}

/// The operations of one path item, in a fixed method order
pub fn path_operations(item: &PathItem) -> Vec<(&'static str, &Operation)> {
    [
        ("GET", &item.get),
        ("PUT", &item.put),
        ("POST", &item.post),
        ("DELETE", &item.delete),
        ("OPTIONS", &item.options),
        ("HEAD", &item.head),
        ("PATCH", &item.patch),
        ("TRACE", &item.trace),
    ]
    .into_iter()
    .filter_map(|(method, operation)| operation.as_ref().map(|op| (method, op)))
    .collect()
}

/// Every operation in the document
pub fn operations(document: &SchemaDocument, order: KeyOrder) -> Vec<LocatedOperation<'_>> {
    let items: Vec<(&str, &PathItem)> = document
        .spec()
        .paths
        .paths
        .iter()
        .filter_map(|(path, item)| match item {
            ReferenceOr::Item(item) => Some((path.as_str(), item)),
            ReferenceOr::Reference { .. } => None,
        })
        .collect();

    order
        .arrange(items)
        .into_iter()
        .flat_map(|(path, path_item)| {
            path_operations(path_item)
                .into_iter()
                .map(move |(method, operation)| LocatedOperation {
                    path,
                    method,
                    path_item,
                    operation,
                })
        })
        .collect()
}

/// Find the operation an identifier names, if any
///
/// Operation ids are unique in a valid document, so the first match is the only
/// one. With [`MatchMode::OperationIdOrSummary`] an operation-id match anywhere in
/// the document wins over a summary match.
pub fn locate<'a>(
    document: &'a SchemaDocument,
    identifier: &str,
    mode: MatchMode,
    order: KeyOrder,
) -> Option<LocatedOperation<'a>> {
    let candidates = operations(document, order);

    let by_id = candidates
        .iter()
        .find(|located| located.operation.operation_id.as_deref() == Some(identifier));
    if let Some(located) = by_id {
        return Some(*located);
    }

    match mode {
        MatchMode::OperationId => None,
        MatchMode::OperationIdOrSummary => candidates
            .into_iter()
            .find(|located| located.operation.summary.as_deref() == Some(identifier)),
    }
}

/// Find the operation an identifier names
pub fn find_operation<'a>(
    document: &'a SchemaDocument,
    identifier: &str,
    mode: MatchMode,
    order: KeyOrder,
) -> Result<LocatedOperation<'a>> {
    match locate(document, identifier, mode, order) {
        Some(located) => {
            debug!("Located operation '{}' at {} {}", identifier, located.method, located.path);
            Ok(located)
        }
        None => Err(ToolSpecError::operation_not_found(identifier)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"
openapi: 3.0.0
info: {title: Locator, version: '1'}
servers:
  - url: https://api.example.com
paths:
  /users:
    post:
      operationId: createUser
      summary: Create a user
      responses:
        '201': {description: created}
    get:
      operationId: listUsers
      summary: createUser
      responses:
        '200': {description: ok}
  /accounts:
    delete:
      operationId: dropAccount
      summary: Delete the account
      responses:
        '204': {description: gone}
"#;

    fn document() -> SchemaDocument {
        SchemaDocument::load(DOC.as_bytes()).unwrap()
    }

    #[test]
    fn test_operations_in_declared_order() {
        let document = document();
        let found: Vec<(&str, &str)> = operations(&document, KeyOrder::Declared)
            .iter()
            .map(|op| (op.path, op.method))
            .collect();
        assert_eq!(found, vec![("/users", "GET"), ("/users", "POST"), ("/accounts", "DELETE")]);
    }

    #[test]
    fn test_operations_in_lexicographic_order() {
        let document = document();
        let paths: Vec<&str> = operations(&document, KeyOrder::Lexicographic)
            .iter()
            .map(|op| op.path)
            .collect();
        assert_eq!(paths, vec!["/accounts", "/users", "/users"]);
    }

    #[test]
    fn test_find_by_operation_id() {
        let document = document();
        let located = find_operation(&document, "dropAccount", MatchMode::OperationId, KeyOrder::Declared).unwrap();
        assert_eq!(located.path, "/accounts");
        assert_eq!(located.method, "DELETE");
        assert_eq!(located.operation_id(), "dropAccount");
    }

    #[test]
    fn test_summary_match_requires_mode() {
        let document = document();
        let err = find_operation(&document, "Delete the account", MatchMode::OperationId, KeyOrder::Declared)
            .unwrap_err();
        assert!(matches!(err, ToolSpecError::OperationNotFound { ref identifier } if identifier == "Delete the account"));

        let located = find_operation(
            &document,
            "Delete the account",
            MatchMode::OperationIdOrSummary,
            KeyOrder::Declared,
        )
        .unwrap();
        assert_eq!(located.operation_id(), "dropAccount");
    }

    #[test]
    fn test_operation_id_wins_over_summary() {
        // listUsers carries the summary "createUser", which is also createUser's id
        let document = document();
        let located = find_operation(&document, "createUser", MatchMode::OperationIdOrSummary, KeyOrder::Declared)
            .unwrap();
        assert_eq!(located.method, "POST");
    }
}
