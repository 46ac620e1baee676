//! Schema loading and local reference resolution
//!
//! A [`SchemaDocument`] is parsed fresh for every call and never mutated afterwards,
//! so it can be shared by reference across threads while parameter trees are built.

use crate::error::{Result, SchemaViolation, ToolSpecError};
use crate::openapi::walk::{walk_document, Visit};
use openapiv3::{Header, OpenAPI, Parameter, ReferenceOr, RequestBody, Response, Schema};
use serde_json::Value;
use tracing::debug;

/// Schema extension that carries a declared set of types (`type: [null, integer]`)
pub const TYPE_SET_EXTENSION: &str = "x-toolspec-types";

/// Keys whose values are instance data rather than schemas
const INSTANCE_KEYS: [&str; 5] = ["example", "examples", "default", "enum", "const"];

/// The kind of component a `$ref` points at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentKind {
    Schema,
    Parameter,
    RequestBody,
    Response,
    Header,
    PathItem,
}

impl ComponentKind {
    /// The `#/components/<section>/` prefix for this kind
    pub fn section(&self) -> &'static str {
        match self {
            ComponentKind::Schema => "schemas",
            ComponentKind::Parameter => "parameters",
            ComponentKind::RequestBody => "requestBodies",
            ComponentKind::Response => "responses",
            ComponentKind::Header => "headers",
            ComponentKind::PathItem => "pathItems",
        }
    }
}

/// A parsed OpenAPI 3.x document
#[derive(Debug, Clone)]
pub struct SchemaDocument {
    spec: OpenAPI,
}

impl SchemaDocument {
    /// Parse raw document bytes (JSON or YAML)
    pub fn load(raw: &[u8]) -> Result<Self> {
        let content = std::str::from_utf8(raw)
            .map_err(|e| ToolSpecError::malformed(format!("document is not valid UTF-8: {}", e)))?;
        Self::load_str(content)
    }

    /// Parse document text (JSON or YAML)
    pub fn load_str(content: &str) -> Result<Self> {
        let spec = parse_openapi3(content)?;

        if !spec.openapi.starts_with("3.") {
            return Err(ToolSpecError::malformed(format!(
                "unsupported OpenAPI version {:?}, expected 3.x",
                spec.openapi
            )));
        }

        let document = Self { spec };
        document.ensure_local_references()?;

        debug!(
            "Loaded OpenAPI {} document '{}' with {} paths",
            document.spec.openapi,
            document.spec.info.title,
            document.spec.paths.paths.len()
        );
        Ok(document)
    }

    /// The underlying OpenAPI object graph
    pub fn spec(&self) -> &OpenAPI {
        &self.spec
    }

    /// Resolve a schema reference, following alias chains
    pub fn resolve_schema(&self, reference: &str) -> Result<&Schema> {
        self.follow(reference, ComponentKind::Schema, |name| {
            self.spec.components.as_ref()?.schemas.get(name)
        })
    }

    /// Resolve a parameter reference
    pub fn resolve_parameter(&self, reference: &str) -> Result<&Parameter> {
        self.follow(reference, ComponentKind::Parameter, |name| {
            self.spec.components.as_ref()?.parameters.get(name)
        })
    }

    /// Resolve a request body reference
    pub fn resolve_request_body(&self, reference: &str) -> Result<&RequestBody> {
        self.follow(reference, ComponentKind::RequestBody, |name| {
            self.spec.components.as_ref()?.request_bodies.get(name)
        })
    }

    /// Resolve a response reference
    pub fn resolve_response(&self, reference: &str) -> Result<&Response> {
        self.follow(reference, ComponentKind::Response, |name| {
            self.spec.components.as_ref()?.responses.get(name)
        })
    }

    /// Resolve a header reference
    pub fn resolve_header(&self, reference: &str) -> Result<&Header> {
        self.follow(reference, ComponentKind::Header, |name| {
            self.spec.components.as_ref()?.headers.get(name)
        })
    }

    /// Resolve an inline-or-referenced parameter
    pub fn parameter<'a>(&'a self, parameter: &'a ReferenceOr<Parameter>) -> Result<&'a Parameter> {
        match parameter {
            ReferenceOr::Item(item) => Ok(item),
            ReferenceOr::Reference { reference } => self.resolve_parameter(reference),
        }
    }

    /// Resolve an inline-or-referenced request body
    pub fn request_body<'a>(&'a self, body: &'a ReferenceOr<RequestBody>) -> Result<&'a RequestBody> {
        match body {
            ReferenceOr::Item(item) => Ok(item),
            ReferenceOr::Reference { reference } => self.resolve_request_body(reference),
        }
    }

    /// Resolve an inline-or-referenced response
    pub fn response<'a>(&'a self, response: &'a ReferenceOr<Response>) -> Result<&'a Response> {
        match response {
            ReferenceOr::Item(item) => Ok(item),
            ReferenceOr::Reference { reference } => self.resolve_response(reference),
        }
    }

    /// Check that a reference of the given kind resolves
    pub fn check_reference(&self, reference: &str, kind: ComponentKind) -> Result<()> {
        match kind {
            ComponentKind::Schema => self.resolve_schema(reference).map(|_| ()),
            ComponentKind::Parameter => self.resolve_parameter(reference).map(|_| ()),
            ComponentKind::RequestBody => self.resolve_request_body(reference).map(|_| ()),
            ComponentKind::Response => self.resolve_response(reference).map(|_| ()),
            ComponentKind::Header => self.resolve_header(reference).map(|_| ()),
            // OpenAPI 3.0 has no path item components to point at
            ComponentKind::PathItem => Err(unresolved(reference)),
        }
    }

    fn follow<'a, T>(
        &'a self,
        reference: &str,
        kind: ComponentKind,
        lookup: impl Fn(&str) -> Option<&'a ReferenceOr<T>>,
    ) -> Result<&'a T> {
        let mut current = reference.to_string();
        let mut seen: Vec<String> = Vec::new();

        loop {
            let name = component_name(&current, kind).ok_or_else(|| unresolved(&current))?;
            match lookup(&name).ok_or_else(|| unresolved(&current))? {
                ReferenceOr::Item(item) => return Ok(item),
                ReferenceOr::Reference { reference: next } => {
                    seen.push(current);
                    if seen.contains(next) {
                        return Err(ToolSpecError::cyclic(next.as_str()));
                    }
                    current = next.clone();
                }
            }
        }
    }

    fn ensure_local_references(&self) -> Result<()> {
        let mut external = None;
        walk_document(&self.spec, &mut |visit| {
            if let Visit::Reference { reference, .. } = visit {
                if external.is_none() && !reference.starts_with('#') {
                    external = Some(reference.to_string());
                }
            }
        });

        match external {
            Some(reference) => Err(ToolSpecError::malformed(format!(
                "external reference '{}' cannot be resolved",
                reference
            ))),
            None => Ok(()),
        }
    }
}

/// Parse OpenAPI 3.x specification from JSON or YAML
fn parse_openapi3(content: &str) -> Result<OpenAPI> {
    // Try JSON first
    let json_error = match serde_json::from_str::<OpenAPI>(content) {
        Ok(spec) => return Ok(spec),
        Err(e) => e,
    };

    // Try YAML
    let yaml_error = match serde_yaml::from_str::<OpenAPI>(content) {
        Ok(spec) => return Ok(spec),
        Err(e) => e,
    };

    // Type sets are outside the object model, so lift them into an extension and retry
    if let Some(spec) = parse_with_type_sets(content) {
        debug!("Parsed document after lifting declared type sets");
        return Ok(spec);
    }

    let message = if content.trim_start().starts_with('{') {
        json_error.to_string()
    } else {
        yaml_error.to_string()
    };
    Err(ToolSpecError::malformed(format!(
        "failed to parse OpenAPI document: {}",
        message
    )))
}

fn parse_with_type_sets(content: &str) -> Option<OpenAPI> {
    let mut raw = serde_json::from_str::<Value>(content)
        .ok()
        .or_else(|| serde_yaml::from_str::<Value>(content).ok())?;
    if !lift_type_sets(&mut raw) {
        return None;
    }
    serde_json::from_value(raw).ok()
}

/// Rewrite every array-valued `type` below `node`.
///
/// A one-element set becomes a plain `type`; any other set is moved under
/// [`TYPE_SET_EXTENSION`]. Returns whether anything was rewritten.
fn lift_type_sets(node: &mut Value) -> bool {
    match node {
        Value::Array(values) => values
            .iter_mut()
            .fold(false, |lifted, value| lift_type_sets(value) | lifted),
        Value::Object(map) => {
            let names = match map.get("type") {
                Some(Value::Array(types)) => types
                    .iter()
                    .map(|name| name.as_str().map(str::to_string))
                    .collect::<Option<Vec<String>>>(),
                _ => None,
            };

            let mut lifted = false;
            if let Some(mut names) = names {
                map.remove("type");
                if names.len() == 1 {
                    map.insert("type".to_string(), Value::String(names.remove(0)));
                } else {
                    map.insert(TYPE_SET_EXTENSION.to_string(), Value::from(names));
                }
                lifted = true;
            }

            for (key, value) in map.iter_mut() {
                match (key.as_str(), value) {
                    // property names are free-form, so `default` here is a schema
                    ("properties", Value::Object(properties)) => {
                        for property in properties.values_mut() {
                            lifted |= lift_type_sets(property);
                        }
                    }
                    (key, _) if INSTANCE_KEYS.contains(&key) || key.starts_with("x-") => {}
                    (_, value) => lifted |= lift_type_sets(value),
                }
            }
            lifted
        }
        _ => false,
    }
}

/// Extract the component name from a local `#/components/<section>/<name>` pointer
pub fn component_name(reference: &str, kind: ComponentKind) -> Option<String> {
    let prefix = format!("#/components/{}/", kind.section());
    let escaped = reference.strip_prefix(&prefix)?;
    if escaped.is_empty() || escaped.contains('/') {
        return None;
    }
    Some(escaped.replace("~1", "/").replace("~0", "~"))
}

fn unresolved(reference: &str) -> ToolSpecError {
    ToolSpecError::invalid(SchemaViolation::UnresolvedReference {
        reference: reference.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const PETSTORE: &str = r#"
openapi: 3.0.3
info:
  title: Petstore
  version: 1.0.0
servers:
  - url: https://pets.example.com
paths:
  /pets:
    get:
      operationId: listPets
      responses:
        '200':
          description: ok
          content:
            application/json:
              schema:
                $ref: '#/components/schemas/PetList'
components:
  schemas:
    PetList:
      $ref: '#/components/schemas/Pets'
    Pets:
      type: array
      items:
        $ref: '#/components/schemas/Pet'
    Pet:
      type: object
      properties:
        name:
          type: string
"#;

    #[test]
    fn test_load_yaml_document() {
        let document = SchemaDocument::load(PETSTORE.as_bytes()).unwrap();
        assert_eq!(document.spec().info.title, "Petstore");
        assert_eq!(document.spec().paths.paths.len(), 1);
    }

    #[test]
    fn test_load_json_document() {
        let raw = r#"{"openapi":"3.0.0","info":{"title":"T","version":"1"},"paths":{}}"#;
        let document = SchemaDocument::load(raw.as_bytes()).unwrap();
        assert_eq!(document.spec().openapi, "3.0.0");
    }

    #[test]
    fn test_load_rejects_garbage() {
        let err = SchemaDocument::load(b"{ not json").unwrap_err();
        assert!(matches!(err, ToolSpecError::MalformedDocument { .. }));

        let err = SchemaDocument::load(&[0xff, 0xfe, 0x00]).unwrap_err();
        assert!(matches!(err, ToolSpecError::MalformedDocument { .. }));
    }

    #[test]
    fn test_load_rejects_swagger2_version() {
        let raw = r#"{"openapi":"2.0","info":{"title":"T","version":"1"},"paths":{}}"#;
        let err = SchemaDocument::load(raw.as_bytes()).unwrap_err();
        assert!(matches!(err, ToolSpecError::MalformedDocument { .. }));
    }

    #[test]
    fn test_load_rejects_external_reference() {
        let raw = r#"{
            "openapi": "3.0.0",
            "info": {"title": "T", "version": "1"},
            "paths": {
                "/a": {
                    "get": {
                        "operationId": "a",
                        "responses": {
                            "200": {
                                "description": "ok",
                                "content": {"application/json": {"schema": {"$ref": "other.yaml#/Pet"}}}
                            }
                        }
                    }
                }
            }
        }"#;
        let err = SchemaDocument::load(raw.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("other.yaml#/Pet"));
    }

    #[test]
    fn test_resolve_schema_follows_aliases() {
        let document = SchemaDocument::load(PETSTORE.as_bytes()).unwrap();
        let schema = document.resolve_schema("#/components/schemas/PetList").unwrap();
        assert!(matches!(
            schema.schema_kind,
            openapiv3::SchemaKind::Type(openapiv3::Type::Array(_))
        ));
    }

    #[test]
    fn test_resolve_unknown_schema() {
        let document = SchemaDocument::load(PETSTORE.as_bytes()).unwrap();
        let err = document.resolve_schema("#/components/schemas/Owner").unwrap_err();
        assert_eq!(
            err.violation(),
            Some(&SchemaViolation::UnresolvedReference {
                reference: "#/components/schemas/Owner".to_string()
            })
        );
    }

    #[test]
    fn test_alias_loop_is_cyclic() {
        let raw = r#"
openapi: 3.0.0
info: {title: T, version: '1'}
paths: {}
components:
  schemas:
    A:
      $ref: '#/components/schemas/B'
    B:
      $ref: '#/components/schemas/A'
"#;
        let document = SchemaDocument::load(raw.as_bytes()).unwrap();
        let err = document.resolve_schema("#/components/schemas/A").unwrap_err();
        assert!(matches!(err, ToolSpecError::CyclicSchema { .. }));
    }

    #[test]
    fn test_load_lifts_type_sets() {
        let raw = r#"{
            "openapi": "3.1.0",
            "info": {"title": "T", "version": "1"},
            "paths": {},
            "components": {
                "schemas": {
                    "Count": {"type": ["null", "integer"], "format": "int32"},
                    "Name": {"type": ["string"]},
                    "Sample": {"type": "object", "example": {"type": ["kept"]}}
                }
            }
        }"#;
        let document = SchemaDocument::load(raw.as_bytes()).unwrap();

        let count = document.resolve_schema("#/components/schemas/Count").unwrap();
        assert!(matches!(count.schema_kind, openapiv3::SchemaKind::Any(_)));
        assert_eq!(
            count.schema_data.extensions.get(TYPE_SET_EXTENSION),
            Some(&serde_json::json!(["null", "integer"]))
        );

        let name = document.resolve_schema("#/components/schemas/Name").unwrap();
        assert!(matches!(
            name.schema_kind,
            openapiv3::SchemaKind::Type(openapiv3::Type::String(_))
        ));

        let sample = document.resolve_schema("#/components/schemas/Sample").unwrap();
        assert_eq!(
            sample.schema_data.example,
            Some(serde_json::json!({"type": ["kept"]}))
        );
    }

    #[test]
    fn test_lift_keeps_declared_order() {
        let raw = r#"
openapi: 3.1.0
info: {title: T, version: '1'}
paths:
  /zeta:
    get:
      operationId: zeta
      responses:
        '200': {description: ok}
  /alpha:
    get:
      operationId: alpha
      responses:
        '200':
          description: ok
          content:
            application/json:
              schema:
                type: [object, 'null']
"#;
        let document = SchemaDocument::load(raw.as_bytes()).unwrap();
        let paths: Vec<&str> = document.spec().paths.paths.keys().map(String::as_str).collect();
        assert_eq!(paths, vec!["/zeta", "/alpha"]);
    }

    #[test]
    fn test_component_name_unescapes_pointer() {
        assert_eq!(
            component_name("#/components/schemas/a~1b~0c", ComponentKind::Schema),
            Some("a/b~c".to_string())
        );
        assert_eq!(component_name("#/components/parameters/id", ComponentKind::Schema), None);
        assert_eq!(component_name("#/components/schemas/", ComponentKind::Schema), None);
    }
}
