//! Document traversal
//!
//! Visits every `$ref` and every inline schema reachable from paths and
//! components, without following references.

use crate::openapi::classify::{SchemaLink, SchemaView};
use crate::openapi::document::ComponentKind;
use crate::openapi::locator::path_operations;
use openapiv3::{
    Content, Header, OpenAPI, Operation, Parameter, ParameterSchemaOrContent, PathItem, ReferenceOr,
    RequestBody, Response, Schema,
};

/// Something the walker found
#[derive(Debug)]
pub enum Visit<'a> {
    Reference {
        reference: &'a str,
        kind: ComponentKind,
        at: String,
    },
    Schema {
        schema: &'a Schema,
        at: String,
    },
}

/// Walk the whole document, calling `visit` for every reference and inline schema
pub fn walk_document<'a>(spec: &'a OpenAPI, visit: &mut dyn FnMut(Visit<'a>)) {
    let mut walker = Walker { visit };

    for (path, item) in &spec.paths.paths {
        let at = format!("paths.{}", path);
        match item {
            ReferenceOr::Reference { reference } => walker.reference(reference, ComponentKind::PathItem, at),
            ReferenceOr::Item(item) => walker.path_item(item, &at),
        }
    }

    if let Some(components) = &spec.components {
        for (name, schema) in &components.schemas {
            walker.schema(SchemaLink::from(schema), format!("components.schemas.{}", name));
        }
        for (name, parameter) in &components.parameters {
            walker.parameter(parameter, format!("components.parameters.{}", name));
        }
        for (name, body) in &components.request_bodies {
            walker.request_body(body, format!("components.requestBodies.{}", name));
        }
        for (name, response) in &components.responses {
            walker.response(response, format!("components.responses.{}", name));
        }
        for (name, header) in &components.headers {
            walker.header(header, format!("components.headers.{}", name));
        }
    }
}

struct Walker<'v, 'a> {
    visit: &'v mut dyn FnMut(Visit<'a>),
}

impl<'v, 'a> Walker<'v, 'a> {
    fn reference(&mut self, reference: &'a str, kind: ComponentKind, at: String) {
        (self.visit)(Visit::Reference { reference, kind, at });
    }

    fn path_item(&mut self, item: &'a PathItem, at: &str) {
        for (index, parameter) in item.parameters.iter().enumerate() {
            self.parameter(parameter, format!("{}.parameters[{}]", at, index));
        }
        for (method, operation) in path_operations(item) {
            self.operation(operation, &format!("{}.{}", at, method.to_lowercase()));
        }
    }

    fn operation(&mut self, operation: &'a Operation, at: &str) {
        for (index, parameter) in operation.parameters.iter().enumerate() {
            self.parameter(parameter, format!("{}.parameters[{}]", at, index));
        }
        if let Some(body) = &operation.request_body {
            self.request_body(body, format!("{}.requestBody", at));
        }
        if let Some(response) = &operation.responses.default {
            self.response(response, format!("{}.responses.default", at));
        }
        for (status, response) in &operation.responses.responses {
            self.response(response, format!("{}.responses.{}", at, status));
        }
    }

    fn parameter(&mut self, parameter: &'a ReferenceOr<Parameter>, at: String) {
        match parameter {
            ReferenceOr::Reference { reference } => self.reference(reference, ComponentKind::Parameter, at),
            ReferenceOr::Item(parameter) => self.schema_or_content(&parameter.parameter_data_ref().format, at),
        }
    }

    fn request_body(&mut self, body: &'a ReferenceOr<RequestBody>, at: String) {
        match body {
            ReferenceOr::Reference { reference } => self.reference(reference, ComponentKind::RequestBody, at),
            ReferenceOr::Item(body) => self.content(&body.content, &at),
        }
    }

    fn response(&mut self, response: &'a ReferenceOr<Response>, at: String) {
        match response {
            ReferenceOr::Reference { reference } => self.reference(reference, ComponentKind::Response, at),
            ReferenceOr::Item(response) => {
                for (name, header) in &response.headers {
                    self.header(header, format!("{}.headers.{}", at, name));
                }
                self.content(&response.content, &at);
            }
        }
    }

    fn header(&mut self, header: &'a ReferenceOr<Header>, at: String) {
        match header {
            ReferenceOr::Reference { reference } => self.reference(reference, ComponentKind::Header, at),
            ReferenceOr::Item(header) => self.schema_or_content(&header.format, at),
        }
    }

    fn schema_or_content(&mut self, format: &'a ParameterSchemaOrContent, at: String) {
        match format {
            ParameterSchemaOrContent::Schema(schema) => self.schema(SchemaLink::from(schema), format!("{}.schema", at)),
            ParameterSchemaOrContent::Content(content) => self.content(content, &at),
        }
    }

    fn content(&mut self, content: &'a Content, at: &str) {
        for (media_type, object) in content {
            if let Some(schema) = &object.schema {
                self.schema(SchemaLink::from(schema), format!("{}.content.{}.schema", at, media_type));
            }
        }
    }

    fn schema(&mut self, link: SchemaLink<'a>, at: String) {
        let schema = match link {
            SchemaLink::Reference(reference) => return self.reference(reference, ComponentKind::Schema, at),
            SchemaLink::Inline(schema) => schema,
        };

        let view = SchemaView::of(schema);
        for (name, property) in &view.properties {
            self.schema(*property, format!("{}.properties.{}", at, name));
        }
        if let Some(items) = view.items {
            self.schema(items, format!("{}.items", at));
        }
        for (keyword, branches) in [("oneOf", view.one_of), ("anyOf", view.any_of), ("allOf", view.all_of)] {
            for (index, branch) in branches.iter().enumerate() {
                self.schema(SchemaLink::from(branch), format!("{}.{}[{}]", at, keyword, index));
            }
        }
        if let Some(not) = view.not {
            self.schema(not, format!("{}.not", at));
        }

        (self.visit)(Visit::Schema { schema, at });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_walk_collects_references_and_schemas() {
        let raw = r#"
openapi: 3.0.0
info: {title: Walk, version: '1'}
paths:
  /pets/{id}:
    parameters:
      - $ref: '#/components/parameters/PetId'
    get:
      operationId: getPet
      responses:
        '200':
          description: ok
          content:
            application/json:
              schema:
                type: object
                properties:
                  owner:
                    $ref: '#/components/schemas/Owner'
                  tags:
                    type: array
                    items:
                      type: string
components:
  parameters:
    PetId:
      name: id
      in: path
      required: true
      schema:
        type: string
  schemas:
    Owner:
      type: object
"#;
        let spec: OpenAPI = serde_yaml::from_str(raw).unwrap();

        let mut references = Vec::new();
        let mut schemas = Vec::new();
        walk_document(&spec, &mut |visit| match visit {
            Visit::Reference { reference, kind, .. } => references.push((reference.to_string(), kind)),
            Visit::Schema { at, .. } => schemas.push(at),
        });

        assert_eq!(
            references,
            vec![
                ("#/components/parameters/PetId".to_string(), ComponentKind::Parameter),
                ("#/components/schemas/Owner".to_string(), ComponentKind::Schema),
            ]
        );
        assert!(schemas.contains(&"paths./pets/{id}.get.responses.200.content.application/json.schema.properties.tags.items".to_string()));
        assert!(schemas.contains(&"components.parameters.PetId.schema".to_string()));
        assert!(schemas.contains(&"components.schemas.Owner".to_string()));
    }
}
