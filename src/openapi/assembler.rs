//! Operation input/output assembly

use crate::error::Result;
use crate::openapi::classify::{parameter_schema, SchemaLink};
use crate::openapi::document::SchemaDocument;
use crate::openapi::locator::{find_operation, LocatedOperation};
use crate::openapi::options::{BodyStyle, ExtractOptions, ParameterNaming};
use crate::openapi::tree::ParameterTreeBuilder;
use crate::openapi::types::{OperationIo, ParameterNode};
use openapiv3::{Content, MediaType, Parameter, ReferenceOr, Response, Responses};
use tracing::debug;

/// Turns one operation of a document into its input and output parameter trees
pub struct OperationIoAssembler<'a> {
    document: &'a SchemaDocument,
    options: ExtractOptions,
}

impl<'a> OperationIoAssembler<'a> {
    pub fn new(document: &'a SchemaDocument, options: ExtractOptions) -> Self {
        Self { document, options }
    }

    /// Validate the document, locate the operation and build its inputs and outputs
    pub fn extract(&self, identifier: &str) -> Result<OperationIo> {
        self.document.validate()?;

        let located = find_operation(self.document, identifier, self.options.matching, self.options.order)?;
        let mut builder = ParameterTreeBuilder::new(self.document, self.options.order);

        let io = OperationIo {
            inputs: self.inputs(&located, &mut builder)?,
            outputs: self.outputs(&located, &mut builder)?,
        };

        debug!(
            "Extracted operation '{}': {} input nodes, {} output nodes",
            identifier,
            io.inputs.iter().map(ParameterNode::size).sum::<usize>(),
            io.outputs.iter().map(ParameterNode::size).sum::<usize>()
        );
        Ok(io)
    }

    fn inputs(
        &self,
        located: &LocatedOperation<'a>,
        builder: &mut ParameterTreeBuilder<'a>,
    ) -> Result<Vec<ParameterNode>> {
        let mut inputs = Vec::new();

        for parameter in self.parameters(located)? {
            let data = parameter.parameter_data_ref();
            let name = match self.options.naming {
                ParameterNaming::Located => format!("{}.{}", location(parameter), data.name),
                ParameterNaming::Bare => data.name.clone(),
            };
            let r#type = match parameter_schema(parameter) {
                Some(link) => builder.type_of(link)?,
                None => "string".to_string(),
            };
            inputs.push(ParameterNode::leaf(
                name,
                data.description.clone().unwrap_or_default(),
                r#type,
                data.required,
            ));
        }

        let Some(body) = &located.operation.request_body else {
            return Ok(inputs);
        };
        let body = self.document.request_body(body)?;
        let media = self.schemas(&body.content);

        match self.options.body {
            BodyStyle::Flatten => {
                for link in media {
                    inputs.extend(builder.properties_of(link)?.unwrap_or_default());
                }
            }
            BodyStyle::Wrap => {
                if let Some(link) = media.into_iter().next() {
                    inputs.push(builder.node("body", link, body.required, body.description.as_deref())?);
                }
            }
        }

        Ok(inputs)
    }

    fn outputs(
        &self,
        located: &LocatedOperation<'a>,
        builder: &mut ParameterTreeBuilder<'a>,
    ) -> Result<Vec<ParameterNode>> {
        let Some((status, response)) = self.select_response(&located.operation.responses) else {
            return Ok(Vec::new());
        };
        let response: &'a Response = self.document.response(response)?;
        let media = self.schemas(&response.content);

        match self.options.body {
            BodyStyle::Flatten => match media.into_iter().next() {
                Some(link) => Ok(builder.properties_of(link)?.unwrap_or_default()),
                None => Ok(Vec::new()),
            },
            BodyStyle::Wrap => {
                let mut outputs = Vec::new();
                for link in media {
                    match builder.object_properties_of(link)? {
                        Some(properties) => outputs.extend(properties),
                        None => outputs.push(builder.node(&status, link, false, Some(response.description.as_str()))?),
                    }
                }
                Ok(outputs)
            }
        }
    }

    /// Own parameters followed by path-item parameters the operation does not redeclare
    fn parameters(&self, located: &LocatedOperation<'a>) -> Result<Vec<&'a Parameter>> {
        let own = located
            .operation
            .parameters
            .iter()
            .map(|parameter| self.document.parameter(parameter))
            .collect::<Result<Vec<_>>>()?;

        let mut parameters = own.clone();
        for parameter in &located.path_item.parameters {
            let inherited = self.document.parameter(parameter)?;
            if !own.iter().any(|declared| same_slot(declared, inherited)) {
                parameters.push(inherited);
            }
        }
        Ok(parameters)
    }

    /// The success response if one is declared, otherwise the first response
    fn select_response(&self, responses: &'a Responses) -> Option<(String, &'a ReferenceOr<Response>)> {
        let keyed: Vec<(String, &ReferenceOr<Response>)> = responses
            .responses
            .iter()
            .map(|(status, response)| (status.to_string(), response))
            .collect();
        let mut keyed = self.options.order.arrange(keyed);
        if let Some(default) = &responses.default {
            keyed.push(("default".to_string(), default));
        }

        let chosen = keyed.iter().position(|(status, _)| status.starts_with('2')).unwrap_or(0);
        keyed.into_iter().nth(chosen)
    }

    /// Schemas of a content map, in key order, skipping media types without one
    fn schemas(&self, content: &'a Content) -> Vec<SchemaLink<'a>> {
        let entries: Vec<(&String, &MediaType)> = content.iter().collect();
        self.options
            .order
            .arrange(entries)
            .into_iter()
            .filter_map(|(_, media)| media.schema.as_ref().map(SchemaLink::from))
            .collect()
    }
}

/// Extract the inputs and outputs of one operation of a document
pub fn extract_io(document: &SchemaDocument, identifier: &str, options: ExtractOptions) -> Result<OperationIo> {
    OperationIoAssembler::new(document, options).extract(identifier)
}

fn location(parameter: &Parameter) -> &'static str {
    match parameter {
        Parameter::Query { .. } => "query",
        Parameter::Header { .. } => "header",
        Parameter::Path { .. } => "path",
        Parameter::Cookie { .. } => "cookie",
    }
}

fn same_slot(a: &Parameter, b: &Parameter) -> bool {
    location(a) == location(b) && a.parameter_data_ref().name == b.parameter_data_ref().name
}
