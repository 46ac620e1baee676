//! Parameter tree building
//!
//! Expands a schema into [`ParameterNode`] children. Each node is classified
//! once into a [`SchemaView`] and dispatched on its [`Expansion`]. `$ref` targets
//! are resolved on the way down and the pointers on the current recursion path are
//! tracked, so a self-referential schema fails with `CyclicSchema` instead of
//! recursing forever.

use crate::error::{Result, ToolSpecError};
use crate::openapi::classify::{Expansion, SchemaLink, SchemaView, TypeTag};
use crate::openapi::document::SchemaDocument;
use crate::openapi::options::KeyOrder;
use crate::openapi::types::ParameterNode;
use openapiv3::Schema;
use tracing::warn;

/// Builds parameter trees out of the schemas of one document
pub struct ParameterTreeBuilder<'a> {
    document: &'a SchemaDocument,
    order: KeyOrder,
    /// `$ref` pointers entered on the current recursion path
    trail: Vec<&'a str>,
}

impl<'a> ParameterTreeBuilder<'a> {
    pub fn new(document: &'a SchemaDocument, order: KeyOrder) -> Self {
        Self {
            document,
            order,
            trail: Vec::new(),
        }
    }

    /// Child nodes of a schema
    pub fn build_children(&mut self, schema: &'a Schema) -> Result<Vec<ParameterNode>> {
        let view = SchemaView::of(schema);
        self.expand(&view)
    }

    /// Build one named node for a schema, with its whole subtree
    ///
    /// `description` overrides the schema's own description when given.
    pub fn node(
        &mut self,
        name: &str,
        link: SchemaLink<'a>,
        required: bool,
        description: Option<&str>,
    ) -> Result<ParameterNode> {
        self.descend(link, |builder, schema| {
            let view = SchemaView::of(schema);
            Ok(ParameterNode {
                name: name.to_string(),
                description: description.unwrap_or(view.description).to_string(),
                r#type: TypeTag::classify(&view).to_string(),
                required,
                children: builder.expand(&view)?,
            })
        })
    }

    /// Top-level property nodes of a schema, or `None` if it declares no properties
    pub fn properties_of(&mut self, link: SchemaLink<'a>) -> Result<Option<Vec<ParameterNode>>> {
        self.descend(link, |builder, schema| {
            let view = SchemaView::of(schema);
            if view.properties.is_empty() {
                return Ok(None);
            }
            builder.properties(&view).map(Some)
        })
    }

    /// Like [`properties_of`](Self::properties_of), but only for schemas declared as objects
    pub fn object_properties_of(&mut self, link: SchemaLink<'a>) -> Result<Option<Vec<ParameterNode>>> {
        self.descend(link, |builder, schema| {
            let view = SchemaView::of(schema);
            match view.expansion() {
                Expansion::Properties => builder.properties(&view).map(Some),
                _ => Ok(None),
            }
        })
    }

    /// Type tag of a possibly referenced schema, without building children
    pub fn type_of(&self, link: SchemaLink<'a>) -> Result<String> {
        let schema = match link {
            SchemaLink::Inline(schema) => schema,
            SchemaLink::Reference(reference) => self.document.resolve_schema(reference)?,
        };
        Ok(TypeTag::classify(&SchemaView::of(schema)).to_string())
    }

    fn expand(&mut self, view: &SchemaView<'a>) -> Result<Vec<ParameterNode>> {
        match view.expansion() {
            Expansion::Properties => self.properties(view),
            // the synthetic items node describes the array, typed by its items
            Expansion::Items(items) => Ok(vec![self.node("items", items, false, Some(view.description))?]),
            Expansion::Composite(composite, branches) => branches
                .iter()
                .enumerate()
                .map(|(index, branch)| {
                    let name = format!("{}_{}", composite.branch_prefix(), index + 1);
                    self.node(&name, SchemaLink::from(branch), false, Some(composite.branch_description()))
                })
                .collect(),
            Expansion::Leaf => Ok(Vec::new()),
        }
    }

    fn properties(&mut self, view: &SchemaView<'a>) -> Result<Vec<ParameterNode>> {
        self.order
            .arrange(view.properties.clone())
            .into_iter()
            .map(|(name, property)| self.node(name, property, view.is_required(name), None))
            .collect()
    }

    fn descend<R>(
        &mut self,
        link: SchemaLink<'a>,
        build: impl FnOnce(&mut Self, &'a Schema) -> Result<R>,
    ) -> Result<R> {
        let reference = match link {
            SchemaLink::Inline(schema) => return build(self, schema),
            SchemaLink::Reference(reference) => reference,
        };

        if self.trail.contains(&reference) {
            warn!(
                "Cyclic schema reference {} (path: {})",
                reference,
                self.trail.join(" -> ")
            );
            return Err(ToolSpecError::cyclic(reference));
        }

        let schema = self.document.resolve_schema(reference)?;
        self.trail.push(reference);
        let result = build(self, schema);
        self.trail.pop();
        result
    }
}

/// Child nodes of a schema within a document
pub fn build_children(document: &SchemaDocument, schema: &Schema) -> Result<Vec<ParameterNode>> {
    ParameterTreeBuilder::new(document, KeyOrder::Declared).build_children(schema)
}
