//! Type classification
//!
//! Every schema node is normalized once into a [`SchemaView`]. The coarse type tag
//! ([`TypeTag::classify`]) and the child expansion ([`SchemaView::expansion`]) are
//! both pure functions of that view, each written as a single ordered list of
//! checks so the precedence stays auditable.

use crate::openapi::document::TYPE_SET_EXTENSION;
use openapiv3::{Parameter, ParameterSchemaOrContent, ReferenceOr, Schema, SchemaKind, Type};
use serde_json::Value;
use std::fmt;

/// A schema that is either inline or a `$ref` still to be resolved
#[derive(Debug, Clone, Copy)]
pub enum SchemaLink<'a> {
    Inline(&'a Schema),
    Reference(&'a str),
}

impl<'a> From<&'a ReferenceOr<Schema>> for SchemaLink<'a> {
    fn from(value: &'a ReferenceOr<Schema>) -> Self {
        match value {
            ReferenceOr::Item(schema) => SchemaLink::Inline(schema),
            ReferenceOr::Reference { reference } => SchemaLink::Reference(reference),
        }
    }
}

impl<'a> From<&'a ReferenceOr<Box<Schema>>> for SchemaLink<'a> {
    fn from(value: &'a ReferenceOr<Box<Schema>>) -> Self {
        match value {
            ReferenceOr::Item(schema) => SchemaLink::Inline(schema.as_ref()),
            ReferenceOr::Reference { reference } => SchemaLink::Reference(reference),
        }
    }
}

/// The facts about one schema node that classification and expansion look at
#[derive(Debug, Clone, Default)]
pub struct SchemaView<'a> {
    pub description: &'a str,
    /// Declared type set
    pub types: Vec<&'a str>,
    /// Format string, only consulted for untyped schemas
    pub format: Option<&'a str>,
    pub properties: Vec<(&'a str, SchemaLink<'a>)>,
    pub required: &'a [String],
    pub items: Option<SchemaLink<'a>>,
    pub one_of: &'a [ReferenceOr<Schema>],
    pub any_of: &'a [ReferenceOr<Schema>],
    pub all_of: &'a [ReferenceOr<Schema>],
    pub not: Option<SchemaLink<'a>>,
}

impl<'a> SchemaView<'a> {
    pub fn of(schema: &'a Schema) -> Self {
        let mut view = SchemaView {
            description: schema.schema_data.description.as_deref().unwrap_or(""),
            ..SchemaView::default()
        };

        match &schema.schema_kind {
            // typed schemas never classify by format, so it is not collected
            SchemaKind::Type(Type::String(_)) => view.types.push("string"),
            SchemaKind::Type(Type::Number(_)) => view.types.push("number"),
            SchemaKind::Type(Type::Integer(_)) => view.types.push("integer"),
            SchemaKind::Type(Type::Boolean(_)) => view.types.push("boolean"),
            SchemaKind::Type(Type::Object(object)) => {
                view.types.push("object");
                view.properties = object
                    .properties
                    .iter()
                    .map(|(name, property)| (name.as_str(), SchemaLink::from(property)))
                    .collect();
                view.required = &object.required;
            }
            SchemaKind::Type(Type::Array(array)) => {
                view.types.push("array");
                view.items = array.items.as_ref().map(SchemaLink::from);
            }
            SchemaKind::OneOf { one_of } => view.one_of = one_of,
            SchemaKind::AllOf { all_of } => view.all_of = all_of,
            SchemaKind::AnyOf { any_of } => view.any_of = any_of,
            SchemaKind::Not { not } => view.not = Some(SchemaLink::from(&**not)),
            SchemaKind::Any(any) => {
                view.types.extend(any.typ.as_deref());
                view.format = any.format.as_deref();
                view.properties = any
                    .properties
                    .iter()
                    .map(|(name, property)| (name.as_str(), SchemaLink::from(property)))
                    .collect();
                view.required = &any.required;
                view.items = any.items.as_ref().map(SchemaLink::from);
                view.one_of = &any.one_of;
                view.any_of = &any.any_of;
                view.all_of = &any.all_of;
                view.not = any.not.as_deref().map(SchemaLink::from);
            }
        }

        if let Some(Value::Array(types)) = schema.schema_data.extensions.get(TYPE_SET_EXTENSION) {
            view.types = types.iter().filter_map(Value::as_str).collect();
        }

        view
    }

    pub fn is_type(&self, name: &str) -> bool {
        self.types.iter().any(|declared| *declared == name)
    }

    pub fn is_required(&self, property: &str) -> bool {
        self.required.iter().any(|name| name == property)
    }

    /// Which children this node expands into; the first matching rule wins
    pub fn expansion(&self) -> Expansion<'a> {
        if self.is_type("object") && !self.properties.is_empty() {
            Expansion::Properties
        } else if let (true, Some(items)) = (self.is_type("array"), self.items) {
            Expansion::Items(items)
        } else if !self.one_of.is_empty() {
            Expansion::Composite(Composite::OneOf, self.one_of)
        } else if !self.any_of.is_empty() {
            Expansion::Composite(Composite::AnyOf, self.any_of)
        } else if !self.all_of.is_empty() {
            Expansion::Composite(Composite::AllOf, self.all_of)
        } else {
            Expansion::Leaf
        }
    }
}

/// Child expansion of a schema node
#[derive(Debug, Clone, Copy)]
pub enum Expansion<'a> {
    /// One child per object property
    Properties,
    /// One synthetic `items` child
    Items(SchemaLink<'a>),
    /// One child per composite branch
    Composite(Composite, &'a [ReferenceOr<Schema>]),
    Leaf,
}

/// Composite schema keyword
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Composite {
    OneOf,
    AnyOf,
    AllOf,
}

impl Composite {
    /// Prefix of synthesized branch names
    pub fn branch_prefix(&self) -> &'static str {
        match self {
            Composite::OneOf | Composite::AnyOf => "option",
            Composite::AllOf => "combined",
        }
    }

    /// Fixed description of synthesized branch nodes
    pub fn branch_description(&self) -> &'static str {
        match self {
            Composite::OneOf => "One of the options",
            Composite::AnyOf => "Any of the options",
            Composite::AllOf => "Combined schema requirement",
        }
    }
}

/// Coarse type tag of a schema node
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeTag<'a> {
    Object,
    Array,
    String,
    Number,
    Integer,
    Boolean,
    /// A declared type outside the known set, kept verbatim
    Declared(&'a str),
    AnyOf,
    AllOf,
    OneOf,
    /// Untyped schema with a format, kept verbatim
    Format(&'a str),
}

/// Membership order for declared type sets
const TYPE_PRECEDENCE: [(&str, TypeTag<'static>); 6] = [
    ("object", TypeTag::Object),
    ("array", TypeTag::Array),
    ("string", TypeTag::String),
    ("number", TypeTag::Number),
    ("integer", TypeTag::Integer),
    ("boolean", TypeTag::Boolean),
];

impl<'a> TypeTag<'a> {
    /// Classify a normalized schema node; the first matching rule wins
    pub fn classify(view: &SchemaView<'a>) -> Self {
        if let Some((_, tag)) = TYPE_PRECEDENCE.iter().find(|(name, _)| view.is_type(name)) {
            return tag.clone();
        }
        if let Some(first) = view.types.first() {
            return TypeTag::Declared(*first);
        }
        if !view.any_of.is_empty() {
            return TypeTag::AnyOf;
        }
        if !view.all_of.is_empty() {
            return TypeTag::AllOf;
        }
        if !view.one_of.is_empty() {
            return TypeTag::OneOf;
        }
        match view.format {
            Some(format) if !format.is_empty() => TypeTag::Format(format),
            _ => TypeTag::String,
        }
    }

    pub fn as_str(&self) -> &'a str {
        match self {
            TypeTag::Object => "object",
            TypeTag::Array => "array",
            TypeTag::String => "string",
            TypeTag::Number => "number",
            TypeTag::Integer => "integer",
            TypeTag::Boolean => "boolean",
            TypeTag::Declared(name) => *name,
            TypeTag::AnyOf => "anyOf",
            TypeTag::AllOf => "allOf",
            TypeTag::OneOf => "oneOf",
            TypeTag::Format(format) => *format,
        }
    }
}

impl fmt::Display for TypeTag<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a bare schema
pub fn classify_schema(schema: &Schema) -> TypeTag<'_> {
    TypeTag::classify(&SchemaView::of(schema))
}

/// The schema a parameter declares, if it declares one
pub fn parameter_schema(parameter: &Parameter) -> Option<SchemaLink<'_>> {
    match &parameter.parameter_data_ref().format {
        ParameterSchemaOrContent::Schema(schema) => Some(SchemaLink::from(schema)),
        ParameterSchemaOrContent::Content(_) => None,
    }
}
