pub mod sdl;

use async_graphql_parser::types::{BaseType, Type};

use crate::field_selection::types::OperationKind;

pub use sdl::{SchemaError, SdlRegistry};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompositeKind {
    Object,
    Interface,
    Union,
}

/// A field declared on a composite type, with its type exactly as written in the schema.
#[derive(Debug, Clone, Copy)]
pub struct FieldDefinition<'a> {
    pub name: &'a str,
    pub ty: &'a Type,
}

/// View over an object, interface or union type of a schema.
#[derive(Debug, Clone)]
pub struct CompositeType<'a> {
    name: &'a str,
    kind: CompositeKind,
    fields: Vec<FieldDefinition<'a>>,
}

/// The schema capabilities the selection converter relies on.
///
/// `resolve_named_type` only ever yields composite types: looking up a scalar, enum or input
/// type must return `None`.
pub trait TypeRegistry {
    fn resolve_named_type(&self, name: &str) -> Option<CompositeType<'_>>;

    fn resolve_root_type(&self, kind: OperationKind) -> Option<CompositeType<'_>> {
        self.resolve_named_type(kind.default_root_type_name())
    }
}

impl<'a> CompositeType<'a> {
    pub fn new(name: &'a str, kind: CompositeKind, fields: impl IntoIterator<Item = FieldDefinition<'a>>) -> Self {
        CompositeType {
            name,
            kind,
            fields: fields.into_iter().collect(),
        }
    }

    pub fn name(&self) -> &'a str {
        self.name
    }

    pub fn kind(&self) -> CompositeKind {
        self.kind
    }

    pub fn fields(&self) -> &[FieldDefinition<'a>] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldDefinition<'a>> {
        self.fields.iter().find(|field| field.name == name)
    }
}

/// Name of the innermost named type, with list and non-null wrappers removed.
pub fn named_type(ty: &Type) -> &str {
    match &ty.base {
        BaseType::Named(name) => name.as_str(),
        BaseType::List(inner) => named_type(inner),
    }
}
