use std::collections::hash_map::Entry;
use std::collections::HashMap;

use async_graphql_parser::types::{
    FieldDefinition as AstFieldDefinition, ServiceDocument, TypeDefinition, TypeKind, TypeSystemDefinition,
};
use async_graphql_parser::{parse_schema, Positioned};
use thiserror::Error;

use super::{CompositeKind, CompositeType, FieldDefinition, TypeRegistry};
use crate::field_selection::types::OperationKind;

#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("Failed parsing schema document: {0}")]
    Parse(#[from] async_graphql_parser::Error),
}

/// Type registry backed by a schema definition document.
///
/// Only composite types are kept. Type extensions are folded into the type they extend, and an
/// explicit `schema { ... }` definition takes precedence over the conventional root type names.
#[derive(Debug, Default)]
pub struct SdlRegistry {
    types: HashMap<String, SdlType>,
    roots: Option<RootTypes>,
}

#[derive(Debug)]
struct SdlType {
    kind: CompositeKind,
    fields: Vec<Positioned<AstFieldDefinition>>,
}

#[derive(Debug, Default)]
struct RootTypes {
    query: Option<String>,
    mutation: Option<String>,
    subscription: Option<String>,
}

impl SdlRegistry {
    pub fn parse(sdl: &str) -> Result<Self, SchemaError> {
        Ok(Self::from_document(parse_schema(sdl)?))
    }

    pub fn from_document(document: ServiceDocument) -> Self {
        let mut registry = SdlRegistry::default();
        for definition in document.definitions {
            match definition {
                TypeSystemDefinition::Schema(schema) => {
                    let schema = schema.node;
                    let roots = registry.roots.get_or_insert_with(RootTypes::default);
                    if let Some(query) = schema.query {
                        roots.query = Some(query.node.to_string());
                    }
                    if let Some(mutation) = schema.mutation {
                        roots.mutation = Some(mutation.node.to_string());
                    }
                    if let Some(subscription) = schema.subscription {
                        roots.subscription = Some(subscription.node.to_string());
                    }
                }
                TypeSystemDefinition::Type(ty) => registry.add_type(ty.node),
                TypeSystemDefinition::Directive(_) => {}
            }
        }

        tracing::debug!(types = registry.types.len(), "Loaded composite types from schema document.");
        registry
    }

    fn add_type(&mut self, definition: TypeDefinition) {
        let (kind, fields) = match definition.kind {
            TypeKind::Object(object) => (CompositeKind::Object, object.fields),
            TypeKind::Interface(interface) => (CompositeKind::Interface, interface.fields),
            TypeKind::Union(_) => (CompositeKind::Union, Vec::new()),
            _ => return,
        };

        match self.types.entry(definition.name.node.to_string()) {
            Entry::Occupied(mut entry) => entry.get_mut().fields.extend(fields),
            Entry::Vacant(entry) => {
                entry.insert(SdlType { kind, fields });
            }
        }
    }
}

impl TypeRegistry for SdlRegistry {
    fn resolve_named_type(&self, name: &str) -> Option<CompositeType<'_>> {
        let (name, ty) = self.types.get_key_value(name)?;
        let fields = ty.fields.iter().map(|field| FieldDefinition {
            name: field.node.name.node.as_str(),
            ty: &field.node.ty.node,
        });

        Some(CompositeType::new(name, ty.kind, fields))
    }

    fn resolve_root_type(&self, kind: OperationKind) -> Option<CompositeType<'_>> {
        let name = match &self.roots {
            Some(roots) => match kind {
                OperationKind::Query => roots.query.as_deref(),
                OperationKind::Mutation => roots.mutation.as_deref(),
                OperationKind::Subscription => roots.subscription.as_deref(),
            }?,
            None => kind.default_root_type_name(),
        };

        self.resolve_named_type(name)
    }
}

impl TryFrom<&str> for SdlRegistry {
    type Error = SchemaError;

    fn try_from(sdl: &str) -> Result<Self, Self::Error> {
        SdlRegistry::parse(sdl)
    }
}
