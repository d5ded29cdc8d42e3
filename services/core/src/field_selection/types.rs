use std::collections::HashMap;
use std::fmt::{Display, Formatter, Result as FmtResult};

use async_graphql_parser::types::{
    DocumentOperations, ExecutableDocument, FragmentDefinition, OperationDefinition, OperationType,
};
use async_graphql_parser::Positioned;
use async_graphql_value::{ConstValue, Name};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

use super::error::ConvertError;
use crate::schema::TypeRegistry;

/// Run-time values bound to the operation's variables, keyed by variable name.
pub type VariableValues = IndexMap<String, ConstValue>;

pub type ArgumentMap = IndexMap<String, ConstValue>;

pub type DirectiveMap = IndexMap<String, ArgumentMap>;

pub type FragmentMap = HashMap<Name, Positioned<FragmentDefinition>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    Query,
    Mutation,
    Subscription,
}

/// Flags controlling which optional attributes end up in the field records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TypedBuilder)]
#[serde(default, rename_all = "camelCase")]
pub struct ConvertOptions {
    #[builder(default = false)]
    pub include_field_path: bool,

    #[builder(default = false)]
    pub include_return_types: bool,
}

/// Everything a field resolver knows about the operation being executed.
#[derive(TypedBuilder)]
pub struct ResolveInfo<'a, R> {
    pub operation: &'a OperationDefinition,

    pub fragments: &'a FragmentMap,

    pub schema: &'a R,

    #[builder(default, setter(strip_option))]
    pub variable_values: Option<&'a VariableValues>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationRecord {
    pub operation: OperationKind,
    pub fields: Vec<FieldRecord>,
}

/// One selected field. Optional attributes are left out of the serialized form when absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldRecord {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fragment_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<FieldRecord>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arguments: Option<ArgumentMap>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directives: Option<DirectiveMap>,
}

impl OperationKind {
    pub fn default_root_type_name(&self) -> &'static str {
        match self {
            OperationKind::Query => "Query",
            OperationKind::Mutation => "Mutation",
            OperationKind::Subscription => "Subscription",
        }
    }
}

impl From<OperationType> for OperationKind {
    fn from(operation_type: OperationType) -> Self {
        match operation_type {
            OperationType::Query => OperationKind::Query,
            OperationType::Mutation => OperationKind::Mutation,
            OperationType::Subscription => OperationKind::Subscription,
        }
    }
}

impl<'a, R: TypeRegistry> ResolveInfo<'a, R> {
    /// Builds the resolve info for one operation of a parsed document.
    ///
    /// Without an `operation_name` the document must hold exactly one operation.
    pub fn from_document(
        document: &'a ExecutableDocument,
        operation_name: Option<&str>,
        schema: &'a R,
        variable_values: Option<&'a VariableValues>,
    ) -> Result<Self, ConvertError> {
        let operation = match (&document.operations, operation_name) {
            (DocumentOperations::Single(operation), _) => operation,
            (DocumentOperations::Multiple(operations), Some(name)) => operations
                .get(&Name::new(name))
                .ok_or_else(|| ConvertError::UnknownOperation(name.to_string()))?,
            (DocumentOperations::Multiple(operations), None) if operations.len() == 1 => operations
                .values()
                .next()
                .ok_or(ConvertError::MultiOperationsNotSupported)?,
            (DocumentOperations::Multiple(_), None) => return Err(ConvertError::MultiOperationsNotSupported),
        };

        Ok(ResolveInfo {
            operation: &operation.node,
            fragments: &document.fragments,
            schema,
            variable_values,
        })
    }
}

impl FieldRecord {
    pub fn new(name: impl Into<String>) -> Self {
        FieldRecord {
            name: name.into(),
            alias: None,
            fragment_type: None,
            path: None,
            return_type: None,
            fields: None,
            arguments: None,
            directives: None,
        }
    }

    pub fn alias_or_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }

    /// Key deciding whether two selections of one level are the same output field. Fields of
    /// fragments on different types stay apart even when they share a name.
    pub fn dedup_key(&self, parent_type_name: &str) -> String {
        format!(
            "{}.{}",
            self.alias_or_name(),
            self.fragment_type.as_deref().unwrap_or(parent_type_name)
        )
    }
}

impl Display for OperationKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            OperationKind::Query => write!(f, "query"),
            OperationKind::Mutation => write!(f, "mutation"),
            OperationKind::Subscription => write!(f, "subscription"),
        }
    }
}

impl Display for OperationRecord {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{} {{ {} }}", self.operation, join(&self.fields))
    }
}

impl Display for FieldRecord {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        if let Some(alias) = &self.alias {
            write!(f, "{alias}: ")?;
        }
        write!(f, "{}", self.name)?;

        if let Some(arguments) = &self.arguments {
            let mut joined_args = String::default();
            let mut it = arguments.iter().peekable();
            while let Some((name, value)) = it.next() {
                joined_args.push_str(&format!("{name}: {value}{}", if it.peek().is_some() { ", " } else { "" }));
            }
            write!(f, "({joined_args})")?;
        }

        if let Some(fields) = &self.fields {
            write!(f, " {{ {} }}", join(fields))?;
        }

        Ok(())
    }
}

fn join(fields: &[FieldRecord]) -> String {
    fields.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
}
