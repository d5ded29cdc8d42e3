use std::convert::Infallible;

use async_graphql_parser::types::Directive;
use async_graphql_parser::Positioned;
use async_graphql_value::{ConstValue, Name, Value};

use super::types::{ArgumentMap, DirectiveMap, VariableValues};

/// Extracts the argument literals of a field or directive, in source order.
pub fn arguments_from_ast(
    arguments: &[(Positioned<Name>, Positioned<Value>)],
    variables: Option<&VariableValues>,
) -> ArgumentMap {
    arguments
        .iter()
        .map(|(name, value)| (name.node.to_string(), value_from_ast(&value.node, variables)))
        .collect()
}

/// Maps every directive name to its extracted arguments. A repeated directive keeps the
/// arguments of its last occurrence.
pub fn directives_from_ast(directives: &[Positioned<Directive>], variables: Option<&VariableValues>) -> DirectiveMap {
    directives
        .iter()
        .map(|directive| {
            let directive = &directive.node;
            (
                directive.name.node.to_string(),
                arguments_from_ast(&directive.arguments, variables),
            )
        })
        .collect()
}

/// Untyped literal extraction.
///
/// Variables are replaced by their bound value as-is, with no coercion against the declared
/// variable type. Enum literals become plain strings. An unbound variable yields `null`.
pub fn value_from_ast(value: &Value, variables: Option<&VariableValues>) -> ConstValue {
    match value {
        Value::Variable(name) => bound_variable(name, variables),
        Value::Null => ConstValue::Null,
        Value::Number(n) => ConstValue::Number(n.clone()),
        Value::String(s) => ConstValue::String(s.clone()),
        Value::Boolean(b) => ConstValue::Boolean(*b),
        Value::Enum(name) => ConstValue::String(name.to_string()),
        Value::List(items) => ConstValue::List(items.iter().map(|item| value_from_ast(item, variables)).collect()),
        Value::Object(fields) => ConstValue::Object(
            fields
                .iter()
                .map(|(name, value)| (name.clone(), value_from_ast(value, variables)))
                .collect(),
        ),
        // binary payloads
        other => other
            .clone()
            .into_const_with(|name| Ok::<_, Infallible>(bound_variable(&name, variables)))
            .unwrap_or(ConstValue::Null),
    }
}

/// Builds variable values from a JSON object. Anything but an object yields no variables.
pub fn variables_from_json(json: serde_json::Value) -> VariableValues {
    match serde_json::from_value::<ConstValue>(json) {
        Ok(ConstValue::Object(fields)) => fields
            .into_iter()
            .map(|(name, value)| (name.to_string(), value))
            .collect(),
        Ok(other) => {
            tracing::warn!(value = %other, "Variable values must be an object, ignoring them.");
            VariableValues::default()
        }
        Err(e) => {
            tracing::warn!(error = ?e, "Variable values are not valid GraphQL values, ignoring them.");
            VariableValues::default()
        }
    }
}

fn bound_variable(name: &Name, variables: Option<&VariableValues>) -> ConstValue {
    match variables.and_then(|variables| variables.get(name.as_str())) {
        Some(value) => value.clone(),
        None => {
            tracing::debug!(variable = %name, "Extracted unbound variable as null.");
            ConstValue::Null
        }
    }
}
