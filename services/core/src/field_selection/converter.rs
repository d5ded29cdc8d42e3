use std::borrow::Cow;

use async_graphql_parser::types::{Field, Selection, SelectionSet, Type};
use indexmap::map::Entry;
use indexmap::IndexMap;
use log::{log_enabled, Level};

use super::error::ConvertError;
use super::types::{ConvertOptions, FieldRecord, FragmentMap, OperationKind, OperationRecord, ResolveInfo, VariableValues};
use super::values::{arguments_from_ast, directives_from_ast};
use crate::schema::{named_type, CompositeType, TypeRegistry};

const TYPENAME_FIELD: &str = "__typename";
const TYPENAME_TYPE: &str = "String!";

/// Converts the operation a resolver is executing into a tree of field records.
///
/// # Params
/// * `info` - the operation, its fragments, the schema and the bound variables
/// * `options` - which optional attributes to attach to every record
///
/// # Returns
/// The operation kind with the records selected at the root, or the first error hit while
/// walking the selections. Nothing is returned for a partially converted operation.
#[tracing::instrument(skip_all, fields(operation = %OperationKind::from(info.operation.ty)))]
pub fn convert<R: TypeRegistry>(info: &ResolveInfo<'_, R>, options: ConvertOptions) -> Result<OperationRecord, ConvertError> {
    let kind = OperationKind::from(info.operation.ty);
    let root_type = info
        .schema
        .resolve_root_type(kind)
        .ok_or(ConvertError::MissingRootType(kind))?;

    let converter = Converter {
        fragments: info.fragments,
        schema: info.schema,
        variables: info.variable_values,
        options,
    };
    let fields = converter.convert_selection_set(&info.operation.selection_set.node, &root_type, "", None, &mut vec![])?;
    let record = OperationRecord { operation: kind, fields };

    if log_enabled!(Level::Debug) {
        tracing::debug!(selections = %record, "Converted operation selections.");
    }

    Ok(record)
}

/// Same as [`convert`], rendered as a JSON string.
#[tracing::instrument(skip_all)]
pub fn convert_to_json<R: TypeRegistry>(info: &ResolveInfo<'_, R>, options: ConvertOptions) -> Result<String, ConvertError> {
    let record = convert(info, options)?;
    serde_json::to_string(&record).map_err(crate::simple_err_map!(
        "Failed serializing operation record.",
        ConvertError::Serialization
    ))
}

struct Converter<'a, R> {
    fragments: &'a FragmentMap,
    schema: &'a R,
    variables: Option<&'a VariableValues>,
    options: ConvertOptions,
}

impl<'a, R: TypeRegistry> Converter<'a, R> {
    /// Converts one selection set into the deduplicated records of its level.
    ///
    /// Fragments are expanded in place: their records are merged into this level exactly like
    /// sibling fields, tagged with the fragment's type condition. `expanding` holds the named
    /// fragments currently being expanded, from the root down to this level.
    fn convert_selection_set(
        &self,
        selection_set: &'a SelectionSet,
        parent_type: &CompositeType<'a>,
        parent_path: &str,
        fragment_type: Option<&'a str>,
        expanding: &mut Vec<&'a str>,
    ) -> Result<Vec<FieldRecord>, ConvertError> {
        let mut field_map: IndexMap<String, FieldRecord> = IndexMap::new();

        for selection in &selection_set.items {
            match &selection.node {
                Selection::Field(field) => {
                    let record = self.convert_field(&field.node, parent_type, parent_path, fragment_type, expanding)?;
                    self.merge_into(&mut field_map, record, parent_type, parent_path)?;
                }
                Selection::InlineFragment(fragment) => {
                    let fragment = &fragment.node;
                    let type_condition = fragment
                        .type_condition
                        .as_ref()
                        .map(|condition| condition.node.on.node.as_str())
                        .or(fragment_type);

                    tracing::trace!(type_condition = ?type_condition, "Expanding inline fragment.");
                    let records = self.convert_selection_set(
                        &fragment.selection_set.node,
                        parent_type,
                        parent_path,
                        type_condition,
                        expanding,
                    )?;
                    for record in records {
                        self.merge_into(&mut field_map, record, parent_type, parent_path)?;
                    }
                }
                Selection::FragmentSpread(spread) => {
                    let fragment_name = &spread.node.fragment_name.node;
                    if expanding.contains(&fragment_name.as_str()) {
                        return Err(ConvertError::CyclicFragment(fragment_name.to_string()));
                    }
                    let definition = &self
                        .fragments
                        .get(fragment_name)
                        .ok_or_else(|| ConvertError::UnknownFragment(fragment_name.to_string()))?
                        .node;
                    let type_condition = definition.type_condition.node.on.node.as_str();

                    tracing::trace!(fragment = %fragment_name, type_condition, "Expanding fragment spread.");
                    expanding.push(fragment_name.as_str());
                    let records = self.convert_selection_set(
                        &definition.selection_set.node,
                        parent_type,
                        parent_path,
                        Some(type_condition),
                        expanding,
                    );
                    expanding.pop();

                    for record in records? {
                        self.merge_into(&mut field_map, record, parent_type, parent_path)?;
                    }
                }
            }
        }

        Ok(field_map.into_values().collect())
    }

    fn convert_field(
        &self,
        field: &'a Field,
        parent_type: &CompositeType<'a>,
        parent_path: &str,
        fragment_type: Option<&'a str>,
        expanding: &mut Vec<&'a str>,
    ) -> Result<FieldRecord, ConvertError> {
        let name = field.name.node.as_str();
        let alias = field.alias.as_ref().map(|alias| alias.node.as_str());
        let path = join_path(parent_path, alias.unwrap_or(name));

        let mut record = FieldRecord::new(name);
        record.alias = alias.map(str::to_owned);
        record.fragment_type = fragment_type.map(str::to_owned);

        let owner = self.owner_type(parent_type, fragment_type);
        let declared = owner.as_deref().and_then(|owner| self.declared_type(owner, name));

        if !field.selection_set.node.items.is_empty() {
            let nested_type = declared
                .and_then(|ty| self.schema.resolve_named_type(named_type(ty)))
                .ok_or_else(|| ConvertError::schema_mismatch(&path))?;
            record.fields = Some(self.convert_selection_set(
                &field.selection_set.node,
                &nested_type,
                &path,
                None,
                expanding,
            )?);
        }

        let arguments = arguments_from_ast(&field.arguments, self.variables);
        if !arguments.is_empty() {
            record.arguments = Some(arguments);
        }
        let directives = directives_from_ast(&field.directives, self.variables);
        if !directives.is_empty() {
            record.directives = Some(directives);
        }

        if self.options.include_return_types {
            record.return_type = match declared {
                Some(ty) => Some(ty.to_string()),
                None if name == TYPENAME_FIELD => Some(TYPENAME_TYPE.to_owned()),
                None => None,
            };
        }
        if self.options.include_field_path {
            record.path = Some(path);
        }

        Ok(record)
    }

    /// Adds a record to the records of a level. A repeated record only contributes its nested
    /// selections; its own arguments, directives and tags are dropped.
    fn merge_into(
        &self,
        field_map: &mut IndexMap<String, FieldRecord>,
        record: FieldRecord,
        parent_type: &CompositeType<'a>,
        parent_path: &str,
    ) -> Result<(), ConvertError> {
        match field_map.entry(record.dedup_key(parent_type.name())) {
            Entry::Vacant(entry) => {
                entry.insert(record);
            }
            Entry::Occupied(mut entry) => {
                let existing = entry.get_mut();
                let Some(fields) = record.fields else { return Ok(()) };
                let Some(existing_fields) = existing.fields.take() else {
                    tracing::debug!(field = existing.alias_or_name(), "Discarded nested selections of a leaf field.");
                    return Ok(());
                };

                let path = join_path(parent_path, existing.alias_or_name());
                let nested_type = self.nested_type(parent_type, existing, &path)?;
                existing.fields = Some(self.merge_field_lists(existing_fields, fields, &nested_type, &path)?);
            }
        }

        Ok(())
    }

    /// Merges two record lists of the same field, keyed by alias-or-name. Items present on both
    /// sides are merged depth-first when the first one has nested selections and both carry the
    /// same fragment tag. Otherwise the second one replaces the first in place.
    fn merge_field_lists(
        &self,
        first: Vec<FieldRecord>,
        second: Vec<FieldRecord>,
        parent_type: &CompositeType<'a>,
        parent_path: &str,
    ) -> Result<Vec<FieldRecord>, ConvertError> {
        let mut merged: IndexMap<String, FieldRecord> = first
            .into_iter()
            .map(|record| (record.alias_or_name().to_owned(), record))
            .collect();

        for record in second {
            match merged.entry(record.alias_or_name().to_owned()) {
                Entry::Vacant(entry) => {
                    entry.insert(record);
                }
                Entry::Occupied(mut entry) => {
                    let existing = entry.get_mut();
                    if existing.fragment_type != record.fragment_type {
                        *existing = record;
                        continue;
                    }
                    match existing.fields.take() {
                        Some(existing_fields) => {
                            let path = join_path(parent_path, existing.alias_or_name());
                            let nested_type = self.nested_type(parent_type, existing, &path)?;
                            existing.fields = Some(self.merge_field_lists(
                                existing_fields,
                                record.fields.unwrap_or_default(),
                                &nested_type,
                                &path,
                            )?);
                        }
                        None => *existing = record,
                    }
                }
            }
        }

        Ok(merged.into_values().collect())
    }

    /// The type declaring a field: the fragment's type condition when the field was selected
    /// inside a fragment, the enclosing type otherwise.
    fn owner_type<'p>(
        &self,
        parent_type: &'p CompositeType<'a>,
        fragment_type: Option<&str>,
    ) -> Option<Cow<'p, CompositeType<'a>>> {
        match fragment_type {
            Some(name) => self.schema.resolve_named_type(name).map(Cow::Owned),
            None => Some(Cow::Borrowed(parent_type)),
        }
    }

    fn declared_type(&self, owner: &CompositeType<'a>, field_name: &str) -> Option<&'a Type> {
        owner.field(field_name).map(|field| field.ty)
    }

    fn nested_type(
        &self,
        parent_type: &CompositeType<'a>,
        record: &FieldRecord,
        path: &str,
    ) -> Result<CompositeType<'a>, ConvertError> {
        self.owner_type(parent_type, record.fragment_type.as_deref())
            .and_then(|owner| self.declared_type(&owner, &record.name))
            .and_then(|ty| self.schema.resolve_named_type(named_type(ty)))
            .ok_or_else(|| ConvertError::schema_mismatch(path))
    }
}

fn join_path(parent_path: &str, segment: &str) -> String {
    if parent_path.is_empty() {
        segment.to_owned()
    } else {
        format!("{parent_path}.{segment}")
    }
}
