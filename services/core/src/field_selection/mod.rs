pub mod converter;
pub mod error;
pub mod types;
pub mod values;

#[cfg(test)]
pub(crate) mod fixtures;

pub use converter::{convert, convert_to_json};
pub use error::ConvertError;
pub use types::{
    ArgumentMap, ConvertOptions, DirectiveMap, FieldRecord, FragmentMap, OperationKind, OperationRecord, ResolveInfo,
    VariableValues,
};
pub use values::variables_from_json;
