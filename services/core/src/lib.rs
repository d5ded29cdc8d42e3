pub mod field_selection;
pub mod schema;
pub mod telemetry;

pub use field_selection::{
    convert, convert_to_json, variables_from_json, ConvertError, ConvertOptions, FieldRecord, OperationKind,
    OperationRecord, ResolveInfo,
};
pub use schema::{CompositeType, SdlRegistry, TypeRegistry};
