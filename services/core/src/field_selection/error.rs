use thiserror::Error;

use super::types::OperationKind;

#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("Error matching query to schema: could not find type definition for field '{0}'")]
    SchemaMismatch(String),

    #[error("Schema has no root type for {0} operations.")]
    MissingRootType(OperationKind),

    #[error("Fragment {0} is not defined.")]
    UnknownFragment(String),

    #[error("Fragment {0} is spread within its own expansion.")]
    CyclicFragment(String),

    #[error("Document with multiple operations not supported without an operation name.")]
    MultiOperationsNotSupported,

    #[error("Operation {0} is not defined in the document.")]
    UnknownOperation(String),

    #[error("Failed rendering operation record as JSON.")]
    Serialization,
}

impl ConvertError {
    pub fn schema_mismatch(path: impl Into<String>) -> Self {
        ConvertError::SchemaMismatch(path.into())
    }
}
