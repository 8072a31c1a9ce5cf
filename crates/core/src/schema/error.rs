use thiserror::Error;

/// Errors that can occur when constructing a table schema.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("Schema '{schema}' declares no '{column}' column")]
    MissingIdColumn { schema: String, column: &'static str },
    #[error("Schema '{schema}': the id column must be marked required and key")]
    IdColumnNotKey { schema: String },
    #[error("Schema '{schema}': the id column must carry a non-empty prefix")]
    MissingIdPrefix { schema: String },
    #[error("Schema '{schema}' has no table name for stage '{stage}'")]
    UnknownStage { schema: String, stage: String },
}
