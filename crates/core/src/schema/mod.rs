mod error;
mod types;

pub use error::SchemaError;
pub use types::{ColumnRule, ColumnType, TableSchema, ID_COLUMN};
