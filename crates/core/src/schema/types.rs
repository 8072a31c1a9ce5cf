//! Table schemas and column rules.
//!
//! A `TableSchema` is the static description of one logical table: its
//! per-stage physical names, an optional companion log table, and the
//! validation/key metadata for each column. Schemas are built once and
//! never mutated; the constructor enforces the id-column invariant.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::SchemaError;
use crate::value::{Record, Value};

/// Logical name of the mandatory id column.
pub const ID_COLUMN: &str = "id";

/// Declared type of a column's values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    String,
    Number,
    Bool,
    List,
    Map,
    /// No type constraint.
    Any,
}

/// Validation and key metadata for a single column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnRule {
    /// Physical attribute name; may differ from the logical map key.
    pub name: String,
    pub column_type: ColumnType,
    /// Required columns must be present and non-null.
    pub required: bool,
    /// Key columns form the record's composite identity.
    pub key: bool,
    /// Identifier namespace; only meaningful on the id column, where
    /// generated ids and stored values must start with it.
    pub prefix: Option<String>,
}

impl ColumnRule {
    /// A plain optional, non-key column of the given type.
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
            required: false,
            key: false,
            prefix: None,
        }
    }

    /// An id column rule: required, key, string, with the given prefix.
    pub fn id(name: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            column_type: ColumnType::String,
            required: true,
            key: true,
            prefix: Some(prefix.into()),
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn key(mut self) -> Self {
        self.key = true;
        self
    }
}

/// Static description of one logical table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    name: String,
    table_names: BTreeMap<String, String>,
    log_table_names: Option<BTreeMap<String, String>>,
    columns: BTreeMap<String, ColumnRule>,
}

impl TableSchema {
    /// Creates a schema, validating the id-column invariant: a column
    /// under the logical key `"id"`, marked required and key, with a
    /// non-empty prefix.
    pub fn new(
        name: impl Into<String>,
        table_names: BTreeMap<String, String>,
        log_table_names: Option<BTreeMap<String, String>>,
        columns: BTreeMap<String, ColumnRule>,
    ) -> Result<Self, SchemaError> {
        let name = name.into();

        let id = columns
            .get(ID_COLUMN)
            .ok_or_else(|| SchemaError::MissingIdColumn {
                schema: name.clone(),
                column: ID_COLUMN,
            })?;
        if !id.required || !id.key {
            return Err(SchemaError::IdColumnNotKey {
                schema: name.clone(),
            });
        }
        match &id.prefix {
            Some(prefix) if !prefix.is_empty() => {}
            _ => {
                return Err(SchemaError::MissingIdPrefix {
                    schema: name.clone(),
                })
            }
        }

        Ok(Self {
            name,
            table_names,
            log_table_names,
            columns,
        })
    }

    /// Logical schema identifier.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The id column's rule. Guaranteed present by construction.
    pub fn id_column(&self) -> &ColumnRule {
        &self.columns[ID_COLUMN]
    }

    /// The id column's prefix. Guaranteed non-empty by construction.
    pub fn id_prefix(&self) -> &str {
        self.id_column()
            .prefix
            .as_deref()
            .unwrap_or_default()
    }

    /// Physical table name for the given deployment stage.
    pub fn table_name(&self, stage: &str) -> Result<&str, SchemaError> {
        self.table_names
            .get(stage)
            .map(String::as_str)
            .ok_or_else(|| SchemaError::UnknownStage {
                schema: self.name.clone(),
                stage: stage.to_string(),
            })
    }

    /// Physical log table name for the given stage, if the schema
    /// declares a companion log table there.
    pub fn log_table_name(&self, stage: &str) -> Option<&str> {
        self.log_table_names
            .as_ref()
            .and_then(|names| names.get(stage))
            .map(String::as_str)
    }

    /// All declared columns, keyed by logical name.
    pub fn columns(&self) -> &BTreeMap<String, ColumnRule> {
        &self.columns
    }

    /// Columns marked as part of the composite key, id column included.
    pub fn key_columns(&self) -> impl Iterator<Item = (&str, &ColumnRule)> {
        self.columns
            .iter()
            .filter(|(_, rule)| rule.key)
            .map(|(logical, rule)| (logical.as_str(), rule))
    }

    /// Whether the given physical attribute name belongs to a key
    /// column. Undeclared attributes are never keys.
    pub fn is_key_attribute(&self, attribute: &str) -> bool {
        self.columns
            .values()
            .any(|rule| rule.key && rule.name == attribute)
    }

    /// Projects `record` onto the key columns: the id column first,
    /// then every other column flagged `key`, each defaulting to null
    /// when absent. Pure; never consults the backend.
    pub fn derive_keys(&self, record: &Record) -> Record {
        let mut keys = Record::new();

        let id = self.id_column();
        keys.insert(
            id.name.clone(),
            record.get(&id.name).cloned().unwrap_or(Value::Null),
        );

        for (logical, rule) in &self.columns {
            if logical == ID_COLUMN || !rule.key {
                continue;
            }
            keys.insert(
                rule.name.clone(),
                record.get(&rule.name).cloned().unwrap_or(Value::Null),
            );
        }

        keys
    }
}
