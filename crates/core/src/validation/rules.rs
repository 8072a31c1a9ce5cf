//! Bundled rule validator.

use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::schema::{ColumnRule, ColumnType};
use crate::value::{Record, Value};

use super::{Result, ValidationError, Validator};

/// Validates records directly against their column rules.
///
/// Checks, per declared column:
/// - required columns are present and non-null,
/// - present values match the declared type,
/// - string values on a prefixed column start with that prefix.
///
/// Attributes without a declared column (the engine's timestamp columns
/// included) pass through untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleValidator;

impl RuleValidator {
    pub fn new() -> Self {
        Self
    }

    fn matches_type(value: &Value, column_type: ColumnType) -> bool {
        match column_type {
            ColumnType::Any => true,
            ColumnType::String => matches!(value, Value::String(_)),
            ColumnType::Number => matches!(value, Value::Number(_)),
            ColumnType::Bool => matches!(value, Value::Bool(_)),
            ColumnType::List => matches!(value, Value::List(_)),
            ColumnType::Map => matches!(value, Value::Map(_)),
        }
    }

    fn check_column(rule: &ColumnRule, value: Option<&Value>) -> Result<()> {
        let value = match value {
            None | Some(Value::Null) => {
                if rule.required {
                    return Err(ValidationError::MissingRequired {
                        column: rule.name.clone(),
                    });
                }
                return Ok(());
            }
            Some(value) => value,
        };

        if !Self::matches_type(value, rule.column_type) {
            return Err(ValidationError::WrongType {
                column: rule.name.clone(),
                expected: rule.column_type,
            });
        }

        if let (Some(prefix), Value::String(s)) = (&rule.prefix, value) {
            if !s.starts_with(prefix.as_str()) {
                return Err(ValidationError::PrefixMismatch {
                    column: rule.name.clone(),
                    prefix: prefix.clone(),
                });
            }
        }

        Ok(())
    }
}

#[async_trait]
impl Validator for RuleValidator {
    async fn validate(
        &self,
        record: &Record,
        columns: &BTreeMap<String, ColumnRule>,
    ) -> Result<Record> {
        for rule in columns.values() {
            Self::check_column(rule, record.get(&rule.name))?;
        }
        Ok(record.clone())
    }
}
