use thiserror::Error;

use crate::schema::ColumnType;

/// Errors produced when a record fails its column rules.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Required column '{column}' is missing or null")]
    MissingRequired { column: String },
    #[error("Column '{column}' does not match the declared type {expected:?}")]
    WrongType {
        column: String,
        expected: ColumnType,
    },
    #[error("Column '{column}' must start with prefix '{prefix}'")]
    PrefixMismatch { column: String, prefix: String },
}

/// Result type for validation.
pub type Result<T> = std::result::Result<T, ValidationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_required_display() {
        let error = ValidationError::MissingRequired {
            column: "locationId".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Required column 'locationId' is missing or null"
        );
    }

    #[test]
    fn test_prefix_mismatch_display() {
        let error = ValidationError::PrefixMismatch {
            column: "locationId".to_string(),
            prefix: "loc_".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Column 'locationId' must start with prefix 'loc_'"
        );
    }
}
