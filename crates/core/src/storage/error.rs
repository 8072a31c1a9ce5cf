use thiserror::Error;

/// Errors that can occur during storage backend operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StorageError {
    #[error("Table not found: {0}")]
    TableNotFound(String),
    #[error("Condition failed: {0}")]
    ConditionFailed(String),
    #[error("Query failed: {0}")]
    QueryFailed(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),
}

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_not_found_display() {
        let error = StorageError::TableNotFound("locations-staging".to_string());
        assert_eq!(error.to_string(), "Table not found: locations-staging");
    }

    #[test]
    fn test_query_failed_display() {
        let error = StorageError::QueryFailed("throughput exceeded".to_string());
        assert_eq!(error.to_string(), "Query failed: throughput exceeded");
    }
}
