//! The CRUD engine.
//!
//! Owns a table schema, a validator, a storage backend, and a token
//! source, and implements the record-storage operations on top of
//! them: create/read/update/delete, paginated batch read, unique-id
//! probing, key derivation, and best-effort audit logging.
//!
//! The engine holds no locks and keeps no per-operation state; all
//! suspension happens at backend I/O boundaries. Configuration is
//! immutable: the `with_*` builders consume the engine and return a
//! new one.

mod audit_log;
mod batch;
mod crud;

use std::sync::Arc;

use chrono::Utc;

use recordstore_core::schema::TableSchema;
use recordstore_core::storage::StorageBackend;
use recordstore_core::validation::{RuleValidator, Validator};
use recordstore_core::Record;

use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::token::{TokenSource, UuidTokenSource};

/// Maximum number of keys accepted by a single batch read.
pub const BATCH_LIMIT: usize = 100;

/// Number of candidate ids probed per unique-id generation round.
pub(crate) const GENERATED_ID_BATCH: usize = 5;

/// Ceiling on unprocessed-keys continuation rounds. Guards against a
/// backend that never drains its remainder.
pub(crate) const MAX_BATCH_GET_ROUNDS: usize = 32;

/// Engine-managed timestamp column touched by opt-in read marking.
pub const DATE_ACCESSED: &str = "dateAccessed";
/// Engine-managed creation timestamp column.
pub const DATE_CREATED: &str = "dateCreated";
/// Engine-managed modification timestamp column.
pub const DATE_MODIFIED: &str = "dateModified";

/// Schema-validated CRUD engine over a [`StorageBackend`].
#[derive(Clone)]
pub struct Engine {
    schema: Option<TableSchema>,
    config: EngineConfig,
    backend: Arc<dyn StorageBackend>,
    validator: Arc<dyn Validator>,
    tokens: Arc<dyn TokenSource>,
}

impl Engine {
    /// Creates an engine with the bundled rule validator and the UUID
    /// token source. No schema is bound yet; operations fail with
    /// `MissingTableException` until [`with_schema`](Self::with_schema)
    /// is used.
    pub fn new(config: EngineConfig, backend: Arc<dyn StorageBackend>) -> Self {
        Self {
            schema: None,
            config,
            backend,
            validator: Arc::new(RuleValidator::new()),
            tokens: Arc::new(UuidTokenSource),
        }
    }

    //----------------------------------------
    //-Builders-------------------------------
    //----------------------------------------

    /// Binds a table schema.
    pub fn with_schema(mut self, schema: TableSchema) -> Self {
        self.schema = Some(schema);
        self
    }

    /// Replaces the configuration.
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Replaces the storage backend.
    pub fn with_backend(mut self, backend: Arc<dyn StorageBackend>) -> Self {
        self.backend = backend;
        self
    }

    /// Replaces the validator.
    pub fn with_validator(mut self, validator: Arc<dyn Validator>) -> Self {
        self.validator = validator;
        self
    }

    /// Replaces the unique-string token source.
    pub fn with_token_source(mut self, tokens: Arc<dyn TokenSource>) -> Self {
        self.tokens = tokens;
        self
    }

    //----------------------------------------
    //-Getters--------------------------------
    //----------------------------------------

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn schema(&self) -> Option<&TableSchema> {
        self.schema.as_ref()
    }

    //----------------------------------------
    //-Utilities------------------------------
    //----------------------------------------

    /// Derives the record's key: the id column plus every other column
    /// flagged `key`, each defaulting to null when absent. Pure; never
    /// consults the backend.
    pub fn get_keys(&self, record: &Record) -> Result<Record> {
        Ok(self.bound_schema()?.derive_keys(record))
    }

    pub(crate) fn bound_schema(&self) -> Result<&TableSchema> {
        self.schema.as_ref().ok_or(EngineError::MissingTable)
    }

    /// Physical table name for the configured stage.
    pub(crate) fn table_name(&self) -> Result<String> {
        Ok(self
            .bound_schema()?
            .table_name(&self.config.stage)?
            .to_string())
    }

    pub(crate) fn backend(&self) -> &dyn StorageBackend {
        self.backend.as_ref()
    }

    pub(crate) fn validator(&self) -> &dyn Validator {
        self.validator.as_ref()
    }

    pub(crate) fn token(&self) -> String {
        self.tokens.token()
    }

    pub(crate) fn now() -> String {
        Utc::now().to_rfc3339()
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Shared fixtures for engine tests.

    use std::collections::BTreeMap;
    use std::sync::Arc;

    use recordstore_core::schema::{ColumnRule, ColumnType, TableSchema};

    use crate::storage::memory::InMemoryBackend;
    use crate::token::SequenceTokenSource;

    use super::*;

    pub const STAGE: &str = "staging";
    pub const TABLE: &str = "locations-staging";
    pub const LOG_TABLE: &str = "locations-log-staging";

    /// Schema with a prefixed id column and one plain column.
    pub fn schema(with_log_table: bool) -> TableSchema {
        let mut columns = BTreeMap::new();
        columns.insert("id".to_string(), ColumnRule::id("locationId", "loc_"));
        columns.insert(
            "name".to_string(),
            ColumnRule::new("locationName", ColumnType::String),
        );
        columns.insert(
            "bays".to_string(),
            ColumnRule::new("bayCount", ColumnType::Number),
        );

        let mut table_names = BTreeMap::new();
        table_names.insert(STAGE.to_string(), TABLE.to_string());

        let log_table_names = with_log_table.then(|| {
            let mut names = BTreeMap::new();
            names.insert(STAGE.to_string(), LOG_TABLE.to_string());
            names
        });

        TableSchema::new("locations", table_names, log_table_names, columns).unwrap()
    }

    /// Backend with the data table (and log table) registered.
    pub async fn backend(with_log_table: bool) -> Arc<InMemoryBackend> {
        let backend = InMemoryBackend::new();
        backend
            .create_table(TABLE, vec!["locationId".to_string()])
            .await;
        if with_log_table {
            backend
                .create_table(LOG_TABLE, vec!["logId".to_string()])
                .await;
        }
        Arc::new(backend)
    }

    /// Engine over the given backend with deterministic tokens.
    pub fn engine(backend: Arc<InMemoryBackend>, with_log_table: bool) -> Engine {
        Engine::new(EngineConfig::new(STAGE).with_service("wash"), backend)
            .with_schema(schema(with_log_table))
            .with_token_source(Arc::new(SequenceTokenSource::new()))
    }
}

#[cfg(test)]
mod tests {
    use recordstore_core::Value;

    use super::testing;
    use super::*;

    #[tokio::test]
    async fn test_get_keys_requires_bound_schema() {
        let engine = Engine::new(
            EngineConfig::new(testing::STAGE),
            testing::backend(false).await,
        );

        let result = engine.get_keys(&Record::new());

        assert_eq!(result, Err(EngineError::MissingTable));
    }

    #[tokio::test]
    async fn test_get_keys_projects_key_columns() {
        let engine = testing::engine(testing::backend(false).await, false);

        let mut record = Record::new();
        record.insert("locationId".to_string(), Value::from("loc_1"));
        record.insert("locationName".to_string(), Value::from("Main St"));

        let keys = engine.get_keys(&record).unwrap();

        assert_eq!(keys.len(), 1);
        assert_eq!(keys["locationId"], Value::from("loc_1"));
    }

    #[tokio::test]
    async fn test_table_name_unknown_stage_reads_as_missing_table() {
        let engine = testing::engine(testing::backend(false).await, false)
            .with_config(EngineConfig::new("production"));

        assert_eq!(engine.table_name(), Err(EngineError::MissingTable));
    }
}
