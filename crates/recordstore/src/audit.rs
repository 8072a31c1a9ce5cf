//! Audit log entries.
//!
//! Every engine operation attempts to append one of these to the
//! schema's companion log table. Entries are append-only; the engine
//! never updates or deletes them.

use std::fmt;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use recordstore_core::{Record, Value};

use crate::config::EngineConfig;
use crate::engine::{DATE_CREATED, DATE_MODIFIED};

/// Sentinel for absent audit context.
pub const UNKNOWN: &str = "UNKNOWN";

/// The operation type recorded in an audit entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CrudType {
    Create,
    Read,
    Update,
    Delete,
    BatchRead,
}

impl fmt::Display for CrudType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CrudType::Create => "Create",
            CrudType::Read => "Read",
            CrudType::Update => "Update",
            CrudType::Delete => "Delete",
            CrudType::BatchRead => "BatchRead",
        };
        f.write_str(name)
    }
}

/// One audit log record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    /// `log_<token>-<epoch millis>`.
    pub log_id: String,
    /// Physical name of the table the operation ran against.
    pub table_name: String,
    pub crud_type: CrudType,
    /// Affected element(s), always normalized to a list.
    pub affected_elements: Vec<Record>,
    pub service: String,
    pub stage: String,
    pub call: String,
    pub user_data: Record,
    pub date_created: String,
    pub date_modified: String,
}

impl AuditEntry {
    /// Builds an entry for one operation, defaulting absent context to
    /// the `"UNKNOWN"` sentinel and stamping both timestamps to now.
    pub fn new(
        crud_type: CrudType,
        table_name: impl Into<String>,
        affected_elements: Vec<Record>,
        config: &EngineConfig,
        token: String,
    ) -> Self {
        let now = Utc::now();
        let stamp = now.to_rfc3339();

        Self {
            log_id: format!("log_{}-{}", token, now.timestamp_millis()),
            table_name: table_name.into(),
            crud_type,
            affected_elements,
            service: config.service.clone().unwrap_or_else(|| UNKNOWN.to_string()),
            stage: config.stage.clone(),
            call: config.call.clone().unwrap_or_else(|| UNKNOWN.to_string()),
            user_data: config.user_data.clone().unwrap_or_default(),
            date_created: stamp.clone(),
            date_modified: stamp,
        }
    }

    /// Flattens the entry into a record for the log-table put.
    pub fn into_record(self) -> Record {
        let mut record = Record::new();
        record.insert("logId".to_string(), Value::String(self.log_id));
        record.insert("tableName".to_string(), Value::String(self.table_name));
        record.insert(
            "crudType".to_string(),
            Value::String(self.crud_type.to_string()),
        );
        record.insert(
            "affectedElements".to_string(),
            Value::List(self.affected_elements.into_iter().map(Value::Map).collect()),
        );
        record.insert("service".to_string(), Value::String(self.service));
        record.insert("stage".to_string(), Value::String(self.stage));
        record.insert("call".to_string(), Value::String(self.call));
        record.insert("userData".to_string(), Value::Map(self.user_data));
        record.insert(DATE_CREATED.to_string(), Value::String(self.date_created));
        record.insert(DATE_MODIFIED.to_string(), Value::String(self.date_modified));
        record
    }
}
