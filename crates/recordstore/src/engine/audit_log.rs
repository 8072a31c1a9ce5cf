//! Best-effort audit logging.

use recordstore_core::storage::PutRequest;
use recordstore_core::{trim_empty_strings, Record};

use crate::audit::{AuditEntry, CrudType};
use crate::error::{EngineError, Result};

use super::Engine;

impl Engine {
    /// Writes one audit entry to the schema's log table.
    ///
    /// Fails with `MissingTableException` when the schema declares no
    /// log table for the active stage, and with the translated backend
    /// error when the put itself fails. The CRUD operations treat both
    /// as advisory and resolve anyway; only direct callers of `log`
    /// see these errors.
    pub async fn log(&self, crud_type: CrudType, affected: &[Record]) -> Result<Record> {
        let schema = self.bound_schema()?;
        let source_table = self.table_name()?;

        let log_table = match schema.log_table_name(&self.config().stage) {
            Some(name) => name.to_string(),
            None => {
                tracing::debug!(
                    schema = schema.name(),
                    stage = %self.config().stage,
                    "no log table bound, skipping audit log"
                );
                return Err(EngineError::MissingTable);
            }
        };

        let affected_elements: Vec<Record> = affected.iter().map(trim_empty_strings).collect();
        let entry = AuditEntry::new(
            crud_type,
            source_table,
            affected_elements,
            self.config(),
            self.token(),
        );
        let item = entry.into_record();

        self.backend()
            .put(PutRequest {
                table_name: log_table,
                item: item.clone(),
            })
            .await?;

        Ok(item)
    }

    /// Audit logging is advisory, never load-bearing: failures are
    /// swallowed here and the parent operation resolves normally.
    pub(crate) async fn log_best_effort(&self, crud_type: CrudType, affected: &[Record]) {
        match self.log(crud_type, affected).await {
            Ok(_) => {}
            // Already traced as a skip inside log().
            Err(EngineError::MissingTable) => {}
            Err(error) => {
                tracing::warn!(%error, crud_type = %crud_type, "audit log write failed");
            }
        }
    }
}
