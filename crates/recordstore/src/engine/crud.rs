//! Create, read, update, and delete.

use std::collections::BTreeMap;

use futures_util::future::try_join_all;

use recordstore_core::storage::{
    Condition, DeleteRequest, PutRequest, ScanFilter, ScanOutput, ScanRequest, UpdateRequest,
};
use recordstore_core::{trim_empty_strings, Record, Value};

use crate::audit::CrudType;
use crate::error::{EngineError, Result};

use super::{Engine, DATE_ACCESSED, DATE_CREATED, DATE_MODIFIED};

impl Engine {
    /// Validates and stores a new record.
    ///
    /// Empty-string attributes are stripped first. When the input lacks
    /// the id column, a fresh collision-probed id is generated and
    /// injected before validation. Both timestamp columns are stamped
    /// to the same instant. The returned record echoes the stored
    /// server-assigned values; it is not a re-read.
    pub async fn create(&self, input: &Record) -> Result<Record> {
        let mut item = trim_empty_strings(input);
        let schema = self.bound_schema()?;
        let id_attribute = schema.id_column().name.clone();

        if !item.contains_key(&id_attribute) {
            let partial_key = schema.derive_keys(&item);
            let id = self.get_unique_id(&partial_key).await?;
            item.insert(id_attribute, Value::String(id));
        }

        let mut validated = self.validator().validate(&item, schema.columns()).await?;

        let now = Self::now();
        validated.insert(DATE_CREATED.to_string(), Value::String(now.clone()));
        validated.insert(DATE_MODIFIED.to_string(), Value::String(now));

        self.backend()
            .put(PutRequest {
                table_name: self.table_name()?,
                item: validated.clone(),
            })
            .await?;

        self.log_best_effort(CrudType::Create, std::slice::from_ref(&validated))
            .await;

        Ok(validated)
    }

    /// Filtered scan of the table, carrying the caller's conditions
    /// verbatim.
    ///
    /// With `mark_accessed` set, every returned record's `dateAccessed`
    /// is touched through the non-logging update path; the scan must
    /// then project at least the key columns. The flag defaults to off
    /// in every other engine path.
    pub async fn read(
        &self,
        filter: &ScanFilter,
        requested_attributes: Option<&[String]>,
        mark_accessed: bool,
    ) -> Result<ScanOutput> {
        let schema = self.bound_schema()?;

        let output = self
            .backend()
            .scan(ScanRequest {
                table_name: self.table_name()?,
                filter: filter.clone(),
                projection: requested_attributes.map(<[String]>::to_vec),
            })
            .await?;

        if mark_accessed {
            let touches: Vec<Record> = output
                .items
                .iter()
                .map(|item| {
                    let mut touch = schema.derive_keys(item);
                    touch.insert(DATE_ACCESSED.to_string(), Value::String(Self::now()));
                    touch
                })
                .collect();
            try_join_all(touches.iter().map(|touch| self.update_inner(touch, true))).await?;
        }

        self.log_best_effort(CrudType::Read, &output.items).await;

        Ok(output)
    }

    /// Patches an existing record by key, returning the post-update
    /// record.
    ///
    /// The existence check and the patch are not transactional: a
    /// concurrent writer can delete or mutate the record between the
    /// two backend calls.
    pub async fn update(&self, input: &Record) -> Result<Record> {
        self.update_inner(input, false).await
    }

    pub(crate) async fn update_inner(&self, input: &Record, skip_logging: bool) -> Result<Record> {
        let item = trim_empty_strings(input);
        let schema = self.bound_schema()?;

        let mut validated = self.validator().validate(&item, schema.columns()).await?;
        let key = schema.derive_keys(&validated);

        // Existence check: the key must identify exactly one record.
        let mut filter = ScanFilter::new();
        for (attribute, value) in &key {
            filter.insert(attribute.clone(), Condition::eq(value.clone()));
        }
        let existing = self
            .backend()
            .scan(ScanRequest {
                table_name: self.table_name()?,
                filter,
                projection: Some(vec![schema.id_column().name.clone()]),
            })
            .await?;
        if existing.count != 1 {
            return Err(EngineError::NoSingleItem);
        }

        // One assignment per caller-supplied non-key attribute, through
        // placeholders so physical names never hit reserved words.
        let mut assignments = Vec::new();
        let mut attribute_names = BTreeMap::new();
        let mut attribute_values = BTreeMap::new();
        let mut index = 0;
        validated.insert(DATE_MODIFIED.to_string(), Value::String(Self::now()));
        for (attribute, value) in &validated {
            if schema.is_key_attribute(attribute) {
                continue;
            }
            index += 1;
            let name_placeholder = format!("#{index}");
            let value_placeholder = format!(":{index}");
            assignments.push(format!("{name_placeholder} = {value_placeholder}"));
            attribute_names.insert(name_placeholder, attribute.clone());
            attribute_values.insert(value_placeholder, value.clone());
        }
        // The engine's own dateModified stamp never counts as a caller
        // update value.
        if assignments.len() <= 1 {
            return Err(EngineError::MissingUpdateValues);
        }

        let updated = self
            .backend()
            .update(UpdateRequest {
                table_name: self.table_name()?,
                key,
                update_expression: format!("SET {}", assignments.join(", ")),
                attribute_names,
                attribute_values,
            })
            .await?;

        if !skip_logging {
            self.log_best_effort(CrudType::Update, std::slice::from_ref(&updated))
                .await;
        }

        Ok(updated)
    }

    /// Deletes a record by its derived key, returning the pre-delete
    /// attributes (or `None` when no such record existed; deletes are
    /// unconditional per the backend contract).
    pub async fn delete(&self, input: &Record) -> Result<Option<Record>> {
        let item = trim_empty_strings(input);
        let schema = self.bound_schema()?;

        let validated = self.validator().validate(&item, schema.columns()).await?;
        let key = schema.derive_keys(&validated);

        let removed = self
            .backend()
            .delete(DeleteRequest {
                table_name: self.table_name()?,
                key,
            })
            .await?;

        let affected: Vec<Record> = removed.clone().into_iter().collect();
        self.log_best_effort(CrudType::Delete, &affected).await;

        Ok(removed)
    }
}
