//! In-memory backend implementation.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use recordstore_core::storage::{
    BatchGetOutput, BatchGetRequest, Comparison, Condition, DeleteRequest, KeysAndProjection,
    PutRequest, Result, ScanOutput, ScanRequest, StorageBackend, StorageError, UpdateRequest,
};
use recordstore_core::{Record, Value};

#[derive(Debug, Clone, Default)]
struct TableData {
    key_attributes: Vec<String>,
    items: BTreeMap<String, Record>,
}

/// In-memory storage backend.
///
/// Tables must be registered with [`create_table`](Self::create_table)
/// before use; operations against unregistered tables fail with
/// `TableNotFound`.
#[derive(Debug, Clone, Default)]
pub struct InMemoryBackend {
    tables: Arc<RwLock<HashMap<String, TableData>>>,
    failing: Arc<RwLock<HashSet<String>>>,
    batch_get_calls: Arc<AtomicUsize>,
    /// When set, `batch_get` satisfies at most this many keys per
    /// round and reports the rest as unprocessed.
    batch_page_size: Option<usize>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Caps `batch_get` rounds at `page_size` keys per table, forcing
    /// unprocessed-keys continuation.
    pub fn with_batch_page_size(mut self, page_size: usize) -> Self {
        self.batch_page_size = Some(page_size);
        self
    }

    /// Registers a table and the attributes forming its key.
    pub async fn create_table(&self, name: impl Into<String>, key_attributes: Vec<String>) {
        self.tables.write().await.insert(
            name.into(),
            TableData {
                key_attributes,
                items: BTreeMap::new(),
            },
        );
    }

    /// Makes every subsequent operation against `name` fail.
    pub async fn fail_table(&self, name: impl Into<String>) {
        self.failing.write().await.insert(name.into());
    }

    /// Inserts a record directly, bypassing failure injection.
    pub async fn seed(&self, table_name: &str, record: Record) {
        let mut tables = self.tables.write().await;
        let table = tables
            .get_mut(table_name)
            .unwrap_or_else(|| panic!("seed: unknown table {table_name}"));
        let key = key_string(&table.key_attributes, &record)
            .unwrap_or_else(|error| panic!("seed: {error}"));
        table.items.insert(key, record);
    }

    /// Number of `batch_get` calls served so far.
    pub fn batch_get_calls(&self) -> usize {
        self.batch_get_calls.load(AtomicOrdering::Relaxed)
    }

    async fn check_failing(&self, table_name: &str) -> Result<()> {
        if self.failing.read().await.contains(table_name) {
            return Err(StorageError::QueryFailed(format!(
                "injected failure for table {table_name}"
            )));
        }
        Ok(())
    }
}

/// Canonical string form of a record's key attributes. Non-finite
/// numbers have no canonical JSON form (serde_json writes them as
/// null), so they are rejected rather than collapsed onto a shared key.
fn key_string(key_attributes: &[String], record: &Record) -> Result<String> {
    let projected: Vec<&Value> = key_attributes
        .iter()
        .map(|attribute| record.get(attribute).unwrap_or(&Value::Null))
        .collect();
    for value in &projected {
        if has_non_finite(value) {
            return Err(StorageError::Serialization(
                "non-finite number in key attribute".to_string(),
            ));
        }
    }
    serde_json::to_string(&projected)
        .map_err(|error| StorageError::Serialization(format!("unserializable key: {error}")))
}

fn has_non_finite(value: &Value) -> bool {
    match value {
        Value::Number(n) => !n.is_finite(),
        Value::List(values) => values.iter().any(has_non_finite),
        Value::Map(map) => map.values().any(has_non_finite),
        _ => false,
    }
}

fn project(record: &Record, projection: Option<&[String]>) -> Record {
    match projection {
        None => record.clone(),
        Some(attributes) => record
            .iter()
            .filter(|(name, _)| attributes.iter().any(|attribute| attribute == *name))
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect(),
    }
}

fn compare(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(a), Value::Number(b)) => a.partial_cmp(b),
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

fn matches(record: &Record, attribute: &str, condition: &Condition) -> bool {
    let value = match record.get(attribute) {
        Some(value) => value,
        None => return false,
    };
    let operand = match condition.values.first() {
        Some(operand) => operand,
        None => return false,
    };

    match condition.comparison {
        Comparison::Eq => value == operand,
        Comparison::Ne => value != operand,
        Comparison::Lt => compare(value, operand) == Some(Ordering::Less),
        Comparison::Le => matches!(
            compare(value, operand),
            Some(Ordering::Less) | Some(Ordering::Equal)
        ),
        Comparison::Gt => compare(value, operand) == Some(Ordering::Greater),
        Comparison::Ge => matches!(
            compare(value, operand),
            Some(Ordering::Greater) | Some(Ordering::Equal)
        ),
        Comparison::BeginsWith => match (value, operand) {
            (Value::String(value), Value::String(prefix)) => value.starts_with(prefix.as_str()),
            _ => false,
        },
        Comparison::Contains => match (value, operand) {
            (Value::String(value), Value::String(needle)) => value.contains(needle.as_str()),
            (Value::List(values), operand) => values.iter().any(|value| value == operand),
            _ => false,
        },
    }
}

#[async_trait]
impl StorageBackend for InMemoryBackend {
    async fn put(&self, request: PutRequest) -> Result<Option<Record>> {
        self.check_failing(&request.table_name).await?;
        let mut tables = self.tables.write().await;
        let table = tables
            .get_mut(&request.table_name)
            .ok_or_else(|| StorageError::TableNotFound(request.table_name.clone()))?;

        let key = key_string(&table.key_attributes, &request.item)?;
        Ok(table.items.insert(key, request.item))
    }

    async fn scan(&self, request: ScanRequest) -> Result<ScanOutput> {
        self.check_failing(&request.table_name).await?;
        let tables = self.tables.read().await;
        let table = tables
            .get(&request.table_name)
            .ok_or_else(|| StorageError::TableNotFound(request.table_name.clone()))?;

        let items: Vec<Record> = table
            .items
            .values()
            .filter(|record| {
                request
                    .filter
                    .iter()
                    .all(|(attribute, condition)| matches(record, attribute, condition))
            })
            .map(|record| project(record, request.projection.as_deref()))
            .collect();

        Ok(ScanOutput {
            count: items.len(),
            items,
        })
    }

    async fn update(&self, request: UpdateRequest) -> Result<Record> {
        self.check_failing(&request.table_name).await?;
        let mut tables = self.tables.write().await;
        let table = tables
            .get_mut(&request.table_name)
            .ok_or_else(|| StorageError::TableNotFound(request.table_name.clone()))?;

        let key = key_string(&table.key_attributes, &request.key)?;
        // Like DynamoDB, an update against an absent key creates the
        // item from the key plus the patch.
        let mut record = table
            .items
            .get(&key)
            .cloned()
            .unwrap_or_else(|| request.key.clone());

        for (name_placeholder, attribute) in &request.attribute_names {
            let value_placeholder = name_placeholder.replacen('#', ":", 1);
            let value = request
                .attribute_values
                .get(&value_placeholder)
                .ok_or_else(|| {
                    StorageError::Serialization(format!(
                        "no value bound for placeholder {value_placeholder}"
                    ))
                })?;
            record.insert(attribute.clone(), value.clone());
        }

        table.items.insert(key, record.clone());
        Ok(record)
    }

    async fn delete(&self, request: DeleteRequest) -> Result<Option<Record>> {
        self.check_failing(&request.table_name).await?;
        let mut tables = self.tables.write().await;
        let table = tables
            .get_mut(&request.table_name)
            .ok_or_else(|| StorageError::TableNotFound(request.table_name.clone()))?;

        let key = key_string(&table.key_attributes, &request.key)?;
        Ok(table.items.remove(&key))
    }

    async fn batch_get(&self, request: BatchGetRequest) -> Result<BatchGetOutput> {
        self.batch_get_calls.fetch_add(1, AtomicOrdering::Relaxed);

        let tables = self.tables.read().await;
        let mut responses = BTreeMap::new();
        let mut unprocessed = BTreeMap::new();

        for (table_name, keys_and_projection) in request.requests {
            self.check_failing(&table_name).await?;
            let table = tables
                .get(&table_name)
                .ok_or_else(|| StorageError::TableNotFound(table_name.clone()))?;

            let keys = keys_and_projection.keys;
            let projection = keys_and_projection.projection;

            let served = match self.batch_page_size {
                Some(page_size) => page_size.min(keys.len()),
                None => keys.len(),
            };

            let mut records = Vec::new();
            for key in &keys[..served] {
                let key = key_string(&table.key_attributes, key)?;
                if let Some(record) = table.items.get(&key) {
                    records.push(project(record, projection.as_deref()));
                }
            }
            responses.insert(table_name.clone(), records);

            if served < keys.len() {
                unprocessed.insert(
                    table_name,
                    KeysAndProjection {
                        keys: keys[served..].to_vec(),
                        projection,
                    },
                );
            }
        }

        Ok(BatchGetOutput {
            responses,
            unprocessed_keys: (!unprocessed.is_empty()).then_some(unprocessed),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, name: &str) -> Record {
        let mut record = Record::new();
        record.insert("locationId".to_string(), Value::from(id));
        record.insert("locationName".to_string(), Value::from(name));
        record
    }

    async fn backend() -> InMemoryBackend {
        let backend = InMemoryBackend::new();
        backend
            .create_table("locations", vec!["locationId".to_string()])
            .await;
        backend
    }

    #[tokio::test]
    async fn test_put_returns_previous_item() {
        let backend = backend().await;

        let first = backend
            .put(PutRequest {
                table_name: "locations".to_string(),
                item: record("loc_1", "Main St"),
            })
            .await
            .unwrap();
        assert_eq!(first, None);

        let second = backend
            .put(PutRequest {
                table_name: "locations".to_string(),
                item: record("loc_1", "Elm St"),
            })
            .await
            .unwrap();
        assert_eq!(second, Some(record("loc_1", "Main St")));
    }

    #[tokio::test]
    async fn test_unknown_table_fails() {
        let backend = backend().await;

        let result = backend
            .put(PutRequest {
                table_name: "nope".to_string(),
                item: record("loc_1", "Main St"),
            })
            .await;

        assert_eq!(result, Err(StorageError::TableNotFound("nope".to_string())));
    }

    #[tokio::test]
    async fn test_scan_filters_and_projects() {
        let backend = backend().await;
        backend.seed("locations", record("loc_1", "Main St")).await;
        backend.seed("locations", record("loc_2", "Elm St")).await;

        let mut filter = BTreeMap::new();
        filter.insert("locationName".to_string(), Condition::eq("Elm St"));

        let output = backend
            .scan(ScanRequest {
                table_name: "locations".to_string(),
                filter,
                projection: Some(vec!["locationId".to_string()]),
            })
            .await
            .unwrap();

        assert_eq!(output.count, 1);
        assert_eq!(output.items[0].len(), 1);
        assert_eq!(output.items[0]["locationId"], Value::from("loc_2"));
    }

    #[tokio::test]
    async fn test_scan_comparisons() {
        let backend = backend().await;
        let mut item = record("loc_1", "Main St");
        item.insert("bayCount".to_string(), Value::from(4.0));
        backend.seed("locations", item).await;

        let cases = [
            (Comparison::Ge, Value::from(4.0), 1),
            (Comparison::Gt, Value::from(4.0), 0),
            (Comparison::Lt, Value::from(10.0), 1),
            (Comparison::Ne, Value::from(3.0), 1),
        ];
        for (comparison, operand, expected) in cases {
            let mut filter = BTreeMap::new();
            filter.insert(
                "bayCount".to_string(),
                Condition {
                    comparison,
                    values: vec![operand],
                },
            );
            let output = backend
                .scan(ScanRequest {
                    table_name: "locations".to_string(),
                    filter,
                    projection: None,
                })
                .await
                .unwrap();
            assert_eq!(output.count, expected, "{comparison:?}");
        }
    }

    #[tokio::test]
    async fn test_scan_begins_with() {
        let backend = backend().await;
        backend.seed("locations", record("loc_1", "Main St")).await;
        backend.seed("locations", record("usr_1", "Elm St")).await;

        let mut filter = BTreeMap::new();
        filter.insert(
            "locationId".to_string(),
            Condition {
                comparison: Comparison::BeginsWith,
                values: vec![Value::from("loc_")],
            },
        );

        let output = backend
            .scan(ScanRequest {
                table_name: "locations".to_string(),
                filter,
                projection: None,
            })
            .await
            .unwrap();

        assert_eq!(output.count, 1);
    }

    #[tokio::test]
    async fn test_update_patches_by_placeholder() {
        let backend = backend().await;
        backend.seed("locations", record("loc_1", "Main St")).await;

        let mut key = Record::new();
        key.insert("locationId".to_string(), Value::from("loc_1"));
        let mut attribute_names = BTreeMap::new();
        attribute_names.insert("#1".to_string(), "locationName".to_string());
        let mut attribute_values = BTreeMap::new();
        attribute_values.insert(":1".to_string(), Value::from("Elm St"));

        let updated = backend
            .update(UpdateRequest {
                table_name: "locations".to_string(),
                key,
                update_expression: "SET #1 = :1".to_string(),
                attribute_names,
                attribute_values,
            })
            .await
            .unwrap();

        assert_eq!(updated["locationName"], Value::from("Elm St"));
        assert_eq!(updated["locationId"], Value::from("loc_1"));
    }

    #[tokio::test]
    async fn test_delete_is_unconditional() {
        let backend = backend().await;
        backend.seed("locations", record("loc_1", "Main St")).await;

        let mut key = Record::new();
        key.insert("locationId".to_string(), Value::from("loc_1"));

        let removed = backend
            .delete(DeleteRequest {
                table_name: "locations".to_string(),
                key: key.clone(),
            })
            .await
            .unwrap();
        assert_eq!(removed, Some(record("loc_1", "Main St")));

        let again = backend
            .delete(DeleteRequest {
                table_name: "locations".to_string(),
                key,
            })
            .await
            .unwrap();
        assert_eq!(again, None);
    }

    #[tokio::test]
    async fn test_batch_get_pages_unprocessed_keys() {
        let backend = InMemoryBackend::new().with_batch_page_size(2);
        backend
            .create_table("locations", vec!["locationId".to_string()])
            .await;
        for i in 0..3 {
            backend
                .seed("locations", record(&format!("loc_{i}"), "x"))
                .await;
        }

        let keys: Vec<Record> = (0..3)
            .map(|i| {
                let mut key = Record::new();
                key.insert("locationId".to_string(), Value::from(format!("loc_{i}")));
                key
            })
            .collect();
        let mut requests = BTreeMap::new();
        requests.insert(
            "locations".to_string(),
            KeysAndProjection {
                keys,
                projection: None,
            },
        );

        let output = backend.batch_get(BatchGetRequest { requests }).await.unwrap();

        assert_eq!(output.responses["locations"].len(), 2);
        let unprocessed = output.unprocessed_keys.unwrap();
        assert_eq!(unprocessed["locations"].keys.len(), 1);
    }

    #[tokio::test]
    async fn test_unserializable_key_attribute_fails() {
        let backend = backend().await;

        let mut item = record("loc_1", "Main St");
        item.insert("locationId".to_string(), Value::from(f64::NAN));

        let result = backend
            .put(PutRequest {
                table_name: "locations".to_string(),
                item,
            })
            .await;

        assert!(matches!(result, Err(StorageError::Serialization(_))));
    }

    #[tokio::test]
    async fn test_failure_injection() {
        let backend = backend().await;
        backend.fail_table("locations").await;

        let result = backend
            .scan(ScanRequest {
                table_name: "locations".to_string(),
                ..Default::default()
            })
            .await;

        assert!(matches!(result, Err(StorageError::QueryFailed(_))));
    }
}
