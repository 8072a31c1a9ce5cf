//! Batch read with continuation, and the unique-id probe.

use std::collections::BTreeMap;

use futures_util::future::try_join_all;

use recordstore_core::storage::{BatchGetRequest, KeysAndProjection};
use recordstore_core::{Record, Value};

use crate::audit::CrudType;
use crate::error::{EngineError, Result};

use super::{Engine, BATCH_LIMIT, GENERATED_ID_BATCH, MAX_BATCH_GET_ROUNDS};

impl Engine {
    /// Fetches up to [`BATCH_LIMIT`] records by key.
    ///
    /// Every key is validated concurrently before the backend is
    /// contacted; the first rejection fails the whole call. When the
    /// backend reports unprocessed keys, they are re-issued until the
    /// remainder drains, appending each round's results in arrival
    /// order.
    pub async fn batch_read(
        &self,
        keys: &[Record],
        requested_attributes: Option<&[String]>,
    ) -> Result<Vec<Record>> {
        if keys.len() > BATCH_LIMIT {
            return Err(EngineError::ExceededBatchLimit);
        }
        let schema = self.bound_schema()?;

        let validated_keys = try_join_all(
            keys.iter()
                .map(|key| self.validator().validate(key, schema.columns())),
        )
        .await?;

        let table_name = self.table_name()?;
        let mut requests = BTreeMap::new();
        requests.insert(
            table_name.clone(),
            KeysAndProjection {
                keys: validated_keys,
                projection: requested_attributes.map(<[String]>::to_vec),
            },
        );
        let mut request = BatchGetRequest { requests };

        let mut records: Vec<Record> = Vec::new();
        let mut rounds = 0;
        loop {
            rounds += 1;
            if rounds > MAX_BATCH_GET_ROUNDS {
                return Err(EngineError::Backend {
                    status: 500,
                    code: "QueryFailedException".to_string(),
                    message: format!(
                        "Batch read did not drain unprocessed keys after {MAX_BATCH_GET_ROUNDS} rounds"
                    ),
                });
            }

            let output = self.backend().batch_get(request).await?;
            if let Some(items) = output.responses.get(&table_name) {
                records.extend(items.iter().cloned());
            }

            match output.unprocessed_keys {
                Some(unprocessed) if !unprocessed.is_empty() => {
                    request = BatchGetRequest {
                        requests: unprocessed,
                    };
                }
                _ => break,
            }
        }

        self.log_best_effort(CrudType::BatchRead, &records).await;

        Ok(records)
    }

    /// Probes for a free identifier: generates [`GENERATED_ID_BATCH`]
    /// candidate keys (`partial_key` with the id column set to
    /// `prefix + token`), fetches them in one batch read projecting
    /// only the id column, and returns the first candidate absent from
    /// the result.
    ///
    /// This is a probabilistic collision probe, not an atomic
    /// reservation: there is no retry loop, and two concurrent callers
    /// can both observe the same candidate as free. Retrying a
    /// `UniqueIdException` is the caller's responsibility.
    pub async fn get_unique_id(&self, partial_key: &Record) -> Result<String> {
        let schema = self.bound_schema()?;
        let id_attribute = schema.id_column().name.clone();
        let prefix = schema.id_prefix().to_string();

        let mut candidate_keys = Vec::with_capacity(GENERATED_ID_BATCH);
        for _ in 0..GENERATED_ID_BATCH {
            let mut key = partial_key.clone();
            key.insert(
                id_attribute.clone(),
                Value::String(format!("{}{}", prefix, self.token())),
            );
            candidate_keys.push(key);
        }

        let taken = self
            .batch_read(&candidate_keys, Some(std::slice::from_ref(&id_attribute)))
            .await?;

        for key in &candidate_keys {
            let candidate = key.get(&id_attribute);
            let exists = taken
                .iter()
                .any(|record| record.get(&id_attribute) == candidate);
            if !exists {
                if let Some(Value::String(id)) = candidate {
                    return Ok(id.clone());
                }
            }
        }

        Err(EngineError::UniqueId)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::token::SequenceTokenSource;

    use super::super::testing;
    use super::*;

    fn key(id: &str) -> Record {
        let mut key = Record::new();
        key.insert("locationId".to_string(), Value::from(id));
        key
    }

    fn seeded_record(id: &str) -> Record {
        let mut record = key(id);
        record.insert("locationName".to_string(), Value::from("seeded"));
        record
    }

    #[tokio::test]
    async fn test_batch_read_over_limit_fails_before_backend() {
        // Unbound engine: the limit check must fire before the schema
        // check or any backend call.
        let engine = crate::Engine::new(
            crate::EngineConfig::new(testing::STAGE),
            testing::backend(false).await,
        );

        let keys: Vec<Record> = (0..101).map(|i| key(&format!("loc_{i}"))).collect();
        let result = engine.batch_read(&keys, None).await;

        assert_eq!(result, Err(EngineError::ExceededBatchLimit));
    }

    #[tokio::test]
    async fn test_batch_read_validates_every_key() {
        let engine = testing::engine(testing::backend(true).await, true);

        let keys = vec![key("loc_ok"), key("usr_bad")];
        let result = engine.batch_read(&keys, None).await;

        assert!(matches!(result, Err(EngineError::Validation(_))));
    }

    #[tokio::test]
    async fn test_batch_read_returns_matches_in_order() {
        let backend = testing::backend(true).await;
        let engine = testing::engine(backend.clone(), true);
        for i in 0..3 {
            backend
                .seed(testing::TABLE, seeded_record(&format!("loc_{i}")))
                .await;
        }

        let keys = vec![key("loc_0"), key("loc_missing"), key("loc_2")];
        let records = engine.batch_read(&keys, None).await.unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["locationId"], Value::from("loc_0"));
        assert_eq!(records[1]["locationId"], Value::from("loc_2"));
    }

    #[tokio::test]
    async fn test_batch_read_continues_over_unprocessed_keys() {
        let backend = Arc::new(
            crate::storage::memory::InMemoryBackend::new().with_batch_page_size(2),
        );
        backend
            .create_table(testing::TABLE, vec!["locationId".to_string()])
            .await;
        backend
            .create_table(testing::LOG_TABLE, vec!["logId".to_string()])
            .await;
        let engine = testing::engine(backend.clone(), true);

        for i in 0..5 {
            backend
                .seed(testing::TABLE, seeded_record(&format!("loc_{i}")))
                .await;
        }

        let keys: Vec<Record> = (0..5).map(|i| key(&format!("loc_{i}"))).collect();
        let records = engine.batch_read(&keys, None).await.unwrap();

        // Union of all pages, processed-then-continued order, no
        // duplicates or omissions.
        let ids: Vec<&str> = records
            .iter()
            .map(|record| record["locationId"].as_str().unwrap())
            .collect();
        assert_eq!(ids, vec!["loc_0", "loc_1", "loc_2", "loc_3", "loc_4"]);
    }

    #[tokio::test]
    async fn test_batch_read_projection() {
        let backend = testing::backend(true).await;
        let engine = testing::engine(backend.clone(), true);
        backend.seed(testing::TABLE, seeded_record("loc_0")).await;

        let projection = vec!["locationId".to_string()];
        let records = engine
            .batch_read(&[key("loc_0")], Some(&projection))
            .await
            .unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].len(), 1);
        assert!(records[0].contains_key("locationId"));
    }

    #[tokio::test]
    async fn test_get_unique_id_returns_first_free_candidate() {
        let engine = testing::engine(testing::backend(true).await, true);

        let id = engine.get_unique_id(&Record::new()).await.unwrap();

        // Deterministic tokens: the first candidate is free on an
        // empty table.
        assert_eq!(id, "loc_00000000");
    }

    #[tokio::test]
    async fn test_get_unique_id_skips_taken_candidates() {
        let backend = testing::backend(true).await;
        let engine = testing::engine(backend.clone(), true);
        backend.seed(testing::TABLE, seeded_record("loc_00000000")).await;
        backend.seed(testing::TABLE, seeded_record("loc_00000001")).await;

        let id = engine.get_unique_id(&Record::new()).await.unwrap();

        assert_eq!(id, "loc_00000002");
    }

    #[tokio::test]
    async fn test_get_unique_id_all_candidates_taken_fails() {
        let backend = testing::backend(true).await;
        let engine = testing::engine(backend.clone(), true);
        for i in 0..5 {
            backend
                .seed(testing::TABLE, seeded_record(&format!("loc_0000000{i}")))
                .await;
        }

        let result = engine.get_unique_id(&Record::new()).await;

        assert_eq!(result, Err(EngineError::UniqueId));
    }

    #[tokio::test]
    async fn test_get_unique_id_single_backend_round() {
        let backend = testing::backend(true).await;
        let engine = testing::engine(backend.clone(), true)
            .with_token_source(Arc::new(SequenceTokenSource::new()));

        engine.get_unique_id(&Record::new()).await.unwrap();

        // One batch_get for the probe; the audit put does not count.
        assert_eq!(backend.batch_get_calls(), 1);
    }
}
