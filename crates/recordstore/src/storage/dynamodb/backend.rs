//! DynamoDB backend implementation.

use std::collections::BTreeMap;

use async_trait::async_trait;
use aws_sdk_dynamodb::types::{KeysAndAttributes, ReturnValue};
use aws_sdk_dynamodb::Client;

use recordstore_core::storage::{
    BatchGetOutput, BatchGetRequest, DeleteRequest, KeysAndProjection, PutRequest, Result,
    ScanOutput, ScanRequest, StorageBackend, StorageError, UpdateRequest,
};
use recordstore_core::Record;

use super::conversions::{
    condition_to_dynamo, item_to_record, projection_expression, record_to_item, value_to_attribute,
};
use super::error::{
    map_batch_get_error, map_delete_error, map_put_error, map_scan_error, map_update_error,
};

/// DynamoDB-based storage backend.
#[derive(Debug, Clone)]
pub struct DynamoBackend {
    client: Client,
}

impl DynamoBackend {
    /// Creates a backend with the given DynamoDB client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Creates a backend from the AWS SDK default credential chain.
    pub async fn from_env() -> Self {
        let config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        Self::new(Client::new(&config))
    }
}

#[async_trait]
impl StorageBackend for DynamoBackend {
    async fn put(&self, request: PutRequest) -> Result<Option<Record>> {
        let output = self
            .client
            .put_item()
            .table_name(&request.table_name)
            .set_item(Some(record_to_item(&request.item)))
            .return_values(ReturnValue::AllOld)
            .send()
            .await
            .map_err(|e| map_put_error(e, &request.table_name))?;

        output.attributes.as_ref().map(item_to_record).transpose()
    }

    async fn scan(&self, request: ScanRequest) -> Result<ScanOutput> {
        let mut scan = self
            .client
            .scan()
            .table_name(&request.table_name)
            .set_projection_expression(projection_expression(request.projection.as_deref()));
        for (attribute, condition) in &request.filter {
            scan = scan.scan_filter(attribute, condition_to_dynamo(condition)?);
        }

        let output = scan
            .send()
            .await
            .map_err(|e| map_scan_error(e, &request.table_name))?;

        let items: Vec<Record> = output
            .items
            .unwrap_or_default()
            .iter()
            .map(item_to_record)
            .collect::<Result<_>>()?;

        Ok(ScanOutput {
            count: items.len(),
            items,
        })
    }

    async fn update(&self, request: UpdateRequest) -> Result<Record> {
        let attribute_values = request
            .attribute_values
            .iter()
            .map(|(placeholder, value)| (placeholder.clone(), value_to_attribute(value)))
            .collect();

        let output = self
            .client
            .update_item()
            .table_name(&request.table_name)
            .set_key(Some(record_to_item(&request.key)))
            .update_expression(&request.update_expression)
            .set_expression_attribute_names(Some(
                request.attribute_names.clone().into_iter().collect(),
            ))
            .set_expression_attribute_values(Some(attribute_values))
            .return_values(ReturnValue::AllNew)
            .send()
            .await
            .map_err(|e| map_update_error(e, &request.table_name))?;

        item_to_record(&output.attributes.unwrap_or_default())
    }

    async fn delete(&self, request: DeleteRequest) -> Result<Option<Record>> {
        let output = self
            .client
            .delete_item()
            .table_name(&request.table_name)
            .set_key(Some(record_to_item(&request.key)))
            .return_values(ReturnValue::AllOld)
            .send()
            .await
            .map_err(|e| map_delete_error(e, &request.table_name))?;

        output.attributes.as_ref().map(item_to_record).transpose()
    }

    async fn batch_get(&self, request: BatchGetRequest) -> Result<BatchGetOutput> {
        let mut batch = self.client.batch_get_item();
        for (table_name, keys_and_projection) in &request.requests {
            let keys = keys_and_projection
                .keys
                .iter()
                .map(record_to_item)
                .collect();
            let keys_and_attributes = KeysAndAttributes::builder()
                .set_keys(Some(keys))
                .set_projection_expression(projection_expression(
                    keys_and_projection.projection.as_deref(),
                ))
                .build()
                .map_err(|e| StorageError::Serialization(e.to_string()))?;
            batch = batch.request_items(table_name, keys_and_attributes);
        }

        let output = batch.send().await.map_err(map_batch_get_error)?;

        let mut responses = BTreeMap::new();
        for (table_name, items) in output.responses.unwrap_or_default() {
            let records: Vec<Record> = items.iter().map(item_to_record).collect::<Result<_>>()?;
            responses.insert(table_name, records);
        }

        let unprocessed = output.unprocessed_keys.unwrap_or_default();
        let unprocessed_keys = if unprocessed.is_empty() {
            None
        } else {
            let mut remainder = BTreeMap::new();
            for (table_name, keys_and_attributes) in unprocessed {
                let keys: Vec<Record> = keys_and_attributes
                    .keys
                    .iter()
                    .map(item_to_record)
                    .collect::<Result<_>>()?;
                let projection = keys_and_attributes.projection_expression.map(|expression| {
                    expression
                        .split(',')
                        .map(str::to_string)
                        .collect::<Vec<_>>()
                });
                remainder.insert(table_name, KeysAndProjection { keys, projection });
            }
            Some(remainder)
        };

        Ok(BatchGetOutput {
            responses,
            unprocessed_keys,
        })
    }
}
