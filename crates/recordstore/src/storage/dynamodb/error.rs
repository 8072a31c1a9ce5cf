//! DynamoDB error mapping.
//!
//! Maps AWS SDK errors to `StorageError` from `recordstore_core`.

use std::fmt::Debug;

use aws_sdk_dynamodb::error::SdkError;
use aws_sdk_dynamodb::operation::batch_get_item::BatchGetItemError;
use aws_sdk_dynamodb::operation::delete_item::DeleteItemError;
use aws_sdk_dynamodb::operation::put_item::PutItemError;
use aws_sdk_dynamodb::operation::scan::ScanError;
use aws_sdk_dynamodb::operation::update_item::UpdateItemError;

use recordstore_core::storage::StorageError;

/// Map a PutItem SDK error to StorageError.
pub fn map_put_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<PutItemError, R>,
    table_name: &str,
) -> StorageError {
    match err.into_service_error() {
        PutItemError::ConditionalCheckFailedException(_) => {
            StorageError::ConditionFailed(format!("PutItem condition failed on {table_name}"))
        }
        PutItemError::ResourceNotFoundException(_) => {
            StorageError::TableNotFound(table_name.to_string())
        }
        PutItemError::ProvisionedThroughputExceededException(_) => {
            StorageError::QueryFailed("Throughput exceeded, please retry".to_string())
        }
        PutItemError::RequestLimitExceeded(_) => {
            StorageError::QueryFailed("Request limit exceeded, please retry".to_string())
        }
        PutItemError::ItemCollectionSizeLimitExceededException(_) => {
            StorageError::QueryFailed("Item collection size limit exceeded".to_string())
        }
        PutItemError::TransactionConflictException(_) => {
            StorageError::QueryFailed("Transaction conflict, please retry".to_string())
        }
        PutItemError::InternalServerError(_) => {
            StorageError::QueryFailed("DynamoDB internal server error".to_string())
        }
        err => StorageError::QueryFailed(format!("PutItem failed: {:?}", err)),
    }
}

/// Map a Scan SDK error to StorageError.
pub fn map_scan_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<ScanError, R>,
    table_name: &str,
) -> StorageError {
    match err.into_service_error() {
        ScanError::ResourceNotFoundException(_) => {
            StorageError::TableNotFound(table_name.to_string())
        }
        ScanError::ProvisionedThroughputExceededException(_) => {
            StorageError::QueryFailed("Throughput exceeded, please retry".to_string())
        }
        ScanError::RequestLimitExceeded(_) => {
            StorageError::QueryFailed("Request limit exceeded, please retry".to_string())
        }
        ScanError::InternalServerError(_) => {
            StorageError::QueryFailed("DynamoDB internal server error".to_string())
        }
        err => StorageError::QueryFailed(format!("Scan failed: {:?}", err)),
    }
}

/// Map an UpdateItem SDK error to StorageError.
pub fn map_update_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<UpdateItemError, R>,
    table_name: &str,
) -> StorageError {
    match err.into_service_error() {
        UpdateItemError::ConditionalCheckFailedException(_) => {
            StorageError::ConditionFailed(format!("UpdateItem condition failed on {table_name}"))
        }
        UpdateItemError::ResourceNotFoundException(_) => {
            StorageError::TableNotFound(table_name.to_string())
        }
        UpdateItemError::ProvisionedThroughputExceededException(_) => {
            StorageError::QueryFailed("Throughput exceeded, please retry".to_string())
        }
        UpdateItemError::RequestLimitExceeded(_) => {
            StorageError::QueryFailed("Request limit exceeded, please retry".to_string())
        }
        UpdateItemError::ItemCollectionSizeLimitExceededException(_) => {
            StorageError::QueryFailed("Item collection size limit exceeded".to_string())
        }
        UpdateItemError::TransactionConflictException(_) => {
            StorageError::QueryFailed("Transaction conflict, please retry".to_string())
        }
        UpdateItemError::InternalServerError(_) => {
            StorageError::QueryFailed("DynamoDB internal server error".to_string())
        }
        err => StorageError::QueryFailed(format!("UpdateItem failed: {:?}", err)),
    }
}

/// Map a DeleteItem SDK error to StorageError.
pub fn map_delete_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<DeleteItemError, R>,
    table_name: &str,
) -> StorageError {
    match err.into_service_error() {
        DeleteItemError::ConditionalCheckFailedException(_) => {
            StorageError::ConditionFailed(format!("DeleteItem condition failed on {table_name}"))
        }
        DeleteItemError::ResourceNotFoundException(_) => {
            StorageError::TableNotFound(table_name.to_string())
        }
        DeleteItemError::ProvisionedThroughputExceededException(_) => {
            StorageError::QueryFailed("Throughput exceeded, please retry".to_string())
        }
        DeleteItemError::RequestLimitExceeded(_) => {
            StorageError::QueryFailed("Request limit exceeded, please retry".to_string())
        }
        DeleteItemError::ItemCollectionSizeLimitExceededException(_) => {
            StorageError::QueryFailed("Item collection size limit exceeded".to_string())
        }
        DeleteItemError::TransactionConflictException(_) => {
            StorageError::QueryFailed("Transaction conflict, please retry".to_string())
        }
        DeleteItemError::InternalServerError(_) => {
            StorageError::QueryFailed("DynamoDB internal server error".to_string())
        }
        err => StorageError::QueryFailed(format!("DeleteItem failed: {:?}", err)),
    }
}

/// Map a BatchGetItem SDK error to StorageError.
pub fn map_batch_get_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<BatchGetItemError, R>,
) -> StorageError {
    match err.into_service_error() {
        BatchGetItemError::ResourceNotFoundException(_) => {
            StorageError::QueryFailed("Table not found".to_string())
        }
        BatchGetItemError::ProvisionedThroughputExceededException(_) => {
            StorageError::QueryFailed("Throughput exceeded, please retry".to_string())
        }
        BatchGetItemError::RequestLimitExceeded(_) => {
            StorageError::QueryFailed("Request limit exceeded, please retry".to_string())
        }
        BatchGetItemError::InternalServerError(_) => {
            StorageError::QueryFailed("DynamoDB internal server error".to_string())
        }
        err => StorageError::QueryFailed(format!("BatchGetItem failed: {:?}", err)),
    }
}
