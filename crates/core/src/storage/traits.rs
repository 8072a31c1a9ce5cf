use async_trait::async_trait;

use crate::value::Record;

use super::{
    BatchGetOutput, BatchGetRequest, DeleteRequest, PutRequest, Result, ScanOutput, ScanRequest,
    UpdateRequest,
};

/// Asynchronous key-value/document store contract.
///
/// The engine consumes exactly these five operations; transport,
/// retries, and timeouts are the implementation's business.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Stores an item, returning the previous item under the same key
    /// if one existed.
    async fn put(&self, request: PutRequest) -> Result<Option<Record>>;

    /// Filtered full-table read.
    async fn scan(&self, request: ScanRequest) -> Result<ScanOutput>;

    /// Applies an attribute patch by key, returning the post-update
    /// record.
    async fn update(&self, request: UpdateRequest) -> Result<Record>;

    /// Deletes by key, returning the pre-delete record. Unconditional:
    /// deleting an absent key succeeds and returns `None`.
    async fn delete(&self, request: DeleteRequest) -> Result<Option<Record>>;

    /// Multi-key fetch. May return a subset of the requested keys plus
    /// an unprocessed remainder for continuation.
    async fn batch_get(&self, request: BatchGetRequest) -> Result<BatchGetOutput>;
}
