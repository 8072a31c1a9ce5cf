mod error;
mod traits;
mod types;

pub use error::{Result, StorageError};
pub use traits::StorageBackend;
pub use types::{
    BatchGetOutput, BatchGetRequest, Comparison, Condition, DeleteRequest, KeysAndProjection,
    PutRequest, ScanFilter, ScanOutput, ScanRequest, UpdateRequest,
};
