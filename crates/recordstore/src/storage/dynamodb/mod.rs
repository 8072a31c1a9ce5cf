//! DynamoDB storage backend.
//!
//! Implements the `StorageBackend` contract from `recordstore_core`
//! on top of `aws-sdk-dynamodb`.

mod backend;
mod conversions;
mod error;

pub use backend::DynamoBackend;
