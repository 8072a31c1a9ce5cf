//! Schema-validated CRUD engine over a key-value/document backend.
//!
//! The [`Engine`] owns a table schema, a validator, and a storage
//! backend, and exposes create/read/update/delete/batch-read with
//! collision-probed unique-id generation and best-effort audit
//! logging. Backends implement the `StorageBackend` contract from
//! `recordstore_core`; an in-memory backend ships for testing, and a
//! DynamoDB backend is available behind the `dynamodb` feature.

pub mod audit;
pub mod config;
pub mod engine;
pub mod error;
pub mod storage;
pub mod token;

pub use audit::CrudType;
pub use config::EngineConfig;
pub use engine::{Engine, BATCH_LIMIT};
pub use error::{EngineError, Result};
