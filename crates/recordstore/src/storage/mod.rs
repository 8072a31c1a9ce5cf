//! Storage backend implementations.
//!
//! Concrete implementations of the `StorageBackend` contract from
//! `recordstore_core`. The in-memory backend is always available and
//! is what the test suite runs against; the DynamoDB backend is
//! enabled with the `dynamodb` feature:
//!
//! ```bash
//! cargo build -p recordstore --features dynamodb
//! ```

pub mod memory;

#[cfg(feature = "dynamodb")]
pub mod dynamodb;

pub use memory::InMemoryBackend;

#[cfg(feature = "dynamodb")]
pub use dynamodb::DynamoBackend;
