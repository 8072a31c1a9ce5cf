//! In-memory storage backend for testing.
//!
//! Stores all data in HashMaps behind an `RwLock`. Data is not
//! persisted and is lost when the backend is dropped. Supports paged
//! `batch_get` responses and per-table failure injection so tests can
//! exercise unprocessed-keys continuation and best-effort logging.

mod backend;

pub use backend::InMemoryBackend;
