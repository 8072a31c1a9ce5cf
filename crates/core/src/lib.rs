//! Core types and contracts for the recordstore engine.
//!
//! This crate is pure: it defines the attribute-value model, table
//! schemas, the validation contract, and the storage backend contract,
//! but performs no I/O itself. Concrete backends and the CRUD engine
//! live in the `recordstore` crate.

pub mod schema;
pub mod storage;
pub mod validation;
pub mod value;

pub use value::{trim_empty_strings, Record, Value};
