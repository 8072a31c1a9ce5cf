//! Storage backend request and response types.
//!
//! These mirror a key-value/document store's surface without tying the
//! engine to any vendor SDK: filtered scans, conditional attribute
//! patches by key, and multi-key fetches that may come back partially
//! satisfied.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::value::{Record, Value};

/// Comparison operator for a scan filter condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Comparison {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    BeginsWith,
    Contains,
}

/// A single filter condition on one attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub comparison: Comparison,
    pub values: Vec<Value>,
}

impl Condition {
    /// An equality condition against a single value.
    pub fn eq(value: impl Into<Value>) -> Self {
        Self {
            comparison: Comparison::Eq,
            values: vec![value.into()],
        }
    }
}

/// Flat attribute filter for a scan: every condition must hold.
pub type ScanFilter = BTreeMap<String, Condition>;

/// Stores an item, replacing any existing item with the same key.
#[derive(Debug, Clone, PartialEq)]
pub struct PutRequest {
    pub table_name: String,
    pub item: Record,
}

/// Filtered full-table read.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ScanRequest {
    pub table_name: String,
    pub filter: ScanFilter,
    /// Attribute names to project; `None` returns whole records.
    pub projection: Option<Vec<String>>,
}

/// Result of a scan.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ScanOutput {
    pub count: usize,
    pub items: Vec<Record>,
}

/// Conditional attribute patch by key.
///
/// The expression uses `#n`/`:n` placeholders resolved through the two
/// side maps, so physical attribute names never collide with backend
/// reserved words.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateRequest {
    pub table_name: String,
    pub key: Record,
    /// e.g. `SET #1 = :1, #2 = :2`
    pub update_expression: String,
    pub attribute_names: BTreeMap<String, String>,
    pub attribute_values: BTreeMap<String, Value>,
}

/// Point delete by key.
#[derive(Debug, Clone, PartialEq)]
pub struct DeleteRequest {
    pub table_name: String,
    pub key: Record,
}

/// Keys requested from one table, with an optional projection.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct KeysAndProjection {
    pub keys: Vec<Record>,
    pub projection: Option<Vec<String>>,
}

/// Multi-key fetch across one or more tables.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BatchGetRequest {
    pub requests: BTreeMap<String, KeysAndProjection>,
}

/// Result of a multi-key fetch.
///
/// `unprocessed_keys` carries the remainder the backend could not
/// satisfy in this round, keyed identically to the request; callers
/// re-issue it until it drains.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BatchGetOutput {
    pub responses: BTreeMap<String, Vec<Record>>,
    pub unprocessed_keys: Option<BTreeMap<String, KeysAndProjection>>,
}
