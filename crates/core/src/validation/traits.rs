use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::schema::ColumnRule;
use crate::value::Record;

use super::Result;

/// Record validation contract.
///
/// The engine does not interpret rule semantics; it only relies on the
/// pass/fail contract: a successful call returns a normalized copy of
/// the record, a failing one rejects with the first broken rule.
#[async_trait]
pub trait Validator: Send + Sync {
    /// Validates `record` against the column rules, returning a
    /// normalized copy.
    async fn validate(
        &self,
        record: &Record,
        columns: &BTreeMap<String, ColumnRule>,
    ) -> Result<Record>;
}
