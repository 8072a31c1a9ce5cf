//! DynamoDB attribute conversion functions.
//!
//! Pure functions for converting between DynamoDB AttributeValue maps
//! and the engine's value model. These are testable in isolation
//! without DynamoDB access.

use std::collections::{BTreeMap, HashMap};

use aws_sdk_dynamodb::types::{
    AttributeValue, ComparisonOperator, Condition as DynamoCondition,
};

use recordstore_core::storage::{Comparison, Condition, Result, StorageError};
use recordstore_core::{Record, Value};

/// Convert an engine value to a DynamoDB attribute value.
pub fn value_to_attribute(value: &Value) -> AttributeValue {
    match value {
        Value::Null => AttributeValue::Null(true),
        Value::Bool(b) => AttributeValue::Bool(*b),
        Value::Number(n) => AttributeValue::N(n.to_string()),
        Value::String(s) => AttributeValue::S(s.clone()),
        Value::List(values) => {
            AttributeValue::L(values.iter().map(value_to_attribute).collect())
        }
        Value::Map(map) => AttributeValue::M(
            map.iter()
                .map(|(name, value)| (name.clone(), value_to_attribute(value)))
                .collect(),
        ),
    }
}

/// Convert a DynamoDB attribute value back to an engine value.
pub fn attribute_to_value(attribute: &AttributeValue) -> Result<Value> {
    match attribute {
        AttributeValue::Null(_) => Ok(Value::Null),
        AttributeValue::Bool(b) => Ok(Value::Bool(*b)),
        AttributeValue::N(n) => n
            .parse::<f64>()
            .map(Value::Number)
            .map_err(|_| StorageError::Serialization(format!("invalid number: {n}"))),
        AttributeValue::S(s) => Ok(Value::String(s.clone())),
        AttributeValue::L(values) => Ok(Value::List(
            values
                .iter()
                .map(attribute_to_value)
                .collect::<Result<Vec<_>>>()?,
        )),
        AttributeValue::M(map) => Ok(Value::Map(
            map.iter()
                .map(|(name, value)| Ok((name.clone(), attribute_to_value(value)?)))
                .collect::<Result<BTreeMap<_, _>>>()?,
        )),
        other => Err(StorageError::Serialization(format!(
            "unsupported attribute type: {other:?}"
        ))),
    }
}

/// Convert a record to a DynamoDB item.
pub fn record_to_item(record: &Record) -> HashMap<String, AttributeValue> {
    record
        .iter()
        .map(|(name, value)| (name.clone(), value_to_attribute(value)))
        .collect()
}

/// Convert a DynamoDB item to a record.
pub fn item_to_record(item: &HashMap<String, AttributeValue>) -> Result<Record> {
    item.iter()
        .map(|(name, value)| Ok((name.clone(), attribute_to_value(value)?)))
        .collect()
}

fn comparison_operator(comparison: Comparison) -> ComparisonOperator {
    match comparison {
        Comparison::Eq => ComparisonOperator::Eq,
        Comparison::Ne => ComparisonOperator::Ne,
        Comparison::Lt => ComparisonOperator::Lt,
        Comparison::Le => ComparisonOperator::Le,
        Comparison::Gt => ComparisonOperator::Gt,
        Comparison::Ge => ComparisonOperator::Ge,
        Comparison::BeginsWith => ComparisonOperator::BeginsWith,
        Comparison::Contains => ComparisonOperator::Contains,
    }
}

/// Convert a filter condition to the legacy scan-filter condition.
pub fn condition_to_dynamo(condition: &Condition) -> Result<DynamoCondition> {
    DynamoCondition::builder()
        .comparison_operator(comparison_operator(condition.comparison))
        .set_attribute_value_list(Some(
            condition.values.iter().map(value_to_attribute).collect(),
        ))
        .build()
        .map_err(|e| StorageError::Serialization(e.to_string()))
}

/// Join requested attributes into a projection expression.
pub fn projection_expression(projection: Option<&[String]>) -> Option<String> {
    projection.map(|attributes| attributes.join(","))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_round_trip() {
        let mut map = BTreeMap::new();
        map.insert("nested".to_string(), Value::from(true));
        let value = Value::List(vec![
            Value::from("a"),
            Value::from(4.5),
            Value::Null,
            Value::Map(map),
        ]);

        let attribute = value_to_attribute(&value);
        let back = attribute_to_value(&attribute).unwrap();

        assert_eq!(back, value);
    }

    #[test]
    fn test_whole_numbers_stay_integral() {
        let attribute = value_to_attribute(&Value::from(4.0));
        assert_eq!(attribute, AttributeValue::N("4".to_string()));
    }

    #[test]
    fn test_invalid_number_fails() {
        let result = attribute_to_value(&AttributeValue::N("four".to_string()));
        assert!(matches!(result, Err(StorageError::Serialization(_))));
    }

    #[test]
    fn test_string_set_attributes_unsupported() {
        let attribute = AttributeValue::Ss(vec!["a".to_string()]);
        let result = attribute_to_value(&attribute);
        assert!(matches!(result, Err(StorageError::Serialization(_))));
    }

    #[test]
    fn test_condition_conversion() {
        let condition = condition_to_dynamo(&Condition::eq("loc_1")).unwrap();

        assert_eq!(condition.comparison_operator, ComparisonOperator::Eq);
        assert_eq!(
            condition.attribute_value_list,
            Some(vec![AttributeValue::S("loc_1".to_string())])
        );
    }

    #[test]
    fn test_projection_expression_joins() {
        let attributes = vec!["locationId".to_string(), "locationName".to_string()];
        assert_eq!(
            projection_expression(Some(&attributes)),
            Some("locationId,locationName".to_string())
        );
        assert_eq!(projection_expression(None), None);
    }
}
