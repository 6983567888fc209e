//! Untyped document field bags
//!
//! Every read from the store produces a loose map of JSON values; typed
//! entities are built from it with explicit defaulting for every optional
//! field. Writes merge field bags into whatever already exists.

use bantay_core::{StoreError, StoreResult};
use serde::Serialize;
use serde_json::Value;

/// A document's fields as stored: a JSON object keyed by field name.
pub type Document = serde_json::Map<String, Value>;

/// Serialize a value into a document field bag.
///
/// Fails for values that do not serialize to a JSON object.
pub fn to_document<T: Serialize>(value: &T) -> StoreResult<Document> {
    let json = serde_json::to_value(value).map_err(|e| StoreError::Serialization {
        reason: e.to_string(),
    })?;
    match json {
        Value::Object(map) => Ok(map),
        other => Err(StoreError::Serialization {
            reason: format!("expected an object, got {}", kind_of(&other)),
        }),
    }
}

/// String field accessor; absent or non-string fields read as `None`.
pub fn get_str<'a>(doc: &'a Document, key: &str) -> Option<&'a str> {
    doc.get(key).and_then(Value::as_str)
}

/// String field with a fallback, trimmed.
pub fn get_string_or(doc: &Document, key: &str, fallback: &str) -> String {
    get_str(doc, key).unwrap_or(fallback).trim().to_string()
}

/// Integer field accessor; absent or non-numeric fields read as `None`.
pub fn get_i64(doc: &Document, key: &str) -> Option<i64> {
    doc.get(key).and_then(Value::as_i64)
}

/// Non-negative integer field; absent, non-numeric, or negative reads as 0.
pub fn get_u32_or_zero(doc: &Document, key: &str) -> u32 {
    get_i64(doc, key)
        .and_then(|n| u32::try_from(n).ok())
        .unwrap_or(0)
}

/// Merge `incoming` fields into `target`, leaving unrelated fields alone.
pub fn merge_fields(target: &mut Document, incoming: Document) {
    for (key, value) in incoming {
        target.insert(key, value);
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

// =============================================================================
// TESTS
// =============================================================================


#[cfg(test)]
mod prop_tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::BTreeMap;

    fn document_strategy() -> impl Strategy<Value = Document> {
        proptest::collection::btree_map("[a-z]{1,6}", 0i64..100, 0..8).prop_map(
            |map: BTreeMap<String, i64>| {
                map.into_iter()
                    .map(|(k, v)| (k, Value::from(v)))
                    .collect()
            },
        )
    }

    proptest! {
        /// Incoming fields always win; fields only in the target survive.
        #[test]
        fn prop_merge_is_an_upsert(
            target in document_strategy(),
            incoming in document_strategy(),
        ) {
            let mut merged = target.clone();
            merge_fields(&mut merged, incoming.clone());

            for (key, value) in &incoming {
                prop_assert_eq!(merged.get(key), Some(value));
            }
            for (key, value) in &target {
                if !incoming.contains_key(key) {
                    prop_assert_eq!(merged.get(key), Some(value));
                }
            }
            prop_assert!(merged.len() <= target.len() + incoming.len());
        }
    }
}
