#![allow(dead_code)]

use docmask_core::{Document, FakeGenerator, FieldMap};
use rstest::fixture;
use serde_json::Value;
use tracing::info;

pub fn init_tracing() {
    // should be run once, fail otherwise, we skip that error
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();

    info!("Tracing initialized");
}

#[fixture]
pub fn generator() -> FakeGenerator {
    init_tracing();
    FakeGenerator::seeded(20_240_223)
}

pub fn document(value: Value) -> Document {
    match value {
        Value::Object(document) => document,
        other => panic!("not a document: {other}"),
    }
}

pub fn field_map(json: &str) -> FieldMap {
    match FieldMap::from_json_str(json) {
        Ok(field_map) => field_map,
        Err(error) => panic!("invalid field map: {error}"),
    }
}

pub fn fixture(json: &str) -> Document {
    match serde_json::from_str(json) {
        Ok(document) => document,
        Err(error) => panic!("invalid fixture: {error}"),
    }
}

/// Numbered documents `{"_id": i, "name": "user-i", "address": {"city": ...}}`.
pub fn people(count: usize) -> Vec<Document> {
    (0..count)
        .map(|index| {
            document(serde_json::json!({
                "_id": index,
                "name": format!("user-{index}"),
                "address": {"city": format!("city-{index}")}
            }))
        })
        .collect()
}

/// Asserts both values have the same keys at every level and the same list
/// lengths. Scalars may differ.
pub fn assert_same_shape(left: &Value, right: &Value) {
    assert_same_shape_at("$", left, right);
}

fn assert_same_shape_at(at: &str, left: &Value, right: &Value) {
    match (left, right) {
        (Value::Object(left), Value::Object(right)) if !is_wrapper(left) && !is_wrapper(right) => {
            let left_keys = left.keys().collect::<Vec<_>>();
            let right_keys = right.keys().collect::<Vec<_>>();
            assert_eq!(left_keys, right_keys, "keys differ at {at}");
            for (key, value) in left {
                assert_same_shape_at(&format!("{at}.{key}"), value, &right[key]);
            }
        }
        (Value::Array(left), Value::Array(right)) => {
            assert_eq!(left.len(), right.len(), "list lengths differ at {at}");
            for (index, (left, right)) in left.iter().zip(right).enumerate() {
                assert_same_shape_at(&format!("{at}[{index}]"), left, right);
            }
        }
        (Value::Object(_) | Value::Array(_), _) | (_, Value::Object(_) | Value::Array(_))
            if !is_scalar(left) || !is_scalar(right) =>
        {
            panic!("container replaced at {at}: {left} vs {right}");
        }
        _ => {}
    }
}

fn is_wrapper(document: &Document) -> bool {
    document.len() == 1 && document.keys().all(|key| key.starts_with('$'))
}

fn is_scalar(value: &Value) -> bool {
    match value {
        Value::Object(document) => is_wrapper(document),
        Value::Array(_) => false,
        _ => true,
    }
}
