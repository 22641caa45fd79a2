//! JSON conversion for records.
//!
//! The payload of a remote object list is a JSON array of objects; each item
//! is turned into a validated [`Record`] of a given schema.

use std::sync::Arc;

use crudform_core::error::{CrudError, CrudResult, ErrorDetail, ValidationError};

use crate::record::Record;
use crate::schema::ModelSchema;
use crate::value::Value;

/// Builds a validated record from a JSON object.
pub fn record_from_json(
    schema: &Arc<ModelSchema>,
    json: &serde_json::Value,
) -> Result<Record, ValidationError> {
    match Value::from_json(json) {
        Value::Map(map) => schema.create(map),
        other => Err(ValidationError::new(ErrorDetail::new(
            format!(
                "Input should be a valid dictionary or instance of {}, got {}",
                schema.name(),
                other.kind()
            ),
            "model_type",
        ))),
    }
}

/// Parses a JSON array of objects into validated records.
///
/// Validation failures carry the item index as the first location segment.
pub fn records_from_json(schema: &Arc<ModelSchema>, text: &str) -> CrudResult<Vec<Record>> {
    let json: serde_json::Value = serde_json::from_str(text)?;
    records_from_json_value(schema, &json)
}

/// Converts an already-parsed JSON array into validated records.
pub fn records_from_json_value(
    schema: &Arc<ModelSchema>,
    json: &serde_json::Value,
) -> CrudResult<Vec<Record>> {
    let serde_json::Value::Array(items) = json else {
        return Err(CrudError::SerializationError(format!(
            "Expected a JSON array of {} objects",
            schema.name()
        )));
    };
    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            record_from_json(schema, item)
                .map_err(|e| CrudError::Validation(e.within(&i.to_string())))
        })
        .collect()
}

/// Serializes records as a JSON array.
pub fn records_to_json(records: &[Record]) -> serde_json::Value {
    serde_json::Value::Array(records.iter().map(Record::to_json).collect())
}
