//! Conversion between plain JSON and Firestore's typed value encoding.
//!
//! ```text
//! "abc"        <-> {"stringValue": "abc"}
//! 5            <-> {"integerValue": "5"}
//! 1.5          <-> {"doubleValue": 1.5}
//! [1]          <-> {"arrayValue": {"values": [...]}}
//! {"k": 1}     <-> {"mapValue": {"fields": {...}}}
//! ```

use serde_json::{json, Map, Value};

use super::RemoteError;
use crate::models::Document;

pub fn encode_value(value: &Value) -> Value {
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(b) => json!({ "booleanValue": b }),
        Value::Number(n) => match n.as_i64() {
            Some(i) => json!({ "integerValue": i.to_string() }),
            None => json!({ "doubleValue": n.as_f64().unwrap_or_default() }),
        },
        Value::String(s) => json!({ "stringValue": s }),
        Value::Array(items) => {
            let values: Vec<Value> = items.iter().map(encode_value).collect();
            json!({ "arrayValue": { "values": values } })
        }
        Value::Object(fields) => json!({ "mapValue": { "fields": encode_fields(fields) } }),
    }
}

/// Encodes every field of a document.
pub fn encode_fields(fields: &Document) -> Value {
    Value::Object(
        fields
            .iter()
            .map(|(k, v)| (k.clone(), encode_value(v)))
            .collect(),
    )
}

pub fn decode_value(value: &Value) -> Result<Value, RemoteError> {
    let (kind, inner) = value
        .as_object()
        .and_then(|o| o.iter().next())
        .ok_or_else(|| RemoteError::DecodeError(format!("not a typed value: {}", value)))?;

    match (kind.as_str(), inner) {
        ("nullValue", _) => Ok(Value::Null),
        ("booleanValue", v) => Ok(Value::Bool(v.as_bool().unwrap_or_default())),
        ("integerValue", v) => {
            let parsed = match v {
                Value::String(s) => s.parse::<i64>().ok(),
                other => other.as_i64(),
            };
            parsed
                .map(Value::from)
                .ok_or_else(|| RemoteError::DecodeError(format!("bad integerValue: {}", v)))
        }
        ("doubleValue", v) => Ok(v
            .as_f64()
            .and_then(serde_json::Number::from_f64)
            .map(Value::Number)
            .unwrap_or(Value::Null)),
        ("stringValue" | "timestampValue" | "referenceValue" | "bytesValue", v) => Ok(v.clone()),
        ("geoPointValue", v) => Ok(v.clone()),
        ("arrayValue", v) => {
            let values = v
                .get("values")
                .and_then(Value::as_array)
                .map(|items| items.iter().map(decode_value).collect::<Result<Vec<_>, _>>())
                .transpose()?
                .unwrap_or_default();
            Ok(Value::Array(values))
        }
        ("mapValue", v) => {
            let fields = match v.get("fields").and_then(Value::as_object) {
                Some(fields) => decode_fields(fields)?,
                None => Map::new(),
            };
            Ok(Value::Object(fields))
        }
        (kind, _) => Err(RemoteError::DecodeError(format!(
            "unsupported value type '{}'",
            kind
        ))),
    }
}

pub fn decode_fields(fields: &Map<String, Value>) -> Result<Document, RemoteError> {
    fields
        .iter()
        .map(|(k, v)| -> Result<(String, Value), RemoteError> {
            Ok((k.clone(), decode_value(v)?))
        })
        .collect()
}

/// Decodes a Firestore document resource into a record carrying its `id`.
///
/// The id is the last segment of the resource name and takes precedence
/// over any stored `id` field.
pub fn decode_document(document: &Value) -> Result<Document, RemoteError> {
    let name = document
        .get("name")
        .and_then(Value::as_str)
        .ok_or_else(|| RemoteError::DecodeError("document has no name".to_string()))?;

    let mut record = match document.get("fields").and_then(Value::as_object) {
        Some(fields) => decode_fields(fields)?,
        None => Document::new(),
    };
    record.insert("id".to_string(), Value::String(document_id(name).to_string()));
    Ok(record)
}

/// Last path segment of a resource name.
pub fn document_id(name: &str) -> &str {
    name.rsplit('/').next().unwrap_or(name)
}
