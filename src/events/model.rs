//! Typed event payloads

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::Serialize;
use serde_json::Value;

/// A typed event a collaborator can emit
pub trait EventModel: Serialize {
    fn event_type(&self) -> &'static str;

    /// Serialize and strip empty values
    fn to_payload(&self) -> serde_json::Result<Value> {
        Ok(sanitize_payload(serde_json::to_value(self)?))
    }
}

/// Recursively drop null, empty-string, empty-array and empty-object values
///
/// Containers emptied by the pass are dropped as well. A top-level value that
/// sanitizes to nothing becomes an empty object.
pub fn sanitize_payload(value: Value) -> Value {
    prune(value).unwrap_or_else(|| Value::Object(Default::default()))
}

fn prune(value: Value) -> Option<Value> {
    match value {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        Value::Array(items) => {
            let items: Vec<Value> = items.into_iter().filter_map(prune).collect();
            (!items.is_empty()).then_some(Value::Array(items))
        }
        Value::Object(map) => {
            let map: serde_json::Map<String, Value> = map
                .into_iter()
                .filter_map(|(k, v)| prune(v).map(|v| (k, v)))
                .collect();
            (!map.is_empty()).then_some(Value::Object(map))
        }
        other => Some(other),
    }
}

/// Base64 text for binary payload fields
pub fn encode_bytes(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}
