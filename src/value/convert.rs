use crate::value::types::{Value, ValueRef};

/// Largest integer magnitude exactly representable as an f64.
const MAX_SAFE_INTEGER: i128 = (1 << 53) - 1;

/// Build a subject graph from a parsed JSON document.
///
/// JSON cannot express cycles, sets, maps, or byte blobs, so the result
/// only uses the scalar, sequence, and record variants. Object key order
/// is preserved as parsed.
pub fn from_json(json: &serde_json::Value) -> ValueRef {
    match json {
        serde_json::Value::Null => Value::null(),
        serde_json::Value::Bool(b) => Value::boolean(*b),
        serde_json::Value::Number(n) => from_number(n),
        serde_json::Value::String(s) => Value::text(s.clone()),
        serde_json::Value::Array(items) => Value::list(items.iter().map(from_json)),
        serde_json::Value::Object(fields) => {
            Value::record(fields.iter().map(|(k, v)| (k.clone(), from_json(v))))
        }
    }
}

fn from_number(n: &serde_json::Number) -> ValueRef {
    if let Some(i) = n.as_i64() {
        let wide = i as i128;
        if wide.abs() > MAX_SAFE_INTEGER {
            return Value::bigint(wide);
        }
        return Value::number(i as f64);
    }
    if let Some(u) = n.as_u64() {
        let wide = u as i128;
        if wide > MAX_SAFE_INTEGER {
            return Value::bigint(wide);
        }
        return Value::number(u as f64);
    }
    Value::number(n.as_f64().unwrap_or(f64::NAN))
}
