//! Strict-mode fixups for runtime JSON schemas.
//!
//! OpenAI's `json_schema` response format in strict mode requires:
//! 1. `additionalProperties: false` on all object schemas
//! 2. ALL properties listed in `required`, even nullable ones
//!
//! Schemas built at runtime rarely satisfy both, so callers pass them through
//! [`into_strict`] before sending.

use serde_json::Value;

/// Rewrite every object schema in `schema` for strict mode.
pub fn into_strict(mut schema: Value) -> Value {
    fix_object_schemas(&mut schema);
    schema
}

/// Adds `additionalProperties: false` and ensures all properties are in `required`.
fn fix_object_schemas(value: &mut Value) {
    if let Value::Object(map) = value {
        if map.get("type") == Some(&Value::String("object".to_string())) {
            map.insert("additionalProperties".to_string(), Value::Bool(false));

            if let Some(Value::Object(props)) = map.get("properties") {
                let all_keys: Vec<Value> = props.keys().map(|k| Value::String(k.clone())).collect();
                map.insert("required".to_string(), Value::Array(all_keys));
            }
        }

        for (_, v) in map.iter_mut() {
            fix_object_schemas(v);
        }
    } else if let Value::Array(arr) = value {
        for item in arr.iter_mut() {
            fix_object_schemas(item);
        }
    }
}
