//! Canonical serialization for cache-key material.
//!
//! Two logically identical parameter objects must produce byte-identical
//! strings no matter how they were assembled. Object keys are sorted
//! lexicographically at every nesting level and `null` members are omitted,
//! so an absent field and an explicit `null` serialize identically. Array
//! order is preserved: for values like `sort`, order is meaning.

use serde_json::Value;

// serde_json's map iteration order is a feature-unification detail
// (`preserve_order` flips it crate-wide); keys are sorted explicitly here so
// the output stays canonical either way.
const MAX_DEPTH: usize = 32;

/// Serialize a JSON value into its canonical string form.
pub fn stable_string(value: &Value) -> String {
    let mut out = String::new();
    write_value(&mut out, value, 0);
    out
}

fn write_value(out: &mut String, value: &Value, depth: usize) {
    if depth > MAX_DEPTH {
        // Truncate instead of recursing further; degenerate nesting must not
        // take the serializer down.
        out.push_str("null");
        return;
    }

    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(flag) => out.push_str(if *flag { "true" } else { "false" }),
        Value::Number(number) => out.push_str(&number.to_string()),
        Value::String(text) => write_escaped(out, text),
        Value::Array(items) => {
            out.push('[');
            for (index, item) in items.iter().enumerate() {
                if index > 0 {
                    out.push(',');
                }
                write_value(out, item, depth + 1);
            }
            out.push(']');
        }
        Value::Object(map) => {
            let mut keys: Vec<&String> = map
                .iter()
                .filter(|(_, member)| !member.is_null())
                .map(|(key, _)| key)
                .collect();
            keys.sort_unstable();

            out.push('{');
            for (index, key) in keys.iter().enumerate() {
                if index > 0 {
                    out.push(',');
                }
                write_escaped(out, key.as_str());
                out.push(':');
                write_value(out, &map[key.as_str()], depth + 1);
            }
            out.push('}');
        }
    }
}

fn write_escaped(out: &mut String, text: &str) {
    match serde_json::to_string(text) {
        Ok(quoted) => out.push_str(&quoted),
        // Strings always serialize; keep the raw text if that ever changes.
        Err(_) => out.push_str(text),
    }
}
