//! Merge nested request defaults.

use crate::{Error, Result};
use serde_json::Value;

/// Apply `overrides` onto `base` in place.
///
/// For every key of `overrides`:
///
/// - absent in `base`: inserted as is.
/// - both sides are objects: merged recursively.
/// - both sides hold the same kind of value: replaced.
/// - otherwise: [`ErrorKind::MismatchedHeaderType`](crate::ErrorKind::MismatchedHeaderType).
///
/// `base` is left untouched when an error is returned.
pub fn merge(base: &mut Value, overrides: &Value) -> Result<()> {
    let mut merged = base.clone();
    merge_into(&mut merged, overrides, "")?;
    *base = merged;
    Ok(())
}

fn merge_into(base: &mut Value, overrides: &Value, path: &str) -> Result<()> {
    let (Value::Object(base), Value::Object(overrides)) = (base, overrides) else {
        return Err(Error::mismatched_header_type(format!(
            "cannot merge non-object values at {:?}",
            display_path(path)
        )));
    };

    for (key, ov) in overrides {
        let key_path = if path.is_empty() {
            key.clone()
        } else {
            format!("{path}.{key}")
        };

        match base.get_mut(key) {
            None => {
                base.insert(key.clone(), ov.clone());
            }
            Some(sv) => {
                if sv.is_object() && ov.is_object() {
                    merge_into(sv, ov, &key_path)?;
                } else if kind(sv) == kind(ov) {
                    *sv = ov.clone();
                } else {
                    return Err(Error::mismatched_header_type(format!(
                        "mismatched types for key {key_path}: source is {}, override is {}",
                        kind(sv),
                        kind(ov)
                    )));
                }
            }
        }
    }

    Ok(())
}

fn kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn display_path(path: &str) -> &str {
    if path.is_empty() {
        "<root>"
    } else {
        path
    }
}
