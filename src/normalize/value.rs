//! Field-probing helpers shared by the normalizer modules.
//!
//! The upstream feed grew out of a JavaScript stack, so field presence and
//! "truthiness" follow that heritage: `null`, `false`, `0` and `""` all count
//! as absent when an alias chain is probed with short-circuit semantics.

use serde_json::Value;

/// First of `keys` that is present and not `null` (the wire's `??` chains).
pub fn first_present<'a>(obj: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|k| obj.get(*k))
        .find(|v| !v.is_null())
}

/// First of `keys` whose value is truthy (the wire's `||` chains).
pub fn first_truthy<'a>(obj: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|k| obj.get(*k))
        .find(|v| is_truthy(v))
}

pub fn is_truthy(v: &Value) -> bool {
    match v {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// True when the message carries a `type` or `event` tag equal to `tag`.
pub fn tag_equals(msg: &Value, tag: &str) -> bool {
    ["type", "event"]
        .iter()
        .filter_map(|k| msg.get(*k))
        .filter_map(Value::as_str)
        .any(|t| t == tag)
}

/// Numeric coercion accepting JSON numbers and numeric strings.
pub fn lenient_f64(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// Coerce a truthy identifier to its string form; falsy ids are rejected so
/// that heterogeneous numeric/string ids never cause false mismatches and
/// empty/zero ids never create phantom entries.
pub fn id_string(v: &Value) -> Option<String> {
    if !is_truthy(v) {
        return None;
    }
    match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(_) => Some(coerce_string(v)),
        _ => None,
    }
}

/// Unconditional string form of a scalar (falsy values included), used where
/// the wire stringifies whatever it finds. Non-scalars come out empty.
pub fn coerce_string(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        Value::Number(n) => n
            .as_i64()
            .map(|i| i.to_string())
            .or_else(|| n.as_u64().map(|u| u.to_string()))
            .unwrap_or_else(|| n.to_string()),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

/// A display string (title/name fields): strings verbatim, numbers coerced.
pub fn display_string(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(_) => Some(coerce_string(v)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn first_present_skips_null_but_keeps_falsy() {
        let v = json!({"a": null, "b": 0, "c": "x"});
        assert_eq!(first_present(&v, &["a", "b", "c"]), Some(&json!(0)));
    }

    #[test]
    fn first_truthy_skips_empty_and_zero() {
        let v = json!({"a": "", "b": 0, "c": false, "d": [1]});
        assert_eq!(first_truthy(&v, &["a", "b", "c", "d"]), Some(&json!([1])));
        assert_eq!(first_truthy(&v, &["a", "b", "c"]), None);
    }

    #[test]
    fn tag_matches_type_or_event() {
        assert!(tag_equals(&json!({"type": "back-end"}), "back-end"));
        assert!(tag_equals(&json!({"event": "back-end"}), "back-end"));
        assert!(!tag_equals(&json!({"kind": "back-end"}), "back-end"));
    }

    #[test]
    fn lenient_f64_parses_numeric_strings() {
        assert_eq!(lenient_f64(&json!("56.95")), Some(56.95));
        assert_eq!(lenient_f64(&json!(24.1)), Some(24.1));
        assert_eq!(lenient_f64(&json!("n/a")), None);
        assert_eq!(lenient_f64(&json!(null)), None);
    }

    #[test]
    fn id_string_rejects_falsy_ids() {
        assert_eq!(id_string(&json!("T7")), Some("T7".into()));
        assert_eq!(id_string(&json!(42)), Some("42".into()));
        assert_eq!(id_string(&json!(0)), None);
        assert_eq!(id_string(&json!("")), None);
        assert_eq!(id_string(&json!(null)), None);
    }
}
