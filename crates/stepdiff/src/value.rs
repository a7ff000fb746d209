//! Structural comparison and display helpers for JSON step values

use serde_json::Value;

/// Recursive structural equality over JSON values.
///
/// Numbers compare numerically, so `1` and `1.0` are equal. Sequences are
/// compared element by element in order. Mappings are equal when they have the
/// same key set and every value is deep-equal; key order does not matter.
pub fn deep_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::String(x), Value::String(y)) => x == y,
        (Value::Number(x), Value::Number(y)) => {
            if x == y {
                return true;
            }
            match (x.as_f64(), y.as_f64()) {
                (Some(x), Some(y)) => x == y,
                _ => false,
            }
        }
        (Value::Array(x), Value::Array(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(l, r)| deep_equal(l, r))
        }
        (Value::Object(x), Value::Object(y)) => {
            x.len() == y.len()
                && x
                    .iter()
                    .all(|(k, v)| y.get(k).is_some_and(|other| deep_equal(v, other)))
        }
        _ => false,
    }
}

/// Whether a value counts as "unset" when reporting the old side of a change
pub fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f == 0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

/// Render a value for humans: strings bare, everything else as compact JSON
pub fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deep_equal_scalars() {
        assert!(deep_equal(&json!("a"), &json!("a")));
        assert!(!deep_equal(&json!("a"), &json!("b")));
        assert!(deep_equal(&json!(null), &json!(null)));
        assert!(!deep_equal(&json!(true), &json!(false)));
        assert!(!deep_equal(&json!("1"), &json!(1)));
    }

    #[test]
    fn test_deep_equal_numbers_compare_numerically() {
        assert!(deep_equal(&json!(30), &json!(30.0)));
        assert!(!deep_equal(&json!(30), &json!(31)));
    }

    #[test]
    fn test_deep_equal_mapping_ignores_key_order() {
        let a = json!({"A": "1", "B": {"x": [1, 2]}});
        let b = json!({"B": {"x": [1, 2]}, "A": "1"});
        assert!(deep_equal(&a, &b));
    }

    #[test]
    fn test_deep_equal_mapping_key_sets_must_match() {
        assert!(!deep_equal(&json!({"A": "1"}), &json!({"A": "1", "B": "2"})));
        assert!(!deep_equal(&json!({"A": "1", "B": "2"}), &json!({"A": "1"})));
    }

    #[test]
    fn test_deep_equal_sequences_are_ordered() {
        assert!(deep_equal(&json!(["a", "b"]), &json!(["a", "b"])));
        assert!(!deep_equal(&json!(["a", "b"]), &json!(["b", "a"])));
        assert!(!deep_equal(&json!(["a"]), &json!(["a", "a"])));
    }

    #[test]
    fn test_is_falsy() {
        assert!(is_falsy(&json!(null)));
        assert!(is_falsy(&json!(false)));
        assert!(is_falsy(&json!(0)));
        assert!(is_falsy(&json!("")));
        assert!(!is_falsy(&json!("x")));
        assert!(!is_falsy(&json!(5)));
        assert!(!is_falsy(&json!([])));
        assert!(!is_falsy(&json!({})));
    }

    #[test]
    fn test_render_value() {
        assert_eq!(render_value(&json!("run.sh")), "run.sh");
        assert_eq!(render_value(&json!(30)), "30");
        assert_eq!(render_value(&json!(["a", "b"])), r#"["a","b"]"#);
        assert_eq!(render_value(&json!({"K": "v"})), r#"{"K":"v"}"#);
    }
}
