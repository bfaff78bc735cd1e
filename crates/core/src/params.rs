//! Helpers for reading typed parameters out of a `serde_json::Value` object.
//!
//! Each helper takes a JSON value, a key name, and a default. A missing key
//! (or an explicit `null`) yields the default. A key that is present but has
//! the wrong shape is a configuration error, never a silent fallback; range
//! and domain checks on well-formed values are left to the constructor that
//! consumes them.

use crate::config::Range;
use crate::error::AquariumError;
use serde_json::Value;

fn lookup<'a>(params: &'a Value, name: &str) -> Result<Option<&'a Value>, AquariumError> {
    match params {
        Value::Null => Ok(None),
        Value::Object(map) => Ok(map.get(name).filter(|v| !v.is_null())),
        other => Err(AquariumError::InvalidConfig(format!(
            "parameters must be a JSON object, got {other}"
        ))),
    }
}

fn expected(name: &str, what: &str, got: &Value) -> AquariumError {
    AquariumError::InvalidConfig(format!("'{name}' must be {what}, got {got}"))
}

/// Extracts an `f64` from `params[name]`, returning `default` if missing.
///
/// JSON integers are accepted and converted.
pub fn param_f64(params: &Value, name: &str, default: f64) -> Result<f64, AquariumError> {
    match lookup(params, name)? {
        None => Ok(default),
        Some(v) => v.as_f64().ok_or_else(|| expected(name, "a number", v)),
    }
}

/// Extracts a `usize` from `params[name]`, returning `default` if missing.
///
/// Negative numbers, fractions and non-numbers are rejected.
pub fn param_usize(params: &Value, name: &str, default: usize) -> Result<usize, AquariumError> {
    match lookup(params, name)? {
        None => Ok(default),
        Some(v) => v
            .as_u64()
            .and_then(|n| usize::try_from(n).ok())
            .ok_or_else(|| expected(name, "a non-negative integer", v)),
    }
}

/// Extracts a [`Range`] from `params[name]`, returning `default` if missing.
///
/// Accepts either `{"min": a, "max": b}` or a two-element array `[a, b]`.
/// A partially specified object keeps the default for the missing end.
pub fn param_range(params: &Value, name: &str, default: Range) -> Result<Range, AquariumError> {
    match lookup(params, name)? {
        None => Ok(default),
        Some(Value::Array(items)) => match items.as_slice() {
            [min, max] => match (min.as_f64(), max.as_f64()) {
                (Some(min), Some(max)) => Ok(Range::new(min, max)),
                _ => Err(expected(name, "a pair of numbers", &Value::Array(items.clone()))),
            },
            _ => Err(expected(name, "a [min, max] pair", &Value::Array(items.clone()))),
        },
        Some(obj @ Value::Object(_)) => {
            let field = |end: &str, fallback: f64| {
                param_f64(obj, end, fallback)
                    .map_err(|_| expected(&format!("{name}.{end}"), "a number", &obj[end]))
            };
            Ok(Range::new(field("min", default.min)?, field("max", default.max)?))
        }
        Some(other) => Err(expected(name, "a [min, max] pair or {min, max} object", other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn is_config_error<T: std::fmt::Debug>(result: Result<T, AquariumError>) -> bool {
        matches!(result, Err(AquariumError::InvalidConfig(_)))
    }

    // -- param_f64 --

    #[test]
    fn param_f64_extracts_existing_float() {
        let params = json!({"ceiling": 12.5});
        assert_eq!(param_f64(&params, "ceiling", 10.0).unwrap(), 12.5);
    }

    #[test]
    fn param_f64_extracts_integer_as_float() {
        let params = json!({"ceiling": 40});
        assert_eq!(param_f64(&params, "ceiling", 0.0).unwrap(), 40.0);
    }

    #[test]
    fn param_f64_returns_default_when_key_missing_or_null() {
        assert_eq!(param_f64(&json!({"other": 1.0}), "bend_amp", 0.3).unwrap(), 0.3);
        assert_eq!(param_f64(&json!({"bend_amp": null}), "bend_amp", 0.3).unwrap(), 0.3);
        assert_eq!(param_f64(&Value::Null, "bend_amp", 0.3).unwrap(), 0.3);
    }

    #[test]
    fn param_f64_rejects_wrong_type() {
        assert!(is_config_error(param_f64(&json!({"ceiling": "high"}), "ceiling", 10.0)));
        assert!(is_config_error(param_f64(&json!({"ceiling": [1.0]}), "ceiling", 10.0)));
    }

    #[test]
    fn non_object_params_are_rejected() {
        assert!(is_config_error(param_f64(&json!("not an object"), "ceiling", 7.0)));
        assert!(is_config_error(param_usize(&json!([1, 2]), "count", 7)));
    }

    // -- param_usize --

    #[test]
    fn param_usize_extracts_existing_integer() {
        let params = json!({"count": 250});
        assert_eq!(param_usize(&params, "count", 0).unwrap(), 250);
        assert_eq!(param_usize(&json!({"count": 0}), "count", 20).unwrap(), 0);
    }

    #[test]
    fn param_usize_rejects_negative_fractional_and_text() {
        for bad in [json!({"count": -5}), json!({"count": 2.5}), json!({"count": "many"})] {
            let result = param_usize(&bad, "count", 20);
            assert!(is_config_error(result), "accepted {bad}");
        }
    }

    #[test]
    fn param_usize_error_names_the_key() {
        let err = param_usize(&json!({"count": -5}), "count", 20).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("'count'"), "{msg}");
        assert!(msg.contains("-5"), "{msg}");
    }

    // -- param_range --

    #[test]
    fn param_range_reads_array_form() {
        let params = json!({"speed": [2.0, 5.0]});
        let r = param_range(&params, "speed", Range::new(0.0, 1.0)).unwrap();
        assert_eq!(r, Range::new(2.0, 5.0));
    }

    #[test]
    fn param_range_reads_object_form() {
        let params = json!({"speed": {"min": 0.5, "max": 2}});
        let r = param_range(&params, "speed", Range::new(0.0, 1.0)).unwrap();
        assert_eq!(r, Range::new(0.5, 2.0));
    }

    #[test]
    fn param_range_object_keeps_default_for_missing_end() {
        let params = json!({"speed": {"max": 9.0}});
        let r = param_range(&params, "speed", Range::new(2.0, 5.0)).unwrap();
        assert_eq!(r, Range::new(2.0, 9.0));
    }

    #[test]
    fn param_range_missing_key_gives_default() {
        let default = Range::new(2.0, 5.0);
        assert_eq!(param_range(&json!({}), "speed", default).unwrap(), default);
    }

    #[test]
    fn param_range_rejects_wrong_shape() {
        let default = Range::new(2.0, 5.0);
        for bad in [
            json!({"speed": [2.0]}),
            json!({"speed": [1.0, 2.0, 3.0]}),
            json!({"speed": 3.0}),
            json!({"speed": ["a", "b"]}),
            json!({"speed": {"min": "slow"}}),
        ] {
            assert!(is_config_error(param_range(&bad, "speed", default)), "accepted {bad}");
        }
    }
}
