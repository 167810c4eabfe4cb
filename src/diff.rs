/*
 * This file is part of Fanpanel.
 *
 * Copyright (C) 2025 Fanpanel contributors
 *
 * Fanpanel is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * Fanpanel is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with Fanpanel. If not, see <https://www.gnu.org/licenses/>.
 */

//! Pending-change computation.
//!
//! Every editable screen compares what the user has in the form against the
//! record last fetched from the CLI and only keeps the fields that differ.
//! The resulting map gates the commit action and is also the JSON payload
//! handed to `set`, so the tool can apply a partial update.

use serde_json::{Map, Value};

/// String form used to compare a candidate value with its reference.
///
/// Arrays compare by their trimmed elements joined with commas. Numbers
/// without a fractional part print as integers so that `45`, `45.0` and
/// `"45"` all compare equal.
pub fn normalize(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                i.to_string()
            } else if let Some(u) = n.as_u64() {
                u.to_string()
            } else {
                let f = n.as_f64().unwrap_or(0.0);
                if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e15 {
                    format!("{}", f as i64)
                } else {
                    format!("{}", f)
                }
            }
        }
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(|item| normalize(item).trim().to_string())
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => value.to_string(),
    }
}

/// Returns the fields of `candidate` that differ from `reference`.
///
/// Keys listed in `exclude` are never returned. A key missing from
/// `reference` always counts as changed. The candidate's raw value is kept.
pub fn build_opts(
    candidate: &Map<String, Value>,
    reference: &Map<String, Value>,
    exclude: &[&str],
) -> Map<String, Value> {
    let mut opts = Map::new();
    for (key, value) in candidate {
        if exclude.contains(&key.as_str()) {
            continue;
        }
        if let Some(reference_value) = reference.get(key) {
            if normalize(value) == normalize(reference_value) {
                continue;
            }
        }
        opts.insert(key.clone(), value.clone());
    }
    opts
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn obj(v: Value) -> Map<String, Value> {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn test_identical_maps_yield_no_changes() {
        let x = obj(json!({
            "name": "CPU",
            "mintemp": 45,
            "farenheit": false,
            "list": ["a", "b"],
        }));
        assert!(build_opts(&x, &x, &[]).is_empty());
    }

    #[test]
    fn test_changed_and_new_keys_are_returned() {
        let candidate = obj(json!({"name": "CPU", "mintemp": 50, "extra": "x"}));
        let reference = obj(json!({"name": "CPU", "mintemp": 45}));
        let opts = build_opts(&candidate, &reference, &[]);
        assert_eq!(opts.len(), 2);
        assert_eq!(opts["mintemp"], json!(50));
        assert_eq!(opts["extra"], json!("x"));
    }

    #[test]
    fn test_excluded_keys_are_skipped() {
        let candidate = obj(json!({"pwm": "hwmon0/pwm1", "name": "new"}));
        let reference = Map::new();
        let opts = build_opts(&candidate, &reference, &["pwm"]);
        assert!(!opts.contains_key("pwm"));
        assert_eq!(opts["name"], json!("new"));
    }

    #[test]
    fn test_arrays_compare_by_trimmed_content() {
        let candidate = obj(json!({"tags": ["a ", "b"]}));
        let reference = obj(json!({"tags": ["a", " b"]}));
        assert!(build_opts(&candidate, &reference, &[]).is_empty());
    }

    #[test]
    fn test_numbers_compare_with_their_string_form() {
        let candidate = obj(json!({"interval": "10", "maxpwm": 255.0}));
        let reference = obj(json!({"interval": 10, "maxpwm": 255}));
        assert!(build_opts(&candidate, &reference, &[]).is_empty());
    }

    #[test]
    fn test_keys_only_in_reference_are_ignored() {
        let candidate = obj(json!({"a": 1}));
        let reference = obj(json!({"a": 1, "b": 2}));
        assert!(build_opts(&candidate, &reference, &[]).is_empty());
    }

    #[test]
    fn test_normalize_scalars() {
        assert_eq!(normalize(&json!(true)), "true");
        assert_eq!(normalize(&json!(42)), "42");
        assert_eq!(normalize(&json!(42.5)), "42.5");
        assert_eq!(normalize(&json!("abc")), "abc");
        assert_eq!(normalize(&Value::Null), "");
        assert_eq!(normalize(&json!([" x", 1, true])), "x,1,true");
    }
}
