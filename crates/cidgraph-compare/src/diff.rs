//! Structural diff over inlined JSON values.
//!
//! Objects are diffed key-wise, arrays index-wise; anything else is compared
//! by equality. Each delta carries an explicit change type and a rendered
//! description suitable for per-pair detail output.

use std::fmt;

use serde_json::Value;

/// Value rendering limit for per-pair detail.
pub const DETAIL_VALUE_LIMIT: usize = 50;

/// Value rendering limit for the aggregate summary.
pub const SUMMARY_VALUE_LIMIT: usize = 100;

/// The type of a structural delta.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChangeKind {
    Added,
    Updated,
    Removed,
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ChangeKind::Added => "ADD",
            ChangeKind::Updated => "UPDATE",
            ChangeKind::Removed => "REMOVE",
        };
        write!(f, "{s}")
    }
}

/// One structural delta between two inlined graphs.
#[derive(Clone, Debug, PartialEq)]
pub struct Difference {
    /// Dotted key path, with array indices in brackets (`a.b[2].c`).
    pub path: String,
    pub kind: ChangeKind,
    pub old: Option<Value>,
    pub new: Option<Value>,
    pub description: String,
}

/// Render a value for human-readable output.
///
/// Strings are shown quoted and truncated with an ellipsis past `limit`;
/// objects and arrays are summarized by size.
pub fn format_value(value: &Value, limit: usize) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => truncate(format!("\"{s}\""), limit),
        Value::Array(items) => format!("[{} items]", items.len()),
        Value::Object(map) => format!("{{{} fields}}", map.len()),
    }
}

fn truncate(s: String, limit: usize) -> String {
    if s.chars().count() <= limit {
        return s;
    }
    let mut cut: String = s.chars().take(limit).collect();
    cut.push_str("...");
    cut
}

/// Compute the ordered structural diff between two values.
pub fn diff_values(old: &Value, new: &Value) -> Vec<Difference> {
    let mut out = Vec::new();
    walk("", old, new, &mut out);
    out
}

fn walk(path: &str, old: &Value, new: &Value, out: &mut Vec<Difference>) {
    match (old, new) {
        (Value::Object(l), Value::Object(r)) => {
            for (key, old_val) in l {
                let child = join_key(path, key);
                match r.get(key) {
                    Some(new_val) => walk(&child, old_val, new_val, out),
                    None => out.push(removed(child, old_val)),
                }
            }
            for (key, new_val) in r {
                if !l.contains_key(key) {
                    out.push(added(join_key(path, key), new_val));
                }
            }
        }
        (Value::Array(l), Value::Array(r)) => {
            let shared = l.len().min(r.len());
            for i in 0..shared {
                walk(&join_index(path, i), &l[i], &r[i], out);
            }
            for (i, old_val) in l.iter().enumerate().skip(shared) {
                out.push(removed(join_index(path, i), old_val));
            }
            for (i, new_val) in r.iter().enumerate().skip(shared) {
                out.push(added(join_index(path, i), new_val));
            }
        }
        _ => {
            if old != new {
                out.push(updated(display_path(path), old, new));
            }
        }
    }
}

fn join_key(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{path}.{key}")
    }
}

fn join_index(path: &str, index: usize) -> String {
    if path.is_empty() {
        format!("[{index}]")
    } else {
        format!("{path}[{index}]")
    }
}

fn display_path(path: &str) -> String {
    if path.is_empty() {
        "(root)".to_string()
    } else {
        path.to_string()
    }
}

fn added(path: String, value: &Value) -> Difference {
    Difference {
        description: format!("added with value {}", format_value(value, DETAIL_VALUE_LIMIT)),
        path,
        kind: ChangeKind::Added,
        old: None,
        new: Some(value.clone()),
    }
}

fn removed(path: String, value: &Value) -> Difference {
    Difference {
        description: format!("removed (was {})", format_value(value, DETAIL_VALUE_LIMIT)),
        path,
        kind: ChangeKind::Removed,
        old: Some(value.clone()),
        new: None,
    }
}

fn updated(path: String, old: &Value, new: &Value) -> Difference {
    Difference {
        description: format!(
            "changed from {} to {}",
            format_value(old, DETAIL_VALUE_LIMIT),
            format_value(new, DETAIL_VALUE_LIMIT)
        ),
        path,
        kind: ChangeKind::Updated,
        old: Some(old.clone()),
        new: Some(new.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn identical_values_no_diff() {
        let v = json!({"a": 1, "b": [1, 2], "c": {"d": null}});
        assert!(diff_values(&v, &v).is_empty());
    }

    #[test]
    fn scalar_update_at_top_level() {
        let diffs = diff_values(&json!({"a": 1}), &json!({"a": 2}));
        assert_eq!(diffs.len(), 1);
        assert_eq!(diffs[0].path, "a");
        assert_eq!(diffs[0].kind, ChangeKind::Updated);
        assert_eq!(diffs[0].old, Some(json!(1)));
        assert_eq!(diffs[0].new, Some(json!(2)));
        assert_eq!(diffs[0].description, "changed from 1 to 2");
    }

    #[test]
    fn nested_paths_are_dotted() {
        let diffs = diff_values(
            &json!({"a": {"b": {"c": "x"}}}),
            &json!({"a": {"b": {"c": "y"}}}),
        );
        assert_eq!(diffs.len(), 1);
        assert_eq!(diffs[0].path, "a.b.c");
        assert_eq!(diffs[0].description, "changed from \"x\" to \"y\"");
    }

    #[test]
    fn array_indices_use_brackets() {
        let diffs = diff_values(&json!({"xs": [1, 2]}), &json!({"xs": [1, 3]}));
        assert_eq!(diffs.len(), 1);
        assert_eq!(diffs[0].path, "xs[1]");
    }

    #[test]
    fn added_and_removed_keys() {
        let diffs = diff_values(&json!({"gone": 1, "keep": 2}), &json!({"keep": 2, "fresh": 3}));
        assert_eq!(diffs.len(), 2);
        let kinds: Vec<ChangeKind> = diffs.iter().map(|d| d.kind).collect();
        assert!(kinds.contains(&ChangeKind::Added));
        assert!(kinds.contains(&ChangeKind::Removed));
    }

    #[test]
    fn array_length_mismatch() {
        let diffs = diff_values(&json!([1]), &json!([1, 2, 3]));
        assert_eq!(diffs.len(), 2);
        assert_eq!(diffs[0].path, "[1]");
        assert_eq!(diffs[0].kind, ChangeKind::Added);
        assert_eq!(diffs[1].path, "[2]");
    }

    #[test]
    fn type_mismatch_is_single_update() {
        let diffs = diff_values(&json!({"a": {"x": 1}}), &json!({"a": 5}));
        assert_eq!(diffs.len(), 1);
        assert_eq!(diffs[0].kind, ChangeKind::Updated);
        assert_eq!(diffs[0].description, "changed from {1 fields} to 5");
    }

    #[test]
    fn root_scalar_mismatch_uses_root_marker() {
        let diffs = diff_values(&json!(1), &json!(2));
        assert_eq!(diffs.len(), 1);
        assert_eq!(diffs[0].path, "(root)");
    }

    #[test]
    fn long_strings_are_truncated() {
        let long = "x".repeat(80);
        let rendered = format_value(&json!(long), DETAIL_VALUE_LIMIT);
        assert_eq!(rendered.chars().count(), DETAIL_VALUE_LIMIT + 3);
        assert!(rendered.ends_with("..."));
        // The summary limit keeps more of the value.
        let wider = format_value(&json!("x".repeat(80)), SUMMARY_VALUE_LIMIT);
        assert!(!wider.ends_with("..."));
    }

    #[test]
    fn containers_are_summarized_by_size() {
        assert_eq!(format_value(&json!([1, 2, 3]), 50), "[3 items]");
        assert_eq!(format_value(&json!({"a": 1, "b": 2}), 50), "{2 fields}");
    }

    #[test]
    fn change_kind_display() {
        assert_eq!(ChangeKind::Added.to_string(), "ADD");
        assert_eq!(ChangeKind::Updated.to_string(), "UPDATE");
        assert_eq!(ChangeKind::Removed.to_string(), "REMOVE");
    }
}
