//! Structural comparison of JSON documents.
//!
//! [`compare`] walks two values in parallel and records every difference as
//! a flat list of path-tagged [`Change`]s. Objects compare as unordered key
//! sets and arrays as order-insensitive multisets.

use serde::Serialize;
use serde_json::Value;
use std::fmt;

/// Kind of a single structural difference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    /// A scalar changed value without changing type.
    ValueChanged,
    /// A value changed JSON type (including `null` to non-null).
    TypeChanged,
    /// An object key is present only in the desired document.
    KeyAdded,
    /// An object key is present only in the current document.
    KeyRemoved,
    /// An array element is present only in the desired document.
    ItemAdded,
    /// An array element is present only in the current document.
    ItemRemoved,
}

/// Coarse change tag used for rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeTag {
    /// Something was added.
    Added,
    /// Something was removed.
    Removed,
    /// Something was changed in place.
    Changed,
}

impl ChangeKind {
    /// Returns the rendering tag for this kind.
    #[must_use]
    pub const fn tag(self) -> ChangeTag {
        match self {
            Self::ValueChanged | Self::TypeChanged => ChangeTag::Changed,
            Self::KeyAdded | Self::ItemAdded => ChangeTag::Added,
            Self::KeyRemoved | Self::ItemRemoved => ChangeTag::Removed,
        }
    }
}

impl ChangeTag {
    /// Single-character marker used in narratives.
    #[must_use]
    pub const fn symbol(self) -> char {
        match self {
            Self::Added => '+',
            Self::Removed => '-',
            Self::Changed => '~',
        }
    }
}

impl fmt::Display for ChangeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Added => "added",
            Self::Removed => "removed",
            Self::Changed => "changed",
        };
        write!(f, "{s}")
    }
}

/// One difference between a current and a desired document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Change {
    /// Location, e.g. `root['policy']['phases'][0]`.
    pub path: String,
    /// What kind of difference this is.
    pub kind: ChangeKind,
    /// Value in the current document, if any.
    pub old: Option<Value>,
    /// Value in the desired document, if any.
    pub new: Option<Value>,
}

impl fmt::Display for Change {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = self.kind.tag().symbol();
        match (&self.old, &self.new) {
            (Some(old), Some(new)) => write!(f, "{symbol} {}: {old} -> {new}", self.path),
            (Some(value), None) | (None, Some(value)) => {
                write!(f, "{symbol} {}: {value}", self.path)
            }
            (None, None) => write!(f, "{symbol} {}", self.path),
        }
    }
}

/// Root path segment.
pub const ROOT: &str = "root";

/// Appends an object key segment to `path`.
#[must_use]
pub fn key_path(path: &str, key: &str) -> String {
    format!("{path}['{key}']")
}

fn index_path(path: &str, index: usize) -> String {
    format!("{path}[{index}]")
}

/// Compares `current` against `desired` and returns every difference.
///
/// An empty result means the documents are structurally equivalent.
#[must_use]
pub fn compare(current: &Value, desired: &Value) -> Vec<Change> {
    let mut changes = Vec::new();
    compare_at(ROOT, current, desired, &mut changes);
    changes
}

/// Returns whether two values are structurally equivalent.
///
/// Numbers compare by value (`1` equals `1.0`), objects ignore key order and
/// arrays ignore element order while respecting repetition counts.
#[must_use]
pub fn equivalent(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::String(x), Value::String(y)) => x == y,
        (Value::Number(x), Value::Number(y)) => numbers_equal(x, y),
        (Value::Object(x), Value::Object(y)) => {
            x.len() == y.len()
                && x
                    .iter()
                    .all(|(key, value)| y.get(key).is_some_and(|other| equivalent(value, other)))
        }
        (Value::Array(x), Value::Array(y)) => {
            if x.len() != y.len() {
                return false;
            }
            let (unmatched_x, unmatched_y) = match_elements(x, y);
            unmatched_x.is_empty() && unmatched_y.is_empty()
        }
        _ => false,
    }
}

fn numbers_equal(a: &serde_json::Number, b: &serde_json::Number) -> bool {
    if let (Some(x), Some(y)) = (a.as_i64(), b.as_i64()) {
        return x == y;
    }
    if let (Some(x), Some(y)) = (a.as_u64(), b.as_u64()) {
        return x == y;
    }
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x.total_cmp(&y).is_eq(),
        _ => false,
    }
}

const fn same_type(a: &Value, b: &Value) -> bool {
    matches!(
        (a, b),
        (Value::Null, Value::Null)
            | (Value::Bool(_), Value::Bool(_))
            | (Value::Number(_), Value::Number(_))
            | (Value::String(_), Value::String(_))
            | (Value::Array(_), Value::Array(_))
            | (Value::Object(_), Value::Object(_))
    )
}

/// Pairs equivalent elements greedily and returns the indices left over
/// on each side.
///
/// Equivalence is transitive, so greedy pairing finds a maximum matching.
fn match_elements(current: &[Value], desired: &[Value]) -> (Vec<usize>, Vec<usize>) {
    let mut unmatched_current: Vec<usize> = (0..current.len()).collect();
    let mut unmatched_desired = Vec::new();

    for (index, wanted) in desired.iter().enumerate() {
        let position = unmatched_current
            .iter()
            .position(|&candidate| equivalent(&current[candidate], wanted));
        match position {
            Some(position) => {
                unmatched_current.remove(position);
            }
            None => unmatched_desired.push(index),
        }
    }

    (unmatched_current, unmatched_desired)
}

fn compare_at(path: &str, current: &Value, desired: &Value, changes: &mut Vec<Change>) {
    if equivalent(current, desired) {
        return;
    }

    match (current, desired) {
        (Value::Object(current), Value::Object(desired)) => {
            for (key, wanted) in desired {
                let child = key_path(path, key);
                match current.get(key) {
                    Some(existing) => compare_at(&child, existing, wanted, changes),
                    None => changes.push(Change {
                        path: child,
                        kind: ChangeKind::KeyAdded,
                        old: None,
                        new: Some(wanted.clone()),
                    }),
                }
            }
            for (key, existing) in current {
                if !desired.contains_key(key) {
                    changes.push(Change {
                        path: key_path(path, key),
                        kind: ChangeKind::KeyRemoved,
                        old: Some(existing.clone()),
                        new: None,
                    });
                }
            }
        }
        (Value::Array(current), Value::Array(desired)) => {
            compare_arrays(path, current, desired, changes);
        }
        _ if same_type(current, desired) => changes.push(Change {
            path: path.to_string(),
            kind: ChangeKind::ValueChanged,
            old: Some(current.clone()),
            new: Some(desired.clone()),
        }),
        _ => changes.push(Change {
            path: path.to_string(),
            kind: ChangeKind::TypeChanged,
            old: Some(current.clone()),
            new: Some(desired.clone()),
        }),
    }
}

fn compare_arrays(path: &str, current: &[Value], desired: &[Value], changes: &mut Vec<Change>) {
    let (removed, added) = match_elements(current, desired);

    // A single modified container element reads better as a nested diff than
    // as a remove plus an add.
    if let ([old], [new]) = (removed.as_slice(), added.as_slice()) {
        let (old_value, new_value) = (&current[*old], &desired[*new]);
        let containers = matches!(
            (old_value, new_value),
            (Value::Object(_), Value::Object(_)) | (Value::Array(_), Value::Array(_))
        );
        if containers {
            compare_at(&index_path(path, *new), old_value, new_value, changes);
            return;
        }
    }

    for index in added {
        changes.push(Change {
            path: index_path(path, index),
            kind: ChangeKind::ItemAdded,
            old: None,
            new: Some(desired[index].clone()),
        });
    }
    for index in removed {
        changes.push(Change {
            path: index_path(path, index),
            kind: ChangeKind::ItemRemoved,
            old: Some(current[index].clone()),
            new: None,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_identical_documents_have_no_changes() {
        let doc = json!({"a": 1, "b": [1, 2, {"c": null}]});
        assert!(compare(&doc, &doc).is_empty());
        assert!(compare(&json!({}), &json!({})).is_empty());
    }

    #[test]
    fn test_key_order_is_ignored() {
        let current = json!({"a": 1, "b": 2});
        let desired = json!({"b": 2, "a": 1});
        assert!(compare(&current, &desired).is_empty());
    }

    #[test]
    fn test_array_order_is_ignored() {
        let current = json!({"processors": [{"set": {"field": "a"}}, {"trim": {"field": "b"}}]});
        let desired = json!({"processors": [{"trim": {"field": "b"}}, {"set": {"field": "a"}}]});
        assert!(compare(&current, &desired).is_empty());
    }

    #[test]
    fn test_array_repetition_counts() {
        let changes = compare(&json!(["a", "a", "b"]), &json!(["a", "b", "b"]));
        assert_eq!(changes.len(), 2);
        assert!(changes.iter().any(|c| c.kind == ChangeKind::ItemAdded));
        assert!(changes.iter().any(|c| c.kind == ChangeKind::ItemRemoved));
    }

    #[test]
    fn test_numbers_compare_by_value() {
        assert!(compare(&json!({"n": 1}), &json!({"n": 1.0})).is_empty());
        assert_eq!(compare(&json!({"n": 1}), &json!({"n": 2})).len(), 1);
    }

    #[test]
    fn test_value_changed_path_and_rendering() {
        let current = json!({"policy": {"phases": {"delete": {"min_age": "30d"}}}});
        let desired = json!({"policy": {"phases": {"delete": {"min_age": "90d"}}}});
        let changes = compare(&current, &desired);

        assert_eq!(changes.len(), 1);
        let change = &changes[0];
        assert_eq!(change.kind, ChangeKind::ValueChanged);
        assert_eq!(change.path, "root['policy']['phases']['delete']['min_age']");
        assert_eq!(
            change.to_string(),
            "~ root['policy']['phases']['delete']['min_age']: \"30d\" -> \"90d\""
        );
    }

    #[test]
    fn test_added_and_removed_keys() {
        let changes = compare(&json!({"a": 1, "gone": true}), &json!({"a": 1, "new": [1]}));
        assert_eq!(
            changes,
            vec![
                Change {
                    path: String::from("root['new']"),
                    kind: ChangeKind::KeyAdded,
                    old: None,
                    new: Some(json!([1])),
                },
                Change {
                    path: String::from("root['gone']"),
                    kind: ChangeKind::KeyRemoved,
                    old: Some(json!(true)),
                    new: None,
                },
            ]
        );
    }

    #[test]
    fn test_null_versus_value_is_type_change() {
        let changes = compare(&json!({"a": null}), &json!({"a": "x"}));
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].kind, ChangeKind::TypeChanged);
        assert_eq!(changes[0].kind.tag(), ChangeTag::Changed);
    }

    #[test]
    fn test_null_versus_absent_is_addition() {
        let changes = compare(&json!({}), &json!({"a": null}));
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].kind, ChangeKind::KeyAdded);
    }

    #[test]
    fn test_single_modified_array_object_recurses() {
        let current = json!([{"set": {"field": "a", "value": 1}}, {"trim": {}}]);
        let desired = json!([{"trim": {}}, {"set": {"field": "a", "value": 2}}]);
        let changes = compare(&current, &desired);

        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].path, "root[1]['set']['value']");
        assert_eq!(changes[0].kind, ChangeKind::ValueChanged);
    }

    #[test]
    fn test_added_scalar_item() {
        let changes = compare(&json!({"p": ["logs-*"]}), &json!({"p": ["logs-*", "metrics-*"]}));
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].kind, ChangeKind::ItemAdded);
        assert_eq!(changes[0].to_string(), "+ root['p'][1]: \"metrics-*\"");
    }
}
