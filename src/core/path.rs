//! Dot-path access into nested JSON objects.
//!
//! Card data that is keyed by target id (defend choices) is stored the way
//! the host stores document data: a dot-separated key addresses nested
//! objects, so `"Scene.a.Token.b"` written with [`set_path`] becomes
//! `{"Scene": {"a": {"Token": {"b": ...}}}}`. Readers also accept a literal
//! flat key equal to the whole path, which is how such data looks when it
//! was written by something other than the path helpers.
//!
//! Deep clones are plain `Value::clone` / `Map::clone`.

use serde_json::{Map, Value};

/// Look up the value at `path`.
///
/// A literal key equal to the whole path takes precedence over nesting.
#[must_use]
pub fn get_path<'a>(root: &'a Map<String, Value>, path: &str) -> Option<&'a Value> {
    if let Some(value) = root.get(path) {
        return Some(value);
    }

    let mut segments = path.split('.');
    let first = root.get(segments.next()?)?;
    segments.try_fold(first, |node, segment| node.as_object()?.get(segment))
}

/// Check whether a value exists at `path`.
#[must_use]
pub fn has_path(root: &Map<String, Value>, path: &str) -> bool {
    get_path(root, path).is_some()
}

/// Check whether a value exists at `path` inside an arbitrary JSON value.
///
/// Used on change deltas, which may be any JSON shape.
#[must_use]
pub fn value_has_path(root: &Value, path: &str) -> bool {
    root.as_object().is_some_and(|map| has_path(map, path))
}

/// Write `value` at `path`, creating intermediate objects as needed.
///
/// Non-object values sitting on the way are replaced by empty objects. A
/// literal flat key equal to the whole path is removed first, so a later
/// read cannot see a stale flat value ahead of the nested one.
pub fn set_path(root: &mut Map<String, Value>, path: &str, value: Value) {
    if path.contains('.') {
        root.remove(path);
    }
    let mut segments: Vec<&str> = path.split('.').collect();
    let Some(leaf) = segments.pop() else {
        return;
    };

    let mut node = root;
    for segment in segments {
        let entry = node
            .entry(segment.to_owned())
            .or_insert_with(|| Value::Object(Map::new()));
        if !entry.is_object() {
            *entry = Value::Object(Map::new());
        }
        let Value::Object(next) = entry else {
            return;
        };
        node = next;
    }

    node.insert(leaf.to_owned(), value);
}

/// Delete the value at `path`, touching nothing but the leaf key.
///
/// Ancestor objects are left in place even when they become empty, and
/// sibling keys are never removed. A literal flat key equal to the whole
/// path is removed as well. Returns whether anything was deleted.
pub fn delete_leaf(root: &mut Map<String, Value>, path: &str) -> bool {
    let removed_flat = root.remove(path).is_some();

    let mut segments: Vec<&str> = path.split('.').collect();
    let Some(leaf) = segments.pop() else {
        return removed_flat;
    };

    let mut node = root;
    for segment in segments {
        match node.get_mut(segment) {
            Some(Value::Object(next)) => node = next,
            _ => return removed_flat,
        }
    }

    node.remove(leaf).is_some() || removed_flat
}
