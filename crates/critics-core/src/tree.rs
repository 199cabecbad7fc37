//! Tree operations shared by every store adapter
//!
//! The tree is a `serde_json::Value` whose objects are the interior nodes.
//! Null never appears in it: setting null removes, and removing the last
//! child of an object removes the object too.

use crate::ports::WriteOp;
use serde_json::{Map, Value};

/// Value at `segments`, or `None` when absent. Numeric segments index arrays.
pub fn get_at<'a>(root: &'a Value, segments: &[String]) -> Option<&'a Value> {
    let mut node = root;
    for segment in segments {
        node = match node {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    if node.is_null() {
        None
    } else {
        Some(node)
    }
}

/// Replace the value at `segments`, creating intermediate objects.
///
/// A non-object met on the way is replaced by an object.
pub fn set_at(root: &mut Value, segments: &[String], value: Value) {
    if value.is_null() {
        remove_at(root, segments);
        return;
    }

    let Some((last, parents)) = segments.split_last() else {
        *root = value;
        return;
    };

    let mut node = root;
    for segment in parents {
        node = ensure_object(node)
            .entry(segment.clone())
            .or_insert_with(|| Value::Object(Map::new()));
    }
    ensure_object(node).insert(last.clone(), value);
}

/// Merge `fields` into the object at `segments`.
pub fn update_at(root: &mut Value, segments: &[String], fields: &Map<String, Value>) {
    for (key, value) in fields {
        let mut child = segments.to_vec();
        child.push(key.clone());
        set_at(root, &child, value.clone());
    }
}

/// Remove the value at `segments`, pruning ancestors left empty.
pub fn remove_at(root: &mut Value, segments: &[String]) {
    let Some((first, rest)) = segments.split_first() else {
        *root = Value::Object(Map::new());
        return;
    };
    let Value::Object(map) = root else {
        return;
    };

    if rest.is_empty() {
        map.remove(first);
        return;
    }

    if let Some(child) = map.get_mut(first) {
        remove_at(child, rest);
        if is_empty_node(child) {
            map.remove(first);
        }
    }
}

pub fn apply(root: &mut Value, op: &WriteOp) {
    match op {
        WriteOp::Set { path, value } => set_at(root, path.segments(), value.clone()),
        WriteOp::Update { path, fields } => update_at(root, path.segments(), fields),
        WriteOp::Remove { path } => remove_at(root, path.segments()),
    }
}

fn ensure_object(node: &mut Value) -> &mut Map<String, Value> {
    if !node.is_object() {
        *node = Value::Object(Map::new());
    }
    match node {
        Value::Object(map) => map,
        _ => unreachable!("node was replaced by an object above"),
    }
}

fn is_empty_node(node: &Value) -> bool {
    match node {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}
