//! Operations on the JSON tree held by the store.
//!
//! The tree is a plain [`serde_json::Value`]; interior nodes are objects.
//! Writing `null` (or an empty object) at a path deletes the node, and
//! emptied parents are pruned, so a node either exists with data or does
//! not exist at all.

use serde_json::{Map, Value};

use crate::path::StorePath;

/// Read the value at a path, if any.
pub fn get<'a>(root: &'a Value, path: &StorePath) -> Option<&'a Value> {
    let mut node = root;
    for segment in path.segments() {
        node = node.as_object()?.get(segment)?;
    }
    if node.is_null() {
        None
    } else {
        Some(node)
    }
}

/// Write (or delete, with `None`) the value at a path.
///
/// Intermediate objects are created as needed; after a deletion, parents
/// left empty are pruned.
pub fn set(root: &mut Value, path: &StorePath, value: Option<Value>) {
    let value = value.filter(|v| !is_empty_node(v));
    set_inner(root, path.segments(), value);
}

fn set_inner(node: &mut Value, segments: &[String], value: Option<Value>) {
    let Some((head, rest)) = segments.split_first() else {
        *node = value.unwrap_or(Value::Null);
        return;
    };

    if !node.is_object() {
        if value.is_none() {
            // Deleting below a leaf or a hole: nothing to do.
            return;
        }
        *node = Value::Object(Map::new());
    }
    let map = node.as_object_mut().expect("object ensured above");

    match map.get_mut(head.as_str()) {
        Some(child) => {
            set_inner(child, rest, value);
            let now_empty = is_empty_node(child);
            if now_empty {
                map.remove(head.as_str());
            }
        }
        None => {
            if value.is_none() {
                return;
            }
            let mut child = Value::Object(Map::new());
            set_inner(&mut child, rest, value);
            if !is_empty_node(&child) {
                map.insert(head.clone(), child);
            }
        }
    }
}

/// Merge a field map into the object at a path.
///
/// This is the partial-update primitive: each entry overwrites one child,
/// and a `null` entry deletes that child.  Other children are untouched.
pub fn merge_fields(root: &mut Value, path: &StorePath, fields: Map<String, Value>) {
    for (key, value) in fields {
        let child = match path.child(&key) {
            Ok(child) => child,
            Err(_) => continue,
        };
        let value = if value.is_null() { None } else { Some(value) };
        set(root, &child, value);
    }
}

fn is_empty_node(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}
