//! Path-addressed reads and writes over a JSON document.
//!
//! Paths address object keys only. Writes create intermediate objects as
//! needed; reads and deletes of absent paths are no-ops.

use crate::types::Path;
use serde_json::{Map, Value};

/// Get a reference to the value at a path, if present.
pub fn get_in<'a>(doc: &'a Value, path: &Path) -> Option<&'a Value> {
    let mut current = doc;
    for segment in path.segments() {
        current = current.get(segment)?;
    }
    Some(current)
}

/// Set the value at a path, creating intermediate objects as needed.
///
/// Any non-object encountered along the way is replaced by an object, so
/// the write always lands.
pub fn set_in(doc: &mut Value, path: &Path, value: Value) {
    set_at(doc, path.segments(), value);
}

fn set_at(current: &mut Value, segments: &[String], value: Value) {
    match segments {
        [] => *current = value,
        [key, rest @ ..] => {
            if !current.is_object() {
                *current = Value::Object(Map::new());
            }
            let obj = current.as_object_mut().unwrap();
            if rest.is_empty() {
                obj.insert(key.clone(), value);
            } else {
                let entry = obj.entry(key.clone()).or_insert(Value::Null);
                set_at(entry, rest, value);
            }
        }
    }
}

/// Delete the value at a path. Returns true if something was removed.
pub fn delete_in(doc: &mut Value, path: &Path) -> bool {
    delete_at(doc, path.segments())
}

fn delete_at(current: &mut Value, segments: &[String]) -> bool {
    match segments {
        [] => false,
        [key] => current
            .as_object_mut()
            .map(|obj| obj.remove(key).is_some())
            .unwrap_or(false),
        [key, rest @ ..] => current
            .as_object_mut()
            .and_then(|obj| obj.get_mut(key))
            .map(|child| delete_at(child, rest))
            .unwrap_or(false),
    }
}

/// Deep-merge `incoming` into `target`.
///
/// Objects merge key by key, recursively; everything else (scalars,
/// arrays, nulls) overwrites the target wholesale.
pub fn merge_deep(target: &mut Value, incoming: &Value) {
    match (target.as_object_mut(), incoming.as_object()) {
        (Some(target_obj), Some(incoming_obj)) => {
            for (key, incoming_child) in incoming_obj {
                match target_obj.get_mut(key) {
                    Some(existing) => merge_deep(existing, incoming_child),
                    None => {
                        target_obj.insert(key.clone(), incoming_child.clone());
                    }
                }
            }
        }
        _ => *target = incoming.clone(),
    }
}
