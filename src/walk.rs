//! Generic traversal of JSON values that rebuilds the tree while mapping every leaf.
//!
//! Containers (arrays and objects) are descended; everything else, `null` included, is a leaf and
//! is replaced by whatever the mapping function returns. Array items that are objects with a string
//! `_key` are addressed by a [KeyedSegment] carrying both the key and the position.
use serde_json::{Map, Value};

use crate::paths::{KeyedSegment, ParsedPath, PathSegment};

/// Map every leaf of `value`, returning a new tree. `value` itself is left untouched.
pub fn walk<F>(value: &Value, mut f: F) -> Value
where
    F: FnMut(&Value, &[PathSegment]) -> Value,
{
    let mut path = ParsedPath::new();
    walk_inner(value, &mut f, &mut path, false)
}

/// Like [walk], with every leaf path prefixed by `base_path`.
pub fn walk_from<F>(value: &Value, base_path: &[PathSegment], mut f: F) -> Value
where
    F: FnMut(&Value, &[PathSegment]) -> Value,
{
    let mut path = base_path.to_vec();
    walk_inner(value, &mut f, &mut path, false)
}

/// Like [walk], but portable text is only entered where it holds text: `block` objects are
/// descended through `children` and `span` objects through `text`. Their other fields are copied
/// through unmapped.
pub fn walk_portable_text<F>(value: &Value, mut f: F) -> Value
where
    F: FnMut(&Value, &[PathSegment]) -> Value,
{
    let mut path = ParsedPath::new();
    walk_inner(value, &mut f, &mut path, true)
}

fn item_segment(item: &Value, idx: usize) -> PathSegment {
    match item.get("_key").and_then(Value::as_str) {
        Some(key) if item.is_object() => PathSegment::Keyed(KeyedSegment::with_index(key, idx)),
        _ => PathSegment::Index(idx),
    }
}

fn walk_inner<F>(value: &Value, f: &mut F, path: &mut ParsedPath, portable_text: bool) -> Value
where
    F: FnMut(&Value, &[PathSegment]) -> Value,
{
    match value {
        Value::Array(items) => Value::Array(
            items
                .iter()
                .enumerate()
                .map(|(idx, item)| {
                    path.push(item_segment(item, idx));
                    let mapped = walk_inner(item, f, path, portable_text);
                    path.pop();
                    mapped
                })
                .collect(),
        ),
        Value::Object(map) => {
            let text_field = match map.get("_type").and_then(Value::as_str) {
                Some("block") if portable_text => Some("children"),
                Some("span") if portable_text => Some("text"),
                _ => None,
            };
            let mut out = Map::with_capacity(map.len());
            for (key, child) in map {
                let mapped = match text_field {
                    Some(field) if field != key.as_str() => child.clone(),
                    _ => {
                        path.push(PathSegment::Key(key.clone()));
                        let mapped = walk_inner(child, f, path, portable_text);
                        path.pop();
                        mapped
                    }
                };
                out.insert(key.clone(), mapped);
            }
            Value::Object(out)
        }
        leaf => f(leaf, path.as_slice()),
    }
}
