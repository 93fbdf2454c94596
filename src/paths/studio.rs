//! Studio paths: the human facing notation used by editing tools.
//!
//! ```text
//! body[_key=="abc"].children[0].text
//! ```
//!
//! Studio paths have one segment kind with no path-expression counterpart, the index range
//! `[from:to]`, so conversion into a [ParsedPath] is fallible.
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::fmt::{Display, Formatter};

use super::segment::{KeyedSegment, ParsedPath, PathSegment};
use crate::error::CsmError;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StudioSegment {
    Key(String),
    Index(usize),
    /// `[_key=="..."]`
    Keyed(String),
    /// `[from:to]`, either bound optional.
    Range(Option<usize>, Option<usize>),
}

pub type StudioPath = Vec<StudioSegment>;

static STUDIO_SEGMENT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?x)
        \[\s*(?P<index>\d+)\s*\]
        | \[\s*(?P<from>\d*)\s*:\s*(?P<to>\d*)\s*\]
        | \[\s*_key\s*==\s*(?:"(?P<kdq>(?:[^"\\]|\\.)*)"|'(?P<ksq>(?:[^'\\]|\\.)*)')\s*\]
        | \[\s*(?:"(?P<dq>(?:[^"\\]|\\.)*)"|'(?P<sq>(?:[^'\\]|\\.)*)')\s*\]
        | (?P<prop>[^.\[\]]+)
        "#,
    )
    .expect("studio path segment pattern to compile")
});

static PLAIN_PROPERTY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$\-]*$").expect("plain property pattern to compile")
});

fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => out.push(chars.next().unwrap_or('\\')),
            _ => out.push(c),
        }
    }
    out
}

fn quote(raw: &str) -> String {
    format!("\"{}\"", raw.replace('\\', "\\\\").replace('"', "\\\""))
}

fn parse_bound(raw: &str) -> Result<Option<usize>, CsmError> {
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse::<usize>()
        .map(Some)
        .map_err(|e| CsmError::InvalidPath(format!("invalid range bound '{raw}': {e}")))
}

/// Parse a studio path string.
///
/// Accepts plain property names, bracketed indices, bracketed quoted property names, `_key`
/// predicates in either quote style and `[from:to]` ranges. Fails when no segment can be read.
pub fn parse_studio_path(path: &str) -> Result<StudioPath, CsmError> {
    let mut segments = StudioPath::new();
    for caps in STUDIO_SEGMENT_RE.captures_iter(path) {
        let segment = if let Some(idx) = caps.name("index") {
            StudioSegment::Index(idx.as_str().parse::<usize>().map_err(|e| {
                CsmError::InvalidPath(format!("invalid index '{}': {e}", idx.as_str()))
            })?)
        } else if let (Some(from), Some(to)) = (caps.name("from"), caps.name("to")) {
            StudioSegment::Range(parse_bound(from.as_str())?, parse_bound(to.as_str())?)
        } else if let Some(key) = caps.name("kdq").or_else(|| caps.name("ksq")) {
            StudioSegment::Keyed(unescape(key.as_str()))
        } else if let Some(key) = caps.name("dq").or_else(|| caps.name("sq")) {
            StudioSegment::Key(unescape(key.as_str()))
        } else if let Some(prop) = caps.name("prop") {
            StudioSegment::Key(prop.as_str().to_string())
        } else {
            continue;
        };
        segments.push(segment);
    }
    if segments.is_empty() {
        return Err(CsmError::InvalidPath(format!(
            "no path segments found in '{path}'"
        )));
    }
    Ok(segments)
}

/// Render a studio path string. Property names that would not read back as a plain property are
/// written in bracketed, quoted form.
pub fn studio_path_to_string(path: &[StudioSegment]) -> String {
    let mut out = String::new();
    for (i, segment) in path.iter().enumerate() {
        match segment {
            StudioSegment::Key(key) if PLAIN_PROPERTY_RE.is_match(key) => {
                if i > 0 {
                    out.push('.');
                }
                out.push_str(key);
            }
            StudioSegment::Key(key) => {
                out.push('[');
                out.push_str(&quote(key));
                out.push(']');
            }
            StudioSegment::Index(idx) => {
                out.push_str(&format!("[{idx}]"));
            }
            StudioSegment::Keyed(key) => {
                out.push_str("[_key==");
                out.push_str(&quote(key));
                out.push(']');
            }
            StudioSegment::Range(from, to) => {
                let bound = |b: &Option<usize>| b.map(|b| b.to_string()).unwrap_or_default();
                out.push_str(&format!("[{}:{}]", bound(from), bound(to)));
            }
        }
    }
    out
}

/// Convert a parsed path into studio notation.
///
/// Keyed segments keep their key; a keyed segment with an empty key falls back to its index and
/// fails if it has none.
pub fn to_studio_path(path: &[PathSegment]) -> Result<StudioPath, CsmError> {
    path.iter()
        .map(|segment| match segment {
            PathSegment::Key(key) => Ok(StudioSegment::Key(key.clone())),
            PathSegment::Index(idx) => Ok(StudioSegment::Index(*idx)),
            PathSegment::Keyed(KeyedSegment { key, .. }) if !key.is_empty() => {
                Ok(StudioSegment::Keyed(key.clone()))
            }
            PathSegment::Keyed(KeyedSegment {
                index: Some(idx), ..
            }) => Ok(StudioSegment::Index(*idx)),
            PathSegment::Keyed(_) => Err(CsmError::UnsupportedSegment(
                "keyed segment with neither key nor index".to_string(),
            )),
        })
        .collect()
}

/// Convert a studio path into a parsed path. Index ranges have no parsed-path form.
pub fn from_studio_path(path: &[StudioSegment]) -> Result<ParsedPath, CsmError> {
    path.iter()
        .map(|segment| match segment {
            StudioSegment::Key(key) => Ok(PathSegment::Key(key.clone())),
            StudioSegment::Index(idx) => Ok(PathSegment::Index(*idx)),
            StudioSegment::Keyed(key) => Ok(PathSegment::Keyed(KeyedSegment::new(key.clone()))),
            StudioSegment::Range(_, _) => Err(CsmError::UnsupportedSegment(format!(
                "index range segments aren't supported: {}",
                studio_path_to_string(std::slice::from_ref(segment))
            ))),
        })
        .collect()
}

/// Parse a studio path string straight into a [ParsedPath].
pub fn parse_studio_path_to_parsed(path: &str) -> Result<ParsedPath, CsmError> {
    from_studio_path(&parse_studio_path(path)?)
}

/// Render a [ParsedPath] as a studio path string.
pub fn parsed_to_studio_string(path: &[PathSegment]) -> Result<String, CsmError> {
    Ok(studio_path_to_string(&to_studio_path(path)?))
}

/// Follow `path` into `value`.
///
/// Returns `None` as soon as a segment does not resolve: a missing key, an index out of bounds,
/// an index or keyed segment applied to a non-array, or a range segment.
pub fn get<'a>(value: &'a Value, path: &[StudioSegment]) -> Option<&'a Value> {
    let mut acc = value;
    for segment in path {
        acc = match (segment, acc) {
            (StudioSegment::Key(key), Value::Object(map)) => map.get(key)?,
            (StudioSegment::Index(idx), Value::Array(items)) => items.get(*idx)?,
            (StudioSegment::Keyed(key), Value::Array(items)) => items
                .iter()
                .find(|item| item.get("_key").and_then(Value::as_str) == Some(key.as_str()))?,
            _ => return None,
        };
    }
    Some(acc)
}

impl Display for StudioSegment {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", studio_path_to_string(std::slice::from_ref(self)))
    }
}
