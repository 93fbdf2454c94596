//! The normalized, bracket-only path expression used as Content Source Map keys.
//!
//! ```text
//! $['content'][?(@._key=='section-1')]['title'][0]
//! ```
//!
//! Object keys are quoted with `['..']`, array indices are bare `[n]` and keyed array items are
//! written as `[?(@._key=='..')]` filter expressions.
use once_cell::sync::Lazy;
use regex::Regex;

use super::segment::{KeyedSegment, ParsedPath, PathSegment};

static SEGMENT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?s)\['(?P<key>(?:[^'\\]|\\.)*)'\]|\[(?P<index>\d+)\]|\[\?\(@\._key=='(?P<keyed>(?:[^'\\]|\\.)*)'\)\]",
    )
    .expect("path expression segment pattern to compile")
});

fn escape_key(key: &str) -> String {
    let mut escaped = String::with_capacity(key.len());
    for c in key.chars() {
        match c {
            '\u{c}' => escaped.push_str("\\f"),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\t' => escaped.push_str("\\t"),
            '\'' => escaped.push_str("\\'"),
            '\\' => escaped.push_str("\\\\"),
            _ => escaped.push(c),
        }
    }
    escaped
}

// `_key` values only ever escape quotes and backslashes.
fn escape_keyed(key: &str) -> String {
    key.replace('\\', "\\\\").replace('\'', "\\'")
}

fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('f') => out.push('\u{c}'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

fn push_segment(expr: &mut String, segment: &PathSegment) {
    match segment {
        PathSegment::Key(key) => {
            expr.push_str("['");
            expr.push_str(&escape_key(key));
            expr.push_str("']");
        }
        PathSegment::Index(idx) => {
            expr.push('[');
            expr.push_str(&idx.to_string());
            expr.push(']');
        }
        PathSegment::Keyed(KeyedSegment { key, index }) => match (key.is_empty(), index) {
            (true, Some(idx)) => push_segment(expr, &PathSegment::Index(*idx)),
            _ => {
                expr.push_str("[?(@._key=='");
                expr.push_str(&escape_keyed(key));
                expr.push_str("')]");
            }
        },
    }
}

/// Render a path as a normalized path expression, e.g. `$['foo']['bar'][0]`.
pub fn to_expression(path: &[PathSegment]) -> String {
    let mut expr = String::from("$");
    for segment in path {
        push_segment(&mut expr, segment);
    }
    expr
}

/// Render a path the way Content Source Map mapping keys are written.
///
/// Mapping tables are keyed structurally, so any keyed segment whose array position is known is
/// written as its bare index.
pub fn to_mapping_key(path: &[PathSegment]) -> String {
    let mut expr = String::from("$");
    for segment in path {
        match segment {
            PathSegment::Keyed(KeyedSegment {
                index: Some(idx), ..
            }) => push_segment(&mut expr, &PathSegment::Index(*idx)),
            _ => push_segment(&mut expr, segment),
        }
    }
    expr
}

/// Parse a normalized path expression.
///
/// Segments are matched in order; text between recognized segments (including the leading `$`)
/// is ignored. Keyed segments parse with an unresolved index.
pub fn parse_expression(expr: &str) -> ParsedPath {
    SEGMENT_RE
        .captures_iter(expr)
        .filter_map(|caps| {
            if let Some(key) = caps.name("key") {
                Some(PathSegment::Key(unescape(key.as_str())))
            } else if let Some(idx) = caps.name("index") {
                idx.as_str().parse::<usize>().ok().map(PathSegment::Index)
            } else {
                caps.name("keyed")
                    .map(|keyed| PathSegment::Keyed(KeyedSegment::new(unescape(keyed.as_str()))))
            }
        })
        .collect()
}
