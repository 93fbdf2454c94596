//! Stega encoding support: decide which strings in a result get an invisible edit link and what
//! that link is.
//!
//! The bit-level encoding itself lives outside this crate and is supplied as a `combine` function
//! taking the visible string and a [StegaPayload].
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use url::Url;

use crate::{
    edit::{create_edit_url, resolve_studio_base_route, EditInfo, StudioUrl},
    error::CsmError,
    paths::{to_expression, ParsedPath, PathSegment},
    sourcemap::{resolve_mapping, resolved_keyed_source_path, ContentSourceMap, SourceDocument},
    walk::walk_portable_text,
};

pub const STEGA_ORIGIN: &str = "sanity.io";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StegaConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub studio_url: Option<StudioUrl>,
    /// Leave `projectId`/`dataset` out of the encoded edit links.
    #[serde(default)]
    pub omit_cross_dataset_reference_data: bool,
}

/// A string leaf that could carry an edit link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodeContext<'a> {
    /// The field in the source document, with keyed array items kept as keys.
    pub source_path: ParsedPath,
    pub source_document: &'a SourceDocument,
    pub result_path: ParsedPath,
    pub value: &'a str,
}

/// The data encoded into a string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StegaPayload {
    pub origin: String,
    pub href: String,
}

/// Call `encoder` for every string leaf of `result` that maps to a stored field, using its return
/// value in place of the string.
///
/// Portable text is only entered through block `children` and span `text`.
pub fn encode_into_result<F>(result: &Value, csm: &ContentSourceMap, mut encoder: F) -> Value
where
    F: FnMut(&EncodeContext<'_>) -> Value,
{
    walk_portable_text(result, |value, path| {
        let Value::String(text) = value else {
            return value.clone();
        };
        let Some(resolved) = resolve_mapping(path, Some(csm)) else {
            return value.clone();
        };
        let Some(source) = csm.document_value_source(resolved.mapping) else {
            return value.clone();
        };
        encoder(&EncodeContext {
            source_path: resolved_keyed_source_path(path, &resolved.path_suffix, source.path),
            source_document: source.document,
            result_path: path.to_vec(),
            value: text,
        })
    })
}

static DATE_PREFIX_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{4})-(\d{2})-(\d{2})").expect("date prefix pattern to compile")
});

static TYPE_LIKE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)type").expect("type-like pattern to compile"));

static DENYLIST: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "color", "colour", "currency", "email", "format", "gid", "hex", "href", "hsl", "hsla",
        "icon", "id", "index", "key", "language", "layout", "link", "linkAction", "locale", "lqip",
        "page", "path", "ref", "rgb", "rgba", "route", "secret", "slug", "status", "tag",
        "template", "theme", "type", "textTheme", "unit", "url", "username", "variant", "website",
    ]
    .into_iter()
    .collect()
});

const SEO_SEGMENTS: [&str; 4] = ["meta", "metadata", "openGraph", "seo"];

fn is_valid_date(value: &str) -> bool {
    let Some(caps) = DATE_PREFIX_RE.captures(value) else {
        return false;
    };
    let month: u32 = caps[2].parse().unwrap_or(0);
    let day: u32 = caps[3].parse().unwrap_or(0);
    (1..=12).contains(&month) && (1..=31).contains(&day)
}

fn is_valid_url(value: &str) -> bool {
    if value.starts_with('/') {
        return Url::parse("https://acme.com")
            .and_then(|base| base.join(value))
            .is_ok();
    }
    Url::parse(value).is_ok()
}

fn has_type_like(path: &[PathSegment]) -> bool {
    path.iter()
        .any(|segment| matches!(segment, PathSegment::Key(key) if TYPE_LIKE_RE.is_match(key)))
}

fn key_at(path: &[PathSegment], from_end: usize) -> Option<&str> {
    let idx = path.len().checked_sub(from_end)?;
    match path.get(idx) {
        Some(PathSegment::Key(key)) => Some(key.as_str()),
        _ => None,
    }
}

/// The default policy for which strings get encoded.
///
/// Skips values that look like dates or URLs, slugs, underscored or `*Id` fields, anything under
/// SEO metadata, paths mentioning a type, and a fixed list of field names that usually drive
/// layout or logic rather than display.
pub fn filter_default(ctx: &EncodeContext<'_>) -> bool {
    if is_valid_date(ctx.value) || is_valid_url(ctx.value) {
        return false;
    }
    let end = key_at(&ctx.source_path, 1);
    if key_at(&ctx.source_path, 2) == Some("slug") && end == Some("current") {
        return false;
    }
    if let Some(end) = end {
        if end.starts_with('_') || end.ends_with("Id") {
            return false;
        }
    }
    if ctx
        .source_path
        .iter()
        .any(|segment| matches!(segment, PathSegment::Key(key) if SEO_SEGMENTS.contains(&key.as_str())))
    {
        return false;
    }
    if has_type_like(&ctx.source_path) || has_type_like(&ctx.result_path) {
        return false;
    }
    !end.is_some_and(|end| DENYLIST.contains(end))
}

/// Encode edit links into every eligible string of `result`.
///
/// Returns `result` unchanged when encoding is disabled. Strings rejected by `filter` are left as
/// they are; the rest are replaced by `combine(value, payload)`.
pub fn stega_encode_source_map<F, C>(
    result: &Value,
    csm: Option<&ContentSourceMap>,
    config: &StegaConfig,
    filter: F,
    mut combine: C,
) -> Result<Value, CsmError>
where
    F: Fn(&EncodeContext<'_>) -> bool,
    C: FnMut(&str, &StegaPayload) -> String,
{
    if !config.enabled {
        tracing::debug!("[stega] disabled, returning result untouched");
        return Ok(result.clone());
    }
    let Some(studio_url) = config.studio_url.as_ref() else {
        return Err(CsmError::MissingField("studioUrl".to_string()));
    };
    let Some(csm) = csm else {
        tracing::debug!("[stega] no resultSourceMap, returning result untouched");
        return Ok(result.clone());
    };
    let route = resolve_studio_base_route(studio_url);

    let mut encoded: Vec<String> = Vec::new();
    let mut skipped: Vec<String> = Vec::new();
    let mut failure: Option<CsmError> = None;

    let out = encode_into_result(result, csm, |ctx| {
        let original = Value::String(ctx.value.to_string());
        if failure.is_some() || !filter(ctx) {
            skipped.push(to_expression(&ctx.result_path));
            return original;
        }
        let cross_dataset = !config.omit_cross_dataset_reference_data;
        let info = EditInfo {
            base_url: route.base_url.clone(),
            workspace: route.workspace.clone(),
            tool: route.tool.clone(),
            id: ctx.source_document.id.clone(),
            doc_type: ctx.source_document.doc_type.clone(),
            path: ctx.source_path.clone(),
            project_id: ctx
                .source_document
                .project_id
                .clone()
                .filter(|_| cross_dataset),
            dataset: ctx.source_document.dataset.clone().filter(|_| cross_dataset),
        };
        match create_edit_url(&info) {
            Ok(href) => {
                encoded.push(to_expression(&ctx.result_path));
                let payload = StegaPayload {
                    origin: STEGA_ORIGIN.to_string(),
                    href,
                };
                Value::String(combine(ctx.value, &payload))
            }
            Err(e) => {
                failure = Some(e);
                original
            }
        }
    });

    if let Some(e) = failure {
        return Err(e);
    }
    tracing::debug!(
        "[stega] encoded {} paths, skipped {}",
        encoded.len(),
        skipped.len()
    );
    tracing::trace!("[stega] encoded: {:?}", encoded);
    tracing::trace!("[stega] skipped: {:?}", skipped);
    Ok(out)
}
