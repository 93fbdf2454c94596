//! Optimistic updates: re-read mapped leaves of a query result from locally cached documents.
use serde_json::Value;

use crate::{
    error::CsmError,
    paths::{studio, to_studio_path, ParsedPath, PathSegment},
    perspective::{DocumentCache, Perspective, SourceDocumentResolver},
    sourcemap::{resolve_mapping, source_path_with_suffix, ContentSourceMap, SourceDocument},
    walk::walk,
};

/// What an update function is told about a changed leaf.
#[derive(Debug, Clone, Copy)]
pub struct UpdateContext<'a> {
    pub cached_document: &'a Value,
    pub previous_value: &'a Value,
    pub source_document: &'a SourceDocument,
    pub source_path: &'a [PathSegment],
}

/// Apply cached documents onto `result` with the identity update function.
pub fn apply_source_documents<C>(
    result: &Value,
    result_source_map: Option<&ContentSourceMap>,
    cache: &C,
    perspective: &Perspective,
) -> Result<Value, CsmError>
where
    C: DocumentCache + ?Sized,
{
    apply_source_documents_with(result, result_source_map, cache, perspective, |value, _| value)
}

/// Return a copy of `result` where every leaf backed by a stored field holds that field's current
/// value in the cached document.
///
/// Leaves whose source is unmapped, literal, uncached or unchanged keep their original value;
/// `update_fn` runs once per leaf that actually changed and its return value is used in place of
/// the cached one. `result` is never modified.
///
/// With [Perspective::Raw] each source document is looked up under its exact id; any other
/// perspective resolves it through its lookup chain.
pub fn apply_source_documents_with<C, U>(
    result: &Value,
    result_source_map: Option<&ContentSourceMap>,
    cache: &C,
    perspective: &Perspective,
    mut update_fn: U,
) -> Result<Value, CsmError>
where
    C: DocumentCache + ?Sized,
    U: FnMut(Value, &UpdateContext<'_>) -> Value,
{
    let Some(csm) = result_source_map else {
        return Ok(result.clone());
    };
    let resolver = match perspective {
        Perspective::Raw => None,
        other => Some(SourceDocumentResolver::new(cache, other)?),
    };

    let mut failure: Option<CsmError> = None;
    let patched = walk(result, |value, path| {
        if failure.is_some() {
            return value.clone();
        }
        match patch_leaf(value, path, csm, cache, resolver.as_ref(), &mut update_fn) {
            Ok(patched) => patched,
            Err(e) => {
                failure = Some(e);
                value.clone()
            }
        }
    });
    match failure {
        Some(e) => Err(e),
        None => Ok(patched),
    }
}

fn patch_leaf<C, U>(
    value: &Value,
    path: &[PathSegment],
    csm: &ContentSourceMap,
    cache: &C,
    resolver: Option<&SourceDocumentResolver<'_, C>>,
    update_fn: &mut U,
) -> Result<Value, CsmError>
where
    C: DocumentCache + ?Sized,
    U: FnMut(Value, &UpdateContext<'_>) -> Value,
{
    let Some(resolved) = resolve_mapping(path, Some(csm)) else {
        return Ok(value.clone());
    };
    let Some(source) = csm.document_value_source(resolved.mapping) else {
        return Ok(value.clone());
    };
    let cached = match resolver {
        Some(resolver) => resolver.resolve(source.document)?,
        None => cache.get_document(source.document),
    };
    let Some(cached_document) = cached else {
        tracing::trace!(
            "[apply_source_documents] {} is not cached, keeping result value",
            source.document.id
        );
        return Ok(value.clone());
    };

    let source_path: ParsedPath = source_path_with_suffix(source.path, &resolved.path_suffix);
    let current = studio::get(&cached_document, &to_studio_path(&source_path)?);
    match current {
        Some(current) if current != value => {
            let ctx = UpdateContext {
                cached_document: &cached_document,
                previous_value: value,
                source_document: source.document,
                source_path: &source_path,
            };
            Ok(update_fn(current.clone(), &ctx))
        }
        _ => Ok(value.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sourcemap::{Mapping, MappingSource};
    use serde_json::json;
    use std::collections::BTreeMap;
    use test_log::test;

    fn csm() -> ContentSourceMap {
        serde_json::from_value(json!({
            "documents": [{"_id": "abc", "_type": "page"}],
            "paths": ["$['title']", "$['tags']"],
            "mappings": {
                "$['heading']": {"type": "value", "source": {"type": "documentValue", "document": 0, "path": 0}},
                "$['labels']": {"type": "value", "source": {"type": "documentValue", "document": 0, "path": 1}},
                "$['literal']": {"type": "value", "source": {"type": "literal"}}
            }
        }))
        .unwrap()
    }

    fn result() -> Value {
        json!({"heading": "Old", "labels": ["a", "b"], "literal": "x", "other": 1})
    }

    #[test]
    fn test_applies_changed_values() {
        let cache: BTreeMap<String, Value> = [(
            "abc".to_string(),
            json!({"_id": "abc", "title": "New", "tags": ["a", "c"]}),
        )]
        .into_iter()
        .collect();
        let input = result();
        let out = apply_source_documents(&input, Some(&csm()), &cache, &Perspective::Raw).unwrap();
        assert_eq!(
            out,
            json!({"heading": "New", "labels": ["a", "c"], "literal": "x", "other": 1})
        );
        assert_eq!(input, result());
    }

    #[test]
    fn test_update_fn_called_once_per_changed_leaf() {
        let cache: BTreeMap<String, Value> = [(
            "abc".to_string(),
            json!({"_id": "abc", "title": "New", "tags": ["a", "c"]}),
        )]
        .into_iter()
        .collect();
        let mut calls = Vec::new();
        let out = apply_source_documents_with(
            &result(),
            Some(&csm()),
            &cache,
            &Perspective::Raw,
            |value, ctx| {
                calls.push((ctx.previous_value.clone(), value.clone(), ctx.source_path.to_vec()));
                json!(format!("patched:{}", value.as_str().unwrap_or_default()))
            },
        )
        .unwrap();
        assert_eq!(
            calls,
            vec![
                (json!("Old"), json!("New"), vec![PathSegment::from("title")]),
                (json!("b"), json!("c"), vec![PathSegment::from("tags"), 1.into()]),
            ]
        );
        assert_eq!(out["heading"], json!("patched:New"));
        assert_eq!(out["labels"], json!(["a", "patched:c"]));
    }

    #[test]
    fn test_missing_cache_or_field_keeps_value() {
        let empty: BTreeMap<String, Value> = BTreeMap::new();
        let out = apply_source_documents(&result(), Some(&csm()), &empty, &Perspective::Raw).unwrap();
        assert_eq!(out, result());

        let partial: BTreeMap<String, Value> =
            [("abc".to_string(), json!({"_id": "abc"}))].into_iter().collect();
        let out =
            apply_source_documents(&result(), Some(&csm()), &partial, &Perspective::Raw).unwrap();
        assert_eq!(out, result());

        let out = apply_source_documents(&result(), None, &partial, &Perspective::Raw).unwrap();
        assert_eq!(out, result());
    }

    #[test]
    fn test_drafts_perspective_prefers_draft() {
        let cache: BTreeMap<String, Value> = [
            ("abc".to_string(), json!({"_id": "abc", "title": "Published"})),
            ("drafts.abc".to_string(), json!({"_id": "drafts.abc", "title": "Draft"})),
        ]
        .into_iter()
        .collect();
        let mut originals = Vec::new();
        let out = apply_source_documents_with(
            &result(),
            Some(&csm()),
            &cache,
            &Perspective::Drafts,
            |value, ctx| {
                originals.push(ctx.cached_document["_originalId"].clone());
                value
            },
        )
        .unwrap();
        assert_eq!(out["heading"], json!("Draft"));
        assert_eq!(originals, vec![json!("drafts.abc")]);
    }

    #[test]
    fn test_literal_mappings_are_inert() {
        let mut csm = csm();
        csm.mappings.insert(
            "$['other']".to_string(),
            Mapping::Value {
                source: MappingSource::Unknown,
            },
        );
        let cache = |_: &SourceDocument| Some(json!({"_id": "abc", "title": "Old", "tags": ["a", "b"]}));
        let out = apply_source_documents(&result(), Some(&csm), &cache, &Perspective::Raw).unwrap();
        assert_eq!(out, result());
    }
}
