//! Content Source Map wire types and mapping resolution.
//!
//! A source map arrives next to a query result (`resultSourceMap`) and records, for paths in the
//! result, which stored document and field produced the value found there:
//!
//! ```json
//! {
//!   "documents": [{ "_id": "drafts.abc", "_type": "page" }],
//!   "paths": ["$['title']"],
//!   "mappings": {
//!     "$['title']": {
//!       "type": "value",
//!       "source": { "type": "documentValue", "document": 0, "path": 0 }
//!     }
//!   }
//! }
//! ```
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::paths::{parse_expression, to_expression, to_mapping_key, ParsedPath, PathSegment};

/// A document that contributed to a query result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceDocument {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_type")]
    pub doc_type: String,
    #[serde(rename = "_projectId", default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    #[serde(rename = "_dataset", default, skip_serializing_if = "Option::is_none")]
    pub dataset: Option<String>,
}

impl SourceDocument {
    pub fn new<I: Into<String>, T: Into<String>>(id: I, doc_type: T) -> SourceDocument {
        SourceDocument {
            id: id.into(),
            doc_type: doc_type.into(),
            ..Default::default()
        }
    }

    /// The same descriptor under a different `_id`.
    pub fn with_id<I: Into<String>>(&self, id: I) -> SourceDocument {
        SourceDocument {
            id: id.into(),
            ..self.clone()
        }
    }
}

/// Where a mapped value came from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum MappingSource {
    /// A stored field: indices into [ContentSourceMap::documents] and [ContentSourceMap::paths].
    DocumentValue { document: usize, path: usize },
    /// A literal written in the query itself.
    Literal,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Mapping {
    Value { source: MappingSource },
}

impl Mapping {
    pub fn source(&self) -> &MappingSource {
        match self {
            Mapping::Value { source } => source,
        }
    }

    /// The `(document, path)` indices for document-valued mappings.
    pub fn document_value(&self) -> Option<(usize, usize)> {
        match self.source() {
            MappingSource::DocumentValue { document, path } => Some((*document, *path)),
            MappingSource::Literal | MappingSource::Unknown => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentSourceMap {
    #[serde(default)]
    pub documents: Vec<SourceDocument>,
    #[serde(default)]
    pub paths: Vec<String>,
    #[serde(default)]
    pub mappings: BTreeMap<String, Mapping>,
}

/// The source document and path expression behind a document-valued mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentValueSource<'a> {
    pub document: &'a SourceDocument,
    pub path: &'a str,
}

impl ContentSourceMap {
    /// Look up the document and path a mapping points at.
    ///
    /// `None` for literal or unknown sources, and for indices outside the map's tables.
    pub fn document_value_source(&self, mapping: &Mapping) -> Option<DocumentValueSource<'_>> {
        let (document, path) = mapping.document_value()?;
        let document = self.documents.get(document);
        let path = self.paths.get(path);
        if document.is_none() || path.is_none() {
            tracing::debug!(
                "[ContentSourceMap] mapping {:?} references an index outside the map",
                mapping
            );
        }
        Some(DocumentValueSource {
            document: document?,
            path: path?.as_str(),
        })
    }
}

/// The mapping responsible for a result path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedMapping<'a> {
    pub mapping: &'a Mapping,
    /// The mapping key that matched.
    pub matched_path: &'a str,
    /// The part of the result path's mapping key that the matched key did not cover, in
    /// path-expression notation. Empty for exact matches.
    pub path_suffix: String,
}

/// Find the mapping for `result_path`: the exact key if present, otherwise the longest key that
/// is a prefix of the path's mapping key.
///
/// Between equally long prefix keys the first in table order wins; well formed maps have at most
/// one.
pub fn resolve_mapping<'a>(
    result_path: &[PathSegment],
    csm: Option<&'a ContentSourceMap>,
) -> Option<ResolvedMapping<'a>> {
    let csm = csm?;
    if csm.mappings.is_empty() {
        return None;
    }
    let key = to_mapping_key(result_path);

    if let Some((matched_path, mapping)) = csm.mappings.get_key_value(&key) {
        return Some(ResolvedMapping {
            mapping,
            matched_path: matched_path.as_str(),
            path_suffix: String::new(),
        });
    }

    let mut best: Option<(&'a String, &'a Mapping)> = None;
    for (candidate, mapping) in csm.mappings.iter() {
        if !key.starts_with(candidate.as_str()) {
            continue;
        }
        if best.is_none_or(|(current, _)| candidate.len() > current.len()) {
            best = Some((candidate, mapping));
        }
    }

    match best {
        Some((matched_path, mapping)) => Some(ResolvedMapping {
            mapping,
            matched_path: matched_path.as_str(),
            path_suffix: key[matched_path.len()..].to_string(),
        }),
        None => {
            tracing::trace!("[resolve_mapping] no mapping covers {}", key);
            None
        }
    }
}

/// Join a mapping's source path with the unmatched suffix of a result path.
pub fn source_path_with_suffix(source_path: &str, path_suffix: &str) -> ParsedPath {
    parse_expression(&format!("{source_path}{path_suffix}"))
}

/// Join a mapping's source path with the trailing segments of the keyed result path that the
/// suffix stands for.
///
/// Unlike [source_path_with_suffix], keyed array items in the suffix keep their `_key` rather than
/// being flattened to the index the mapping key used.
pub fn resolved_keyed_source_path(
    keyed_result_path: &[PathSegment],
    path_suffix: &str,
    source_base_path: &str,
) -> ParsedPath {
    let suffix_len = parse_expression(path_suffix).len();
    let start = keyed_result_path.len().saturating_sub(suffix_len);
    let tail = to_expression(&keyed_result_path[start..]);
    parse_expression(&format!("{source_base_path}{}", &tail[1..]))
}
