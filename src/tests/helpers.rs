//! Shared fixtures for crate-level tests

use crate::sourcemap::{ContentSourceMap, Mapping, MappingSource, SourceDocument};
use serde_json::{json, Value};
use std::collections::BTreeMap;

/// Initialize logging for tests
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init()
        .ok();
}

pub fn document_value(document: usize, path: usize) -> Mapping {
    Mapping::Value {
        source: MappingSource::DocumentValue { document, path },
    }
}

/// A landing page projection joining an author document:
///
/// ```groq
/// *[_type == "page"][0]{ title, "sections": body, author->{ name }, "kind": "landing" }
/// ```
pub fn landing_page_source_map() -> ContentSourceMap {
    init_logging();
    ContentSourceMap {
        documents: vec![
            SourceDocument {
                project_id: Some("p1".to_string()),
                dataset: Some("production".to_string()),
                ..SourceDocument::new("drafts.page-1", "page")
            },
            SourceDocument::new("author-1", "person"),
        ],
        paths: vec![
            "$['title']".to_string(),
            "$['body']".to_string(),
            "$['name']".to_string(),
        ],
        mappings: BTreeMap::from([
            ("$['title']".to_string(), document_value(0, 0)),
            ("$['sections']".to_string(), document_value(0, 1)),
            ("$['author']['name']".to_string(), document_value(1, 2)),
            (
                "$['kind']".to_string(),
                Mapping::Value {
                    source: MappingSource::Literal,
                },
            ),
        ]),
    }
}

pub fn landing_page_result() -> Value {
    json!({
        "title": "Welcome",
        "sections": [
            {"_key": "hero", "_type": "hero", "heading": "Hello"},
            {"_key": "faq", "_type": "faq", "heading": "Questions", "items": ["One", "Two"]}
        ],
        "author": {"name": "Ada"},
        "kind": "landing"
    })
}

/// Cached documents for [landing_page_source_map], keyed by id.
pub fn landing_page_cache() -> BTreeMap<String, Value> {
    BTreeMap::from([
        (
            "drafts.page-1".to_string(),
            json!({
                "_id": "drafts.page-1",
                "_type": "page",
                "title": "Welcome back",
                "body": [
                    {"_key": "hero", "_type": "hero", "heading": "Hello"},
                    {"_key": "faq", "_type": "faq", "heading": "Questions", "items": ["One", "Three"]}
                ]
            }),
        ),
        (
            "author-1".to_string(),
            json!({"_id": "author-1", "_type": "person", "name": "Ada"}),
        ),
    ])
}
