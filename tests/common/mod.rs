//! Shared test utilities for integration tests.
//!
//! Import from integration test files as:
//! ```ignore
//! mod common;
//! ```

use content_source_map::sourcemap::ContentSourceMap;
use serde_json::{json, Value};
use std::path::PathBuf;
use tempfile::TempDir;

/// Initialize tracing for tests, respecting RUST_LOG env var.
///
/// Safe to call multiple times; later calls are no-ops.
#[allow(dead_code)]
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init()
        .ok();
}

/// The id of the blog post in [blog_post_response].
#[allow(dead_code)]
pub const POST_ID: &str = "807cc05c-8c4c-443a-a5cc-e5bd4c9d7c8b";

/// A query response for a blog post projection:
///
/// ```groq
/// *[_type == "post"][0]{ title, "slug": slug.current, content, "authorName": author->name }
/// ```
///
/// The post is served from its draft; the author is published.
#[allow(dead_code)]
pub fn blog_post_response() -> Value {
    json!({
        "result": {
            "title": "Hello world",
            "slug": "hello-world",
            "content": [
                {
                    "_type": "block",
                    "_key": "b1",
                    "style": "normal",
                    "markDefs": [],
                    "children": [{"_type": "span", "_key": "s1", "text": "First paragraph", "marks": []}]
                }
            ],
            "authorName": "Ada"
        },
        "resultSourceMap": {
            "documents": [
                {"_id": format!("drafts.{POST_ID}"), "_type": "post"},
                {"_id": "author-ada", "_type": "person"}
            ],
            "paths": ["$['title']", "$['slug']['current']", "$['content']", "$['name']"],
            "mappings": {
                "$['title']": {"type": "value", "source": {"type": "documentValue", "document": 0, "path": 0}},
                "$['slug']": {"type": "value", "source": {"type": "documentValue", "document": 0, "path": 1}},
                "$['content']": {"type": "value", "source": {"type": "documentValue", "document": 0, "path": 2}},
                "$['authorName']": {"type": "value", "source": {"type": "documentValue", "document": 1, "path": 3}}
            }
        }
    })
}

#[allow(dead_code)]
pub fn blog_post_source_map() -> ContentSourceMap {
    serde_json::from_value(blog_post_response()["resultSourceMap"].clone()).unwrap()
}

#[allow(dead_code)]
pub fn blog_post_result() -> Value {
    blog_post_response()["result"].clone()
}

/// Write `value` as JSON into `temp_dir`, returning the file path.
#[allow(dead_code)]
pub fn write_json(temp_dir: &TempDir, name: &str, value: &Value) -> PathBuf {
    let path = temp_dir.path().join(name);
    std::fs::write(&path, serde_json::to_string_pretty(value).unwrap()).unwrap();
    path
}
