//! # content-source-map
//!
//! Tools for working with Content Source Maps: the side-channel a content query API returns next
//! to a query result, recording which stored document and field produced each value in the result.
//!
//! ## Overview
//!
//! A query result is a freely shaped JSON tree: projections rename and nest fields, join
//! referenced documents and mix in literals. The source map (`resultSourceMap`) ties paths in that
//! tree back to `(document, field)` pairs. This crate reads those maps and uses them to:
//!
//! - **Link**: build an "edit this field" URL for any value in the result
//! - **Patch**: re-read mapped values from locally cached, possibly newer, documents
//! - **Mark**: decide which strings should carry an invisible edit link, and what that link is
//!
//! ## Architecture
//!
//! - **[`paths`]**: Path segments and the two textual path notations (JSONPath-like mapping keys
//!   and the studio's dotted notation), with conversion between them
//! - **[`walk`]**: Leaf-mapping traversal of JSON values that tracks the current path
//! - **[`sourcemap`]**: Wire types and longest-prefix mapping resolution
//! - **[`ids`]**: Published, draft and release-version document ids
//! - **[`perspective`]**: Perspective chains and resolving documents against a cache
//! - **[`edit`]**: Edit info and edit URL construction
//! - **[`patch`]**: Optimistic patching of a result from cached documents
//! - **[`stega`]**: Selection and payloads for stega-encoded edit links
//! - **[`config`]**: TOML backed settings
//!
//! ## Quick Start
//!
//! ```rust
//! use content_source_map::{edit::resolve_edit_url, sourcemap::ContentSourceMap};
//! use serde_json::json;
//!
//! let csm: ContentSourceMap = serde_json::from_value(json!({
//!     "documents": [{ "_id": "drafts.abc", "_type": "page" }],
//!     "paths": ["$['title']"],
//!     "mappings": {
//!         "$['heading']": {
//!             "type": "value",
//!             "source": { "type": "documentValue", "document": 0, "path": 0 }
//!         }
//!     }
//! }))?;
//!
//! let url = resolve_edit_url(&csm, "heading", "https://example.sanity.studio")?;
//! assert!(url.unwrap().ends_with("&isDraft="));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ### Patching a Result
//!
//! ```rust
//! # use content_source_map::{patch::apply_source_documents, perspective::Perspective, sourcemap::ContentSourceMap};
//! # use serde_json::{json, Value};
//! # use std::collections::BTreeMap;
//! # let csm: ContentSourceMap = serde_json::from_value(json!({
//! #     "documents": [{ "_id": "abc", "_type": "page" }],
//! #     "paths": ["$['title']"],
//! #     "mappings": {"$['heading']": {"type": "value", "source": {"type": "documentValue", "document": 0, "path": 0}}}
//! # }))?;
//! let mut cache: BTreeMap<String, Value> = BTreeMap::new();
//! cache.insert("drafts.abc".to_string(), json!({ "_id": "drafts.abc", "title": "Edited" }));
//!
//! let result = json!({ "heading": "Original" });
//! let patched = apply_source_documents(&result, Some(&csm), &cache, &Perspective::Drafts)?;
//! assert_eq!(patched, json!({ "heading": "Edited" }));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Features
//!
//! - **default**: The library
//! - **bin**: The `csm` command line tool

pub mod config;
pub mod edit;
pub mod error;
pub mod ids;
pub mod patch;
pub mod paths;
pub mod perspective;
pub mod sourcemap;
pub mod stega;
#[cfg(test)]
mod tests;
pub mod walk;

pub use error::*;
