//! Edit links: from a path in a query result to the editing tool's intent URL for the document
//! field that produced it.
//!
//! An edit URL carries the same payload twice, once as `;`-separated router params in the URL
//! path for the editing tool's router, once as ordinary query params for overlay tooling:
//!
//! ```text
//! https://example.studio/intent/edit/mode=presentation;id=abc;type=page;path=title?baseUrl=..&id=abc&type=page&path=title&perspective=published
//! ```
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::{Deserialize, Serialize};
use url::form_urlencoded;

use crate::{
    error::CsmError,
    ids::{is_draft_id, published_id, version_from_id},
    paths::{parse_studio_path_to_parsed, parsed_to_studio_string, ParsedPath, PathSegment},
    sourcemap::{resolve_mapping, source_path_with_suffix, ContentSourceMap, SourceDocument},
};

/// Characters `encodeURIComponent` leaves alone, everything else is escaped.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

const DEFAULT: &str = "default";

/// Where the editing tool is mounted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudioBaseRoute {
    pub base_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workspace: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool: Option<String>,
}

/// A studio location given either as a bare URL or as a full route.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StudioUrl {
    Url(String),
    Route(StudioBaseRoute),
}

impl From<&str> for StudioUrl {
    fn from(url: &str) -> Self {
        StudioUrl::Url(url.to_string())
    }
}

impl From<StudioBaseRoute> for StudioUrl {
    fn from(route: StudioBaseRoute) -> Self {
        StudioUrl::Route(route)
    }
}

/// Picks the studio for a given source document.
///
/// Implemented by [StudioUrl] itself, which ignores the document, and by closures so that
/// documents from different projects or datasets can be routed to different studios.
pub trait StudioUrlResolver {
    fn studio_url(&self, document: &SourceDocument) -> Option<StudioUrl>;
}

impl StudioUrlResolver for StudioUrl {
    fn studio_url(&self, _document: &SourceDocument) -> Option<StudioUrl> {
        Some(self.clone())
    }
}

impl StudioUrlResolver for str {
    fn studio_url(&self, _document: &SourceDocument) -> Option<StudioUrl> {
        Some(StudioUrl::from(self))
    }
}

impl<F> StudioUrlResolver for F
where
    F: Fn(&SourceDocument) -> Option<StudioUrl>,
{
    fn studio_url(&self, document: &SourceDocument) -> Option<StudioUrl> {
        self(document)
    }
}

/// Normalize a studio location into a route with no trailing slash on `base_url`. A bare `/` is
/// kept as is.
pub fn resolve_studio_base_route(studio_url: &StudioUrl) -> StudioBaseRoute {
    let mut route = match studio_url {
        StudioUrl::Url(base_url) => StudioBaseRoute {
            base_url: base_url.clone(),
            ..Default::default()
        },
        StudioUrl::Route(route) => route.clone(),
    };
    if route.base_url != "/" {
        if let Some(trimmed) = route.base_url.strip_suffix('/') {
            route.base_url = trimmed.to_string();
        }
    }
    route
}

/// Which variant of the document an edit link was resolved from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EditPerspective {
    Published,
    Draft,
    Release(String),
}

impl EditPerspective {
    pub fn from_id(id: &str) -> EditPerspective {
        if is_draft_id(id) {
            return EditPerspective::Draft;
        }
        match version_from_id(id) {
            Some(release) => EditPerspective::Release(release.to_string()),
            None => EditPerspective::Published,
        }
    }
}

/// Everything needed to build an edit URL.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditInfo {
    pub base_url: String,
    pub workspace: Option<String>,
    pub tool: Option<String>,
    /// The document id as it appears in the source map, prefix included.
    pub id: String,
    pub doc_type: String,
    pub path: ParsedPath,
    pub project_id: Option<String>,
    pub dataset: Option<String>,
}

impl EditInfo {
    pub fn perspective(&self) -> EditPerspective {
        EditPerspective::from_id(&self.id)
    }
}

/// Resolve the edit info for the value at `result_path`.
///
/// `None` when no mapping covers the path, when the value is not backed by a stored field, or
/// when the resolver yields no usable studio.
pub fn resolve_edit_info<S>(
    result_source_map: &ContentSourceMap,
    result_path: &[PathSegment],
    studio_url: &S,
) -> Option<EditInfo>
where
    S: StudioUrlResolver + ?Sized,
{
    let resolved = resolve_mapping(result_path, Some(result_source_map))?;
    let source = result_source_map.document_value_source(resolved.mapping)?;
    let route = resolve_studio_base_route(&studio_url.studio_url(source.document)?);
    if route.base_url.is_empty() {
        return None;
    }
    Some(EditInfo {
        base_url: route.base_url,
        workspace: route.workspace,
        tool: route.tool,
        id: source.document.id.clone(),
        doc_type: source.document.doc_type.clone(),
        path: source_path_with_suffix(source.path, &resolved.path_suffix),
        project_id: source.document.project_id.clone(),
        dataset: source.document.dataset.clone(),
    })
}

/// Build the edit URL for `info`.
///
/// The document id is always written in published form; the variant it came from is carried by
/// `perspective=published`, `perspective=<release>` or `isDraft=`.
pub fn create_edit_url(info: &EditInfo) -> Result<String, CsmError> {
    if info.base_url.is_empty() {
        return Err(CsmError::MissingField("baseUrl".to_string()));
    }
    if info.path.is_empty() {
        return Err(CsmError::MissingField("path".to_string()));
    }
    if info.id.is_empty() {
        return Err(CsmError::MissingField("id".to_string()));
    }
    if info.base_url != "/" && info.base_url.ends_with('/') {
        return Err(CsmError::InvalidBaseUrl(info.base_url.clone()));
    }

    let workspace = info.workspace.as_deref().filter(|w| *w != DEFAULT);
    let tool = info.tool.as_deref().filter(|t| *t != DEFAULT);
    let id = published_id(&info.id);
    let path = parsed_to_studio_string(&info.path)?;

    let mut query = form_urlencoded::Serializer::new(String::new());
    query
        .append_pair("baseUrl", &info.base_url)
        .append_pair("id", id)
        .append_pair("type", &info.doc_type)
        .append_pair("path", &path);
    if let Some(workspace) = workspace {
        query.append_pair("workspace", workspace);
    }
    if let Some(tool) = tool {
        query.append_pair("tool", tool);
    }
    if let Some(project_id) = info.project_id.as_deref() {
        query.append_pair("projectId", project_id);
    }
    if let Some(dataset) = info.dataset.as_deref() {
        query.append_pair("dataset", dataset);
    }
    match info.perspective() {
        EditPerspective::Published => {
            query.append_pair("perspective", "published");
        }
        EditPerspective::Release(release) => {
            query.append_pair("perspective", &release);
        }
        EditPerspective::Draft => {
            query.append_pair("isDraft", "");
        }
    }

    let mut router_params = vec![
        "mode=presentation".to_string(),
        format!("id={id}"),
        format!("type={}", info.doc_type),
        format!("path={}", utf8_percent_encode(&path, URI_COMPONENT)),
    ];
    if let Some(tool) = tool {
        router_params.push(format!("tool={tool}"));
    }

    let mut segments = vec![if info.base_url == "/" {
        ""
    } else {
        info.base_url.as_str()
    }];
    if let Some(workspace) = workspace {
        segments.push(workspace);
    }
    let intent = format!("{}?{}", router_params.join(";"), query.finish());
    segments.extend(["intent", "edit", intent.as_str()]);
    Ok(segments.join("/"))
}

/// Resolve the edit URL for the value at `result_path`, given in studio path notation.
///
/// `Ok(None)` when the value has no edit affordance; errors only for malformed input.
pub fn resolve_edit_url<S>(
    result_source_map: &ContentSourceMap,
    result_path: &str,
    studio_url: &S,
) -> Result<Option<String>, CsmError>
where
    S: StudioUrlResolver + ?Sized,
{
    let result_path = parse_studio_path_to_parsed(result_path)?;
    match resolve_edit_info(result_source_map, &result_path, studio_url) {
        Some(info) => create_edit_url(&info).map(Some),
        None => {
            tracing::debug!(
                "[resolve_edit_url] no edit info for {}",
                crate::paths::to_expression(&result_path)
            );
            Ok(None)
        }
    }
}
