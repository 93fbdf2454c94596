//! Perspectives decide which variant of a document (release version, draft or published) a
//! lookup should prefer.
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::{
    collections::{BTreeMap, HashMap},
    fmt::{Display, Formatter},
    str::FromStr,
};

use crate::{
    error::CsmError,
    ids::{draft_id, published_id, version_id, DRAFTS_FOLDER, PUBLISHED},
    sourcemap::SourceDocument,
};

/// The perspective a query ran with.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "PerspectiveRepr", into = "PerspectiveRepr")]
pub enum Perspective {
    /// Documents exactly as addressed, no variant resolution.
    #[default]
    Raw,
    Published,
    /// Drafts over published. `previewDrafts` is accepted as an alias.
    Drafts,
    /// An ordered stack of releases (and optionally `drafts`), most preferred first.
    Stack(Vec<String>),
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum PerspectiveRepr {
    Named(String),
    Stack(Vec<String>),
}

impl TryFrom<PerspectiveRepr> for Perspective {
    type Error = CsmError;

    fn try_from(repr: PerspectiveRepr) -> Result<Self, Self::Error> {
        match repr {
            PerspectiveRepr::Named(name) => name.parse(),
            PerspectiveRepr::Stack(stack) => Ok(Perspective::Stack(stack)),
        }
    }
}

impl From<Perspective> for PerspectiveRepr {
    fn from(perspective: Perspective) -> Self {
        match perspective {
            Perspective::Stack(stack) => PerspectiveRepr::Stack(stack),
            named => PerspectiveRepr::Named(named.to_string()),
        }
    }
}

impl FromStr for Perspective {
    type Err = CsmError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name {
            "raw" => Ok(Perspective::Raw),
            "published" => Ok(Perspective::Published),
            "drafts" | "previewDrafts" => Ok(Perspective::Drafts),
            other => Err(CsmError::InvalidPerspective(other.to_string())),
        }
    }
}

impl Display for Perspective {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Perspective::Raw => write!(f, "raw"),
            Perspective::Published => write!(f, "{PUBLISHED}"),
            Perspective::Drafts => write!(f, "{DRAFTS_FOLDER}"),
            Perspective::Stack(stack) => write!(f, "{}", stack.join(",")),
        }
    }
}

/// One step of a lookup chain.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PerspectiveScope {
    Release(String),
    Drafts,
    Published,
}

impl From<&str> for PerspectiveScope {
    fn from(name: &str) -> Self {
        match name {
            DRAFTS_FOLDER => PerspectiveScope::Drafts,
            PUBLISHED => PerspectiveScope::Published,
            release => PerspectiveScope::Release(release.to_string()),
        }
    }
}

impl PerspectiveScope {
    /// The id `id` would be stored under in this scope.
    pub fn candidate_id(&self, id: &str) -> Result<String, CsmError> {
        match self {
            PerspectiveScope::Release(release) => version_id(id, release),
            PerspectiveScope::Drafts => Ok(draft_id(id)),
            PerspectiveScope::Published => Ok(published_id(id).to_string()),
        }
    }
}

/// Expand a perspective into the ordered chain of scopes to try. Every chain ends in
/// [PerspectiveScope::Published].
///
/// `raw` has no chain and is rejected.
pub fn resolve_perspectives(perspective: &Perspective) -> Result<Vec<PerspectiveScope>, CsmError> {
    match perspective {
        Perspective::Raw => Err(CsmError::InvalidPerspective(
            "raw perspective has no lookup chain".to_string(),
        )),
        Perspective::Published => Ok(vec![PerspectiveScope::Published]),
        Perspective::Drafts => Ok(vec![PerspectiveScope::Drafts, PerspectiveScope::Published]),
        Perspective::Stack(stack) => {
            let mut chain: Vec<PerspectiveScope> =
                stack.iter().map(|name| name.as_str().into()).collect();
            if !chain.contains(&PerspectiveScope::Published) {
                chain.push(PerspectiveScope::Published);
            }
            Ok(chain)
        }
    }
}

/// A caller owned store of documents, queried by descriptor.
pub trait DocumentCache {
    fn get_document(&self, descriptor: &SourceDocument) -> Option<Value>;
}

impl<F> DocumentCache for F
where
    F: Fn(&SourceDocument) -> Option<Value>,
{
    fn get_document(&self, descriptor: &SourceDocument) -> Option<Value> {
        self(descriptor)
    }
}

impl DocumentCache for BTreeMap<String, Value> {
    fn get_document(&self, descriptor: &SourceDocument) -> Option<Value> {
        self.get(&descriptor.id).cloned()
    }
}

impl DocumentCache for HashMap<String, Value> {
    fn get_document(&self, descriptor: &SourceDocument) -> Option<Value> {
        self.get(&descriptor.id).cloned()
    }
}

/// Resolves source documents against a [DocumentCache], trying each scope of a perspective chain
/// in order.
pub struct SourceDocumentResolver<'a, C: DocumentCache + ?Sized> {
    cache: &'a C,
    chain: Vec<PerspectiveScope>,
}

impl<'a, C: DocumentCache + ?Sized> SourceDocumentResolver<'a, C> {
    pub fn new(cache: &'a C, perspective: &Perspective) -> Result<Self, CsmError> {
        Ok(SourceDocumentResolver {
            cache,
            chain: resolve_perspectives(perspective)?,
        })
    }

    pub fn chain(&self) -> &[PerspectiveScope] {
        &self.chain
    }

    /// The first variant of `source` found in the cache.
    ///
    /// The returned document carries its published `_id`, with the id it was actually found under
    /// in `_originalId`.
    pub fn resolve(&self, source: &SourceDocument) -> Result<Option<Value>, CsmError> {
        for scope in self.chain.iter() {
            let candidate = source.with_id(scope.candidate_id(&source.id)?);
            let Some(mut found) = self.cache.get_document(&candidate) else {
                tracing::trace!(
                    "[SourceDocumentResolver] {} not cached under {:?}",
                    candidate.id,
                    scope
                );
                continue;
            };
            if let Value::Object(map) = &mut found {
                let original_id = map
                    .get("_id")
                    .and_then(Value::as_str)
                    .unwrap_or(candidate.id.as_str())
                    .to_string();
                map.insert(
                    "_id".to_string(),
                    Value::String(published_id(&original_id).to_string()),
                );
                map.insert("_originalId".to_string(), Value::String(original_id));
            }
            return Ok(Some(found));
        }
        Ok(None)
    }
}

/// Build a resolver for `perspective` over `cache`.
pub fn create_source_document_resolver<'a, C: DocumentCache + ?Sized>(
    cache: &'a C,
    perspective: &Perspective,
) -> Result<SourceDocumentResolver<'a, C>, CsmError> {
    SourceDocumentResolver::new(cache, perspective)
}
