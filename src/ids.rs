//! Document identifiers and their three lifecycle encodings:
//!
//! - published: `<id>`
//! - draft: `drafts.<id>`
//! - release version: `versions.<release>.<id>`
//!
//! Published ids may themselves contain dots, so version ids are split on the first two
//! separators only.
use serde::{Deserialize, Serialize};
use std::{
    fmt::{Display, Formatter},
    str::FromStr,
};

use crate::error::CsmError;

pub const DRAFTS_FOLDER: &str = "drafts";
pub const VERSION_FOLDER: &str = "versions";
pub const PUBLISHED: &str = "published";
pub const PATH_SEPARATOR: char = '.';

const DRAFTS_PREFIX: &str = "drafts.";
const VERSION_PREFIX: &str = "versions.";

pub fn is_draft_id(id: &str) -> bool {
    id.starts_with(DRAFTS_PREFIX)
}

pub fn is_version_id(id: &str) -> bool {
    id.starts_with(VERSION_PREFIX)
}

pub fn is_published_id(id: &str) -> bool {
    !is_draft_id(id) && !is_version_id(id)
}

/// Strip one layer of draft or version prefix.
pub fn published_id(id: &str) -> &str {
    if is_version_id(id) {
        let mut parts = id.splitn(3, PATH_SEPARATOR);
        parts.next();
        parts.next();
        return parts.next().unwrap_or("");
    }
    id.strip_prefix(DRAFTS_PREFIX).unwrap_or(id)
}

pub fn draft_id(id: &str) -> String {
    if is_draft_id(id) {
        return id.to_string();
    }
    format!("{DRAFTS_PREFIX}{}", published_id(id))
}

/// The id of `id` inside `release`. An id already in another release is moved, not nested.
pub fn version_id(id: &str, release: &str) -> Result<String, CsmError> {
    if release == DRAFTS_FOLDER || release == PUBLISHED {
        return Err(CsmError::ReservedReleaseName(release.to_string()));
    }
    Ok(format!("{VERSION_PREFIX}{release}{PATH_SEPARATOR}{}", published_id(id)))
}

/// The release name of a version id.
pub fn version_from_id(id: &str) -> Option<&str> {
    if !is_version_id(id) {
        return None;
    }
    id.split(PATH_SEPARATOR).nth(1)
}

/// A document id classified by lifecycle state.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DocumentId {
    Published(String),
    Draft(String),
    Version { release: String, id: String },
}

impl DocumentId {
    /// The published id this variant belongs to.
    pub fn published(&self) -> &str {
        match self {
            DocumentId::Published(id) | DocumentId::Draft(id) => id,
            DocumentId::Version { id, .. } => id,
        }
    }

    pub fn release(&self) -> Option<&str> {
        match self {
            DocumentId::Version { release, .. } => Some(release),
            _ => None,
        }
    }
}

impl FromStr for DocumentId {
    type Err = CsmError;

    fn from_str(id: &str) -> Result<Self, Self::Err> {
        if id.is_empty() {
            return Err(CsmError::MissingField("id".to_string()));
        }
        if let Some(release) = version_from_id(id) {
            return Ok(DocumentId::Version {
                release: release.to_string(),
                id: published_id(id).to_string(),
            });
        }
        if is_draft_id(id) {
            return Ok(DocumentId::Draft(published_id(id).to_string()));
        }
        Ok(DocumentId::Published(id.to_string()))
    }
}

impl Display for DocumentId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            DocumentId::Published(id) => write!(f, "{id}"),
            DocumentId::Draft(id) => write!(f, "{DRAFTS_PREFIX}{id}"),
            DocumentId::Version { release, id } => {
                write!(f, "{VERSION_PREFIX}{release}{PATH_SEPARATOR}{id}")
            }
        }
    }
}

impl Serialize for DocumentId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DocumentId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn test_classification() {
        assert!(is_draft_id("drafts.abc"));
        assert!(is_version_id("versions.r1.abc"));
        assert!(is_published_id("abc"));
        assert!(is_published_id("draftsabc"));
        assert!(!is_published_id("drafts.abc"));
    }

    #[test]
    fn test_published_id() {
        assert_eq!(published_id("abc"), "abc");
        assert_eq!(published_id("drafts.abc"), "abc");
        assert_eq!(published_id("versions.r1.abc"), "abc");
        assert_eq!(published_id("versions.r1.abc.def"), "abc.def");
        assert_eq!(published_id("drafts.abc.def"), "abc.def");
    }

    #[test]
    fn test_draft_id() {
        assert_eq!(draft_id("abc"), "drafts.abc");
        assert_eq!(draft_id("drafts.abc"), "drafts.abc");
        assert_eq!(draft_id("versions.r1.abc"), "drafts.abc");
    }

    #[test]
    fn test_version_id() {
        assert_eq!(version_id("abc", "r1").unwrap(), "versions.r1.abc");
        assert_eq!(version_id("drafts.abc", "r1").unwrap(), "versions.r1.abc");
        assert_eq!(
            version_id("versions.r1.abc", "r2").unwrap(),
            "versions.r2.abc"
        );
        assert_eq!(
            version_id("abc", "drafts"),
            Err(CsmError::ReservedReleaseName("drafts".to_string()))
        );
        assert!(version_id("abc", "published").is_err());
    }

    #[test]
    fn test_version_from_id() {
        assert_eq!(version_from_id("versions.r1.abc"), Some("r1"));
        assert_eq!(version_from_id("drafts.abc"), None);
        assert_eq!(version_from_id("abc"), None);
    }

    #[test]
    fn test_document_id_roundtrip() {
        for raw in ["abc", "drafts.abc", "versions.rABC.abc.def"] {
            let parsed: DocumentId = raw.parse().unwrap();
            assert_eq!(parsed.to_string(), raw);
            assert_eq!(parsed.published(), published_id(raw));
        }
        let version: DocumentId = "versions.rABC.abc".parse().unwrap();
        assert_eq!(version.release(), Some("rABC"));
        assert!("".parse::<DocumentId>().is_err());
    }
}
