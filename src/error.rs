use std::io;

use serde::{Deserialize, Serialize};
use serde_json::Error as JsonError;
use thiserror::Error;

/// Hard failures raised by the crate.
///
/// Soft misses (no mapping for a path, literal-sourced values, documents absent from a cache)
/// are never reported through this type; they surface as `None` or as an unchanged value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
pub enum CsmError {
    #[error("Invalid path: {0}")]
    InvalidPath(String),
    #[error("Unsupported path segment: {0}")]
    UnsupportedSegment(String),
    #[error("{0} is required")]
    MissingField(String),
    #[error("Invalid base URL '{0}': must not end with a slash")]
    InvalidBaseUrl(String),
    #[error("Version can not be \"{0}\": the name is reserved")]
    ReservedReleaseName(String),
    #[error("Unknown perspective: {0}")]
    InvalidPerspective(String),
    #[error("(De)Serialization error: {0}")]
    Serialization(String),
    #[error("File System error: {0}")]
    Io(String),
    #[error("Item Not Found: {0}")]
    NotFound(String),
}

impl From<toml::de::Error> for CsmError {
    fn from(src: toml::de::Error) -> CsmError {
        CsmError::Serialization(format!("Toml deserialization error: {src}"))
    }
}

impl From<toml::ser::Error> for CsmError {
    fn from(src: toml::ser::Error) -> CsmError {
        CsmError::Serialization(format!("Toml serialization error: {src}"))
    }
}

impl From<JsonError> for CsmError {
    fn from(src: JsonError) -> CsmError {
        CsmError::Serialization(format!("JSON (de)serialization error: {src}"))
    }
}

impl From<io::Error> for CsmError {
    fn from(x: io::Error) -> Self {
        match x.kind() {
            io::ErrorKind::NotFound => CsmError::NotFound(format!("{x}")),
            _ => CsmError::Io(format!("IOError: {}", x.kind())),
        }
    }
}
