use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// An array item addressed by its `_key`, optionally carrying the array position it was found at.
///
/// `index` is `None` when the position is unknown, which is what parsing a path expression always
/// produces. On the wire the unknown position is written as `-1`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct KeyedSegment {
    #[serde(rename = "_key")]
    pub key: String,
    #[serde(
        rename = "_index",
        serialize_with = "serialize_index",
        deserialize_with = "deserialize_index",
        default
    )]
    pub index: Option<usize>,
}

impl KeyedSegment {
    pub fn new<K: Into<String>>(key: K) -> KeyedSegment {
        KeyedSegment {
            key: key.into(),
            index: None,
        }
    }

    pub fn with_index<K: Into<String>>(key: K, index: usize) -> KeyedSegment {
        KeyedSegment {
            key: key.into(),
            index: Some(index),
        }
    }
}

fn serialize_index<S>(index: &Option<usize>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match index {
        Some(idx) => serializer.serialize_u64(*idx as u64),
        None => serializer.serialize_i64(-1),
    }
}

struct IndexVisitor;

impl de::Visitor<'_> for IndexVisitor {
    type Value = Option<usize>;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        write!(formatter, "a non-negative array index, or -1 for an unresolved index")
    }

    fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        match v {
            -1 => Ok(None),
            v if v >= 0 => Ok(Some(v as usize)),
            _ => Err(E::invalid_value(de::Unexpected::Signed(v), &self)),
        }
    }

    fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok(Some(v as usize))
    }
}

fn deserialize_index<'de, D>(deserializer: D) -> Result<Option<usize>, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_i64(IndexVisitor)
}

/// One step of a [ParsedPath].
///
/// Serializes to the same untagged shapes the platform uses: a string for object keys, a number
/// for array indices and `{ "_key": .., "_index": .. }` for keyed array items.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathSegment {
    Key(String),
    Index(usize),
    Keyed(KeyedSegment),
}

impl From<&str> for PathSegment {
    fn from(key: &str) -> Self {
        PathSegment::Key(key.to_string())
    }
}

impl From<String> for PathSegment {
    fn from(key: String) -> Self {
        PathSegment::Key(key)
    }
}

impl From<usize> for PathSegment {
    fn from(index: usize) -> Self {
        PathSegment::Index(index)
    }
}

impl From<KeyedSegment> for PathSegment {
    fn from(keyed: KeyedSegment) -> Self {
        PathSegment::Keyed(keyed)
    }
}

/// A context-free sequence of segments addressing a value from the root of a JSON tree.
///
/// Nothing here checks that index segments follow arrays; that only matters when the path is
/// applied to an actual value.
pub type ParsedPath = Vec<PathSegment>;
