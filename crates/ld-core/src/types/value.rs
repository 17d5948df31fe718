//! The value tree produced by locale file parsers.
//!
//! Parsed translation files are open-ended nested key/value documents. They
//! are modelled as a recursive [`Value`] whose mappings keep insertion order,
//! so that merging and serialization are deterministic.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Numeric leaf, shared with `serde_json` so integers and floats survive
/// untouched.
pub type Number = serde_json::Number;

/// An insertion-ordered mapping of keys to values.
pub type Mapping = IndexMap<String, Value>;

/// A node of a parsed locale document.
///
/// Deserializes from any self-describing format (JSON, YAML, ...).
///
/// # Examples
///
/// ```
/// use ld_core::Value;
///
/// let value: Value = serde_json::from_str(r#"{"greeting": "hi", "count": 2}"#).unwrap();
/// let map = value.as_map().unwrap();
/// assert_eq!(map["greeting"], Value::from("hi"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// An explicit null.
    Null,
    /// A boolean leaf.
    Bool(bool),
    /// A numeric leaf.
    Number(Number),
    /// A string leaf.
    String(String),
    /// An ordered list, e.g. i18next array values.
    List(Vec<Value>),
    /// A nested mapping.
    Map(Mapping),
}

impl Value {
    /// Returns an empty mapping value.
    #[inline]
    #[must_use]
    pub fn empty_map() -> Self {
        Self::Map(Mapping::new())
    }

    /// Returns the mapping if this value is one.
    #[inline]
    #[must_use]
    pub const fn as_map(&self) -> Option<&Mapping> {
        match self {
            Self::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Returns the mapping mutably if this value is one.
    #[inline]
    pub fn as_map_mut(&mut self) -> Option<&mut Mapping> {
        match self {
            Self::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Returns the string if this value is a string leaf.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the mapping under this value, replacing a non-mapping value
    /// with an empty mapping first.
    pub fn ensure_map(&mut self) -> &mut Mapping {
        match self {
            Self::Map(map) => map,
            other => {
                *other = Self::empty_map();
                other.ensure_map()
            }
        }
    }

    /// Overlays `other` onto this value one level deep.
    ///
    /// Keys of `other` replace existing keys wholesale; existing keys keep
    /// their position. A non-mapping `self` is replaced by a mapping first.
    pub fn merge_shallow(&mut self, other: &Mapping) {
        let map = self.ensure_map();
        for (key, value) in other {
            map.insert(key.clone(), value.clone());
        }
    }

    /// Overlays `other` onto this value recursively.
    ///
    /// Where both sides hold a mapping under the same key the mappings are
    /// merged; everywhere else the value from `other` wins.
    pub fn merge_deep(&mut self, other: &Mapping) {
        let map = self.ensure_map();
        for (key, value) in other {
            match (map.get_mut(key), value) {
                (Some(existing), Self::Map(incoming)) if existing.as_map().is_some() => {
                    existing.merge_deep(incoming);
                }
                _ => {
                    map.insert(key.clone(), value.clone());
                }
            }
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Number(n.into())
    }
}

impl From<Mapping> for Value {
    fn from(map: Mapping) -> Self {
        Self::Map(map)
    }
}
