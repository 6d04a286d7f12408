//! Case-insensitive header containers.
//!
//! Keys are compared ASCII case-insensitively on insertion and lookup, while the
//! casing of the most recent insertion is kept for iteration (and therefore for
//! the order and spelling of headers sent to the bridge).

use std::fmt;

/// A response header value after flattening.
///
/// Headers that arrived with exactly one value are stored as a scalar; anything
/// else (including repeated headers such as `Set-Cookie`) keeps its list form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderValue {
    /// The header appeared exactly once.
    Single(String),
    /// The header appeared zero or several times, in arrival order.
    Multiple(Vec<String>),
}

impl HeaderValue {
    /// Flattens a raw list of values: one value becomes `Single`, otherwise `Multiple`.
    pub fn from_values(mut values: Vec<String>) -> Self {
        if values.len() == 1 {
            HeaderValue::Single(values.remove(0))
        } else {
            HeaderValue::Multiple(values)
        }
    }

    /// Returns the scalar value, or `None` for list-valued headers.
    pub fn as_single(&self) -> Option<&str> {
        match self {
            HeaderValue::Single(value) => Some(value),
            HeaderValue::Multiple(_) => None,
        }
    }

    /// Returns every value in arrival order.
    pub fn values(&self) -> Vec<&str> {
        match self {
            HeaderValue::Single(value) => vec![value.as_str()],
            HeaderValue::Multiple(values) => values.iter().map(String::as_str).collect(),
        }
    }

    /// Returns all values joined with `", "`, the way repeated headers fold on the wire.
    pub fn joined(&self) -> String {
        self.values().join(", ")
    }
}

impl From<&str> for HeaderValue {
    fn from(value: &str) -> Self {
        HeaderValue::Single(value.to_string())
    }
}

impl From<String> for HeaderValue {
    fn from(value: String) -> Self {
        HeaderValue::Single(value)
    }
}

impl PartialEq<&str> for HeaderValue {
    fn eq(&self, other: &&str) -> bool {
        self.as_single() == Some(*other)
    }
}

/// An insertion-ordered map whose keys are compared case-insensitively.
#[derive(Clone, PartialEq, Eq)]
pub struct CaseInsensitiveMap<V> {
    entries: Vec<(String, V)>,
}

/// Response headers after flattening.
pub type Headers = CaseInsensitiveMap<HeaderValue>;

/// Request headers as sent to the bridge.
pub type RequestHeaders = CaseInsensitiveMap<String>;

impl<V> CaseInsensitiveMap<V> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|(existing, _)| existing.eq_ignore_ascii_case(key))
    }

    /// Inserts `value` under `key`, replacing any entry that differs only in case.
    ///
    /// The replaced entry keeps its position; its key takes the new casing.
    pub fn insert(&mut self, key: impl Into<String>, value: V) -> Option<V> {
        let key = key.into();
        match self.position(&key) {
            Some(index) => {
                let (existing_key, existing_value) = &mut self.entries[index];
                *existing_key = key;
                Some(std::mem::replace(existing_value, value))
            }
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        self.position(key).map(|index| &self.entries[index].1)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut V> {
        self.position(key).map(|index| &mut self.entries[index].1)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.position(key).is_some()
    }

    pub fn remove(&mut self, key: &str) -> Option<V> {
        self.position(key).map(|index| self.entries.remove(index).1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates entries in insertion order with their stored casing.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    /// Overlays `other` onto `self`; keys from `other` win.
    pub fn merge(&mut self, other: CaseInsensitiveMap<V>) {
        for (key, value) in other.entries {
            self.insert(key, value);
        }
    }
}

impl<V> Default for CaseInsensitiveMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: fmt::Debug> fmt::Debug for CaseInsensitiveMap<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K: Into<String>, V> FromIterator<(K, V)> for CaseInsensitiveMap<V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (key, value) in iter {
            map.insert(key, value);
        }
        map
    }
}

impl<V> IntoIterator for CaseInsensitiveMap<V> {
    type Item = (String, V);
    type IntoIter = std::vec::IntoIter<(String, V)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
