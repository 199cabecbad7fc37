//! Ordered set of identifiers used for back-reference lists

use serde::{Deserialize, Serialize};

/// Insertion-ordered list of ids with set semantics.
///
/// Persisted as a plain JSON array. Duplicates present in stored data are
/// collapsed on load, keeping the first occurrence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct IdSet(Vec<String>);

impl IdSet {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.0.iter().any(|existing| existing == id)
    }

    /// Append `id` unless already present. Returns whether it was added.
    pub fn insert(&mut self, id: impl Into<String>) -> bool {
        let id = id.into();
        if self.contains(&id) {
            return false;
        }
        self.0.push(id);
        true
    }

    /// Remove `id` if present. Returns whether it was removed.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.0.len();
        self.0.retain(|existing| existing != id);
        self.0.len() != before
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<String>> for IdSet {
    fn from(ids: Vec<String>) -> Self {
        ids.into_iter().collect()
    }
}

impl From<IdSet> for Vec<String> {
    fn from(set: IdSet) -> Self {
        set.0
    }
}

impl FromIterator<String> for IdSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        let mut set = IdSet::new();
        for id in iter {
            set.insert(id);
        }
        set
    }
}

impl<'a> IntoIterator for &'a IdSet {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl PartialEq<[&str]> for IdSet {
    fn eq(&self, other: &[&str]) -> bool {
        self.0.len() == other.len() && self.0.iter().zip(other).all(|(a, b)| a == b)
    }
}

impl<const N: usize> PartialEq<[&str; N]> for IdSet {
    fn eq(&self, other: &[&str; N]) -> bool {
        self == &other[..]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_keeps_order_and_skips_duplicates() {
        let mut set = IdSet::new();
        assert!(set.insert("u1"));
        assert!(set.insert("u2"));
        assert!(!set.insert("u1"));
        assert_eq!(set, ["u1", "u2"]);
    }

    #[test]
    fn remove_is_idempotent() {
        let mut set: IdSet = vec!["a".to_string(), "b".to_string()].into();
        assert!(set.remove("a"));
        assert!(!set.remove("a"));
        assert_eq!(set, ["b"]);
    }

    #[test]
    fn deserializing_collapses_duplicates() {
        let set: IdSet = serde_json::from_str(r#"["b1","b2","b1"]"#).unwrap();
        assert_eq!(set, ["b1", "b2"]);
        assert_eq!(serde_json::to_string(&set).unwrap(), r#"["b1","b2"]"#);
    }
}
