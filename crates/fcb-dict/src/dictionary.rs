//! Ordered keyword → value mapping.

use crate::error::{DictError, DictResult};
use crate::value::Value;

/// Insertion-ordered mapping with unique keys.
///
/// Dictionaries in case files are small, so lookups scan linearly and the
/// written order always matches the order entries were first inserted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dictionary {
    entries: Vec<(String, Value)>,
}

impl Dictionary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.position(key).is_some()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.position(key).map(|i| &self.entries[i].1)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.position(key).map(move |i| &mut self.entries[i].1)
    }

    /// Insert or overwrite. Overwriting keeps the original position.
    /// Returns the previous value, if any.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        let key = key.into();
        let value = value.into();
        match self.position(&key) {
            Some(i) => Some(std::mem::replace(&mut self.entries[i].1, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.position(key).map(|i| self.entries.remove(i).1)
    }

    /// Sub-dictionary under `key`, created empty when missing.
    ///
    /// An existing non-dictionary value under `key` is replaced.
    pub fn entry_dict(&mut self, key: &str) -> &mut Dictionary {
        let i = match self.position(key) {
            Some(i) => {
                if !self.entries[i].1.is_dict() {
                    self.entries[i].1 = Value::Dict(Dictionary::new());
                }
                i
            }
            None => {
                self.entries
                    .push((key.to_string(), Value::Dict(Dictionary::new())));
                self.entries.len() - 1
            }
        };
        match &mut self.entries[i].1 {
            Value::Dict(d) => d,
            _ => unreachable!("entry was just made a dictionary"),
        }
    }

    /// Look up a slash-separated key path such as `solvers/p/tolerance`.
    pub fn get_path(&self, path: &str) -> Option<&Value> {
        let mut parts = split_path(path);
        let last = parts.pop()?;
        let mut cur = self;
        for part in parts {
            cur = cur.get(part)?.as_dict()?;
        }
        cur.get(last)
    }

    /// Set a slash-separated key path, creating intermediate dictionaries.
    ///
    /// An empty value removes the entry instead.
    pub fn set_path(&mut self, path: &str, value: impl Into<Value>) -> DictResult<()> {
        let value = value.into();
        if value.is_empty() {
            self.remove_path(path);
            return Ok(());
        }
        let mut parts = split_path(path);
        let last = parts.pop().ok_or_else(|| DictError::InvalidPath {
            path: path.to_string(),
        })?;
        let mut cur = self;
        for part in parts {
            cur = cur.entry_dict(part);
        }
        cur.insert(last, value);
        Ok(())
    }

    /// Remove a slash-separated key path. Missing paths are ignored.
    pub fn remove_path(&mut self, path: &str) -> Option<Value> {
        let mut parts = split_path(path);
        let last = parts.pop()?;
        let mut cur = self;
        for part in parts {
            cur = cur.get_mut(part)?.as_dict_mut()?;
        }
        cur.remove(last)
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.entries.iter().position(|(k, _)| k == key)
    }
}

fn split_path(path: &str) -> Vec<&str> {
    path.split('/').filter(|p| !p.is_empty()).collect()
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Dictionary {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut d = Dictionary::new();
        for (k, v) in iter {
            d.insert(k, v);
        }
        d
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_keeps_position() {
        let mut d = Dictionary::new();
        d.insert("a", 1.0);
        d.insert("b", 2.0);
        let old = d.insert("a", 3.0);
        assert_eq!(old, Some(Value::number(1.0)));
        assert_eq!(d.keys().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(d.get("a"), Some(&Value::number(3.0)));
    }

    #[test]
    fn path_access_creates_intermediate() {
        let mut d = Dictionary::new();
        d.set_path("solvers/p/tolerance", 1e-6).unwrap();
        assert_eq!(
            d.get_path("solvers/p/tolerance"),
            Some(&Value::number(1e-6))
        );
        assert!(d.get_path("solvers/U").is_none());
        assert!(d.get_path("solvers/p/tolerance/deeper").is_none());
    }

    #[test]
    fn empty_value_removes() {
        let mut d = Dictionary::new();
        d.set_path("a/b", "x").unwrap();
        d.set_path("a/b", "").unwrap();
        assert!(d.get_path("a/b").is_none());
        assert!(d.get("a").is_some());
    }

    #[test]
    fn empty_path_is_rejected() {
        let mut d = Dictionary::new();
        assert!(d.set_path("//", 1.0).is_err());
    }
}
