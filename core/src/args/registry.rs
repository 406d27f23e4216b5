use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use super::{ArgKey, ArgValue};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgumentEntry {
    pub value: ArgValue,
    pub rendered: Vec<String>,
}

/// Current options of one task instance, kept in rank order.
#[derive(Debug, Clone)]
pub struct ArgumentRegistry<K: ArgKey> {
    entries: BTreeMap<K, ArgumentEntry>,
}

impl<K: ArgKey> Default for ArgumentRegistry<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: ArgKey> ArgumentRegistry<K> {
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Stores `value` rendered with the key's style, or removes the entry when
    /// the value is absent. Returns whether an entry is now stored.
    pub fn set(&mut self, key: K, value: impl Into<ArgValue>) -> bool {
        let value = value.into();
        if !value.is_present() {
            self.entries.remove(&key);
            return false;
        }

        let rendered = key.style().render(&value);
        if rendered.is_empty() {
            self.entries.remove(&key);
            return false;
        }

        self.entries.insert(key, ArgumentEntry { value, rendered });
        true
    }

    pub fn unset(&mut self, key: K) {
        self.entries.remove(&key);
    }

    pub fn contains(&self, key: K) -> bool {
        self.entries.contains_key(&key)
    }

    pub fn get(&self, key: K) -> Option<&ArgValue> {
        self.entries.get(&key).map(|e| &e.value)
    }

    pub fn rendered(&self, key: K) -> Option<&[String]> {
        self.entries.get(&key).map(|e| e.rendered.as_slice())
    }

    pub fn switch(&self, key: K) -> bool {
        matches!(self.get(key), Some(ArgValue::Switch(true)))
    }

    pub fn text(&self, key: K) -> Option<&str> {
        match self.get(key) {
            Some(ArgValue::Text(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn texts(&self, key: K) -> &[String] {
        match self.get(key) {
            Some(ArgValue::TextList(items)) => items.as_slice(),
            _ => &[],
        }
    }

    pub fn file(&self, key: K) -> Option<&Path> {
        match self.get(key) {
            Some(ArgValue::File(p)) => Some(p.as_path()),
            _ => None,
        }
    }

    pub fn files(&self, key: K) -> &[PathBuf] {
        match self.get(key) {
            Some(ArgValue::FileList(items)) => items.as_slice(),
            _ => &[],
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All rendered tokens in ascending rank order.
    pub fn to_args(&self) -> Vec<String> {
        self.entries
            .values()
            .flat_map(|e| e.rendered.iter().cloned())
            .collect()
    }
}
