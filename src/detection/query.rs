//! Multi-valued query string mapping.
//!
//! # Design Decisions
//! - Keys keep the order of their first occurrence
//! - Repeated keys accumulate values in order of appearance
//! - Blank values are kept (`a=` and `a` both yield `""`)

use url::form_urlencoded;

/// Parsed query string: each key maps to an ordered list of values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryMap {
    entries: Vec<(String, Vec<String>)>,
}

impl QueryMap {
    /// Parse an `application/x-www-form-urlencoded` query string.
    /// A leading `?` is not expected; it would become part of the first key.
    pub fn parse(raw: &str) -> Self {
        let mut map = Self::default();
        for (key, value) in form_urlencoded::parse(raw.as_bytes()) {
            map.append(key.into_owned(), value.into_owned());
        }
        map
    }

    /// Append a value for `key`, creating the entry if needed.
    pub fn append(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, values)) => values.push(value.into()),
            None => self.entries.push((key, vec![value.into()])),
        }
    }

    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, values)| values.as_slice())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Iterate entries in first-occurrence order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(k, values)| (k.as_str(), values.as_slice()))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
