//! Defines the generic [`Catalog`] type, an immutable, ordered mapping from
//! keys to entries, and the [`Resolution`] type returned by lookups. Every
//! content category (courses, products, documents and blog posts) is a
//! `Catalog` over its own entry type.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

/// Implemented by catalog entries to expose the key they are registered
/// under.
pub trait Keyed {
    /// The key type. Keys are rendered into URLs, hence [`fmt::Display`].
    type Key: Eq + Hash + Clone + fmt::Display + fmt::Debug;

    /// Returns the entry's key.
    fn key(&self) -> &Self::Key;
}

/// The result of looking up a key. A miss is an ordinary value carrying the
/// key exactly as it was requested so that callers can echo it back.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resolution<T> {
    Found(T),
    NotFound(String),
}

impl<T> Resolution<T> {
    pub fn is_found(&self) -> bool {
        matches!(self, Resolution::Found(_))
    }

    /// Converts into an [`Option`], discarding the requested key on a miss.
    pub fn found(self) -> Option<T> {
        match self {
            Resolution::Found(item) => Some(item),
            Resolution::NotFound(_) => None,
        }
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Resolution<U> {
        match self {
            Resolution::Found(item) => Resolution::Found(f(item)),
            Resolution::NotFound(key) => Resolution::NotFound(key),
        }
    }
}

/// An ordered collection of entries indexed by key. A catalog is built once
/// and never mutated afterwards; iteration order is insertion order.
#[derive(Debug)]
pub struct Catalog<T: Keyed> {
    entries: Vec<T>,
    index: HashMap<T::Key, usize>,
}

impl<T: Keyed> Catalog<T> {
    /// Returns a catalog with no entries. Every lookup misses.
    pub fn empty() -> Self {
        Catalog {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Builds a catalog from `entries`, preserving their order. Fails on the
    /// first key that is registered twice.
    pub fn from_entries(entries: Vec<T>) -> Result<Self, DuplicateKey> {
        let mut index = HashMap::with_capacity(entries.len());
        for (i, entry) in entries.iter().enumerate() {
            if index.insert(entry.key().clone(), i).is_some() {
                return Err(DuplicateKey(entry.key().to_string()));
            }
        }
        Ok(Catalog { entries, index })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.entries.iter()
    }

    /// Looks up an entry by key.
    pub fn get<Q>(&self, key: &Q) -> Option<&T>
    where
        T::Key: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.index.get(key).map(|&i| &self.entries[i])
    }

    /// Returns every registered key, stringified, in insertion order.
    pub fn list_keys(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.key().to_string()).collect()
    }
}

impl<T: Keyed<Key = String>> Catalog<T> {
    /// Resolves `key` by exact, case-sensitive match. The key is not trimmed,
    /// case-folded or slugified.
    pub fn resolve(&self, key: &str) -> Resolution<&T> {
        match self.get(key) {
            Some(entry) => Resolution::Found(entry),
            None => Resolution::NotFound(key.to_owned()),
        }
    }
}

impl<'a, T: Keyed> IntoIterator for &'a Catalog<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Returned when a catalog is built from entries that share a key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateKey(pub String);

impl fmt::Display for DuplicateKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "duplicate key `{}`", self.0)
    }
}

impl std::error::Error for DuplicateKey {}
