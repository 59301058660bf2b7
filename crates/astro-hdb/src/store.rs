//! Insertion-ordered keyword store.
//!
//! Keywords keep the order in which they were added; lookup is by name,
//! case-insensitive, first match wins. FITS permits duplicate keyword names
//! and the store does not forbid them, but [`KeywordStore::write`] replaces
//! the first existing entry of the same name.

use alloc::string::String;
use alloc::vec::Vec;
use core::slice;

use crate::error::{Error, Result};
use crate::keyword::{Keyword, KeywordKind};

/// An ordered collection of header keywords.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KeywordStore {
    keywords: Vec<Keyword>,
}

impl KeywordStore {
    pub fn new() -> Self {
        KeywordStore {
            keywords: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.keywords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }

    /// Iterate the keywords in insertion order.
    pub fn iter(&self) -> slice::Iter<'_, Keyword> {
        self.keywords.iter()
    }

    /// Returns `true` if a keyword with this name exists.
    pub fn exists(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Find the first keyword with the given name.
    pub fn find(&self, name: &str) -> Result<&Keyword> {
        self.position(name)
            .map(|i| &self.keywords[i])
            .ok_or_else(|| Error::KeywordNotFound(String::from(name)))
    }

    /// Find the first keyword with the given name, mutably.
    pub fn find_mut(&mut self, name: &str) -> Result<&mut Keyword> {
        match self.position(name) {
            Some(i) => Ok(&mut self.keywords[i]),
            None => Err(Error::KeywordNotFound(String::from(name))),
        }
    }

    /// The kind of the named keyword, or [`KeywordKind::None`] if absent.
    /// Never fails.
    pub fn kind_of(&self, name: &str) -> KeywordKind {
        self.position(name)
            .map(|i| self.keywords[i].kind())
            .unwrap_or(KeywordKind::None)
    }

    /// Append a keyword, preserving insertion order. Any existing keyword
    /// with the same name is left in place; use [`write`](Self::write) for
    /// replace semantics.
    pub fn push(&mut self, keyword: Keyword) {
        self.keywords.push(keyword);
    }

    /// Replace-or-append: delete the first existing keyword of the same
    /// name, then append the new one at the end. A replaced keyword
    /// therefore moves to the end of the store.
    pub fn write(&mut self, keyword: Keyword) {
        self.delete(keyword.name());
        self.keywords.push(keyword);
    }

    /// Remove the first keyword with this name. Returns `false` if no such
    /// keyword exists; deleting an absent keyword is not an error.
    pub fn delete(&mut self, name: &str) -> bool {
        match self.position(name) {
            Some(i) => {
                self.keywords.remove(i);
                true
            }
            None => false,
        }
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.keywords
            .iter()
            .position(|k| k.name().eq_ignore_ascii_case(name))
    }
}

impl<'a> IntoIterator for &'a KeywordStore {
    type Item = &'a Keyword;
    type IntoIter = slice::Iter<'a, Keyword>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// ── Tests ──
