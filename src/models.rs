//! Domain models shared by the registry, the persistence layer and the
//! terminal editor. `Book` is an immutable catalog entry; `SearchBookSet` is the
//! user-editable selection over those entries.

use std::collections::BTreeMap;
use std::fmt;

use crate::catalog::BookCatalog;
use crate::error::BookSetError;

/// Stable identifier of a canonical book (the OSIS abbreviation, e.g. `Gen`).
/// Persisted flags are keyed by this value, never by catalog position.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BookId(String);

impl BookId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BookId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Testament {
    Old,
    New,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// One entry of the book catalog.
pub struct Book {
    pub id: BookId,
    /// Display name used in the checkbox list.
    pub name: String,
    pub testament: Testament,
}

impl fmt::Display for Book {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// A named selection marking every catalog book as included in or excluded
/// from the search scope.
///
/// The flag map always holds exactly one entry per catalog book. Constructors
/// take the catalog so a set can never be created with missing or foreign
/// ids, and no operation adds or removes keys afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchBookSet {
    name: String,
    flags: BTreeMap<BookId, bool>,
}

impl SearchBookSet {
    /// Create a set with every catalog book included.
    pub fn all_included(name: impl Into<String>, catalog: &BookCatalog) -> Self {
        Self::with_flags(name, catalog, |_| true)
    }

    /// Create a set whose flag for each catalog book is decided by `flag_for`.
    pub fn with_flags(
        name: impl Into<String>,
        catalog: &BookCatalog,
        mut flag_for: impl FnMut(&Book) -> bool,
    ) -> Self {
        let flags = catalog
            .list()
            .iter()
            .map(|book| (book.id.clone(), flag_for(book)))
            .collect();
        Self {
            name: name.into(),
            flags,
        }
    }

    /// Copy another set's flags under a new name.
    pub fn forked_from(name: impl Into<String>, source: &SearchBookSet) -> Self {
        Self {
            name: name.into(),
            flags: source.flags.clone(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_included(&self, book: &BookId) -> Result<bool, BookSetError> {
        self.flags
            .get(book)
            .copied()
            .ok_or_else(|| BookSetError::UnknownBook(book.clone()))
    }

    /// Update one flag. Returns whether the value actually changed.
    pub fn set_included(&mut self, book: &BookId, included: bool) -> Result<bool, BookSetError> {
        let flag = self
            .flags
            .get_mut(book)
            .ok_or_else(|| BookSetError::UnknownBook(book.clone()))?;
        let changed = *flag != included;
        *flag = included;
        Ok(changed)
    }

    pub fn select_all(&mut self) {
        self.flags.values_mut().for_each(|flag| *flag = true);
    }

    pub fn select_none(&mut self) {
        self.flags.values_mut().for_each(|flag| *flag = false);
    }

    pub fn select_inverse(&mut self) {
        self.flags.values_mut().for_each(|flag| *flag = !*flag);
    }

    /// Change the label. Uniqueness is the registry's concern.
    pub fn rename(&mut self, new_name: impl Into<String>) {
        self.name = new_name.into();
    }

    pub fn included_count(&self) -> usize {
        self.flags.values().filter(|included| **included).count()
    }

    pub fn is_all_included(&self) -> bool {
        self.flags.values().all(|included| *included)
    }

    /// Ids of every included book, sorted by id.
    pub fn included_books(&self) -> impl Iterator<Item = &BookId> {
        self.flags
            .iter()
            .filter(|(_, included)| **included)
            .map(|(id, _)| id)
    }

    /// Every `(book id, included)` pair, sorted by id.
    pub fn flags(&self) -> impl Iterator<Item = (&BookId, bool)> {
        self.flags.iter().map(|(id, included)| (id, *included))
    }

    pub fn len(&self) -> usize {
        self.flags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }
}

impl fmt::Display for SearchBookSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}
