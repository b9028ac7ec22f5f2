//! Storage seam for the registry. The stored shape is deliberately loose (raw
//! names and id strings) so the registry can reconcile whatever an older or
//! damaged database hands back against the current catalog.

use crate::error::BookSetError;

/// One persisted set: its name and `(book id, included)` pairs.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StoredBookSet {
    pub name: String,
    pub flags: Vec<(String, bool)>,
}

/// Full registry snapshot. Sets are kept in display order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StoredRegistry {
    pub sets: Vec<StoredBookSet>,
    pub current: Option<String>,
}

/// Where registry snapshots live between runs.
///
/// `save` must be all-or-nothing: either the whole snapshot replaces the
/// previous one or the previous one stays authoritative.
pub trait BookSetStore {
    /// `Ok(None)` means nothing has been stored yet.
    fn load(&self) -> Result<Option<StoredRegistry>, BookSetError>;

    fn save(&mut self, snapshot: &StoredRegistry) -> Result<(), BookSetError>;
}
