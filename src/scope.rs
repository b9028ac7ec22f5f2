//! The hand-off between the registry and whatever runs searches. The registry
//! only says *which* books a query may touch; executing the query is someone
//! else's job.

use std::collections::BTreeSet;
use std::sync::mpsc::Sender;

use tracing::{info, warn};

use crate::models::{BookId, SearchBookSet};

/// Snapshot of the active set, published whenever the current set or its
/// flags change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchScope {
    pub set_name: String,
    pub included: BTreeSet<BookId>,
    /// Catalog size at publication time, so consumers can tell "everything"
    /// from "a subset".
    pub total: usize,
}

impl SearchScope {
    pub fn from_set(set: &SearchBookSet) -> Self {
        Self {
            set_name: set.name().to_string(),
            included: set.included_books().cloned().collect(),
            total: set.len(),
        }
    }

    pub fn allows(&self, book: &BookId) -> bool {
        self.included.contains(book)
    }

    pub fn is_unrestricted(&self) -> bool {
        self.included.len() == self.total
    }
}

/// Receiver of scope changes.
pub trait ScopeListener {
    fn scope_changed(&mut self, scope: &SearchScope);
}

/// Forward scopes to a search worker on another thread. A dropped receiver is
/// logged and otherwise ignored; the edit itself already succeeded.
impl ScopeListener for Sender<SearchScope> {
    fn scope_changed(&mut self, scope: &SearchScope) {
        if self.send(scope.clone()).is_err() {
            warn!(set = %scope.set_name, "search scope receiver is gone");
        }
    }
}

/// Records every scope change in the log.
#[derive(Debug, Default)]
pub struct ScopeLog;

impl ScopeListener for ScopeLog {
    fn scope_changed(&mut self, scope: &SearchScope) {
        info!(
            set = %scope.set_name,
            included = scope.included.len(),
            total = scope.total,
            "search scope changed"
        );
    }
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;

    use super::*;
    use crate::catalog::BookCatalog;

    #[test]
    fn scope_mirrors_set_flags() {
        let catalog = BookCatalog::canonical();
        let mut set = SearchBookSet::all_included("Gospels", &catalog);
        set.select_none();
        for id in ["Matt", "Mark", "Luke", "John"] {
            set.set_included(&BookId::from(id), true).unwrap();
        }

        let scope = SearchScope::from_set(&set);
        assert_eq!(scope.set_name, "Gospels");
        assert_eq!(scope.included.len(), 4);
        assert!(scope.allows(&BookId::from("Luke")));
        assert!(!scope.allows(&BookId::from("Acts")));
        assert!(!scope.is_unrestricted());
    }

    #[test]
    fn sender_forwards_and_tolerates_closed_receiver() {
        let catalog = BookCatalog::canonical();
        let scope = SearchScope::from_set(&SearchBookSet::all_included("All Books", &catalog));
        let (mut tx, rx) = mpsc::channel();

        tx.scope_changed(&scope);
        assert_eq!(rx.recv().unwrap(), scope);

        drop(rx);
        tx.scope_changed(&scope);
    }
}
