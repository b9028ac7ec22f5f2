//! Owner of every search book set. The registry keeps three facts true after
//! every call: at least one set exists (the protected default), names are
//! unique ignoring case, and `current` names an existing set. Each operation
//! validates first and mutates second, so a failed call leaves nothing
//! half-done.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::catalog::BookCatalog;
use crate::config::DEFAULT_SET_NAME;
use crate::error::BookSetError;
use crate::models::{BookId, SearchBookSet};
use crate::scope::{ScopeListener, SearchScope};
use crate::store::{BookSetStore, StoredBookSet, StoredRegistry};

/// Case-insensitive key used for every name comparison.
fn name_key(name: &str) -> String {
    name.trim().to_lowercase()
}

pub struct BookSetRegistry {
    catalog: Arc<BookCatalog>,
    sets: Vec<SearchBookSet>,
    current: String,
    listeners: Vec<Box<dyn ScopeListener>>,
}

impl fmt::Debug for BookSetRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BookSetRegistry")
            .field("sets", &self.sets)
            .field("current", &self.current)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl BookSetRegistry {
    /// A fresh registry holding only the default all-included set.
    pub fn seeded(catalog: Arc<BookCatalog>) -> Self {
        let default = SearchBookSet::all_included(DEFAULT_SET_NAME, &catalog);
        Self {
            catalog,
            sets: vec![default],
            current: DEFAULT_SET_NAME.to_string(),
            listeners: Vec::new(),
        }
    }

    /// Hydrate from `store`. Never fails: an empty store seeds the default and
    /// a store error is logged before seeding the default.
    pub fn load(catalog: Arc<BookCatalog>, store: &impl BookSetStore) -> Self {
        match store.load() {
            Ok(Some(snapshot)) => {
                let registry = Self::from_snapshot(catalog, snapshot);
                info!(
                    sets = registry.sets.len(),
                    current = %registry.current,
                    "loaded book sets"
                );
                registry
            }
            Ok(None) => {
                info!("no stored book sets, seeding default");
                Self::seeded(catalog)
            }
            Err(err) => {
                warn!(error = %err, "failed to load book sets, seeding default");
                Self::seeded(catalog)
            }
        }
    }

    /// Rebuild a registry from stored data, repairing anything that would
    /// break an invariant.
    pub fn from_snapshot(catalog: Arc<BookCatalog>, snapshot: StoredRegistry) -> Self {
        let mut seen = HashSet::new();
        let mut sets = Vec::with_capacity(snapshot.sets.len() + 1);

        for stored in snapshot.sets {
            let name = stored.name.trim().to_string();
            if name.is_empty() {
                warn!("dropping stored book set with an empty name");
                continue;
            }
            if !seen.insert(name_key(&name)) {
                warn!(set = %name, "dropping duplicate stored book set");
                continue;
            }
            sets.push(Self::reconcile(&catalog, name, &stored));
        }

        let default_key = name_key(DEFAULT_SET_NAME);
        match sets.iter().position(|set| name_key(set.name()) == default_key) {
            Some(index) => {
                let default = &mut sets[index];
                if !default.is_all_included() {
                    warn!("stored default book set was not all-included, repairing");
                    default.select_all();
                }
                default.rename(DEFAULT_SET_NAME);
            }
            None => {
                warn!("stored book sets lack the default set, restoring it");
                sets.insert(0, SearchBookSet::all_included(DEFAULT_SET_NAME, &catalog));
            }
        }

        let current = snapshot
            .current
            .and_then(|wanted| {
                sets.iter()
                    .find(|set| name_key(set.name()) == name_key(&wanted))
                    .map(|set| set.name().to_string())
            })
            .unwrap_or_else(|| sets[0].name().to_string());

        Self {
            catalog,
            sets,
            current,
            listeners: Vec::new(),
        }
    }

    /// Map stored flags onto the catalog. Ids the catalog no longer knows are
    /// dropped; books the stored set never saw start out included.
    fn reconcile(catalog: &BookCatalog, name: String, stored: &StoredBookSet) -> SearchBookSet {
        let mut set = SearchBookSet::all_included(name, catalog);
        for (raw_id, included) in &stored.flags {
            let id = BookId::new(raw_id.as_str());
            if set.set_included(&id, *included).is_err() {
                warn!(set = %set.name(), book = %raw_id, "dropping unknown stored book id");
            }
        }
        set
    }

    pub fn snapshot(&self) -> StoredRegistry {
        StoredRegistry {
            sets: self
                .sets
                .iter()
                .map(|set| StoredBookSet {
                    name: set.name().to_string(),
                    flags: set
                        .flags()
                        .map(|(id, included)| (id.to_string(), included))
                        .collect(),
                })
                .collect(),
            current: Some(self.current.clone()),
        }
    }

    /// Write the whole registry to `store`.
    pub fn save(&self, store: &mut impl BookSetStore) -> Result<(), BookSetError> {
        store.save(&self.snapshot())?;
        info!(sets = self.sets.len(), current = %self.current, "saved book sets");
        Ok(())
    }

    /// Register a consumer of scope changes. It immediately receives the
    /// current scope.
    pub fn subscribe(&mut self, mut listener: Box<dyn ScopeListener>) {
        listener.scope_changed(&self.scope());
        self.listeners.push(listener);
    }

    pub fn catalog(&self) -> &BookCatalog {
        &self.catalog
    }

    /// Names in insertion order, for menus.
    pub fn all_names(&self) -> Vec<&str> {
        self.sets.iter().map(|set| set.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&SearchBookSet> {
        self.index_of(name).map(|index| &self.sets[index])
    }

    pub fn current(&self) -> &SearchBookSet {
        &self.sets[self.current_index()]
    }

    pub fn current_name(&self) -> &str {
        &self.current
    }

    pub fn is_default(&self, name: &str) -> bool {
        name_key(name) == name_key(DEFAULT_SET_NAME)
    }

    pub fn scope(&self) -> SearchScope {
        SearchScope::from_set(self.current())
    }

    pub fn select_current(&mut self, name: &str) -> Result<(), BookSetError> {
        let index = self
            .index_of(name)
            .ok_or_else(|| BookSetError::UnknownSet(name.to_string()))?;
        self.current = self.sets[index].name().to_string();
        debug!(set = %self.current, "selected book set");
        self.publish();
        Ok(())
    }

    /// Create a set seeded from the current one and make it current.
    pub fn add(&mut self, name: &str) -> Result<&SearchBookSet, BookSetError> {
        let name = self.validate_new_name(name, None)?;
        let set = SearchBookSet::forked_from(name.clone(), self.current());
        debug!(set = %name, from = %self.current, "added book set");
        self.sets.push(set);
        self.current = name;
        self.publish();
        Ok(self.current())
    }

    pub fn remove(&mut self, name: &str) -> Result<(), BookSetError> {
        let index = self
            .index_of(name)
            .ok_or_else(|| BookSetError::UnknownSet(name.to_string()))?;
        if self.sets.len() == 1 {
            return Err(BookSetError::CannotRemoveLastSet);
        }
        if self.is_default(name) {
            return Err(BookSetError::CannotRemoveDefault(DEFAULT_SET_NAME.to_string()));
        }

        let removed = self.sets.remove(index);
        debug!(set = %removed.name(), "removed book set");
        if removed.name() == self.current {
            self.current = self.sets[0].name().to_string();
        }
        self.publish();
        Ok(())
    }

    /// Rename a set after checking the new name is free. A case-only change
    /// of the set's own name is allowed.
    pub fn rename(&mut self, name: &str, new_name: &str) -> Result<(), BookSetError> {
        let index = self
            .index_of(name)
            .ok_or_else(|| BookSetError::UnknownSet(name.to_string()))?;
        if self.is_default(name) {
            return Err(BookSetError::DefaultSetReadOnly(DEFAULT_SET_NAME.to_string()));
        }
        let new_name = self.validate_new_name(new_name, Some(index))?;

        let was_current = self.sets[index].name() == self.current;
        debug!(from = %self.sets[index].name(), to = %new_name, "renamed book set");
        self.sets[index].rename(new_name.clone());
        if was_current {
            self.current = new_name;
            self.publish();
        }
        Ok(())
    }

    /// Set one flag of the current set. Returns whether anything changed.
    pub fn set_included(&mut self, book: &BookId, included: bool) -> Result<bool, BookSetError> {
        let set = self.current_editable()?;
        let changed = set.set_included(book, included)?;
        if changed {
            debug!(set = %set.name(), %book, included, "updated book flag");
            self.publish();
        }
        Ok(changed)
    }

    /// Flip one flag of the current set, returning the new value.
    pub fn toggle(&mut self, book: &BookId) -> Result<bool, BookSetError> {
        let included = self.current().is_included(book)?;
        self.set_included(book, !included)?;
        Ok(!included)
    }

    pub fn select_all(&mut self) -> Result<(), BookSetError> {
        self.bulk_update(SearchBookSet::select_all)
    }

    pub fn select_none(&mut self) -> Result<(), BookSetError> {
        self.bulk_update(SearchBookSet::select_none)
    }

    pub fn select_inverse(&mut self) -> Result<(), BookSetError> {
        self.bulk_update(SearchBookSet::select_inverse)
    }

    fn bulk_update(&mut self, update: fn(&mut SearchBookSet)) -> Result<(), BookSetError> {
        let set = self.current_editable()?;
        let before = set.included_count();
        update(set);
        debug!(set = %set.name(), before, after = set.included_count(), "bulk book update");
        self.publish();
        Ok(())
    }

    fn current_editable(&mut self) -> Result<&mut SearchBookSet, BookSetError> {
        if self.is_default(&self.current) {
            return Err(BookSetError::DefaultSetReadOnly(DEFAULT_SET_NAME.to_string()));
        }
        let index = self.current_index();
        Ok(&mut self.sets[index])
    }

    /// Trim `name` and make sure no other set uses it. `own` is the index of
    /// the set being renamed, which may keep its own name.
    fn validate_new_name(&self, name: &str, own: Option<usize>) -> Result<String, BookSetError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(BookSetError::InvalidName);
        }
        match self.index_of(name) {
            Some(index) if Some(index) != own => Err(BookSetError::DuplicateName(name.to_string())),
            _ => Ok(name.to_string()),
        }
    }

    fn index_of(&self, name: &str) -> Option<usize> {
        let key = name_key(name);
        self.sets.iter().position(|set| name_key(set.name()) == key)
    }

    fn current_index(&self) -> usize {
        // `current` is kept in sync with `sets` by every mutating call.
        self.sets
            .iter()
            .position(|set| set.name() == self.current)
            .unwrap_or(0)
    }

    fn publish(&mut self) {
        if self.listeners.is_empty() {
            return;
        }
        let scope = self.scope();
        for listener in &mut self.listeners {
            listener.scope_changed(&scope);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc::{self, Receiver};

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::models::{Book, Testament};

    fn registry() -> BookSetRegistry {
        BookSetRegistry::seeded(Arc::new(BookCatalog::canonical()))
    }

    fn listening(registry: &mut BookSetRegistry) -> Receiver<SearchScope> {
        let (tx, rx) = mpsc::channel();
        registry.subscribe(Box::new(tx));
        rx.try_recv().expect("initial scope");
        rx
    }

    fn assert_invariants(registry: &BookSetRegistry) {
        assert!(!registry.is_empty());
        assert!(registry.get(registry.current_name()).is_some());
        let mut catalog_ids: Vec<&BookId> = registry.catalog().ids().collect();
        catalog_ids.sort();
        for set in &registry.sets {
            let ids: Vec<&BookId> = set.flags().map(|(id, _)| id).collect();
            assert_eq!(ids, catalog_ids);
        }
        let keys: HashSet<String> = registry.sets.iter().map(|s| name_key(s.name())).collect();
        assert_eq!(keys.len(), registry.len());
    }

    #[test]
    fn seeded_registry_holds_the_default() {
        let registry = registry();
        assert_eq!(registry.all_names(), vec![DEFAULT_SET_NAME]);
        assert_eq!(registry.current().name(), DEFAULT_SET_NAME);
        assert!(registry.current().is_all_included());
        assert_invariants(&registry);
    }

    #[test]
    fn add_forks_the_current_set_and_selects_it() {
        let mut registry = registry();
        registry.add("Custom").unwrap();
        registry.set_included(&BookId::from("Gen"), false).unwrap();

        let fork = registry.add("Fork").unwrap();
        assert_eq!(fork.name(), "Fork");
        assert!(!fork.is_included(&BookId::from("Gen")).unwrap());
        assert_eq!(registry.current_name(), "Fork");
        assert_eq!(registry.all_names(), vec![DEFAULT_SET_NAME, "Custom", "Fork"]);
        assert_invariants(&registry);
    }

    #[test]
    fn duplicate_add_leaves_registry_unchanged() {
        let mut registry = registry();
        registry.add("Custom").unwrap();
        registry.select_current(DEFAULT_SET_NAME).unwrap();

        let err = registry.add("  custom ").unwrap_err();
        assert!(matches!(err, BookSetError::DuplicateName(name) if name == "custom"));
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.current_name(), DEFAULT_SET_NAME);
    }

    #[test]
    fn empty_names_are_invalid() {
        let mut registry = registry();
        assert!(matches!(registry.add(""), Err(BookSetError::InvalidName)));
        assert!(matches!(registry.add("   "), Err(BookSetError::InvalidName)));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn add_trims_the_name() {
        let mut registry = registry();
        registry.add("  Gospels  ").unwrap();
        assert_eq!(registry.current_name(), "Gospels");
    }

    #[test]
    fn select_unknown_set_fails() {
        let mut registry = registry();
        let err = registry.select_current("Missing").unwrap_err();
        assert!(matches!(err, BookSetError::UnknownSet(name) if name == "Missing"));
        assert_eq!(registry.current_name(), DEFAULT_SET_NAME);
    }

    #[test]
    fn select_is_case_insensitive() {
        let mut registry = registry();
        registry.add("Prophets").unwrap();
        registry.select_current(DEFAULT_SET_NAME).unwrap();
        registry.select_current("PROPHETS").unwrap();
        assert_eq!(registry.current_name(), "Prophets");
    }

    #[test]
    fn removing_the_sole_set_fails() {
        let mut registry = registry();
        let err = registry.remove(DEFAULT_SET_NAME).unwrap_err();
        assert!(matches!(err, BookSetError::CannotRemoveLastSet));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn removing_the_default_fails() {
        let mut registry = registry();
        registry.add("Custom").unwrap();
        let err = registry.remove("all books").unwrap_err();
        assert!(matches!(err, BookSetError::CannotRemoveDefault(_)));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn removing_unknown_set_fails() {
        let mut registry = registry();
        assert!(matches!(
            registry.remove("Missing"),
            Err(BookSetError::UnknownSet(_))
        ));
    }

    #[test]
    fn removing_current_falls_back_to_first_set() {
        let mut registry = registry();
        registry.add("One").unwrap();
        registry.add("Two").unwrap();
        let rx = listening(&mut registry);

        registry.remove("Two").unwrap();
        assert_eq!(registry.current_name(), DEFAULT_SET_NAME);
        assert_eq!(rx.try_recv().unwrap().set_name, DEFAULT_SET_NAME);
        assert_invariants(&registry);
    }

    #[test]
    fn removing_other_set_keeps_current() {
        let mut registry = registry();
        registry.add("One").unwrap();
        registry.add("Two").unwrap();
        let rx = listening(&mut registry);

        registry.remove("One").unwrap();
        assert_eq!(registry.current_name(), "Two");
        assert_eq!(registry.all_names(), vec![DEFAULT_SET_NAME, "Two"]);
        assert_eq!(rx.try_recv().unwrap().set_name, "Two");
    }

    #[test]
    fn default_set_is_read_only() {
        let mut registry = registry();
        let genesis = BookId::from("Gen");

        assert!(matches!(
            registry.set_included(&genesis, false),
            Err(BookSetError::DefaultSetReadOnly(_))
        ));
        assert!(matches!(
            registry.select_none(),
            Err(BookSetError::DefaultSetReadOnly(_))
        ));
        assert!(matches!(
            registry.rename(DEFAULT_SET_NAME, "Everything"),
            Err(BookSetError::DefaultSetReadOnly(_))
        ));
        assert!(registry.current().is_all_included());
    }

    #[test]
    fn rename_validates_and_follows_current() {
        let mut registry = registry();
        registry.add("One").unwrap();
        registry.add("Two").unwrap();

        assert!(matches!(
            registry.rename("Two", "one"),
            Err(BookSetError::DuplicateName(_))
        ));
        assert!(matches!(
            registry.rename("Two", " "),
            Err(BookSetError::InvalidName)
        ));
        registry.rename("Two", "TWO").unwrap();
        assert_eq!(registry.current_name(), "TWO");

        registry.rename("two", "Second").unwrap();
        assert_eq!(registry.current_name(), "Second");
        assert_eq!(registry.all_names(), vec![DEFAULT_SET_NAME, "One", "Second"]);
    }

    #[test]
    fn flag_changes_publish_scope() {
        let mut registry = registry();
        registry.add("Custom").unwrap();
        let rx = listening(&mut registry);
        let genesis = BookId::from("Gen");

        assert!(registry.set_included(&genesis, false).unwrap());
        let scope = rx.try_recv().unwrap();
        assert!(!scope.allows(&genesis));
        assert_eq!(scope.included.len(), 65);

        assert!(!registry.set_included(&genesis, false).unwrap());
        assert!(rx.try_recv().is_err());

        assert!(registry.toggle(&genesis).unwrap());
        assert!(rx.try_recv().unwrap().allows(&genesis));
    }

    #[test]
    fn unknown_book_does_not_publish() {
        let mut registry = registry();
        registry.add("Custom").unwrap();
        let rx = listening(&mut registry);

        assert!(matches!(
            registry.toggle(&BookId::from("Bar")),
            Err(BookSetError::UnknownBook(_))
        ));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn bulk_selections_on_current_set() {
        let mut registry = registry();
        registry.add("Custom").unwrap();

        registry.select_none().unwrap();
        assert_eq!(registry.current().included_count(), 0);
        registry.select_inverse().unwrap();
        assert!(registry.current().is_all_included());
        registry.set_included(&BookId::from("Jude"), false).unwrap();
        let before = registry.current().clone();
        registry.select_inverse().unwrap();
        registry.select_inverse().unwrap();
        assert_eq!(registry.current(), &before);
        registry.select_all().unwrap();
        assert!(registry.current().is_all_included());
        assert_invariants(&registry);
    }

    #[test]
    fn snapshot_reconciles_against_a_grown_catalog() {
        let small = StoredRegistry {
            sets: vec![
                StoredBookSet {
                    name: "Torah".to_string(),
                    flags: vec![
                        ("Gen".to_string(), true),
                        ("Exod".to_string(), false),
                        ("Tob".to_string(), true),
                    ],
                },
                StoredBookSet {
                    name: "torah".to_string(),
                    flags: Vec::new(),
                },
                StoredBookSet {
                    name: " ".to_string(),
                    flags: Vec::new(),
                },
            ],
            current: Some("Missing".to_string()),
        };

        let registry = BookSetRegistry::from_snapshot(Arc::new(BookCatalog::canonical()), small);

        assert_eq!(registry.all_names(), vec![DEFAULT_SET_NAME, "Torah"]);
        assert_eq!(registry.current_name(), DEFAULT_SET_NAME);
        let torah = registry.get("Torah").unwrap();
        assert!(torah.is_included(&BookId::from("Gen")).unwrap());
        assert!(!torah.is_included(&BookId::from("Exod")).unwrap());
        assert!(torah.is_included(&BookId::from("Rev")).unwrap());
        assert_eq!(torah.included_count(), 65);
        assert_invariants(&registry);
    }

    #[test]
    fn snapshot_repairs_a_restricted_default() {
        let stored = StoredRegistry {
            sets: vec![StoredBookSet {
                name: "all books".to_string(),
                flags: vec![("Gen".to_string(), false)],
            }],
            current: Some("ALL BOOKS".to_string()),
        };
        let registry = BookSetRegistry::from_snapshot(Arc::new(BookCatalog::canonical()), stored);

        assert_eq!(registry.all_names(), vec![DEFAULT_SET_NAME]);
        assert_eq!(registry.current_name(), DEFAULT_SET_NAME);
        assert!(registry.current().is_all_included());
    }

    #[test]
    fn works_with_a_custom_catalog() {
        let catalog = BookCatalog::new(vec![
            Book {
                id: BookId::from("A"),
                name: "Alpha".to_string(),
                testament: Testament::Old,
            },
            Book {
                id: BookId::from("B"),
                name: "Beta".to_string(),
                testament: Testament::New,
            },
        ])
        .unwrap();
        let mut registry = BookSetRegistry::seeded(Arc::new(catalog));
        registry.add("Only A").unwrap();
        registry.set_included(&BookId::from("B"), false).unwrap();

        assert_eq!(registry.current().included_count(), 1);
        assert_eq!(registry.snapshot().sets[1].flags, vec![
            ("A".to_string(), true),
            ("B".to_string(), false),
        ]);
    }
}
