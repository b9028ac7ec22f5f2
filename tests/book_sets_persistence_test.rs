//! Registry round-trips through the SQLite store, including the degraded
//! load paths.

use std::sync::mpsc;
use std::sync::Arc;

use pretty_assertions::assert_eq;
use search_book_sets::{
    Book, BookCatalog, BookId, BookSetEditor, BookSetRegistry, BookSetStore, Gesture, Outcome,
    SqliteStore, StoredBookSet, StoredRegistry, Testament,
};

fn canonical() -> Arc<BookCatalog> {
    Arc::new(BookCatalog::canonical())
}

#[test]
fn old_testament_only_survives_a_reload() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("book_sets.sqlite");
    let catalog = canonical();

    {
        let mut store = SqliteStore::open(&db_path).unwrap();
        let mut registry = BookSetRegistry::load(catalog.clone(), &store);
        assert_eq!(registry.all_names(), vec!["All Books"]);
        assert!(registry.current().is_all_included());

        registry.add("OT Only").unwrap();
        let nt_books: Vec<BookId> = catalog
            .testament(Testament::New)
            .map(|book| book.id.clone())
            .collect();
        for id in &nt_books {
            registry.set_included(id, false).unwrap();
        }
        registry.save(&mut store).unwrap();
    }

    let store = SqliteStore::open(&db_path).unwrap();
    let registry = BookSetRegistry::load(catalog.clone(), &store);

    assert_eq!(registry.current_name(), "OT Only");
    assert_eq!(registry.all_names(), vec!["All Books", "OT Only"]);
    let ot_only = registry.current();
    for book in catalog.testament(Testament::New) {
        assert!(!ot_only.is_included(&book.id).unwrap(), "{} included", book.name);
    }
    for book in catalog.testament(Testament::Old) {
        assert!(ot_only.is_included(&book.id).unwrap(), "{} excluded", book.name);
    }
    assert!(registry.get("All Books").unwrap().is_all_included());
}

#[test]
fn editor_gestures_are_saved_as_they_happen() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("book_sets.sqlite");

    {
        let store = SqliteStore::open(&db_path).unwrap();
        let registry = BookSetRegistry::load(canonical(), &store);
        let mut editor = BookSetEditor::new(registry, store);
        editor.apply(Gesture::AddSet("Gospels".to_string()));
        editor.apply(Gesture::SelectNone);
        for id in ["Matt", "Mark", "Luke", "John"] {
            let outcome = editor.apply(Gesture::ToggleBook(BookId::from(id)));
            assert!(matches!(outcome, Outcome::Applied(_)), "{outcome:?}");
        }
        editor.apply(Gesture::SwitchSet("All Books".to_string()));
    }

    let store = SqliteStore::open(&db_path).unwrap();
    let registry = BookSetRegistry::load(canonical(), &store);
    assert_eq!(registry.current_name(), "All Books");
    let gospels = registry.get("gospels").unwrap();
    let included: Vec<&str> = gospels.included_books().map(BookId::as_str).collect();
    assert_eq!(included, vec!["John", "Luke", "Mark", "Matt"]);
}

#[test]
fn sets_saved_with_a_smaller_catalog_cover_the_grown_one() {
    let small = Arc::new(
        BookCatalog::new(vec![
            Book {
                id: BookId::from("Gen"),
                name: "Genesis".to_string(),
                testament: Testament::Old,
            },
            Book {
                id: BookId::from("Matt"),
                name: "Matthew".to_string(),
                testament: Testament::New,
            },
        ])
        .unwrap(),
    );
    let mut store = SqliteStore::in_memory().unwrap();
    let mut registry = BookSetRegistry::seeded(small);
    registry.add("No Matthew").unwrap();
    registry.set_included(&BookId::from("Matt"), false).unwrap();
    registry.save(&mut store).unwrap();

    let grown = canonical();
    let registry = BookSetRegistry::load(grown.clone(), &store);
    let set = registry.get("No Matthew").unwrap();

    assert_eq!(set.len(), grown.len());
    assert!(!set.is_included(&BookId::from("Matt")).unwrap());
    assert!(set.is_included(&BookId::from("Rev")).unwrap());
    assert_eq!(set.included_count(), grown.len() - 1);
}

#[test]
fn empty_database_seeds_the_default() {
    let store = SqliteStore::in_memory().unwrap();
    assert_eq!(store.load().unwrap(), None);

    let registry = BookSetRegistry::load(canonical(), &store);
    assert_eq!(registry.all_names(), vec!["All Books"]);
}

#[test]
fn unreadable_database_falls_back_to_the_default() {
    let store = SqliteStore::in_memory().unwrap();
    let conn = store.connection();
    conn.execute(
        "INSERT INTO book_sets (name, position) VALUES ('Broken', 0)",
        [],
    )
    .unwrap();
    conn.execute("DROP TABLE book_set_flags", []).unwrap();

    assert!(store.load().is_err());
    let registry = BookSetRegistry::load(canonical(), &store);
    assert_eq!(registry.all_names(), vec!["All Books"]);
    assert_eq!(registry.current_name(), "All Books");
}

#[test]
fn stored_snapshot_without_default_or_current_is_repaired() {
    let mut store = SqliteStore::in_memory().unwrap();
    store
        .save(&StoredRegistry {
            sets: vec![StoredBookSet {
                name: "Prophets".to_string(),
                flags: vec![("Isa".to_string(), true), ("Gen".to_string(), false)],
            }],
            current: None,
        })
        .unwrap();

    let registry = BookSetRegistry::load(canonical(), &store);
    assert_eq!(registry.all_names(), vec!["All Books", "Prophets"]);
    assert_eq!(registry.current_name(), "All Books");
    assert!(!registry
        .get("Prophets")
        .unwrap()
        .is_included(&BookId::from("Gen"))
        .unwrap());
}

#[test]
fn scope_follows_the_current_set() {
    let mut registry = BookSetRegistry::seeded(canonical());
    let (tx, rx) = mpsc::channel();
    registry.subscribe(Box::new(tx));

    let initial = rx.recv().unwrap();
    assert!(initial.is_unrestricted());

    registry.add("Torah").unwrap();
    assert_eq!(rx.recv().unwrap().set_name, "Torah");

    registry.select_none().unwrap();
    for id in ["Gen", "Exod", "Lev", "Num", "Deut"] {
        registry.set_included(&BookId::from(id), true).unwrap();
    }
    let scope = rx.try_iter().last().unwrap();
    assert_eq!(scope.included.len(), 5);
    assert!(scope.allows(&BookId::from("Deut")));
    assert!(!scope.allows(&BookId::from("Josh")));

    registry.remove("Torah").unwrap();
    assert!(rx.recv().unwrap().is_unrestricted());
}
