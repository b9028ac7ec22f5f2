//! Binary entry point: resolve the data directory, start logging, hydrate the
//! registry from SQLite and drive the terminal editor until the user exits.
use std::sync::Arc;

use search_book_sets::config::Paths;
use search_book_sets::{
    logging, run_app, App, BookCatalog, BookSetEditor, BookSetRegistry, ScopeLog, SqliteStore,
};

fn main() -> anyhow::Result<()> {
    let paths = Paths::resolve()?;
    logging::init(&paths)?;

    let store = SqliteStore::open(&paths.database())?;
    let catalog = Arc::new(BookCatalog::canonical());
    let mut registry = BookSetRegistry::load(catalog, &store);
    registry.subscribe(Box::new(ScopeLog));

    let mut app = App::new(BookSetEditor::new(registry, store));
    run_app(&mut app)
}
