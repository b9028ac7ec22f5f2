//! Persistence module split across logical submodules.

mod book_sets;
mod connection;
mod store;

pub use book_sets::{fetch_book_sets, fetch_current_name, replace_book_sets, CURRENT_SET_KEY};
pub use connection::{ensure_schema, open_database};
pub use store::SqliteStore;
