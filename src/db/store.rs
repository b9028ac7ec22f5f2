use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::Connection;

use crate::error::BookSetError;
use crate::store::{BookSetStore, StoredRegistry};

use super::book_sets::{fetch_book_sets, fetch_current_name, replace_book_sets};
use super::connection::{ensure_schema, open_database};

/// `BookSetStore` backed by the embedded SQLite database.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open(path: &Path) -> Result<Self> {
        Ok(Self {
            conn: open_database(path)?,
        })
    }

    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("failed to open in-memory database")?;
        Self::from_connection(conn)
    }

    pub fn from_connection(conn: Connection) -> Result<Self> {
        ensure_schema(&conn)?;
        Ok(Self { conn })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl BookSetStore for SqliteStore {
    fn load(&self) -> Result<Option<StoredRegistry>, BookSetError> {
        let sets = fetch_book_sets(&self.conn)?;
        if sets.is_empty() {
            return Ok(None);
        }
        let current = fetch_current_name(&self.conn)?;
        Ok(Some(StoredRegistry { sets, current }))
    }

    fn save(&mut self, snapshot: &StoredRegistry) -> Result<(), BookSetError> {
        replace_book_sets(&mut self.conn, snapshot)?;
        Ok(())
    }
}
