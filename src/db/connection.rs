use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::Connection;

/// Open (creating if needed) the database at `path` and run lazy migrations.
pub fn open_database(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create data directory")?;
    }

    let conn = Connection::open(path).context("failed to open SQLite database")?;
    ensure_schema(&conn)?;
    Ok(conn)
}

/// Create the tables if they are missing. The function also toggles
/// `PRAGMA foreign_keys = ON` so deleting a set cascades to its flags in tests
/// and production alike.
pub fn ensure_schema(conn: &Connection) -> Result<()> {
    conn.execute("PRAGMA foreign_keys = ON", [])
        .context("failed to enable foreign keys")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS book_sets (
            name TEXT PRIMARY KEY COLLATE NOCASE,
            position INTEGER NOT NULL
        )",
        [],
    )
    .context("failed to create book_sets table")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS book_set_flags (
            set_name TEXT NOT NULL COLLATE NOCASE,
            book_id TEXT NOT NULL,
            included INTEGER NOT NULL,
            PRIMARY KEY (set_name, book_id),
            FOREIGN KEY(set_name) REFERENCES book_sets(name) ON DELETE CASCADE
        )",
        [],
    )
    .context("failed to create book_set_flags table")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS preferences (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        )",
        [],
    )
    .context("failed to create preferences table")?;

    Ok(())
}
