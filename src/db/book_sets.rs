use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};

use crate::store::{StoredBookSet, StoredRegistry};

/// Preference key holding the name of the active set.
pub const CURRENT_SET_KEY: &str = "current_book_set";

/// Retrieve every stored set in display order, flags included.
pub fn fetch_book_sets(conn: &Connection) -> Result<Vec<StoredBookSet>> {
    let mut stmt = conn
        .prepare("SELECT name FROM book_sets ORDER BY position, rowid")
        .context("failed to prepare book set query")?;

    let names = stmt
        .query_map([], |row| row.get::<_, String>(0))
        .context("failed to load book sets")?
        .collect::<Result<Vec<_>, _>>()
        .context("failed to collect book sets")?;

    let mut flag_stmt = conn
        .prepare("SELECT book_id, included FROM book_set_flags WHERE set_name = ?1")
        .context("failed to prepare book flag query")?;

    let mut sets = Vec::with_capacity(names.len());
    for name in names {
        let flags: Vec<(String, bool)> = flag_stmt
            .query_map([&name], |row| Ok((row.get(0)?, row.get(1)?)))
            .context("failed to load book flags")?
            .collect::<Result<Vec<_>, _>>()
            .with_context(|| format!("failed to collect flags of book set '{name}'"))?;
        sets.push(StoredBookSet { name, flags });
    }

    Ok(sets)
}

/// Read the stored current set name, if any.
pub fn fetch_current_name(conn: &Connection) -> Result<Option<String>> {
    conn.query_row(
        "SELECT value FROM preferences WHERE key = ?1",
        [CURRENT_SET_KEY],
        |row| row.get(0),
    )
    .optional()
    .context("failed to read current book set")
}

/// Replace everything stored with `snapshot` inside one transaction. If any
/// statement fails the transaction rolls back on drop and the previous rows
/// stay in place.
pub fn replace_book_sets(conn: &mut Connection, snapshot: &StoredRegistry) -> Result<()> {
    let tx = conn
        .transaction()
        .context("failed to begin book set transaction")?;

    tx.execute("DELETE FROM book_sets", [])
        .context("failed to clear book sets")?;

    {
        let mut insert_set = tx
            .prepare("INSERT INTO book_sets (name, position) VALUES (?1, ?2)")
            .context("failed to prepare book set insert")?;
        let mut insert_flag = tx
            .prepare(
                "INSERT INTO book_set_flags (set_name, book_id, included) VALUES (?1, ?2, ?3)",
            )
            .context("failed to prepare book flag insert")?;

        for (position, set) in snapshot.sets.iter().enumerate() {
            insert_set
                .execute(params![set.name, position as i64])
                .with_context(|| format!("failed to insert book set '{}'", set.name))?;
            for (book_id, included) in &set.flags {
                insert_flag
                    .execute(params![set.name, book_id, included])
                    .with_context(|| {
                        format!("failed to insert flag '{book_id}' of '{}'", set.name)
                    })?;
            }
        }
    }

    match &snapshot.current {
        Some(current) => tx.execute(
            "INSERT INTO preferences (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![CURRENT_SET_KEY, current],
        ),
        None => tx.execute("DELETE FROM preferences WHERE key = ?1", [CURRENT_SET_KEY]),
    }
    .context("failed to store current book set")?;

    tx.commit().context("failed to commit book sets")
}
