// Embedding store schema.
//
// One row per word; `emb` holds the vector as big-endian doubles. The layout
// matches the fastText SQLite dumps the store is normally built from, so an
// existing dump can be opened as-is.

use anyhow::{Context, Result};
use rusqlite::Connection;

/// Create the store tables if they don't exist yet. Idempotent.
pub fn create_tables(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS fasttext (
            word TEXT PRIMARY KEY,
            emb BLOB NOT NULL
        );
        ",
    )
    .context("Failed to create embedding store tables")?;

    Ok(())
}

/// Number of words in the store.
pub fn word_count(conn: &Connection) -> Result<i64> {
    let count: i64 = conn
        .query_row("SELECT count(*) FROM fasttext", [], |row| row.get(0))
        .context("Failed to count embedding store words")?;
    Ok(count)
}
