// Token embedding store: word vectors the column vectorizer sums over.
//
// The SQLite store uses rusqlite with the "bundled" feature so there's no
// system SQLite dependency. The database file lives wherever
// TABLEUNION_EMBEDDING_DB points.

pub mod codec;
pub mod schema;
pub mod sqlite;
pub mod traits;

pub use sqlite::{SqliteEmbeddingStore, StoreStats};
pub use traits::{InMemoryEmbeddingStore, TokenEmbeddingStore};

use anyhow::{Context, Result};
use rusqlite::{Connection, OpenFlags};
use std::path::Path;

/// Open (or create) the store and make sure its tables exist.
///
/// Called by `tableunion init` and `tableunion load-embeddings`.
pub fn initialize(db_path: &str) -> Result<SqliteEmbeddingStore> {
    // Create parent directories if needed
    if let Some(parent) = Path::new(db_path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create directory for embedding store: {db_path}")
            })?;
        }
    }

    let conn = Connection::open(db_path)
        .with_context(|| format!("Failed to open embedding store at {}", db_path))?;

    conn.pragma_update(None, "journal_mode", "WAL")?;

    schema::create_tables(&conn)?;

    Ok(SqliteEmbeddingStore::new(conn))
}

/// Open an existing store read-only (fails if it doesn't exist yet).
pub fn open(db_path: &str) -> Result<SqliteEmbeddingStore> {
    if !Path::new(db_path).exists() {
        anyhow::bail!(
            "Embedding store not found at {}. \
             Run `tableunion init` and `tableunion load-embeddings` first.",
            db_path
        );
    }

    let conn = Connection::open_with_flags(
        db_path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )
    .with_context(|| format!("Failed to open embedding store at {}", db_path))?;

    Ok(SqliteEmbeddingStore::new(conn))
}
