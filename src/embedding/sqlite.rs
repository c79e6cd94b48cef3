// SqliteEmbeddingStore: rusqlite backend implementing TokenEmbeddingStore.
//
// Connection is !Sync, so it lives behind a std Mutex; every lookup takes the
// lock, runs its queries, and releases it. Lookups are batched into IN (...)
// queries so one column costs a handful of round trips, not one per token.

use std::collections::HashMap;
use std::io::BufRead;
use std::sync::Mutex;

use anyhow::{Context, Result};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};
use tracing::debug;

use super::codec::{bytes_to_vec, vec_to_bytes};
use super::traits::TokenEmbeddingStore;
use crate::error::{AlignError, AlignResult};

/// SQLite caps bound parameters per statement; stay well below the limit.
const LOOKUP_CHUNK: usize = 500;

/// Summary of what the store holds.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreStats {
    pub words: i64,
    /// Dimension of an arbitrary stored vector, `None` when the store is empty.
    pub dimension: Option<usize>,
}

pub struct SqliteEmbeddingStore {
    conn: Mutex<Connection>,
}

impl SqliteEmbeddingStore {
    /// Wrap an already-opened rusqlite Connection.
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    fn lock(&self) -> AlignResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| AlignError::Resolution(format!("store lock poisoned: {e}")))
    }

    /// Insert or replace word vectors in one transaction.
    pub fn insert_embeddings(&self, entries: &[(String, Vec<f64>)]) -> Result<usize> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        {
            let mut stmt =
                tx.prepare("INSERT OR REPLACE INTO fasttext (word, emb) VALUES (?1, ?2)")?;
            for (word, vec) in entries {
                stmt.execute(params![word, vec_to_bytes(vec)])?;
            }
        }
        tx.commit()?;
        Ok(entries.len())
    }

    /// Bulk-load a text embedding file (`word v1 v2 ...` per line).
    ///
    /// A leading `count dim` header line, as written by fastText, is skipped.
    /// Every vector must have the same dimension; a line that disagrees is an
    /// error rather than a silently truncated vector.
    pub fn load_text_embeddings<R: BufRead>(&self, reader: R, batch_size: usize) -> Result<usize> {
        let batch_size = batch_size.max(1);
        let mut batch: Vec<(String, Vec<f64>)> = Vec::with_capacity(batch_size);
        let mut dimension: Option<usize> = None;
        let mut loaded = 0;

        for (line_no, line) in reader.lines().enumerate() {
            let line = line.with_context(|| format!("Failed to read line {}", line_no + 1))?;
            let mut fields = line.split_whitespace();
            let Some(word) = fields.next() else {
                continue;
            };
            let values: Vec<f64> = fields
                .map(str::parse::<f64>)
                .collect::<std::result::Result<_, _>>()
                .with_context(|| format!("Malformed vector on line {}", line_no + 1))?;

            if line_no == 0 && values.len() == 1 && word.parse::<u64>().is_ok() {
                debug!(header = line.as_str(), "Skipping embedding file header");
                continue;
            }
            if values.is_empty() {
                continue;
            }

            match dimension {
                None => dimension = Some(values.len()),
                Some(d) if d != values.len() => anyhow::bail!(
                    "Line {} has {} components, expected {}",
                    line_no + 1,
                    values.len(),
                    d
                ),
                Some(_) => {}
            }

            batch.push((word.to_string(), values));
            if batch.len() >= batch_size {
                loaded += self.insert_embeddings(&batch)?;
                batch.clear();
            }
        }

        if !batch.is_empty() {
            loaded += self.insert_embeddings(&batch)?;
        }

        debug!(loaded, dimension = ?dimension, "Loaded text embeddings");
        Ok(loaded)
    }

    pub fn stats(&self) -> Result<StoreStats> {
        let conn = self.lock()?;
        let words = super::schema::word_count(&conn)?;
        let blob: Option<Vec<u8>> = conn
            .query_row("SELECT emb FROM fasttext LIMIT 1", [], |row| row.get(0))
            .optional()?;
        let dimension = match blob {
            Some(b) => Some(bytes_to_vec(&b)?.len()),
            None => None,
        };
        Ok(StoreStats { words, dimension })
    }
}

impl TokenEmbeddingStore for SqliteEmbeddingStore {
    fn lookup(&self, tokens: &[String]) -> AlignResult<HashMap<String, Vec<f64>>> {
        let mut found = HashMap::new();
        if tokens.is_empty() {
            return Ok(found);
        }

        let mut unique: Vec<&String> = tokens.iter().collect();
        unique.sort();
        unique.dedup();

        let conn = self.lock()?;
        for chunk in unique.chunks(LOOKUP_CHUNK) {
            let placeholders = vec!["?"; chunk.len()].join(",");
            let sql = format!("SELECT word, emb FROM fasttext WHERE word IN ({placeholders})");
            let mut stmt = conn.prepare_cached(&sql)?;
            let rows = stmt.query_map(params_from_iter(chunk.iter()), |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, Vec<u8>>(1)?))
            })?;
            for row in rows {
                let (word, blob) = row?;
                let vec = bytes_to_vec(&blob)?;
                found.insert(word, vec);
            }
        }

        debug!(
            requested = unique.len(),
            resolved = found.len(),
            "Embedding store lookup"
        );
        Ok(found)
    }
}
