use std::env;
use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::alignment::{ValueWeighting, VectorizerOptions};

pub const DEFAULT_INDEX_URL: &str = "http://localhost:4003";
pub const DEFAULT_INDEX_TIMEOUT_SECS: u64 = 5;
pub const DEFAULT_CANDIDATES_K: usize = 5;

/// Central configuration loaded from environment variables.
///
/// The .env file is loaded automatically at startup via dotenvy, so every
/// setting can live there instead of the shell environment.
#[derive(Debug, Clone)]
pub struct Config {
    /// SQLite token embedding store (TABLEUNION_EMBEDDING_DB)
    pub embedding_db: String,
    /// Root directory that candidate table IDs resolve against (TABLEUNION_TABLE_DIR)
    pub table_dir: PathBuf,
    /// Candidate retrieval index base URL (TABLEUNION_INDEX_URL)
    pub index_url: String,
    /// Upper bound on each retrieval request (TABLEUNION_INDEX_TIMEOUT_SECS)
    pub index_timeout: Duration,
    /// Results requested per query column (TABLEUNION_CANDIDATES_K)
    pub candidates_k: usize,
    /// Aligner threshold; unset keeps every edge (TABLEUNION_MIN_SIMILARITY)
    pub min_similarity: Option<f64>,
    /// TABLEUNION_VALUE_WEIGHTING and TABLEUNION_MAX_VALUE_TOKENS
    pub vectorizer: VectorizerOptions,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Everything has a default. A variable that is set but doesn't parse is
    /// an error, not a silent fallback.
    pub fn load() -> Result<Self> {
        let weighting =
            parse_var::<ValueWeighting>("TABLEUNION_VALUE_WEIGHTING")?.unwrap_or_default();
        let max_tokens_per_value = parse_var::<usize>("TABLEUNION_MAX_VALUE_TOKENS")?;

        Ok(Self {
            embedding_db: env::var("TABLEUNION_EMBEDDING_DB")
                .unwrap_or_else(|_| default_embedding_db()),
            table_dir: env::var("TABLEUNION_TABLE_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./tables")),
            index_url: env::var("TABLEUNION_INDEX_URL")
                .unwrap_or_else(|_| DEFAULT_INDEX_URL.to_string()),
            index_timeout: Duration::from_secs(
                parse_var::<u64>("TABLEUNION_INDEX_TIMEOUT_SECS")?
                    .unwrap_or(DEFAULT_INDEX_TIMEOUT_SECS),
            ),
            candidates_k: parse_var::<usize>("TABLEUNION_CANDIDATES_K")?
                .unwrap_or(DEFAULT_CANDIDATES_K),
            min_similarity: parse_var::<f64>("TABLEUNION_MIN_SIMILARITY")?,
            vectorizer: VectorizerOptions {
                weighting,
                max_tokens_per_value,
            },
        })
    }

    /// Check that the embedding store exists.
    /// Call this before any operation that vectorizes columns.
    pub fn require_embedding_store(&self) -> Result<()> {
        if !Path::new(&self.embedding_db).exists() {
            anyhow::bail!(
                "Embedding store not found at {}\n\
                 Run `tableunion init` and `tableunion load-embeddings <file>` first,\n\
                 or point TABLEUNION_EMBEDDING_DB at an existing store.",
                self.embedding_db
            );
        }
        Ok(())
    }
}

/// Default store location under the platform data directory, falling back to
/// the working directory when there isn't one.
pub fn default_embedding_db() -> String {
    dirs::data_dir()
        .map(|d| d.join("tableunion").join("fasttext.sqlite3"))
        .unwrap_or_else(|| PathBuf::from("./fasttext.sqlite3"))
        .display()
        .to_string()
}

fn parse_var<T>(name: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: Display,
{
    match env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => parse_value(name, &raw).map(Some),
        _ => Ok(None),
    }
}

fn parse_value<T>(name: &str, raw: &str) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| anyhow::anyhow!("{e}"))
        .with_context(|| format!("Invalid value {raw:?} for {name}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_value_accepts_padded_numbers() {
        let k: usize = parse_value("TABLEUNION_CANDIDATES_K", " 10 ").unwrap();
        assert_eq!(k, 10);
    }

    #[test]
    fn test_parse_value_reports_variable_name() {
        let err = parse_value::<f64>("TABLEUNION_MIN_SIMILARITY", "high").unwrap_err();
        assert!(format!("{err:#}").contains("TABLEUNION_MIN_SIMILARITY"));
    }

    #[test]
    fn test_parse_value_weighting() {
        let w: ValueWeighting = parse_value("TABLEUNION_VALUE_WEIGHTING", "frequency").unwrap();
        assert_eq!(w, ValueWeighting::Frequency);
    }

    #[test]
    fn test_default_embedding_db_is_sqlite_file() {
        assert!(default_embedding_db().ends_with("fasttext.sqlite3"));
    }
}
