// Error taxonomy for the alignment core.
//
// Only failures the caller has to act on live here. "No vector" and "no edge"
// are ordinary outcomes and are modeled with Option / missing map entries, and
// degenerate inputs (self-comparison, empty column sets) produce empty results.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AlignError {
    /// The token embedding store could not answer a lookup.
    #[error("Embedding store error: {0}")]
    Resolution(String),

    /// The store returned vectors of different lengths for one column.
    #[error("Embedding dimension mismatch: expected {expected}, got {found} for token {token:?}")]
    DimensionMismatch {
        expected: usize,
        found: usize,
        token: String,
    },

    /// The candidate retrieval service timed out, failed, or answered badly.
    #[error("Candidate retrieval failed: {0}")]
    Retrieval(String),

    /// The table provider could not supply a table.
    #[error("Table {id} unavailable: {reason}")]
    Table { id: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<rusqlite::Error> for AlignError {
    fn from(e: rusqlite::Error) -> Self {
        AlignError::Resolution(e.to_string())
    }
}

impl From<reqwest::Error> for AlignError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            AlignError::Retrieval(format!("request timed out: {e}"))
        } else {
            AlignError::Retrieval(e.to_string())
        }
    }
}

pub type AlignResult<T> = std::result::Result<T, AlignError>;
