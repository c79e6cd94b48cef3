// Candidate retrieval: asks the nearest-neighbor index which tables are worth
// aligning with a query table.
//
// The core only consumes the ranked table IDs. Requests carry a bounded
// timeout; a timeout or non-success answer fails the retrieval instead of
// looking like an empty candidate list.

pub mod client;

pub use client::{CandidateRetriever, ColumnMatch, IndexClient};

use std::collections::HashSet;

use futures::stream::{self, StreamExt, TryStreamExt};
use tracing::debug;

use crate::alignment::ColumnEmbedding;
use crate::error::AlignResult;

/// Query the index once per query column that has a vector and merge the
/// ranked table IDs.
///
/// Results are merged in query column order, then rank order, keeping the
/// first occurrence of each table. Up to `concurrency` requests are in flight
/// at once; the merge order does not depend on which finishes first.
pub async fn retrieve_candidates(
    retriever: &dyn CandidateRetriever,
    query_columns: &[ColumnEmbedding],
    k: usize,
    concurrency: usize,
) -> AlignResult<Vec<String>> {
    let vectors: Vec<&[f64]> = query_columns
        .iter()
        .filter_map(|c| c.vector.as_deref())
        .collect();

    let per_column: Vec<Vec<ColumnMatch>> = stream::iter(vectors)
        .map(|vec| retriever.query_column(vec, k))
        .buffered(concurrency.max(1))
        .try_collect()
        .await?;

    let mut seen = HashSet::new();
    let candidates: Vec<String> = per_column
        .into_iter()
        .flatten()
        .filter(|m| seen.insert(m.table_id.clone()))
        .map(|m| m.table_id)
        .collect();

    debug!(
        query_columns = query_columns.len(),
        candidates = candidates.len(),
        "Candidate retrieval complete"
    );

    Ok(candidates)
}
