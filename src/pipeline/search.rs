// Search pipeline: ask the retrieval index for candidates, then align them.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::runtime::{Handle, RuntimeFlavor};
use tracing::{info, warn};

use super::compare::compare_with_embeddings;
use crate::alignment::{Alignment, ColumnAligner, ColumnVectorizer, GraphBuilder, VectorizerOptions};
use crate::embedding::TokenEmbeddingStore;
use crate::error::AlignResult;
use crate::retrieval::{self, CandidateRetriever};
use crate::table::{Table, TableProvider};

#[derive(Debug, Clone)]
pub struct SearchOptions {
    /// Results requested per retrieval call.
    pub k: usize,
    /// Use the whole-table endpoint instead of one request per column.
    pub whole_table: bool,
    /// Columns a candidate must align for the whole-table endpoint. Defaults
    /// to the number of query columns that have a vector.
    pub n: Option<usize>,
    /// Per-column requests in flight at once.
    pub concurrency: usize,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            k: crate::config::DEFAULT_CANDIDATES_K,
            whole_table: false,
            n: None,
            concurrency: 4,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchReport {
    pub query_table: String,
    pub generated_at: DateTime<Utc>,
    /// Candidate IDs as returned by the index, minus the query itself.
    pub candidates: Vec<String>,
    /// Ranked alignments for the candidates that could be aligned.
    pub alignments: Vec<Alignment>,
}

/// Retrieve candidates for `query` and align each one.
///
/// Retrieval failures are errors. Individual candidates that fail to load
/// are skipped, as in [`compare`](super::compare::compare). A candidate ID
/// that resolves to the query's own file is dropped before alignment.
pub async fn search(
    store: &dyn TokenEmbeddingStore,
    provider: &dyn TableProvider,
    retriever: &dyn CandidateRetriever,
    vectorizer: &VectorizerOptions,
    aligner: &ColumnAligner,
    query: &Table,
    options: &SearchOptions,
) -> AlignResult<SearchReport> {
    let builder = GraphBuilder::new(ColumnVectorizer::with_options(store, vectorizer.clone()));
    let query_embeddings = run_blocking(|| builder.column_embeddings(query))?;

    let vectors: Vec<Vec<f64>> = query_embeddings
        .iter()
        .filter_map(|c| c.vector.clone())
        .collect();

    if vectors.is_empty() {
        warn!(
            query_table = query.id.as_str(),
            "No query column has a vector, nothing to search for"
        );
        return Ok(SearchReport {
            query_table: query.id.clone(),
            generated_at: Utc::now(),
            candidates: Vec::new(),
            alignments: Vec::new(),
        });
    }

    let mut candidates = if options.whole_table {
        let n = options.n.unwrap_or(vectors.len());
        retriever.query_table(&vectors, options.k, n).await?
    } else {
        retrieval::retrieve_candidates(
            retriever,
            &query_embeddings,
            options.k,
            options.concurrency,
        )
        .await?
    };
    candidates.retain(|id| !provider.refers_to(id, query));

    info!(
        query_table = query.id.as_str(),
        candidates = candidates.len(),
        "Candidates retrieved"
    );

    let alignments = run_blocking(|| {
        compare_with_embeddings(
            &builder,
            provider,
            aligner,
            query,
            &query_embeddings,
            &candidates,
        )
    });

    Ok(SearchReport {
        query_table: query.id.clone(),
        generated_at: Utc::now(),
        candidates,
        alignments,
    })
}

/// Run synchronous store and file work without stalling other tasks on a
/// multi-threaded runtime. On a current-thread runtime it runs inline.
fn run_blocking<T>(f: impl FnOnce() -> T) -> T {
    match Handle::try_current() {
        Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
            tokio::task::block_in_place(f)
        }
        _ => f(),
    }
}
