// Compare pipeline: align one query table against a list of candidate tables.
//
// The query's column vectors are computed once and reused for every
// candidate. A candidate that can't be loaded or vectorized is logged and
// skipped; one bad table never sinks the whole comparison.

use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use crate::alignment::{
    Alignment, ColumnAligner, ColumnEmbedding, ColumnVectorizer, GraphBuilder, VectorizerOptions,
};
use crate::embedding::TokenEmbeddingStore;
use crate::error::AlignResult;
use crate::table::{Table, TableProvider};

/// Align `query` with every table in `candidate_ids`.
///
/// Returns alignments ranked by number of aligned pairs, then by total
/// similarity. Ties keep candidate order. Fails only if the query itself
/// can't be vectorized.
pub fn compare(
    store: &dyn TokenEmbeddingStore,
    provider: &dyn TableProvider,
    options: &VectorizerOptions,
    aligner: &ColumnAligner,
    query: &Table,
    candidate_ids: &[String],
) -> AlignResult<Vec<Alignment>> {
    let builder = GraphBuilder::new(ColumnVectorizer::with_options(store, options.clone()));
    let query_embeddings = builder.column_embeddings(query)?;
    Ok(compare_with_embeddings(
        &builder,
        provider,
        aligner,
        query,
        &query_embeddings,
        candidate_ids,
    ))
}

/// Same as [`compare`], with the query's column vectors already computed.
pub fn compare_with_embeddings(
    builder: &GraphBuilder<'_>,
    provider: &dyn TableProvider,
    aligner: &ColumnAligner,
    query: &Table,
    query_embeddings: &[ColumnEmbedding],
    candidate_ids: &[String],
) -> Vec<Alignment> {
    let pb = ProgressBar::new(candidate_ids.len() as u64);
    if let Ok(style) =
        ProgressStyle::default_bar().template("  Aligning [{bar:30}] {pos}/{len} ({eta})")
    {
        pb.set_style(style);
    }

    let mut alignments = Vec::with_capacity(candidate_ids.len());
    let mut skipped = 0;

    for id in candidate_ids {
        let result = provider
            .get_table(id)
            .and_then(|candidate| builder.build_with_query(query, query_embeddings, &candidate))
            .map(|graph| aligner.align(&graph));

        match result {
            Ok(alignment) => alignments.push(alignment),
            Err(e) => {
                warn!(candidate = id.as_str(), error = %e, "Failed to align candidate, skipping");
                skipped += 1;
            }
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    rank(&mut alignments);

    info!(
        query_table = query.id.as_str(),
        candidates = candidate_ids.len(),
        aligned = alignments.len(),
        skipped,
        "Comparison complete"
    );

    alignments
}

/// Most aligned pairs first, then highest total similarity.
pub fn rank(alignments: &mut [Alignment]) {
    alignments.sort_by(|a, b| {
        b.len()
            .cmp(&a.len())
            .then_with(|| b.total_similarity().total_cmp(&a.total_similarity()))
    });
}
