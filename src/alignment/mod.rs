// Column alignment: vectorize columns, build the similarity graph, match.
//
// Data flow for one table pair:
//   cells -> tokenize -> ColumnVectorizer -> GraphBuilder -> ColumnAligner
// Everything here is synchronous and request-scoped; the only I/O is the
// embedding store lookup behind the TokenEmbeddingStore trait.

pub mod aligner;
pub mod expansion;
pub mod graph;
pub mod matching;
pub mod similarity;
pub mod tokenize;
pub mod vectorizer;

pub use aligner::{AlignedPair, Alignment, ColumnAligner};
pub use graph::{ColumnEmbedding, GraphBuilder, SimilarityGraph};
pub use vectorizer::{ColumnVectorizer, ValueWeighting, VectorizerOptions};

use crate::embedding::TokenEmbeddingStore;
use crate::error::AlignResult;
use crate::table::Table;

/// Align two tables end to end: build their similarity graph and match it.
pub fn align_tables(
    store: &dyn TokenEmbeddingStore,
    options: &VectorizerOptions,
    aligner: &ColumnAligner,
    query: &Table,
    candidate: &Table,
) -> AlignResult<(SimilarityGraph, Alignment)> {
    let builder = GraphBuilder::new(ColumnVectorizer::with_options(store, options.clone()));
    let graph = builder.build(query, candidate)?;
    let alignment = aligner.align(&graph);
    Ok((graph, alignment))
}
