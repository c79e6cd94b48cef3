// Column aligner: turns a similarity graph into a one-to-one column pairing.
//
// Runs maximum-weight bipartite matching over the graph's edges, optionally
// dropping edges under a similarity threshold first. Each aligned pair keeps
// the weight it had in the graph so callers can report or re-threshold
// without recomputing anything.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::graph::{ColumnNode, SimilarityGraph};
use super::matching::max_weight_matching;

/// One aligned column pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignedPair {
    /// Position of the query column in the query table.
    pub query_index: usize,
    pub query_column: String,
    /// Position of the candidate column in the candidate table.
    pub candidate_index: usize,
    pub candidate_column: String,
    /// Cosine similarity between the two column vectors.
    pub similarity: f64,
}

/// Result of aligning a query table with one candidate table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alignment {
    pub query_table: String,
    pub candidate_table: String,
    /// Aligned pairs, in query column order.
    pub pairs: Vec<AlignedPair>,
    /// Categorical query columns left without a partner.
    pub unmatched_query: Vec<String>,
    /// Categorical candidate columns left without a partner.
    pub unmatched_candidate: Vec<String>,
}

impl Alignment {
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Similarity of the weakest aligned pair: every aligned pair is at least
    /// this similar. `None` when nothing aligned.
    pub fn k_unionability(&self) -> Option<f64> {
        self.pairs.iter().map(|p| p.similarity).reduce(f64::min)
    }

    pub fn total_similarity(&self) -> f64 {
        self.pairs.iter().map(|p| p.similarity).sum()
    }

    pub fn mean_similarity(&self) -> Option<f64> {
        (!self.pairs.is_empty()).then(|| self.total_similarity() / self.pairs.len() as f64)
    }

    /// Query column position -> candidate column position.
    pub fn column_mapping(&self) -> BTreeMap<usize, usize> {
        self.pairs
            .iter()
            .map(|p| (p.query_index, p.candidate_index))
            .collect()
    }

    /// Look up the partner of a query column by name.
    pub fn partner_of(&self, query_column: &str) -> Option<&AlignedPair> {
        self.pairs.iter().find(|p| p.query_column == query_column)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColumnAligner {
    /// Edges strictly below this similarity are not matchable. `None` keeps
    /// every edge.
    pub min_similarity: Option<f64>,
}

impl ColumnAligner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_min_similarity(min_similarity: f64) -> Self {
        Self {
            min_similarity: Some(min_similarity),
        }
    }

    pub fn align(&self, graph: &SimilarityGraph) -> Alignment {
        let edges: Vec<(usize, usize, f64)> = graph
            .edges()
            .filter(|&(_, _, w)| self.min_similarity.is_none_or(|min| w >= min))
            .collect();

        let matched = max_weight_matching(graph.left.len(), graph.right.len(), &edges);

        let mut left_used = vec![false; graph.left.len()];
        let mut right_used = vec![false; graph.right.len()];
        let mut pairs = Vec::with_capacity(matched.len());

        for (l, r) in matched {
            let Some(similarity) = graph.weight(l, r) else {
                continue;
            };
            left_used[l] = true;
            right_used[r] = true;
            pairs.push(AlignedPair {
                query_index: graph.left[l].index,
                query_column: graph.left[l].name.clone(),
                candidate_index: graph.right[r].index,
                candidate_column: graph.right[r].name.clone(),
                similarity,
            });
        }

        let unmatched = |nodes: &[ColumnNode], used: &[bool]| {
            nodes
                .iter()
                .zip(used)
                .filter(|(_, &u)| !u)
                .map(|(n, _)| n.name.clone())
                .collect::<Vec<_>>()
        };

        let alignment = Alignment {
            query_table: graph.left_table.clone(),
            candidate_table: graph.right_table.clone(),
            unmatched_query: unmatched(&graph.left, &left_used),
            unmatched_candidate: unmatched(&graph.right, &right_used),
            pairs,
        };

        debug!(
            query_table = alignment.query_table.as_str(),
            candidate_table = alignment.candidate_table.as_str(),
            edges = edges.len(),
            aligned = alignment.len(),
            k_unionability = ?alignment.k_unionability(),
            "Aligned columns"
        );

        alignment
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alignment::graph::ColumnEmbedding;

    fn embedding(index: usize, name: &str, vector: Option<Vec<f64>>) -> ColumnEmbedding {
        ColumnEmbedding {
            index,
            name: name.to_string(),
            vector,
        }
    }

    #[test]
    fn test_empty_graph_gives_empty_alignment() {
        let graph = SimilarityGraph::empty("a", "b");
        let alignment = ColumnAligner::new().align(&graph);
        assert!(alignment.is_empty());
        assert!(alignment.k_unionability().is_none());
        assert!(alignment.mean_similarity().is_none());
    }

    #[test]
    fn test_threshold_drops_weak_edges() {
        let left = vec![
            embedding(0, "a", Some(vec![1.0, 0.0])),
            embedding(1, "b", Some(vec![0.0, 1.0])),
        ];
        let right = vec![
            embedding(0, "x", Some(vec![1.0, 0.1])),
            embedding(1, "y", Some(vec![0.3, 1.0])),
        ];
        let graph = SimilarityGraph::from_embeddings("q", "c", &left, &right);

        let all = ColumnAligner::new().align(&graph);
        assert_eq!(all.len(), 2);

        let strict = ColumnAligner::with_min_similarity(0.99).align(&graph);
        assert_eq!(strict.len(), 1);
        assert_eq!(strict.pairs[0].query_column, "a");
        assert_eq!(strict.unmatched_query, vec!["b".to_string()]);
        assert_eq!(strict.unmatched_candidate, vec!["y".to_string()]);
    }

    #[test]
    fn test_pairs_carry_graph_weights_and_table_positions() {
        let left = vec![embedding(3, "a", Some(vec![1.0, 2.0]))];
        let right = vec![
            embedding(0, "x", None),
            embedding(5, "y", Some(vec![2.0, 1.0])),
        ];
        let graph = SimilarityGraph::from_embeddings("q", "c", &left, &right);
        let alignment = ColumnAligner::new().align(&graph);
        assert_eq!(alignment.len(), 1);
        let pair = &alignment.pairs[0];
        assert_eq!(pair.query_index, 3);
        assert_eq!(pair.candidate_index, 5);
        assert_eq!(Some(pair.similarity), graph.weight_by_name("a", "y"));
        assert_eq!(alignment.column_mapping().get(&3), Some(&5));
        assert_eq!(alignment.unmatched_candidate, vec!["x".to_string()]);
    }

    #[test]
    fn test_k_unionability_is_weakest_pair() {
        let alignment = Alignment {
            query_table: "q".to_string(),
            candidate_table: "c".to_string(),
            pairs: vec![
                AlignedPair {
                    query_index: 0,
                    query_column: "a".to_string(),
                    candidate_index: 0,
                    candidate_column: "x".to_string(),
                    similarity: 0.9,
                },
                AlignedPair {
                    query_index: 1,
                    query_column: "b".to_string(),
                    candidate_index: 1,
                    candidate_column: "y".to_string(),
                    similarity: 0.6,
                },
            ],
            unmatched_query: vec![],
            unmatched_candidate: vec![],
        };
        assert_eq!(alignment.k_unionability(), Some(0.6));
        assert!((alignment.mean_similarity().unwrap() - 0.75).abs() < 1e-12);
    }
}
