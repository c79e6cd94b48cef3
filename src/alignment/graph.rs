// Similarity graph: categorical columns of two tables, weighted by cosine.
//
// Left nodes are the query table's categorical columns, right nodes the
// candidate's, both in table order. An edge exists only where both column
// vectors exist and their cosine is defined. Numeric columns never become
// nodes.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use super::similarity::cosine;
use super::vectorizer::ColumnVectorizer;
use crate::error::AlignResult;
use crate::table::Table;

/// A categorical column and its vector (`None` when nothing resolved).
#[derive(Debug, Clone, Serialize)]
pub struct ColumnEmbedding {
    /// Position of the column in its table.
    pub index: usize,
    pub name: String,
    pub vector: Option<Vec<f64>>,
}

/// One side of the graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnNode {
    /// Position of the column in its table.
    pub index: usize,
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct SimilarityGraph {
    pub left_table: String,
    pub right_table: String,
    pub left: Vec<ColumnNode>,
    pub right: Vec<ColumnNode>,
    /// Keyed by (position in `left`, position in `right`).
    weights: BTreeMap<(usize, usize), f64>,
}

impl SimilarityGraph {
    /// A graph with no nodes.
    pub fn empty(left_table: &str, right_table: &str) -> Self {
        Self {
            left_table: left_table.to_string(),
            right_table: right_table.to_string(),
            left: Vec::new(),
            right: Vec::new(),
            weights: BTreeMap::new(),
        }
    }

    /// Build the complete bipartite graph from precomputed column vectors.
    pub fn from_embeddings(
        left_table: &str,
        right_table: &str,
        left: &[ColumnEmbedding],
        right: &[ColumnEmbedding],
    ) -> Self {
        let mut weights = BTreeMap::new();
        for (li, l) in left.iter().enumerate() {
            let Some(lv) = l.vector.as_deref() else {
                continue;
            };
            for (ri, r) in right.iter().enumerate() {
                let Some(rv) = r.vector.as_deref() else {
                    continue;
                };
                if let Some(w) = cosine(lv, rv) {
                    weights.insert((li, ri), w);
                }
            }
        }

        let node = |e: &ColumnEmbedding| ColumnNode {
            index: e.index,
            name: e.name.clone(),
        };

        Self {
            left_table: left_table.to_string(),
            right_table: right_table.to_string(),
            left: left.iter().map(node).collect(),
            right: right.iter().map(node).collect(),
            weights,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.left.is_empty() && self.right.is_empty()
    }

    pub fn edge_count(&self) -> usize {
        self.weights.len()
    }

    /// Weight between the `l`-th left node and the `r`-th right node.
    pub fn weight(&self, l: usize, r: usize) -> Option<f64> {
        self.weights.get(&(l, r)).copied()
    }

    /// Weight between two columns by name.
    pub fn weight_by_name(&self, left: &str, right: &str) -> Option<f64> {
        let l = self.left.iter().position(|n| n.name == left)?;
        let r = self.right.iter().position(|n| n.name == right)?;
        self.weight(l, r)
    }

    /// All edges as (left position, right position, weight), ordered by left
    /// then right position.
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        self.weights.iter().map(|(&(l, r), &w)| (l, r, w))
    }
}

/// Builds similarity graphs, vectorizing each column once per call.
pub struct GraphBuilder<'a> {
    vectorizer: ColumnVectorizer<'a>,
}

impl<'a> GraphBuilder<'a> {
    pub fn new(vectorizer: ColumnVectorizer<'a>) -> Self {
        Self { vectorizer }
    }

    /// Vectors for every categorical column of a table, in table order.
    pub fn column_embeddings(&self, table: &Table) -> AlignResult<Vec<ColumnEmbedding>> {
        table
            .categorical_columns()
            .map(|(index, column)| {
                let vector = self.vectorizer.vectorize(&column.values)?;
                if vector.is_none() {
                    debug!(
                        table = table.id.as_str(),
                        column = column.name.as_str(),
                        "No resolvable values, column has no vector"
                    );
                }
                Ok(ColumnEmbedding {
                    index,
                    name: column.name.clone(),
                    vector,
                })
            })
            .collect()
    }

    /// Build the similarity graph between two tables. Comparing a table with
    /// itself yields an empty graph.
    pub fn build(&self, a: &Table, b: &Table) -> AlignResult<SimilarityGraph> {
        if a.is_same_table(b) {
            debug!(table = a.id.as_str(), "Self-comparison, empty graph");
            return Ok(SimilarityGraph::empty(&a.id, &b.id));
        }

        let left = self.column_embeddings(a)?;
        let right = self.column_embeddings(b)?;
        let graph = SimilarityGraph::from_embeddings(&a.id, &b.id, &left, &right);

        debug!(
            left_table = a.id.as_str(),
            right_table = b.id.as_str(),
            left_nodes = graph.left.len(),
            right_nodes = graph.right.len(),
            edges = graph.edge_count(),
            "Built similarity graph"
        );

        Ok(graph)
    }

    /// Build against a query whose vectors were already computed. Used when
    /// one query is compared with many candidates in a single request.
    pub fn build_with_query(
        &self,
        query: &Table,
        query_embeddings: &[ColumnEmbedding],
        candidate: &Table,
    ) -> AlignResult<SimilarityGraph> {
        if query.is_same_table(candidate) {
            return Ok(SimilarityGraph::empty(&query.id, &candidate.id));
        }
        let right = self.column_embeddings(candidate)?;
        Ok(SimilarityGraph::from_embeddings(
            &query.id,
            &candidate.id,
            query_embeddings,
            &right,
        ))
    }
}
