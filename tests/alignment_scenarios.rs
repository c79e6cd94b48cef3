// Alignment tests: end-to-end behavior of vectorize -> graph -> match.
//
// Everything runs against an in-memory embedding store; no database, network
// or filesystem access.

use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tableunion::alignment::matching::max_weight_matching;
use tableunion::alignment::similarity::cosine;
use tableunion::alignment::{
    align_tables, ColumnAligner, ColumnEmbedding, ColumnVectorizer, GraphBuilder, SimilarityGraph,
    VectorizerOptions,
};
use tableunion::embedding::InMemoryEmbeddingStore;
use tableunion::table::{Column, Table};

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

fn geo_store() -> InMemoryEmbeddingStore {
    InMemoryEmbeddingStore::new()
        .with("usa", vec![0.31, -0.12, 0.88, 0.05])
        .with("canada", vec![0.27, 0.41, 0.63, -0.22])
        .with("mexico", vec![0.19, 0.07, 0.71, 0.33])
        .with("red", vec![-0.5, 0.9, 0.1, 0.0])
        .with("green", vec![-0.4, 0.8, -0.2, 0.3])
        .with("new", vec![0.02, 0.02, 0.1, 0.9])
        .with("york", vec![0.11, -0.3, 0.2, 0.7])
}

// ============================================================
// Reference scenarios
// ============================================================

#[test]
fn country_aligns_with_nation_and_codes_have_no_edges() {
    let store = geo_store();
    let a = Table::new(
        "a",
        vec![
            Column::categorical("country", strings(&["USA", "Canada"])),
            Column::categorical("code", strings(&["1", "2"])),
        ],
    );
    let b = Table::new(
        "b",
        vec![
            Column::categorical("nation", strings(&["USA", "Canada"])),
            Column::categorical("id", strings(&["1", "2"])),
        ],
    );

    let (graph, alignment) = align_tables(
        &store,
        &VectorizerOptions::default(),
        &ColumnAligner::new(),
        &a,
        &b,
    )
    .unwrap();

    let w = graph
        .weight_by_name("country", "nation")
        .expect("country/nation edge should exist");
    assert!((w - 1.0).abs() < 1e-9, "identical columns, got {w}");

    assert_eq!(graph.edge_count(), 1, "code and id have no vectors");
    assert!(graph.weight_by_name("code", "id").is_none());
    assert!(graph.weight_by_name("country", "id").is_none());
    assert!(graph.weight_by_name("code", "nation").is_none());

    assert_eq!(alignment.len(), 1);
    assert_eq!(alignment.pairs[0].query_column, "country");
    assert_eq!(alignment.pairs[0].candidate_column, "nation");
    assert_eq!(alignment.unmatched_query, vec!["code".to_string()]);
    assert_eq!(alignment.unmatched_candidate, vec!["id".to_string()]);
}

#[test]
fn weight_aware_matching_beats_first_near_match() {
    // a0-b0 is the true match (0.9). a1 nearly matches b0 (0.85) but pairs
    // with b1 at 0.95. Everything else is dissimilar.
    let edges = vec![
        (0, 0, 0.9),
        (0, 1, 0.1),
        (0, 2, 0.05),
        (1, 0, 0.85),
        (1, 1, 0.95),
        (1, 2, 0.02),
        (2, 0, 0.03),
        (2, 1, 0.04),
        (2, 2, 0.1),
    ];
    let matched = max_weight_matching(3, 3, &edges);
    assert!(matched.contains(&(0, 0)), "true match lost: {matched:?}");
    assert!(matched.contains(&(1, 1)), "0.95 pair lost: {matched:?}");
    assert!(!matched.contains(&(1, 0)), "near-match won: {matched:?}");
}

#[test]
fn weight_aware_matching_through_the_aligner() {
    // Cosines: (a0,b0) = 0.9, (a1,b0) = 0.85, (a1,b1) = 1.0. Pairing a1 with
    // its near-match b0 would strand a0 with the weaker b1.
    let s = |c: f64| (1.0 - c * c).sqrt();
    let left = vec![
        ColumnEmbedding {
            index: 0,
            name: "a0".to_string(),
            vector: Some(vec![0.9, s(0.9), 0.0]),
        },
        ColumnEmbedding {
            index: 1,
            name: "a1".to_string(),
            vector: Some(vec![0.85, 0.0, s(0.85)]),
        },
    ];
    let right = vec![
        ColumnEmbedding {
            index: 0,
            name: "b0".to_string(),
            vector: Some(vec![1.0, 0.0, 0.0]),
        },
        ColumnEmbedding {
            index: 1,
            name: "b1".to_string(),
            vector: Some(vec![0.85, 0.0, s(0.85)]),
        },
    ];
    let graph = SimilarityGraph::from_embeddings("a", "b", &left, &right);
    let alignment = ColumnAligner::new().align(&graph);

    assert_eq!(alignment.len(), 2);
    assert_eq!(alignment.partner_of("a0").unwrap().candidate_column, "b0");
    assert_eq!(alignment.partner_of("a1").unwrap().candidate_column, "b1");
}

#[test]
fn self_comparison_is_empty() {
    let store = geo_store();
    let a = Table::new(
        "same",
        vec![Column::categorical("country", strings(&["USA", "Canada"]))],
    );
    let (graph, alignment) = align_tables(
        &store,
        &VectorizerOptions::default(),
        &ColumnAligner::new(),
        &a,
        &a.clone(),
    )
    .unwrap();
    assert!(graph.left.is_empty() && graph.right.is_empty());
    assert!(alignment.is_empty());
    assert!(alignment.k_unionability().is_none());
}

#[test]
fn unresolvable_column_is_absent_and_has_no_edges() {
    let store = geo_store();
    let vectorizer = ColumnVectorizer::new(&store);
    assert!(vectorizer
        .vectorize(&strings(&["qwxz", "", "  "]))
        .unwrap()
        .is_none());

    let builder = GraphBuilder::new(ColumnVectorizer::new(&store));
    let a = Table::new(
        "a",
        vec![Column::categorical("junk", strings(&["qwxz", "zzkq"]))],
    );
    let b = Table::new(
        "b",
        vec![Column::categorical("nation", strings(&["USA"]))],
    );
    let graph = builder.build(&a, &b).unwrap();
    assert_eq!(graph.left.len(), 1, "the column is still a node");
    assert_eq!(graph.edge_count(), 0);
}

// ============================================================
// Properties
// ============================================================

#[test]
fn vectorize_is_permutation_invariant() {
    let store = geo_store();
    let vectorizer = ColumnVectorizer::new(&store);
    let values = strings(&["USA", "New York", "Canada", "red", "Mexico", "green"]);

    let forward = vectorizer.vectorize(&values).unwrap().unwrap();

    let mut reversed = values.clone();
    reversed.reverse();
    let backward = vectorizer.vectorize(&reversed).unwrap().unwrap();

    let mut rotated = values.clone();
    rotated.rotate_left(2);
    let shifted = vectorizer.vectorize(&rotated).unwrap().unwrap();

    for ((f, b), s) in forward.iter().zip(&backward).zip(&shifted) {
        assert!((f - b).abs() < 1e-12, "{f} vs {b}");
        assert!((f - s).abs() < 1e-12, "{f} vs {s}");
    }
}

#[test]
fn cosine_is_symmetric_and_self_is_one() {
    let vectors = [
        vec![0.31, -0.12, 0.88, 0.05],
        vec![-0.5, 0.9, 0.1, 0.0],
        vec![1e-8, 3e-8, -2e-8, 0.0],
        vec![1234.5, -0.001, 77.0, 9.0],
    ];
    for u in &vectors {
        let uu = cosine(u, u).unwrap();
        assert!((uu - 1.0).abs() < 1e-12, "cosine(u, u) = {uu}");
        for v in &vectors {
            let uv = cosine(u, v).unwrap();
            let vu = cosine(v, u).unwrap();
            assert!((uv - vu).abs() < 1e-15);
            assert!((-1.0..=1.0).contains(&uv));
        }
    }
}

fn random_vector(rng: &mut StdRng) -> Vec<f64> {
    (0..6).map(|_| rng.gen_range(-0.5..0.5)).collect()
}

#[test]
fn aligner_output_is_a_matching_with_graph_weights() {
    let mut rng = StdRng::seed_from_u64(7);

    for round in 0..25 {
        let n_left = 1 + round % 5;
        let n_right = 1 + (round * 7) % 6;
        let mut embed = |n: usize, prefix: &str| -> Vec<ColumnEmbedding> {
            (0..n)
                .map(|i| ColumnEmbedding {
                    index: i,
                    name: format!("{prefix}{i}"),
                    // every fourth column has no vector
                    vector: (i % 4 != 3).then(|| random_vector(&mut rng)),
                })
                .collect()
        };
        let left = embed(n_left, "l");
        let right = embed(n_right, "r");
        let graph = SimilarityGraph::from_embeddings("a", "b", &left, &right);
        let alignment = ColumnAligner::new().align(&graph);

        let mut seen_q = HashSet::new();
        let mut seen_c = HashSet::new();
        for pair in &alignment.pairs {
            assert!(seen_q.insert(pair.query_index), "query column reused");
            assert!(
                seen_c.insert(pair.candidate_index),
                "candidate column reused"
            );
            let w = graph
                .weight_by_name(&pair.query_column, &pair.candidate_column)
                .expect("matched pair must be an edge");
            assert_eq!(w, pair.similarity);
        }

        let with_vec = |e: &[ColumnEmbedding]| e.iter().filter(|c| c.vector.is_some()).count();
        assert_eq!(
            alignment.len(),
            with_vec(left.as_slice()).min(with_vec(right.as_slice())),
            "complete graph between vectorized columns gives a perfect matching"
        );
    }
}

#[test]
fn threshold_never_matches_below_min_similarity() {
    let store = geo_store();
    let a = Table::new(
        "a",
        vec![
            Column::categorical("country", strings(&["USA", "Canada"])),
            Column::categorical("color", strings(&["red"])),
        ],
    );
    let b = Table::new(
        "b",
        vec![
            Column::categorical("nation", strings(&["Mexico", "USA"])),
            Column::categorical("city", strings(&["New York"])),
        ],
    );
    let aligner = ColumnAligner::with_min_similarity(0.9);
    let (_graph, alignment) =
        align_tables(&store, &VectorizerOptions::default(), &aligner, &a, &b).unwrap();
    for pair in &alignment.pairs {
        assert!(
            pair.similarity >= 0.9,
            "{} below threshold",
            pair.similarity
        );
    }
    assert!(alignment.partner_of("country").is_some());
}
