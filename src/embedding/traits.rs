// Token embedding store trait: the seam between the core and its word vectors.
//
// The core never owns the store. It is injected read-only, so one store can be
// shared by any number of concurrent comparisons.

use std::collections::HashMap;

use crate::error::AlignResult;

/// Read-only map from exact token to a fixed-dimension vector.
pub trait TokenEmbeddingStore: Send + Sync {
    /// Resolve a batch of tokens. Tokens the store does not know are simply
    /// absent from the returned map; a store failure is an error.
    fn lookup(&self, tokens: &[String]) -> AlignResult<HashMap<String, Vec<f64>>>;
}

/// Store backed by a HashMap. Used for tests and for small fixed vocabularies.
#[derive(Debug, Clone, Default)]
pub struct InMemoryEmbeddingStore {
    vectors: HashMap<String, Vec<f64>>,
}

impl InMemoryEmbeddingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, token: impl Into<String>, vec: Vec<f64>) {
        self.vectors.insert(token.into(), vec);
    }

    pub fn with(mut self, token: impl Into<String>, vec: Vec<f64>) -> Self {
        self.insert(token, vec);
        self
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }
}

impl TokenEmbeddingStore for InMemoryEmbeddingStore {
    fn lookup(&self, tokens: &[String]) -> AlignResult<HashMap<String, Vec<f64>>> {
        Ok(tokens
            .iter()
            .filter_map(|t| self.vectors.get(t).map(|v| (t.clone(), v.clone())))
            .collect())
    }
}
