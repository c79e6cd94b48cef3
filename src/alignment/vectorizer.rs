// Column vectorizer: one aggregate embedding per categorical column.
//
// Each distinct value is tokenized, its resolvable token vectors are summed
// into a value vector, and the value vectors are summed into the column
// vector. Values are visited in first-seen order and tokens in cell order, so
// a given column always sums in the same order.
//
// A column where nothing resolves has no vector at all (None). That is not
// the same thing as a zero vector and callers must not treat it as one.

use std::collections::{HashMap, HashSet};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::tokenize::tokenize;
use crate::embedding::TokenEmbeddingStore;
use crate::error::{AlignError, AlignResult};

/// How often a distinct value counts toward the column vector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueWeighting {
    /// Every distinct value counts once.
    #[default]
    Distinct,
    /// Every distinct value counts as many times as it occurs.
    Frequency,
}

impl FromStr for ValueWeighting {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "distinct" => Ok(ValueWeighting::Distinct),
            "frequency" => Ok(ValueWeighting::Frequency),
            other => Err(format!(
                "unknown value weighting {other:?} (expected \"distinct\" or \"frequency\")"
            )),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VectorizerOptions {
    pub weighting: ValueWeighting,
    /// Values with more tokens than this are prose, not domain values, and
    /// are skipped. `None` keeps every value.
    pub max_tokens_per_value: Option<usize>,
}

/// A distinct column value with its tokens and occurrence count.
struct DistinctValue {
    tokens: Vec<String>,
    count: usize,
}

/// Turns raw cells into a column vector using an injected embedding store.
pub struct ColumnVectorizer<'a> {
    store: &'a dyn TokenEmbeddingStore,
    options: VectorizerOptions,
}

impl<'a> ColumnVectorizer<'a> {
    pub fn new(store: &'a dyn TokenEmbeddingStore) -> Self {
        Self::with_options(store, VectorizerOptions::default())
    }

    pub fn with_options(store: &'a dyn TokenEmbeddingStore, options: VectorizerOptions) -> Self {
        Self { store, options }
    }

    pub fn options(&self) -> &VectorizerOptions {
        &self.options
    }

    /// Compute the column vector for a column's cells.
    ///
    /// Returns `Ok(None)` when no value resolved to any token vector. A store
    /// failure is returned as an error, never read as "no tokens".
    pub fn vectorize(&self, values: &[String]) -> AlignResult<Option<Vec<f64>>> {
        let distinct = self.distinct_values(values);
        if distinct.is_empty() {
            return Ok(None);
        }

        let mut seen = HashSet::new();
        let lookup: Vec<String> = distinct
            .iter()
            .flat_map(|v| v.tokens.iter())
            .filter(|t| seen.insert(t.as_str()))
            .cloned()
            .collect();
        let embeddings = self.store.lookup(&lookup)?;

        let mut column: Option<Vec<f64>> = None;
        let mut contributing = 0usize;
        for value in &distinct {
            let Some(mut value_vec) = value_vector(&value.tokens, &embeddings)? else {
                continue;
            };
            if self.options.weighting == ValueWeighting::Frequency && value.count > 1 {
                let factor = value.count as f64;
                value_vec.iter_mut().for_each(|x| *x *= factor);
            }
            match column.as_mut() {
                None => column = Some(value_vec),
                Some(sum) => add_into(sum, &value_vec, value.tokens.first())?,
            }
            contributing += 1;
        }

        debug!(
            distinct_values = distinct.len(),
            contributing_values = contributing,
            tokens = lookup.len(),
            resolved = embeddings.len(),
            "Vectorized column"
        );

        Ok(column)
    }

    /// Distinct non-empty values in first-seen order, tokenized.
    fn distinct_values(&self, values: &[String]) -> Vec<DistinctValue> {
        let mut index: HashMap<String, usize> = HashMap::new();
        let mut distinct: Vec<DistinctValue> = Vec::new();

        for raw in values {
            let tokens = tokenize(raw);
            if tokens.is_empty() {
                continue;
            }
            // cells that differ only in case, punctuation or spacing are one value
            let key = tokens.join(" ");
            if let Some(&i) = index.get(&key) {
                distinct[i].count += 1;
                continue;
            }
            index.insert(key, distinct.len());
            distinct.push(DistinctValue { tokens, count: 1 });
        }

        distinct.retain(|v| {
            self.options
                .max_tokens_per_value
                .is_none_or(|max| v.tokens.len() <= max)
        });
        distinct
    }
}

/// Sum the vectors of a value's resolvable tokens, `None` if none resolve.
fn value_vector(
    tokens: &[String],
    embeddings: &HashMap<String, Vec<f64>>,
) -> AlignResult<Option<Vec<f64>>> {
    let mut sum: Option<Vec<f64>> = None;
    for token in tokens {
        let Some(vec) = embeddings.get(token) else {
            continue;
        };
        match sum.as_mut() {
            None => sum = Some(vec.clone()),
            Some(s) => add_into(s, vec, Some(token))?,
        }
    }
    Ok(sum)
}

/// Componentwise `dst += src`.
fn add_into(dst: &mut [f64], src: &[f64], token: Option<&String>) -> AlignResult<()> {
    if dst.len() != src.len() {
        return Err(AlignError::DimensionMismatch {
            expected: dst.len(),
            found: src.len(),
            token: token.cloned().unwrap_or_default(),
        });
    }
    for (d, s) in dst.iter_mut().zip(src) {
        *d += s;
    }
    Ok(())
}
