// HTTP client for the candidate retrieval index.
//
// The index answers nearest-neighbor queries over stored column vectors:
// POST {base}/query with one column vector returns the closest columns and the
// tables they belong to. A whole-table form takes every query column vector at
// once and returns ranked table unions.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{AlignError, AlignResult};

/// Single-column request body.
#[derive(Debug, Clone, Serialize)]
pub struct ColumnQueryRequest<'a> {
    pub vec: &'a [f64],
    pub k: usize,
}

/// Whole-table request body: one vector per query column.
#[derive(Debug, Clone, Serialize)]
pub struct TableQueryRequest<'a> {
    #[serde(rename = "table")]
    pub vecs: &'a [Vec<f64>],
    pub k: usize,
    pub n: usize,
}

/// A column the index considers close to the query column.
#[derive(Debug, Clone, Deserialize)]
pub struct ColumnMatch {
    pub table_id: String,
    #[serde(default)]
    pub column_index: Option<usize>,
    #[serde(default)]
    pub vec: Option<Vec<f64>>,
}

/// Response from the single-column endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ColumnQueryResponse {
    pub result: Vec<ColumnMatch>,
}

/// Candidate summary inside a whole-table response.
#[derive(Debug, Clone, Deserialize)]
pub struct UnionSummary {
    #[serde(rename = "CandTableID")]
    pub candidate_table: String,
    #[serde(rename = "Kunioability", default)]
    pub k_unionability: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TableQueryResult {
    pub union: UnionSummary,
}

/// Response from the whole-table endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct TableQueryResponse {
    pub result: Vec<TableQueryResult>,
}

/// Source of candidate tables. Implementations must treat any non-success
/// answer as an error, never as "no candidates".
#[async_trait]
pub trait CandidateRetriever: Send + Sync {
    /// Nearest columns to one query column vector, best first.
    async fn query_column(&self, vec: &[f64], k: usize) -> AlignResult<Vec<ColumnMatch>>;

    /// Ranked candidate table IDs for a whole query table.
    async fn query_table(&self, vecs: &[Vec<f64>], k: usize, n: usize) -> AlignResult<Vec<String>>;
}

/// Client for the retrieval index service.
pub struct IndexClient {
    client: reqwest::Client,
    base_url: String,
}

impl IndexClient {
    /// Create a client for `base_url`. Every request is bounded by `timeout`.
    pub fn new(base_url: &str, timeout: Duration) -> AlignResult<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("tableunion/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn post<B, R>(&self, body: &B) -> AlignResult<R>
    where
        B: Serialize + ?Sized + Sync,
        R: serde::de::DeserializeOwned + Send,
    {
        let url = format!("{}/query", self.base_url);

        let response = self.client.post(&url).json(body).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AlignError::Retrieval(format!("index returned {status}: {body}")));
        }

        response
            .json::<R>()
            .await
            .map_err(|e| AlignError::Retrieval(format!("failed to parse index response: {e}")))
    }
}

#[async_trait]
impl CandidateRetriever for IndexClient {
    async fn query_column(&self, vec: &[f64], k: usize) -> AlignResult<Vec<ColumnMatch>> {
        let response: ColumnQueryResponse = self.post(&ColumnQueryRequest { vec, k }).await?;
        debug!(
            k,
            returned = response.result.len(),
            "Index column query complete"
        );
        Ok(response.result)
    }

    async fn query_table(
        &self,
        vecs: &[Vec<f64>],
        k: usize,
        n: usize,
    ) -> AlignResult<Vec<String>> {
        let response: TableQueryResponse = self.post(&TableQueryRequest { vecs, k, n }).await?;
        debug!(
            columns = vecs.len(),
            returned = response.result.len(),
            "Index table query complete"
        );
        Ok(response
            .result
            .into_iter()
            .map(|r| r.union.candidate_table)
            .collect())
    }
}
