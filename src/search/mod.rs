//! Search Backend Gateway
//!
//! Sends a query body to the log-indexing backend and returns the typed
//! result set.
//!
//! ## Architecture
//!
//! - **SearchGateway**: the seam the pipeline depends on
//! - **SearchClient**: HTTPS implementation with basic credentials
//! - **types**: wire shape of the `_search` response

mod client;
mod types;

pub use client::{SearchClient, SearchClientConfig, SearchError};
pub use types::{HitsEnvelope, LogSource, SearchHit, SearchResponse, ShardStats, TotalHits};

use crate::query::SearchBody;
use async_trait::async_trait;

/// Anything that can run a search body against a set of index patterns
#[async_trait]
pub trait SearchGateway: Send + Sync {
    async fn search(
        &self,
        body: &SearchBody,
        index_patterns: &[String],
    ) -> Result<SearchResponse, SearchError>;
}
