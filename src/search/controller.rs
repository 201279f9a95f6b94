//! Index consistency controller
//!
//! [`SearchService`] decides, for every search, whether the external index
//! can be trusted:
//!
//! 1. Take one repository snapshot (listings and categories).
//! 2. Without an index, match locally.
//! 3. Query the index. On error, match locally.
//! 4. If the index returned nothing for an unfiltered query while the
//!    snapshot is non-empty, the index is stale: push the snapshot with one
//!    bulk upsert and query once more. This happens at most once per call and
//!    is skipped when the caller already cancelled.
//! 5. Decode the hits and apply the attribute post-filter the index cannot
//!    evaluate itself.
//! 6. If nothing survives while the snapshot is non-empty, match locally.

use crate::core::listing::Listing;
use crate::core::query::{SearchRequest, SearchResult};
use crate::core::service::{IndexFilter, IndexQuery, IndexResponse, ListingRepository, SearchIndex};
use crate::search::gate::SearchGate;
use crate::search::matcher::{STATUS_KEY, match_listings, post_filter};
use anyhow::Result;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// How a search result was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchPath {
    /// No index configured
    Local,
    /// Index hits, post-filtered
    Index,
    /// Index hits after a reconciliation pass
    Reconciled,
    /// Index failed or produced nothing usable; matched locally
    Fallback,
}

/// Result together with the path that produced it
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub result: SearchResult,
    pub path: SearchPath,
}

/// Search entry point of the marketplace
#[derive(Clone)]
pub struct SearchService {
    repository: Arc<dyn ListingRepository>,
    index: Option<Arc<dyn SearchIndex>>,
}

impl SearchService {
    /// Local-only search over the repository
    pub fn new(repository: Arc<dyn ListingRepository>) -> Self {
        Self {
            repository,
            index: None,
        }
    }

    /// Use an external index in front of the local matcher
    pub fn with_index(mut self, index: Arc<dyn SearchIndex>) -> Self {
        self.index = Some(index);
        self
    }

    pub fn index(&self) -> Option<&Arc<dyn SearchIndex>> {
        self.index.as_ref()
    }

    pub fn repository(&self) -> &Arc<dyn ListingRepository> {
        &self.repository
    }

    /// Run a search that cannot be cancelled
    pub async fn search(&self, request: &SearchRequest) -> Result<SearchResult> {
        Ok(self.execute(request, &CancellationToken::new()).await?.result)
    }

    /// Run a search through a gate; `None` when a newer search superseded it
    pub async fn search_latest(
        &self,
        gate: &SearchGate,
        request: &SearchRequest,
    ) -> Result<Option<SearchResult>> {
        let ticket = gate.begin();
        let outcome = self.execute(request, ticket.token()).await?;
        Ok(gate.finish(&ticket, outcome.result))
    }

    /// Run a search and report which path produced the result
    ///
    /// Repository failures are returned; index failures never are.
    pub async fn execute(
        &self,
        request: &SearchRequest,
        cancel: &CancellationToken,
    ) -> Result<SearchOutcome> {
        let (listings, categories) = tokio::try_join!(
            self.repository.get_listings(),
            self.repository.get_categories()
        )?;

        let local = |path: SearchPath| SearchOutcome {
            result: match_listings(request, &listings, &categories).into(),
            path,
        };

        let Some(index) = &self.index else {
            return Ok(local(SearchPath::Local));
        };

        let query = index_query(request);
        let mut path = SearchPath::Index;
        let mut response = match index.query(&query).await {
            Ok(response) => response,
            Err(err) => {
                tracing::warn!(
                    provider = index.provider_name(),
                    error = %err,
                    "search index query failed, matching locally"
                );
                return Ok(local(SearchPath::Fallback));
            }
        };

        if response.hits.is_empty() && request.is_unfiltered() && !listings.is_empty() {
            if cancel.is_cancelled() {
                tracing::debug!("search cancelled, skipping index reconciliation");
            } else {
                match self.reconcile(index.as_ref(), &listings, &query).await {
                    Ok(refreshed) => {
                        response = refreshed;
                        path = SearchPath::Reconciled;
                    }
                    Err(err) => {
                        tracing::warn!(
                            provider = index.provider_name(),
                            error = %err,
                            "search index reconciliation failed, matching locally"
                        );
                        return Ok(local(SearchPath::Fallback));
                    }
                }
            }
        }

        let hits = post_filter(request, decode_hits(response.hits), &categories);
        if hits.is_empty() && !listings.is_empty() {
            tracing::debug!("no usable index hits, matching locally");
            return Ok(local(SearchPath::Fallback));
        }

        Ok(SearchOutcome {
            result: hits.into(),
            path,
        })
    }

    /// Push the whole snapshot to the index, then repeat the query once
    async fn reconcile(
        &self,
        index: &dyn SearchIndex,
        listings: &[Listing],
        query: &IndexQuery,
    ) -> Result<IndexResponse> {
        tracing::info!(
            provider = index.provider_name(),
            documents = listings.len(),
            "search index is empty, reindexing snapshot"
        );
        index.bulk_upsert(listings).await?;
        index.query(query).await
    }
}

/// Structural part of a request, as the index understands it
pub fn index_query(request: &SearchRequest) -> IndexQuery {
    let text = request.q.trim();
    IndexQuery {
        text: (!text.is_empty()).then(|| text.to_string()),
        filter: IndexFilter {
            category: request.category.clone(),
            county: request.county.clone(),
            status: request
                .filters
                .get(STATUS_KEY)
                .filter(|s| !s.is_empty())
                .cloned(),
        },
    }
}

/// Decode raw index documents, dropping those that no longer fit the model
fn decode_hits(documents: Vec<serde_json::Value>) -> Vec<Listing> {
    documents
        .into_iter()
        .filter_map(|doc| match serde_json::from_value::<Listing>(doc) {
            Ok(listing) => Some(listing),
            Err(err) => {
                tracing::debug!(error = %err, "dropping undecodable index document");
                None
            }
        })
        .collect()
}
