//! Typesense implementation of SearchIndex
//!
//! # Feature flag
//!
//! Gated behind the `typesense` feature:
//! ```toml
//! [dependencies]
//! selj = { version = "0.1", features = ["typesense"] }
//! ```
//!
//! Documents are the camelCase JSON form of [`Listing`]. Category, county
//! and status are exact-match filters; free text is matched against title,
//! meta and description.

use crate::core::listing::{Listing, ListingStatus};
use crate::core::service::{IndexFilter, IndexQuery, IndexResponse, SearchIndex};
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use std::future::Future;
use std::time::Duration;

const API_KEY_HEADER: &str = "X-TYPESENSE-API-KEY";
const QUERY_BY: &str = "title,meta,description";
const PER_PAGE: u32 = 250;

pub const DEFAULT_COLLECTION: &str = "listings";

#[derive(Debug, Deserialize)]
struct SearchHit {
    document: Value,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    found: u64,
    #[serde(default)]
    hits: Vec<SearchHit>,
}

/// HTTP client for one Typesense collection
#[derive(Clone)]
pub struct TypesenseIndex {
    host: String,
    api_key: String,
    collection: String,
    client: reqwest::Client,
}

impl TypesenseIndex {
    pub fn new(
        host: impl Into<String>,
        api_key: impl Into<String>,
        collection: impl Into<String>,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            host: host.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            collection: collection.into(),
            client,
        })
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    fn documents_url(&self) -> String {
        format!("{}/collections/{}/documents", self.host, self.collection)
    }

    /// URL of a single document, with the id percent-encoded as one segment
    fn document_url(&self, id: &str) -> Result<reqwest::Url> {
        let mut url = reqwest::Url::parse(&self.documents_url())
            .with_context(|| format!("invalid Typesense host '{}'", self.host))?;
        url.path_segments_mut()
            .map_err(|_| anyhow::anyhow!("Typesense host '{}' cannot be a base URL", self.host))?
            .push(id);
        Ok(url)
    }

    /// Create the collection unless it already exists
    pub async fn ensure_collection(&self) -> Result<()> {
        let url = format!("{}/collections/{}", self.host, self.collection);
        let response = self
            .client
            .get(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await
            .context("Failed to reach Typesense")?;
        if response.status().is_success() {
            return Ok(());
        }

        let schema = json!({
            "name": self.collection,
            "fields": [
                { "name": "title", "type": "string" },
                { "name": "meta", "type": "string", "optional": true },
                { "name": "description", "type": "string", "optional": true },
                { "name": "category", "type": "string", "facet": true, "optional": true },
                { "name": "county", "type": "string", "facet": true, "optional": true },
                { "name": "status", "type": "string", "facet": true },
                { "name": ".*", "type": "auto" }
            ]
        });
        let response = self
            .client
            .post(format!("{}/collections", self.host))
            .header(API_KEY_HEADER, &self.api_key)
            .json(&schema)
            .send()
            .await
            .context("Failed to create Typesense collection")?;
        check(response).await?;
        tracing::info!(collection = %self.collection, "created search collection");
        Ok(())
    }
}

async fn check(response: reqwest::Response) -> Result<reqwest::Response> {
    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        anyhow::bail!("Typesense API error {}: {}", status, body);
    }
    Ok(response)
}

/// Build the `filter_by` expression, e.g. ``category:=`fordon` && status:=`active` ``
pub fn filter_expression(filter: &IndexFilter) -> Option<String> {
    let clauses: Vec<String> = [
        ("category", &filter.category),
        ("county", &filter.county),
        ("status", &filter.status),
    ]
    .into_iter()
    .filter_map(|(field, value)| {
        value
            .as_deref()
            .map(|v| format!("{}:=`{}`", field, v.replace('`', "")))
    })
    .collect();

    (!clauses.is_empty()).then(|| clauses.join(" && "))
}

/// Request pages `1..` until every document counted by `found` arrived
///
/// A short page also ends the loop.
async fn collect_pages<F, Fut>(mut fetch_page: F) -> Result<IndexResponse>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<SearchResponse>>,
{
    let mut hits = Vec::new();
    let mut found: u64 = 0;
    let mut page = 1;
    loop {
        let response = fetch_page(page).await?;
        found = found.max(response.found);
        let received = response.hits.len();
        hits.extend(response.hits.into_iter().map(|h| h.document));
        if received < PER_PAGE as usize || hits.len() as u64 >= found {
            break;
        }
        page += 1;
    }
    Ok(IndexResponse { hits, found })
}

/// JSON-lines payload for the bulk import endpoint
fn jsonl(listings: &[Listing]) -> Result<String> {
    let mut body = String::new();
    for listing in listings {
        body.push_str(&serde_json::to_string(listing)?);
        body.push('\n');
    }
    Ok(body)
}

#[async_trait]
impl SearchIndex for TypesenseIndex {
    async fn upsert(&self, listing: &Listing) -> Result<()> {
        let response = self
            .client
            .post(self.documents_url())
            .query(&[("action", "upsert")])
            .header(API_KEY_HEADER, &self.api_key)
            .json(listing)
            .send()
            .await
            .context("Failed to send Typesense upsert")?;
        check(response).await?;
        Ok(())
    }

    async fn bulk_upsert(&self, listings: &[Listing]) -> Result<()> {
        if listings.is_empty() {
            return Ok(());
        }
        let response = self
            .client
            .post(format!("{}/import", self.documents_url()))
            .query(&[("action", "upsert")])
            .header(API_KEY_HEADER, &self.api_key)
            .header(reqwest::header::CONTENT_TYPE, "text/plain")
            .body(jsonl(listings)?)
            .send()
            .await
            .context("Failed to send Typesense import")?;
        let body = check(response).await?.text().await?;

        // One result object per line; any failure fails the batch
        let failed = body
            .lines()
            .filter_map(|line| serde_json::from_str::<Value>(line).ok())
            .filter(|v| v.get("success").and_then(Value::as_bool) == Some(false))
            .count();
        if failed > 0 {
            anyhow::bail!("Typesense import rejected {} of {} documents", failed, listings.len());
        }
        Ok(())
    }

    async fn remove(&self, id: &str) -> Result<()> {
        let response = self
            .client
            .delete(self.document_url(id)?)
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await
            .context("Failed to send Typesense delete")?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(());
        }
        check(response).await?;
        Ok(())
    }

    async fn update_status(&self, id: &str, status: ListingStatus) -> Result<()> {
        let response = self
            .client
            .patch(self.document_url(id)?)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&json!({ "status": status }))
            .send()
            .await
            .context("Failed to send Typesense update")?;
        check(response).await?;
        Ok(())
    }

    async fn query(&self, query: &IndexQuery) -> Result<IndexResponse> {
        let mut params = vec![
            ("q", query.text.clone().unwrap_or_else(|| "*".to_string())),
            ("query_by", QUERY_BY.to_string()),
            ("per_page", PER_PAGE.to_string()),
        ];
        if let Some(filter_by) = filter_expression(&query.filter) {
            params.push(("filter_by", filter_by));
        }
        let url = format!("{}/search", self.documents_url());

        collect_pages(|page| {
            let request = self
                .client
                .get(&url)
                .query(&params)
                .query(&[("page", page)])
                .header(API_KEY_HEADER, &self.api_key);
            async move {
                let response = request
                    .send()
                    .await
                    .context("Failed to send Typesense search")?;
                check(response)
                    .await?
                    .json::<SearchResponse>()
                    .await
                    .context("Failed to parse Typesense response")
            }
        })
        .await
    }

    fn provider_name(&self) -> &'static str {
        "typesense"
    }
}
