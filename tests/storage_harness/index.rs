//! In-process search index with scripted failures and call counters

use anyhow::Result;
use async_trait::async_trait;
use selj::core::listing::{Listing, ListingStatus};
use selj::core::service::{IndexQuery, IndexResponse, SearchIndex};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

/// Documents keyed by id, matched the way the external index matches:
/// exact category/county/status, free text over title, meta and description.
#[derive(Default)]
pub struct ScriptedIndex {
    documents: Mutex<BTreeMap<String, Value>>,
    fail_queries: AtomicBool,
    fail_upserts: AtomicBool,
    /// Accept bulk imports without storing anything
    drop_bulk: AtomicBool,
    delay: Mutex<Option<Duration>>,
    pub queries: AtomicUsize,
    pub upserts: AtomicUsize,
    pub bulk_upserts: AtomicUsize,
}

impl ScriptedIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_documents(listings: &[Listing]) -> Self {
        let index = Self::new();
        for listing in listings {
            index.put(listing);
        }
        index
    }

    /// Store a raw document, bypassing counters
    pub fn put_raw(&self, id: &str, document: Value) {
        self.documents.lock().unwrap().insert(id.to_string(), document);
    }

    fn put(&self, listing: &Listing) {
        let doc = serde_json::to_value(listing).unwrap();
        self.put_raw(&listing.id, doc);
    }

    pub fn failing_queries(self) -> Self {
        self.fail_queries.store(true, Ordering::SeqCst);
        self
    }

    pub fn failing_upserts(self) -> Self {
        self.fail_upserts.store(true, Ordering::SeqCst);
        self
    }

    pub fn dropping_bulk(self) -> Self {
        self.drop_bulk.store(true, Ordering::SeqCst);
        self
    }

    pub fn with_delay(self, delay: Duration) -> Self {
        *self.delay.lock().unwrap() = Some(delay);
        self
    }

    pub fn document(&self, id: &str) -> Option<Value> {
        self.documents.lock().unwrap().get(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.documents.lock().unwrap().len()
    }

    pub fn count(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }
}

fn field<'a>(doc: &'a Value, key: &str) -> Option<&'a str> {
    doc.get(key).and_then(Value::as_str)
}

fn matches(doc: &Value, query: &IndexQuery) -> bool {
    let filter = &query.filter;
    for (key, wanted) in [
        ("category", &filter.category),
        ("county", &filter.county),
        ("status", &filter.status),
    ] {
        if let Some(wanted) = wanted {
            if field(doc, key) != Some(wanted.as_str()) {
                return false;
            }
        }
    }
    match &query.text {
        Some(text) => {
            let needle = text.to_lowercase();
            ["title", "meta", "description"]
                .iter()
                .filter_map(|key| field(doc, key))
                .any(|value| value.to_lowercase().contains(&needle))
        }
        None => true,
    }
}

#[async_trait]
impl SearchIndex for ScriptedIndex {
    async fn upsert(&self, listing: &Listing) -> Result<()> {
        self.upserts.fetch_add(1, Ordering::SeqCst);
        if self.fail_upserts.load(Ordering::SeqCst) {
            anyhow::bail!("index unavailable");
        }
        self.put(listing);
        Ok(())
    }

    async fn bulk_upsert(&self, listings: &[Listing]) -> Result<()> {
        self.bulk_upserts.fetch_add(1, Ordering::SeqCst);
        if self.fail_upserts.load(Ordering::SeqCst) {
            anyhow::bail!("index unavailable");
        }
        if !self.drop_bulk.load(Ordering::SeqCst) {
            for listing in listings {
                self.put(listing);
            }
        }
        Ok(())
    }

    async fn remove(&self, id: &str) -> Result<()> {
        self.documents.lock().unwrap().remove(id);
        Ok(())
    }

    async fn update_status(&self, id: &str, status: ListingStatus) -> Result<()> {
        if let Some(doc) = self.documents.lock().unwrap().get_mut(id) {
            doc["status"] = serde_json::to_value(status)?;
        }
        Ok(())
    }

    async fn query(&self, query: &IndexQuery) -> Result<IndexResponse> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_queries.load(Ordering::SeqCst) {
            anyhow::bail!("index timed out");
        }
        let hits: Vec<Value> = self
            .documents
            .lock()
            .unwrap()
            .values()
            .filter(|doc| matches(doc, query))
            .cloned()
            .collect();
        Ok(IndexResponse {
            found: hits.len() as u64,
            hits,
        })
    }

    fn provider_name(&self) -> &'static str {
        "scripted"
    }
}
