//! Marketplace write path and search entry point
//!
//! [`Marketplace`] ties a [`ListingRepository`] to an optional
//! [`SearchIndex`]. The repository is the source of truth: a write succeeds
//! once the repository accepted it, and index propagation failures are only
//! logged.

pub mod input;

pub use input::{CategoryInput, CategoryRef, ListingDraft, StatusUpdate};

use crate::core::category::{Category, FilterOption};
use crate::core::error::{CategoryError, RequestError, SeljError, SeljResult, ValidationError};
use crate::core::listing::{Listing, ListingStatus};
use crate::core::query::{SearchRequest, SearchResult};
use crate::core::schema::{FieldKind, fields_for_category};
use crate::core::service::{ListingRepository, SearchIndex};
use crate::core::validation::category::{
    MSG_DELETE_VALUE_REQUIRED, MSG_SELF_PARENT, MSG_UPDATE_VALUE_REQUIRED,
    MSG_VALUE_LABEL_REQUIRED, check_new_category, check_parent,
};
use crate::core::validation::filters::{CREATE_PREFIX, SEARCH_PREFIX};
use crate::core::validation::{normalize_filters, validate_attributes};
use crate::search::SearchService;
use chrono::Utc;
use serde_json::Value;
use std::sync::Arc;

pub const MSG_TITLE_PRICE_REQUIRED: &str = "Titel och pris är obligatoriska";

#[derive(Clone)]
pub struct Marketplace {
    repository: Arc<dyn ListingRepository>,
    index: Option<Arc<dyn SearchIndex>>,
    search: SearchService,
}

fn rejected(errors: Vec<String>) -> SeljError {
    ValidationError::Rejected(errors).into()
}

impl Marketplace {
    pub fn new(repository: Arc<dyn ListingRepository>) -> Self {
        Self {
            search: SearchService::new(repository.clone()),
            repository,
            index: None,
        }
    }

    pub fn with_index(mut self, index: Arc<dyn SearchIndex>) -> Self {
        self.search = self.search.with_index(index.clone());
        self.index = Some(index);
        self
    }

    pub fn repository(&self) -> &Arc<dyn ListingRepository> {
        &self.repository
    }

    pub fn index(&self) -> Option<&Arc<dyn SearchIndex>> {
        self.index.as_ref()
    }

    pub fn search_service(&self) -> &SearchService {
        &self.search
    }

    fn storage_error(&self, err: anyhow::Error) -> SeljError {
        SeljError::storage(self.repository.backend_name(), err)
    }

    pub async fn search(&self, request: &SearchRequest) -> SeljResult<SearchResult> {
        self.search
            .search(request)
            .await
            .map_err(|e| self.storage_error(e))
    }

    pub async fn list_listings(&self) -> SeljResult<Vec<Listing>> {
        self.repository
            .get_listings()
            .await
            .map_err(|e| self.storage_error(e))
    }

    pub async fn list_categories(&self) -> SeljResult<Vec<Category>> {
        self.repository
            .get_categories()
            .await
            .map_err(|e| self.storage_error(e))
    }

    /// Validate and store a new listing, then index it
    ///
    /// Attribute errors come first, then the title/price error.
    pub async fn create_listing(&self, draft: ListingDraft) -> SeljResult<Listing> {
        let mut errors = match draft.category() {
            Some(category) => {
                let categories = self.list_categories().await?;
                let fields = fields_for_category(&categories, category, FieldKind::Create);
                validate_attributes(&fields, &draft.attributes)
            }
            None => Vec::new(),
        };
        if draft.title().is_none() || draft.price().is_none() {
            errors.push(MSG_TITLE_PRICE_REQUIRED.to_string());
        }
        if !errors.is_empty() {
            tracing::debug!(?errors, "listing rejected");
            return Err(rejected(errors));
        }

        let listing = self
            .repository
            .create_listing(draft.into_listing(Utc::now()))
            .await
            .map_err(|e| self.storage_error(e))?;
        tracing::info!(id = %listing.id, "listing created");

        self.propagate(&listing).await;
        Ok(listing)
    }

    /// Apply a moderation request
    pub async fn moderate(&self, update: StatusUpdate) -> SeljResult<()> {
        let (Some(id), Some(status)) = (
            update.id.filter(|s| !s.is_empty()),
            update.status.filter(|s| !s.is_empty()),
        ) else {
            return Err(RequestError::MissingField {
                field: "id and status".to_string(),
            }
            .into());
        };
        let status: ListingStatus = status.parse().map_err(|message| RequestError::InvalidField {
            field: "status".to_string(),
            message,
        })?;
        self.update_status(&id, status).await
    }

    /// Change a listing's status and refresh its index document
    ///
    /// An unknown id is not an error.
    pub async fn update_status(&self, id: &str, status: ListingStatus) -> SeljResult<()> {
        self.repository
            .update_listing_status(id, status)
            .await
            .map_err(|e| self.storage_error(e))?;
        tracing::info!(%id, %status, "listing status updated");

        if self.index.is_none() {
            return Ok(());
        }
        match self.repository.get_listings().await {
            Ok(listings) => {
                if let Some(listing) = listings.into_iter().find(|l| l.id == id) {
                    self.propagate(&listing).await;
                }
            }
            Err(err) => {
                tracing::warn!(%id, error = %err, "could not re-read listing for indexing");
            }
        }
        Ok(())
    }

    async fn propagate(&self, listing: &Listing) {
        let Some(index) = &self.index else {
            return;
        };
        if let Err(err) = index.upsert(listing).await {
            tracing::warn!(
                provider = index.provider_name(),
                id = %listing.id,
                error = %err,
                "failed to index listing"
            );
        }
    }

    pub async fn create_category(&self, input: CategoryInput) -> SeljResult<Category> {
        let value = input.value();
        let label = input.label();
        let parent = input.parent();

        let empty = Value::Array(Vec::new());
        let create = normalize_filters(input.raw_create_fields().unwrap_or(&empty), CREATE_PREFIX);
        let search = normalize_filters(input.raw_search_filters().unwrap_or(&empty), SEARCH_PREFIX);

        let existing = self.list_categories().await?;
        let mut errors = Vec::new();
        let structural = check_new_category(&value, &label, parent.as_deref(), &existing);
        // value/label message leads, the rest follows the filter errors
        let (head, tail): (Vec<_>, Vec<_>) = structural
            .into_iter()
            .partition(|e| e == MSG_VALUE_LABEL_REQUIRED);
        errors.extend(head);
        errors.extend(create.errors);
        errors.extend(search.errors);
        errors.extend(tail);
        if !errors.is_empty() {
            return Err(rejected(errors));
        }

        let mut category = Category::new(value, label)
            .with_create_fields(create.filters)
            .with_search_filters(search.filters);
        category.parent_value = parent;

        let stored = self
            .repository
            .create_category(category)
            .await
            .map_err(|e| self.storage_error(e))?;
        tracing::info!(value = %stored.value, "category created");
        Ok(stored)
    }

    /// Partial update; slots not present in the input are kept
    pub async fn update_category(&self, input: CategoryInput) -> SeljResult<Category> {
        let value = input.value();
        if value.is_empty() {
            return Err(rejected(vec![MSG_UPDATE_VALUE_REQUIRED.to_string()]));
        }
        let existing_all = self.list_categories().await?;
        let Some(existing) = existing_all.iter().find(|c| c.value == value) else {
            return Err(CategoryError::NotFound { value }.into());
        };

        let create_fields = match input.raw_create_fields() {
            Some(raw) => normalized_or_reject(raw, CREATE_PREFIX)?,
            None => fields_for_category(&existing_all, &value, FieldKind::Create),
        };
        let search_raw = input
            .search_filters
            .as_ref()
            .or(input.filters.as_ref());
        let search_filters = match search_raw {
            Some(raw) => normalized_or_reject(raw, SEARCH_PREFIX)?,
            None => fields_for_category(&existing_all, &value, FieldKind::Search),
        };

        let parent_value = match &input.parent_value {
            None => existing.parent_value.clone(),
            Some(_) => match input.parent() {
                Some(parent) if parent == value => {
                    return Err(rejected(vec![MSG_SELF_PARENT.to_string()]));
                }
                Some(parent) => {
                    let errors = check_parent(&value, &parent, &existing_all);
                    if !errors.is_empty() {
                        return Err(rejected(errors));
                    }
                    Some(parent)
                }
                None => None,
            },
        };

        let label = Some(input.label())
            .filter(|l| !l.is_empty())
            .unwrap_or_else(|| existing.label.clone());

        let mut category = Category::new(value.clone(), label)
            .with_create_fields(create_fields)
            .with_search_filters(search_filters);
        category.parent_value = parent_value;

        let updated = self
            .repository
            .update_category(&value, category)
            .await
            .map_err(|e| self.storage_error(e))?
            .ok_or_else(|| CategoryError::NotFound { value: value.clone() })?;
        tracing::info!(value = %updated.value, "category updated");
        Ok(updated)
    }

    /// Delete a category and its direct children
    pub async fn delete_category(&self, value: &str) -> SeljResult<()> {
        let value = value.trim();
        if value.is_empty() {
            return Err(rejected(vec![MSG_DELETE_VALUE_REQUIRED.to_string()]));
        }
        let removed = self
            .repository
            .delete_category(value)
            .await
            .map_err(|e| self.storage_error(e))?;
        if !removed {
            return Err(CategoryError::NotFound {
                value: value.to_string(),
            }
            .into());
        }
        tracing::info!(%value, "category deleted");
        Ok(())
    }
}

fn normalized_or_reject(raw: &Value, prefix: &str) -> SeljResult<Vec<FilterOption>> {
    let normalized = normalize_filters(raw, prefix);
    if normalized.errors.is_empty() {
        Ok(normalized.filters)
    } else {
        Err(rejected(normalized.errors))
    }
}
