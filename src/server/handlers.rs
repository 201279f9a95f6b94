//! HTTP handlers for the marketplace API
//!
//! Handlers are thin: they decode the request, call [`Marketplace`] and let
//! [`SeljError`] render failures.

use axum::{
    Json,
    extract::{Query, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::{Value, json};

use crate::core::error::{SeljError, SeljResult, ValidationError};
use crate::core::query::{SearchParams, SearchResult};
use crate::core::{Category, Listing};
use crate::market::{CategoryInput, CategoryRef, ListingDraft, Marketplace, StatusUpdate};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub marketplace: Marketplace,
}

impl AppState {
    pub fn new(marketplace: Marketplace) -> Self {
        Self { marketplace }
    }
}

/// Unwrap a JSON body, reporting malformed payloads as validation errors
fn body<T>(payload: Result<Json<T>, JsonRejection>) -> SeljResult<T> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| {
            SeljError::from(ValidationError::InvalidJson {
                message: rejection.body_text(),
            })
        })
}

fn ok() -> Json<Value> {
    Json(json!({ "ok": true }))
}

pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "selj"
    }))
}

/// Which backends are serving this instance
pub async fn status(State(state): State<AppState>) -> Json<Value> {
    let market = &state.marketplace;
    let primary = market
        .index()
        .map(|index| index.provider_name())
        .unwrap_or("local");
    Json(json!({
        "service": "selj",
        "store": market.repository().backend_name(),
        "search": {
            "primary": primary,
            "fallback": "local",
        },
    }))
}

/// GET /api/search?q=&category=&county=&filters=<json>
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> SeljResult<Json<SearchResult>> {
    let request = params.into_request();
    tracing::debug!(?request, "search");
    let result = state.marketplace.search(&request).await?;
    Ok(Json(result))
}

pub async fn list_listings(State(state): State<AppState>) -> SeljResult<Json<Vec<Listing>>> {
    Ok(Json(state.marketplace.list_listings().await?))
}

pub async fn create_listing(
    State(state): State<AppState>,
    payload: Result<Json<ListingDraft>, JsonRejection>,
) -> SeljResult<impl IntoResponse> {
    let listing = state.marketplace.create_listing(body(payload)?).await?;
    Ok((StatusCode::CREATED, Json(listing)))
}

pub async fn update_listing_status(
    State(state): State<AppState>,
    payload: Result<Json<StatusUpdate>, JsonRejection>,
) -> SeljResult<Json<Value>> {
    state.marketplace.moderate(body(payload)?).await?;
    Ok(ok())
}

pub async fn list_categories(State(state): State<AppState>) -> SeljResult<Json<Vec<Category>>> {
    Ok(Json(state.marketplace.list_categories().await?))
}

pub async fn create_category(
    State(state): State<AppState>,
    payload: Result<Json<CategoryInput>, JsonRejection>,
) -> SeljResult<impl IntoResponse> {
    let category = state.marketplace.create_category(body(payload)?).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

pub async fn update_category(
    State(state): State<AppState>,
    payload: Result<Json<CategoryInput>, JsonRejection>,
) -> SeljResult<Json<Category>> {
    Ok(Json(state.marketplace.update_category(body(payload)?).await?))
}

pub async fn delete_category(
    State(state): State<AppState>,
    payload: Result<Json<CategoryRef>, JsonRejection>,
) -> SeljResult<Json<Value>> {
    let target = body(payload)?;
    state
        .marketplace
        .delete_category(target.value.as_deref().unwrap_or_default())
        .await?;
    Ok(ok())
}
