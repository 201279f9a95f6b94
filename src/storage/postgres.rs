//! PostgreSQL implementation of ListingRepository using sqlx.
//!
//! # Feature flag
//!
//! This module is gated behind the `postgres` feature flag:
//! ```toml
//! [dependencies]
//! selj = { version = "0.1", features = ["postgres"] }
//! ```
//!
//! Listings and categories live in two tables created on [`PostgresRepository::connect`].
//! Attribute maps, image lists and category schemas are stored as JSONB.

use crate::core::category::{Category, FilterOption};
use crate::core::error::StorageError;
use crate::core::listing::{Attributes, Listing, ListingStatus, SellerKind};
use crate::core::service::ListingRepository;
use crate::core::validation::category::deletion_set;
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::types::Json;
use sqlx::Row;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS categories (
    value TEXT PRIMARY KEY,
    label TEXT NOT NULL,
    parent_value TEXT,
    create_fields JSONB NOT NULL DEFAULT '[]'::jsonb,
    search_filters JSONB NOT NULL DEFAULT '[]'::jsonb
);
CREATE TABLE IF NOT EXISTS listings (
    id TEXT PRIMARY KEY,
    title TEXT NOT NULL,
    price TEXT NOT NULL,
    price_value DOUBLE PRECISION NULL,
    description TEXT,
    images JSONB NOT NULL DEFAULT '[]'::jsonb,
    meta TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    seller TEXT,
    status TEXT,
    county TEXT,
    category TEXT,
    seller_name TEXT,
    seller_phone TEXT,
    seller_email TEXT,
    seller_website TEXT,
    city TEXT,
    attributes JSONB
);
"#;

/// Listing repository backed by PostgreSQL
#[derive(Clone, Debug)]
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Connect and make sure the tables exist
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(std::time::Duration::from_secs(5))
            .connect(url)
            .await
            .map_err(|e| StorageError::ConnectionError {
                backend: "postgres".to_string(),
                message: e.to_string(),
            })?;
        let repo = Self { pool };
        repo.ensure_schema().await?;
        Ok(repo)
    }

    /// Use an existing pool; the schema must already exist
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn ensure_schema(&self) -> Result<()> {
        sqlx::raw_sql(SCHEMA).execute(&self.pool).await?;
        Ok(())
    }
}

fn seller_to_str(seller: SellerKind) -> &'static str {
    match seller {
        SellerKind::Privat => "Privat",
        SellerKind::Foretag => "Företag",
    }
}

fn row_to_listing(row: &PgRow) -> Result<Listing> {
    let status: Option<String> = row.try_get("status")?;
    let seller: Option<String> = row.try_get("seller")?;
    let images: Option<Json<Vec<String>>> = row.try_get("images")?;
    let attributes: Option<Json<Attributes>> = row.try_get("attributes")?;
    let created_at: DateTime<Utc> = row.try_get("created_at")?;

    Ok(Listing {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        price: row.try_get("price")?,
        price_value: row.try_get("price_value")?,
        description: row.try_get("description")?,
        images: images.map(|j| j.0).unwrap_or_default(),
        meta: row.try_get("meta")?,
        created_at,
        seller: match seller.as_deref() {
            Some("Företag") => SellerKind::Foretag,
            _ => SellerKind::Privat,
        },
        status: status
            .as_deref()
            .and_then(|s| s.parse().ok())
            .unwrap_or_default(),
        county: row.try_get("county")?,
        city: row.try_get("city")?,
        category: row.try_get("category")?,
        seller_name: row.try_get("seller_name")?,
        seller_phone: row.try_get("seller_phone")?,
        seller_email: row.try_get("seller_email")?,
        seller_website: row.try_get("seller_website")?,
        attributes: attributes.map(|j| j.0).unwrap_or_default(),
    })
}

fn row_to_category(row: &PgRow) -> Result<Category> {
    let create_fields: Json<Vec<FilterOption>> = row.try_get("create_fields")?;
    let search_filters: Json<Vec<FilterOption>> = row.try_get("search_filters")?;
    Ok(Category {
        value: row.try_get("value")?,
        label: row.try_get("label")?,
        parent_value: row.try_get("parent_value")?,
        create_fields: Some(create_fields.0),
        search_filters: Some(search_filters.0),
        filters: None,
    }
    .normalized())
}

#[async_trait]
impl ListingRepository for PostgresRepository {
    async fn get_listings(&self) -> Result<Vec<Listing>> {
        let rows = sqlx::query("SELECT * FROM listings ORDER BY created_at DESC, id DESC")
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(row_to_listing).collect()
    }

    async fn get_categories(&self) -> Result<Vec<Category>> {
        let rows = sqlx::query("SELECT * FROM categories ORDER BY value ASC")
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(row_to_category).collect()
    }

    async fn create_listing(&self, listing: Listing) -> Result<Listing> {
        sqlx::query(
            r#"
            INSERT INTO listings
                (id, title, price, price_value, description, images, meta, created_at, seller, status,
                 county, category, seller_name, seller_phone, seller_email, seller_website, city, attributes)
            VALUES
                ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11,$12,$13,$14,$15,$16,$17,$18)
            ON CONFLICT (id) DO UPDATE SET
                title=EXCLUDED.title, price=EXCLUDED.price, price_value=EXCLUDED.price_value,
                description=EXCLUDED.description, images=EXCLUDED.images, meta=EXCLUDED.meta,
                created_at=EXCLUDED.created_at, seller=EXCLUDED.seller, status=EXCLUDED.status,
                county=EXCLUDED.county, category=EXCLUDED.category, seller_name=EXCLUDED.seller_name,
                seller_phone=EXCLUDED.seller_phone, seller_email=EXCLUDED.seller_email,
                seller_website=EXCLUDED.seller_website, city=EXCLUDED.city, attributes=EXCLUDED.attributes
            "#,
        )
        .bind(&listing.id)
        .bind(&listing.title)
        .bind(&listing.price)
        .bind(listing.price_value)
        .bind(&listing.description)
        .bind(Json(&listing.images))
        .bind(&listing.meta)
        .bind(listing.created_at)
        .bind(seller_to_str(listing.seller))
        .bind(listing.status.as_str())
        .bind(&listing.county)
        .bind(&listing.category)
        .bind(&listing.seller_name)
        .bind(&listing.seller_phone)
        .bind(&listing.seller_email)
        .bind(&listing.seller_website)
        .bind(&listing.city)
        .bind(Json(&listing.attributes))
        .execute(&self.pool)
        .await?;
        Ok(listing)
    }

    async fn update_listing_status(&self, id: &str, status: ListingStatus) -> Result<()> {
        sqlx::query("UPDATE listings SET status = $1 WHERE id = $2")
            .bind(status.as_str())
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn create_category(&self, category: Category) -> Result<Category> {
        let category = category.normalized();
        sqlx::query(
            r#"
            INSERT INTO categories (value, label, parent_value, create_fields, search_filters)
            VALUES ($1,$2,$3,$4,$5)
            ON CONFLICT (value) DO UPDATE SET
                label=EXCLUDED.label,
                parent_value=EXCLUDED.parent_value,
                create_fields=EXCLUDED.create_fields,
                search_filters=EXCLUDED.search_filters
            "#,
        )
        .bind(&category.value)
        .bind(&category.label)
        .bind(&category.parent_value)
        .bind(Json(category.create_fields.clone().unwrap_or_default()))
        .bind(Json(category.search_filters.clone().unwrap_or_default()))
        .execute(&self.pool)
        .await?;
        Ok(category)
    }

    async fn update_category(&self, value: &str, category: Category) -> Result<Option<Category>> {
        let category = category.normalized();
        let result = sqlx::query(
            r#"
            UPDATE categories
            SET label=$2, parent_value=$3, create_fields=$4, search_filters=$5
            WHERE value=$1
            "#,
        )
        .bind(value)
        .bind(&category.label)
        .bind(&category.parent_value)
        .bind(Json(category.create_fields.clone().unwrap_or_default()))
        .bind(Json(category.search_filters.clone().unwrap_or_default()))
        .execute(&self.pool)
        .await?;

        Ok((result.rows_affected() > 0).then_some(category))
    }

    async fn delete_category(&self, value: &str) -> Result<bool> {
        let categories = self.get_categories().await?;
        let doomed = deletion_set(value, &categories);
        let result = sqlx::query("DELETE FROM categories WHERE value = ANY($1)")
            .bind(doomed)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    fn backend_name(&self) -> &'static str {
        "postgres"
    }
}
