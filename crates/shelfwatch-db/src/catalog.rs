//! Database operations for `products`, `product_offers`, and `price_history`.
//!
//! Every writing function here takes a `&mut PgConnection` so the
//! reconciler can run the whole per-retailer protocol on one transaction.
//! The serving layer reads these tables (and mutates `products.view_count`);
//! nothing in this module ever touches `view_count` after the initial 0.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};

use crate::DbError;

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// A row from the `products` table. `name` holds the normalized name — the
/// unique matching key across all retailers.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProductRow {
    pub id: i64,
    pub name: String,
    pub category_id: i64,
    pub image_url: Option<String>,
    pub view_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A row from the `product_offers` table: one per (product, retailer) pair.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct OfferRow {
    pub id: i64,
    pub product_id: i64,
    pub retailer_id: i64,
    /// NULL when the listing carried no recoverable price.
    pub price: Option<Decimal>,
    /// The vendor's own (un-normalized) product name for this offer.
    pub original_name: Option<String>,
    pub product_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A row from the append-only `price_history` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PriceHistoryRow {
    pub id: i64,
    pub product_id: i64,
    pub old_price: Decimal,
    pub new_price: Decimal,
    pub changed_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// products operations
// ---------------------------------------------------------------------------

/// Resolves a product by normalized name, creating it if absent.
///
/// Same create-then-handle-conflict pattern as retailer resolution: the
/// unique constraint on `products.name` guarantees at most one row per
/// normalized name even under concurrent ingestion runs. Category, image
/// and the zero view count are set on create only — the first-seen image
/// wins, and later sightings never rewrite an existing product.
///
/// Returns `(id, created)`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert or lookup fails.
pub async fn resolve_or_create_product(
    conn: &mut PgConnection,
    normalized_name: &str,
    category_id: i64,
    image_url: Option<&str>,
) -> Result<(i64, bool), DbError> {
    let inserted: Option<i64> = sqlx::query_scalar::<_, i64>(
        "INSERT INTO products (name, category_id, image_url, view_count) \
         VALUES ($1, $2, $3, 0) \
         ON CONFLICT (name) DO NOTHING \
         RETURNING id",
    )
    .bind(normalized_name)
    .bind(category_id)
    .bind(image_url)
    .fetch_optional(&mut *conn)
    .await?;

    if let Some(id) = inserted {
        return Ok((id, true));
    }

    let id: i64 = sqlx::query_scalar::<_, i64>("SELECT id FROM products WHERE name = $1")
        .bind(normalized_name)
        .fetch_one(&mut *conn)
        .await?;

    Ok((id, false))
}

// ---------------------------------------------------------------------------
// product_offers operations
// ---------------------------------------------------------------------------

/// Returns the offer for a (product, retailer) pair, if one exists.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_offer(
    conn: &mut PgConnection,
    product_id: i64,
    retailer_id: i64,
) -> Result<Option<OfferRow>, DbError> {
    let row = sqlx::query_as::<_, OfferRow>(
        "SELECT id, product_id, retailer_id, price, original_name, product_url, \
                created_at, updated_at \
         FROM product_offers \
         WHERE product_id = $1 AND retailer_id = $2",
    )
    .bind(product_id)
    .bind(retailer_id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(row)
}

/// Inserts the first offer for a (product, retailer) pair.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails (including a unique
/// violation when another transaction created the pair concurrently — the
/// reconciler's transaction rolls back and the profile is retried on the
/// next run).
pub async fn insert_offer(
    conn: &mut PgConnection,
    product_id: i64,
    retailer_id: i64,
    price: Option<Decimal>,
    original_name: &str,
    product_url: Option<&str>,
) -> Result<i64, DbError> {
    let id: i64 = sqlx::query_scalar::<_, i64>(
        "INSERT INTO product_offers \
             (product_id, retailer_id, price, original_name, product_url) \
         VALUES ($1, $2, $3, $4, $5) \
         RETURNING id",
    )
    .bind(product_id)
    .bind(retailer_id)
    .bind(price)
    .bind(original_name)
    .bind(product_url)
    .fetch_one(&mut *conn)
    .await?;

    Ok(id)
}

/// Rewrites an offer's observed fields after a price change.
///
/// Only called when the newly observed price differs from the stored one;
/// an unchanged price leaves the row (and its `updated_at`) untouched.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the update fails.
pub async fn update_offer(
    conn: &mut PgConnection,
    offer_id: i64,
    price: Option<Decimal>,
    original_name: &str,
    product_url: Option<&str>,
) -> Result<(), DbError> {
    sqlx::query(
        "UPDATE product_offers \
         SET price = $1, original_name = $2, product_url = $3, updated_at = NOW() \
         WHERE id = $4",
    )
    .bind(price)
    .bind(original_name)
    .bind(product_url)
    .bind(offer_id)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

// ---------------------------------------------------------------------------
// price_history operations
// ---------------------------------------------------------------------------

/// Appends one price-change record. The table is append-only; the pipeline
/// never updates or deletes history rows.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn insert_price_history(
    conn: &mut PgConnection,
    product_id: i64,
    old_price: Decimal,
    new_price: Decimal,
) -> Result<(), DbError> {
    sqlx::query(
        "INSERT INTO price_history (product_id, old_price, new_price, changed_at) \
         VALUES ($1, $2, $3, NOW())",
    )
    .bind(product_id)
    .bind(old_price)
    .bind(new_price)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Returns a product's price-change history, newest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_price_history(
    pool: &PgPool,
    product_id: i64,
) -> Result<Vec<PriceHistoryRow>, DbError> {
    let rows = sqlx::query_as::<_, PriceHistoryRow>(
        "SELECT id, product_id, old_price, new_price, changed_at \
         FROM price_history \
         WHERE product_id = $1 \
         ORDER BY changed_at DESC, id DESC",
    )
    .bind(product_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
