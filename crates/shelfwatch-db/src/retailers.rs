//! Database operations for `retailers` and `retailer_addresses`.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};

use crate::DbError;

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// A row from the `retailers` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RetailerRow {
    pub id: i64,
    pub name: String,
    pub website_url: Option<String>,
    pub logo_url: Option<String>,
    pub phone: Option<String>,
    pub opening_hours: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A row from the `retailer_addresses` table. Coordinates are NULL until
/// the geocoding backfill resolves them — possibly forever.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RetailerAddressRow {
    pub id: i64,
    pub retailer_id: i64,
    pub address: String,
    pub latitude: Option<Decimal>,
    pub longitude: Option<Decimal>,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// retailers operations
// ---------------------------------------------------------------------------

/// Resolves a retailer by its unique name, creating it if absent.
///
/// Create-then-handle-conflict: the INSERT relies on the unique constraint
/// on `retailers.name`, so two concurrent runs encountering the same new
/// retailer cannot both create a row — the loser's insert conflicts and
/// falls through to the SELECT. `website_url` is only set on create; an
/// existing retailer's row is not rewritten from profile config.
///
/// Returns `(id, created)`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert or lookup fails.
pub async fn resolve_or_create_retailer(
    conn: &mut PgConnection,
    name: &str,
    website_url: Option<&str>,
) -> Result<(i64, bool), DbError> {
    let inserted: Option<i64> = sqlx::query_scalar::<_, i64>(
        "INSERT INTO retailers (name, website_url) \
         VALUES ($1, $2) \
         ON CONFLICT (name) DO NOTHING \
         RETURNING id",
    )
    .bind(name)
    .bind(website_url)
    .fetch_optional(&mut *conn)
    .await?;

    if let Some(id) = inserted {
        return Ok((id, true));
    }

    let id: i64 = sqlx::query_scalar::<_, i64>("SELECT id FROM retailers WHERE name = $1")
        .bind(name)
        .fetch_one(&mut *conn)
        .await?;

    Ok((id, false))
}

/// Inserts any profile addresses not already present for this retailer.
///
/// Exact string match via the `(retailer_id, address)` unique constraint;
/// coordinates are left NULL for the geocoding backfill. Returns how many
/// rows were inserted.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if an insert fails.
pub async fn ensure_addresses(
    conn: &mut PgConnection,
    retailer_id: i64,
    addresses: &[String],
) -> Result<u64, DbError> {
    let mut inserted = 0u64;

    for address in addresses {
        let rows_affected = sqlx::query(
            "INSERT INTO retailer_addresses (retailer_id, address) \
             VALUES ($1, $2) \
             ON CONFLICT (retailer_id, address) DO NOTHING",
        )
        .bind(retailer_id)
        .bind(address)
        .execute(&mut *conn)
        .await?
        .rows_affected();

        inserted += rows_affected;
    }

    Ok(inserted)
}

/// Returns all addresses still lacking coordinates, ordered by id for a
/// stable backfill sequence.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_ungeocoded_addresses(pool: &PgPool) -> Result<Vec<RetailerAddressRow>, DbError> {
    let rows = sqlx::query_as::<_, RetailerAddressRow>(
        "SELECT id, retailer_id, address, latitude, longitude, created_at \
         FROM retailer_addresses \
         WHERE latitude IS NULL OR longitude IS NULL \
         ORDER BY id",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Stores resolved coordinates for one address row.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no row exists with the given `id`, or
/// [`DbError::Sqlx`] if the update fails.
pub async fn update_address_coordinates(
    pool: &PgPool,
    id: i64,
    latitude: f64,
    longitude: f64,
) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE retailer_addresses \
         SET latitude = $1::numeric(9,6), longitude = $2::numeric(9,6) \
         WHERE id = $3",
    )
    .bind(latitude)
    .bind(longitude)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::NotFound);
    }

    Ok(())
}
