//! Database operations for `ingestion_runs` and `ingestion_run_retailers`.
//!
//! The run ledger is the durable form of the orchestrator's per-profile
//! report: one row per run, one row per (run, retailer) with the profile's
//! outcome. Status transitions are guarded so a crashed orchestrator cannot
//! double-complete a run.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// A row from the `ingestion_runs` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct IngestionRunRow {
    pub id: i64,
    pub public_id: Uuid,
    /// What started the run: `"cli"` or `"scheduler"`.
    pub trigger_source: String,
    pub status: String,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub listings_processed: i32,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A row from the `ingestion_run_retailers` table.
///
/// Keyed by the profile's retailer *name* rather than a retailer FK: a
/// profile that fails before its retailer row exists still gets an outcome
/// row.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RunRetailerRow {
    pub id: i64,
    pub ingestion_run_id: i64,
    pub retailer_name: String,
    /// `"succeeded"`, `"succeeded_from_backup"`, or `"skipped"`.
    pub status: String,
    /// Where the listings came from: `"live"`, `"backup"`, or `"seed"`.
    pub source: Option<String>,
    pub listings_processed: i32,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// ingestion_runs operations
// ---------------------------------------------------------------------------

/// Creates a new ingestion run in `queued` status.
///
/// Generates a UUID in Rust and binds it to `public_id`. Returns the full
/// newly-created row.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert or fetch fails.
pub async fn create_ingestion_run(
    pool: &PgPool,
    trigger_source: &str,
) -> Result<IngestionRunRow, DbError> {
    let public_id = Uuid::new_v4();

    let row = sqlx::query_as::<_, IngestionRunRow>(
        "INSERT INTO ingestion_runs (public_id, trigger_source, status) \
         VALUES ($1, $2, 'queued') \
         RETURNING id, public_id, trigger_source, status, \
                   started_at, completed_at, listings_processed, error_message, created_at",
    )
    .bind(public_id)
    .bind(trigger_source)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Marks a run as `running` and sets `started_at = NOW()`.
///
/// # Errors
///
/// Returns [`DbError::InvalidRunTransition`] if the run is not `queued`, or
/// [`DbError::Sqlx`] if the update fails.
pub async fn start_ingestion_run(pool: &PgPool, id: i64) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE ingestion_runs \
         SET status = 'running', started_at = NOW() \
         WHERE id = $1 AND status = 'queued'",
    )
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::InvalidRunTransition {
            id,
            expected_status: "queued",
        });
    }

    Ok(())
}

/// Marks a run as `completed`, sets `completed_at = NOW()` and the total
/// listings processed across all profiles.
///
/// A run completes even when every profile was skipped — profile failures
/// live in the per-retailer rows, never in the run status.
///
/// # Errors
///
/// Returns [`DbError::InvalidRunTransition`] if the run is not `running`,
/// or [`DbError::Sqlx`] if the update fails.
pub async fn complete_ingestion_run(
    pool: &PgPool,
    id: i64,
    listings_processed: i32,
) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE ingestion_runs \
         SET status = 'completed', completed_at = NOW(), listings_processed = $1 \
         WHERE id = $2 AND status = 'running'",
    )
    .bind(listings_processed)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::InvalidRunTransition {
            id,
            expected_status: "running",
        });
    }

    Ok(())
}

/// Marks a run as `failed` with an error message. Reserved for run-level
/// machinery faults (e.g. the ledger itself unavailable mid-run); profile
/// failures never fail a run.
///
/// # Errors
///
/// Returns [`DbError::InvalidRunTransition`] if the run is not `running`,
/// or [`DbError::Sqlx`] if the update fails.
pub async fn fail_ingestion_run(
    pool: &PgPool,
    id: i64,
    error_message: &str,
) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE ingestion_runs \
         SET status = 'failed', completed_at = NOW(), error_message = $1 \
         WHERE id = $2 AND status = 'running'",
    )
    .bind(error_message)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::InvalidRunTransition {
            id,
            expected_status: "running",
        });
    }

    Ok(())
}

/// Fetches a single run by its internal `id`.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no row exists with the given `id`, or
/// [`DbError::Sqlx`] if the query fails.
pub async fn get_ingestion_run(pool: &PgPool, id: i64) -> Result<IngestionRunRow, DbError> {
    let row = sqlx::query_as::<_, IngestionRunRow>(
        "SELECT id, public_id, trigger_source, status, \
                started_at, completed_at, listings_processed, error_message, created_at \
         FROM ingestion_runs \
         WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)?;

    Ok(row)
}

/// Returns the most recent `limit` runs, ordered by `created_at DESC`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_ingestion_runs(
    pool: &PgPool,
    limit: i64,
) -> Result<Vec<IngestionRunRow>, DbError> {
    let rows = sqlx::query_as::<_, IngestionRunRow>(
        "SELECT id, public_id, trigger_source, status, \
                started_at, completed_at, listings_processed, error_message, created_at \
         FROM ingestion_runs \
         ORDER BY created_at DESC, id DESC \
         LIMIT $1",
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

// ---------------------------------------------------------------------------
// ingestion_run_retailers operations
// ---------------------------------------------------------------------------

/// Inserts or updates the per-retailer outcome row for a run.
///
/// Conflicts on `(ingestion_run_id, retailer_name)` update `status`,
/// `source`, `listings_processed`, and `error_message` in place.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails.
pub async fn upsert_run_retailer(
    pool: &PgPool,
    run_id: i64,
    retailer_name: &str,
    status: &str,
    source: Option<&str>,
    listings_processed: Option<i32>,
    error_message: Option<&str>,
) -> Result<(), DbError> {
    sqlx::query(
        "INSERT INTO ingestion_run_retailers \
             (ingestion_run_id, retailer_name, status, source, listings_processed, error_message) \
         VALUES ($1, $2, $3, $4, COALESCE($5, 0), $6) \
         ON CONFLICT (ingestion_run_id, retailer_name) DO UPDATE SET \
             status            = EXCLUDED.status, \
             source            = EXCLUDED.source, \
             listings_processed = EXCLUDED.listings_processed, \
             error_message     = EXCLUDED.error_message",
    )
    .bind(run_id)
    .bind(retailer_name)
    .bind(status)
    .bind(source)
    .bind(listings_processed)
    .bind(error_message)
    .execute(pool)
    .await?;

    Ok(())
}

/// Returns all per-retailer outcome rows for a given run.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_run_retailers(pool: &PgPool, run_id: i64) -> Result<Vec<RunRetailerRow>, DbError> {
    let rows = sqlx::query_as::<_, RunRetailerRow>(
        "SELECT id, ingestion_run_id, retailer_name, status, source, \
                listings_processed, error_message, created_at \
         FROM ingestion_run_retailers \
         WHERE ingestion_run_id = $1 \
         ORDER BY retailer_name",
    )
    .bind(run_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
