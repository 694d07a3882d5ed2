//! Per-profile ingestion: scrape → backup fallback → reconcile.

use std::time::Instant;

use shelfwatch_core::{AppConfig, NormalizedListing, RawListing, RetailerProfile};
use shelfwatch_db::{reconcile_retailer, RetailerContext};
use shelfwatch_scraper::{collect_listings, load_backup_snapshot, normalize_listing, PageClient};

/// Outcome of processing a single retailer profile.
#[derive(Debug)]
pub(crate) enum ProfileOutcome {
    /// Live scrape succeeded and reconciled `listings` listings.
    Succeeded { listings: i32 },
    /// Live scrape failed or was empty; the backup snapshot reconciled
    /// `listings` listings instead.
    SucceededFromBackup { listings: i32 },
    /// Nothing was reconciled for this profile this run.
    Skipped { reason: String },
}

impl ProfileOutcome {
    pub(crate) fn status(&self) -> &'static str {
        match self {
            ProfileOutcome::Succeeded { .. } => "succeeded",
            ProfileOutcome::SucceededFromBackup { .. } => "succeeded_from_backup",
            ProfileOutcome::Skipped { .. } => "skipped",
        }
    }

    pub(crate) fn source(&self) -> Option<&'static str> {
        match self {
            ProfileOutcome::Succeeded { .. } => Some("live"),
            ProfileOutcome::SucceededFromBackup { .. } => Some("backup"),
            ProfileOutcome::Skipped { .. } => None,
        }
    }

    pub(crate) fn listings(&self) -> i32 {
        match self {
            ProfileOutcome::Succeeded { listings }
            | ProfileOutcome::SucceededFromBackup { listings } => *listings,
            ProfileOutcome::Skipped { .. } => 0,
        }
    }

    fn reason(&self) -> Option<&str> {
        match self {
            ProfileOutcome::Skipped { reason } => Some(reason),
            _ => None,
        }
    }
}

impl std::fmt::Display for ProfileOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProfileOutcome::Succeeded { listings } => write!(f, "succeeded ({listings} listings)"),
            ProfileOutcome::SucceededFromBackup { listings } => {
                write!(f, "succeeded from backup ({listings} listings)")
            }
            ProfileOutcome::Skipped { reason } => write!(f, "skipped — {reason}"),
        }
    }
}

/// Processes one retailer profile and records its outcome in the run
/// ledger. Never returns an error: every failure mode collapses into
/// [`ProfileOutcome::Skipped`] so sibling profiles are unaffected.
pub(crate) async fn ingest_profile(
    pool: &sqlx::PgPool,
    client: &PageClient,
    config: &AppConfig,
    run_id: i64,
    profile: &RetailerProfile,
    deadline: Instant,
) -> ProfileOutcome {
    let outcome = ingest_profile_inner(pool, client, config, profile, deadline).await;

    if let Err(e) = shelfwatch_db::upsert_run_retailer(
        pool,
        run_id,
        &profile.name,
        outcome.status(),
        outcome.source(),
        Some(outcome.listings()),
        outcome.reason(),
    )
    .await
    {
        tracing::error!(
            retailer = %profile.name,
            run_id,
            error = %e,
            "catalog updated but outcome row not recorded — run report incomplete"
        );
    }

    outcome
}

async fn ingest_profile_inner(
    pool: &sqlx::PgPool,
    client: &PageClient,
    config: &AppConfig,
    profile: &RetailerProfile,
    deadline: Instant,
) -> ProfileOutcome {
    let remaining = deadline.saturating_duration_since(Instant::now());
    if remaining.is_zero() {
        tracing::warn!(retailer = %profile.name, "run timeout exceeded before profile started");
        return ProfileOutcome::Skipped {
            reason: "run timeout exceeded before profile started".to_string(),
        };
    }

    // The whole pagination loop runs under the remaining run budget;
    // abandoning it mid-loop is safe because nothing is committed until
    // reconciliation.
    let scraped = tokio::time::timeout(
        remaining,
        collect_listings(
            client,
            profile,
            config.scraper_page_cap,
            config.scraper_inter_page_delay_ms,
        ),
    )
    .await;

    let live_listings = match scraped {
        Ok(Ok(listings)) if !listings.is_empty() => Some(listings),
        Ok(Ok(_)) => {
            tracing::warn!(retailer = %profile.name, "scrape returned no listings");
            None
        }
        Ok(Err(e)) => {
            tracing::warn!(retailer = %profile.name, error = %e, "scrape failed");
            None
        }
        Err(_) => {
            tracing::warn!(retailer = %profile.name, "run timeout elapsed during pagination");
            None
        }
    };

    match live_listings {
        Some(raw) => match reconcile_raw(pool, profile, raw).await {
            Ok(listings) => ProfileOutcome::Succeeded { listings },
            Err(e) => skip(profile, format!("reconciliation failed: {e:#}")),
        },
        None => fallback_to_backup(pool, profile).await,
    }
}

/// The backup-fallback policy: on scrape failure or an empty scrape, replay
/// the profile's snapshot through the same reconciliation path. A missing
/// or unreadable snapshot skips the profile.
async fn fallback_to_backup(pool: &sqlx::PgPool, profile: &RetailerProfile) -> ProfileOutcome {
    let Some(path) = &profile.backup_snapshot else {
        return skip(profile, "scrape failed and no backup snapshot configured".to_string());
    };

    match load_backup_snapshot(path) {
        Ok(raw) if raw.is_empty() => skip(profile, "backup snapshot is empty".to_string()),
        Ok(raw) => {
            tracing::info!(
                retailer = %profile.name,
                snapshot = %path.display(),
                listings = raw.len(),
                "reconciling from backup snapshot"
            );
            match reconcile_raw(pool, profile, raw).await {
                Ok(listings) => ProfileOutcome::SucceededFromBackup { listings },
                Err(e) => skip(profile, format!("backup reconciliation failed: {e:#}")),
            }
        }
        Err(e) => skip(profile, format!("backup snapshot unreadable: {e}")),
    }
}

/// Normalizes the raw listings (dropping the unnormalizable ones) and runs
/// the reconciler transaction.
async fn reconcile_raw(
    pool: &sqlx::PgPool,
    profile: &RetailerProfile,
    raw: Vec<RawListing>,
) -> anyhow::Result<i32> {
    let normalized: Vec<NormalizedListing> = raw
        .into_iter()
        .filter_map(|listing| match normalize_listing(listing) {
            Ok(normalized) => Some(normalized),
            Err(e) => {
                tracing::warn!(
                    retailer = %profile.name,
                    error = %e,
                    "skipping listing — normalization failed"
                );
                None
            }
        })
        .collect();

    let context = RetailerContext::from(profile);
    let outcome = reconcile_retailer(pool, &context, &normalized).await?;
    Ok(outcome.listings_applied)
}

fn skip(profile: &RetailerProfile, reason: String) -> ProfileOutcome {
    tracing::warn!(retailer = %profile.name, reason = %reason, "profile skipped");
    ProfileOutcome::Skipped { reason }
}

#[cfg(test)]
#[path = "profile_test.rs"]
mod tests;
