//! The ingestion run orchestrator.
//!
//! Iterates the configured retailer profiles with bounded concurrency and
//! per-profile isolation: each profile scrapes, falls back to its backup
//! snapshot on scrape failure or an empty result, and reconciles inside its
//! own transaction. No profile's failure aborts the run — the run always
//! completes with a per-profile outcome report, persisted to the run ledger
//! and printed.

mod profile;

use std::time::{Duration, Instant};

use futures::stream::{self, StreamExt};

use shelfwatch_core::{AppConfig, RetailerProfile};
use shelfwatch_scraper::PageClient;

use profile::{ingest_profile, ProfileOutcome};

/// Runs one ingestion pass over the configured profiles.
///
/// When `retailer_filter` is `Some(name)`, only that profile runs; an
/// unknown name is an error. `dry_run` prints the would-be plan and exits
/// without scraping or writing.
///
/// # Errors
///
/// Returns an error if configuration cannot be loaded, the page client
/// cannot be constructed, or the run ledger cannot be created. Per-profile
/// scrape/reconcile failures are recorded and skipped, not propagated.
pub(crate) async fn run_ingest(
    pool: &sqlx::PgPool,
    config: &AppConfig,
    retailer_filter: Option<&str>,
    dry_run: bool,
) -> anyhow::Result<()> {
    let retailers_file = shelfwatch_core::load_retailers(&config.retailers_path)?;
    let profiles = select_profiles(retailers_file.retailers, retailer_filter)?;

    if profiles.is_empty() {
        println!("no retailer profiles configured; skipping run creation");
        return Ok(());
    }

    if dry_run {
        let names: Vec<&str> = profiles.iter().map(|p| p.name.as_str()).collect();
        println!(
            "dry-run: would ingest {} retailers: [{}]",
            profiles.len(),
            names.join(", ")
        );
        return Ok(());
    }

    let client = PageClient::new(
        config.scraper_request_timeout_secs,
        &config.scraper_user_agent,
    )?;

    let run = shelfwatch_db::create_ingestion_run(pool, "cli").await?;
    if let Err(e) = shelfwatch_db::start_ingestion_run(pool, run.id).await {
        fail_run_best_effort(pool, run.id, &format!("{e:#}")).await;
        return Err(e.into());
    }

    let deadline = Instant::now() + Duration::from_secs(config.ingest_run_timeout_secs);
    let max_concurrent = config.scraper_max_concurrent_retailers.max(1);

    let results: Vec<(String, ProfileOutcome)> = stream::iter(&profiles)
        .map(|p| {
            let client = &client;
            async move {
                let outcome = ingest_profile(pool, client, config, run.id, p, deadline).await;
                (p.name.clone(), outcome)
            }
        })
        .buffer_unordered(max_concurrent)
        .collect()
        .await;

    let total_listings: i32 = results
        .iter()
        .fold(0i32, |acc, (_, outcome)| {
            acc.saturating_add(outcome.listings())
        });
    let skipped = results
        .iter()
        .filter(|(_, outcome)| matches!(outcome, ProfileOutcome::Skipped { .. }))
        .count();

    if skipped > 0 {
        tracing::warn!(
            skipped,
            total_profiles = profiles.len(),
            "some retailers were skipped during ingestion"
        );
    }

    if let Err(e) = shelfwatch_db::complete_ingestion_run(pool, run.id, total_listings).await {
        fail_run_best_effort(pool, run.id, &format!("{e:#}")).await;
        return Err(e.into());
    }

    for (name, outcome) in &results {
        println!("  {name}: {outcome}");
    }
    println!(
        "ingested {total_listings} listings across {} retailers ({skipped} skipped)",
        profiles.len()
    );
    Ok(())
}

/// Applies the optional `--retailer` filter against profile names.
fn select_profiles(
    profiles: Vec<RetailerProfile>,
    retailer_filter: Option<&str>,
) -> anyhow::Result<Vec<RetailerProfile>> {
    let Some(filter) = retailer_filter else {
        return Ok(profiles);
    };

    let selected: Vec<RetailerProfile> = profiles
        .into_iter()
        .filter(|p| p.name.eq_ignore_ascii_case(filter))
        .collect();

    if selected.is_empty() {
        anyhow::bail!("retailer '{filter}' is not configured; check config/retailers.yaml");
    }
    Ok(selected)
}

/// Marks a run as failed, logging rather than propagating any ledger error:
/// the original failure is what the caller needs to surface.
async fn fail_run_best_effort(pool: &sqlx::PgPool, run_id: i64, message: &str) {
    if let Err(mark_err) = shelfwatch_db::fail_ingestion_run(pool, run_id, message).await {
        tracing::error!(
            run_id,
            error = %mark_err,
            "failed to record run failure — ledger is out of date"
        );
    }
}

#[cfg(test)]
#[path = "ingest_test.rs"]
mod tests;
