//! `geocode` command handler.
//!
//! Backfills coordinates for retailer addresses that lack them. The
//! geocoding service allows roughly one request per second, so requests are
//! spaced by `geocode_delay_ms`; an address the service cannot resolve is
//! left un-geocoded and retried on the next backfill.

use std::time::Duration;

use shelfwatch_core::AppConfig;
use shelfwatch_scraper::Geocoder;

/// Addresses that name no physical place and must never be sent to the
/// geocoding service.
const NON_PHYSICAL_ADDRESSES: &[&str] = &["online only"];

/// Runs one geocoding backfill pass.
///
/// # Errors
///
/// Returns an error if the geocoder cannot be constructed or the pending
/// address list cannot be read. Per-address geocoding failures are logged
/// and skipped.
pub(crate) async fn run_geocode(pool: &sqlx::PgPool, config: &AppConfig) -> anyhow::Result<()> {
    let geocoder = Geocoder::new(
        &config.geocode_endpoint,
        config.scraper_request_timeout_secs,
        &config.scraper_user_agent,
    )?;

    let pending = shelfwatch_db::list_ungeocoded_addresses(pool).await?;
    println!("found {} addresses to geocode", pending.len());

    let mut resolved = 0usize;
    let mut unresolved = 0usize;
    let mut first_request = true;

    for row in &pending {
        if NON_PHYSICAL_ADDRESSES
            .iter()
            .any(|skip| row.address.eq_ignore_ascii_case(skip))
        {
            tracing::debug!(address = %row.address, "skipping non-physical address");
            continue;
        }

        if !first_request && config.geocode_delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(config.geocode_delay_ms)).await;
        }
        first_request = false;

        match geocoder.geocode(&row.address).await {
            Ok(Some(coords)) => {
                shelfwatch_db::update_address_coordinates(
                    pool,
                    row.id,
                    coords.latitude,
                    coords.longitude,
                )
                .await?;
                tracing::info!(
                    address = %row.address,
                    latitude = coords.latitude,
                    longitude = coords.longitude,
                    "address geocoded"
                );
                resolved += 1;
            }
            Ok(None) => {
                tracing::info!(address = %row.address, "no geocoding match");
                unresolved += 1;
            }
            Err(e) => {
                tracing::warn!(
                    address = %row.address,
                    error = %e,
                    "geocoding failed; leaving address un-geocoded"
                );
                unresolved += 1;
            }
        }
    }

    println!("geocoded {resolved} addresses ({unresolved} unresolved)");
    Ok(())
}
