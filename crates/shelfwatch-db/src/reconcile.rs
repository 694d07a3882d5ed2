//! The catalog reconciler.
//!
//! Takes a retailer's full normalized listing set and applies the upsert
//! protocol inside a single all-or-nothing transaction: resolve-or-create
//! the retailer and its addresses, then per listing resolve-or-create the
//! product, upsert the (product, retailer) offer, and append a price-history
//! row whenever a stored price actually changes. A failure anywhere rolls
//! the entire retailer back — the catalog never holds a partially applied
//! retailer contribution.
//!
//! Every write path into the catalog goes through this module: live scrapes,
//! backup-snapshot replays, and synthetic competitor seeding all share the
//! same transaction and the same invariants.

use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};

use shelfwatch_core::{CompetitorProfile, NormalizedListing, RetailerProfile};

use crate::catalog::{
    get_offer, insert_offer, insert_price_history, resolve_or_create_product, update_offer,
};
use crate::retailers::{ensure_addresses, resolve_or_create_retailer};
use crate::DbError;

/// The retailer-side inputs of a reconciliation, independent of whether the
/// listings came from a scrape profile or a competitor seed.
#[derive(Debug, Clone)]
pub struct RetailerContext {
    pub name: String,
    pub website_url: Option<String>,
    pub addresses: Vec<String>,
    pub category_id: i64,
}

impl From<&RetailerProfile> for RetailerContext {
    fn from(profile: &RetailerProfile) -> Self {
        Self {
            name: profile.name.clone(),
            website_url: Some(profile.website_url.clone()),
            addresses: profile.addresses.clone(),
            category_id: profile.category_id,
        }
    }
}

impl From<&CompetitorProfile> for RetailerContext {
    fn from(profile: &CompetitorProfile) -> Self {
        Self {
            name: profile.name.clone(),
            website_url: None,
            addresses: profile.addresses.clone(),
            category_id: profile.category_id,
        }
    }
}

/// Counters describing what one reconciliation changed.
#[derive(Debug, Default, Clone, Copy)]
pub struct ReconcileOutcome {
    pub listings_applied: i32,
    pub products_created: i32,
    pub offers_created: i32,
    pub offers_updated: i32,
    pub price_changes: i32,
}

/// Applies a retailer's listing set to the catalog in one transaction.
///
/// # Errors
///
/// Returns [`DbError`] if any statement fails; the transaction is rolled
/// back and the retailer contributes no rows for this run.
pub async fn reconcile_retailer(
    pool: &PgPool,
    context: &RetailerContext,
    listings: &[NormalizedListing],
) -> Result<ReconcileOutcome, DbError> {
    let mut tx = pool.begin().await?;

    let (retailer_id, retailer_created) =
        resolve_or_create_retailer(&mut tx, &context.name, context.website_url.as_deref()).await?;
    if retailer_created {
        tracing::info!(retailer = %context.name, retailer_id, "created retailer");
    }

    ensure_addresses(&mut tx, retailer_id, &context.addresses).await?;

    let mut outcome = ReconcileOutcome::default();

    for listing in listings {
        apply_listing(&mut tx, retailer_id, context.category_id, listing, &mut outcome).await?;
    }

    tx.commit().await?;

    tracing::info!(
        retailer = %context.name,
        listings = outcome.listings_applied,
        products_created = outcome.products_created,
        offers_created = outcome.offers_created,
        offers_updated = outcome.offers_updated,
        price_changes = outcome.price_changes,
        "reconciliation committed"
    );

    Ok(outcome)
}

/// Applies one listing inside the retailer's transaction.
async fn apply_listing(
    conn: &mut PgConnection,
    retailer_id: i64,
    category_id: i64,
    listing: &NormalizedListing,
    outcome: &mut ReconcileOutcome,
) -> Result<(), DbError> {
    let (product_id, product_created) = resolve_or_create_product(
        conn,
        &listing.normalized_name,
        category_id,
        listing.image_url.as_deref(),
    )
    .await?;
    if product_created {
        outcome.products_created += 1;
    }

    match get_offer(conn, product_id, retailer_id).await? {
        None => {
            insert_offer(
                conn,
                product_id,
                retailer_id,
                listing.price,
                &listing.raw_name,
                listing.product_url.as_deref(),
            )
            .await?;
            outcome.offers_created += 1;
        }
        Some(existing) => {
            // Exact decimal comparison; both sides carry scale 2 from the
            // parser and the NUMERIC(12,2) column.
            if existing.price != listing.price {
                update_offer(
                    conn,
                    existing.id,
                    listing.price,
                    &listing.raw_name,
                    listing.product_url.as_deref(),
                )
                .await?;
                outcome.offers_updated += 1;

                if let (Some(old_price), Some(new_price)) = (existing.price, listing.price) {
                    insert_price_history(conn, product_id, old_price, new_price).await?;
                    outcome.price_changes += 1;
                }
            }
            // Identical price: leave the row untouched. No history entry is
            // fabricated and updated_at does not churn.
        }
    }

    outcome.listings_applied += 1;
    Ok(())
}

/// Applies a uniform price variance to a base price, for synthetic offers.
/// Kept here so seeding shares the reconciler's decimal conventions.
#[must_use]
pub(crate) fn vary_price(base: Decimal, factor: Decimal) -> Decimal {
    let mut varied = (base * factor)
        .round_dp_with_strategy(2, rust_decimal::RoundingStrategy::MidpointAwayFromZero);
    varied.rescale(2);
    varied
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn vary_price_rescales_to_two_places() {
        let base = Decimal::from_str("500.00").unwrap();
        let factor = Decimal::from_str("1.1").unwrap();
        assert_eq!(vary_price(base, factor).to_string(), "550.00");
    }

    #[test]
    fn vary_price_rounds_half_away_from_zero() {
        let base = Decimal::from_str("10.01").unwrap();
        let factor = Decimal::from_str("0.5").unwrap();
        // 5.005 → 5.01
        assert_eq!(vary_price(base, factor).to_string(), "5.01");
    }

    #[test]
    fn retailer_context_from_scrape_profile_carries_website() {
        let profile = RetailerProfile {
            name: "CoolMarket".to_string(),
            website_url: "https://www.coolmarket.com".to_string(),
            listing_url: "https://www.coolmarket.com/groceries.html".to_string(),
            addresses: vec!["Online Only".to_string()],
            category_id: 1,
            backup_snapshot: None,
            selectors: shelfwatch_core::SelectorSet::default(),
        };
        let context = RetailerContext::from(&profile);
        assert_eq!(context.name, "CoolMarket");
        assert_eq!(
            context.website_url.as_deref(),
            Some("https://www.coolmarket.com")
        );
    }

    #[test]
    fn retailer_context_from_competitor_has_no_website() {
        let competitor = CompetitorProfile {
            name: "Sovereign Supermarket".to_string(),
            addresses: vec!["106 Hope Road, Kingston 6".to_string()],
            category_id: 1,
        };
        let context = RetailerContext::from(&competitor);
        assert!(context.website_url.is_none());
        assert_eq!(context.addresses.len(), 1);
    }
}
