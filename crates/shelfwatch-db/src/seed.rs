//! Synthetic competitor offers.
//!
//! Some configured retailers have no scrapeable storefront (walk-in
//! supermarkets). To keep price comparison useful, each gets offers for a
//! random sample of already-cataloged products at a price within ±15% of
//! the cheapest live offer. The synthetic listings are routed through the
//! same reconciler transaction as scraped listings, so every catalog
//! invariant (unique natural keys, offer upsert semantics, history on real
//! change) holds for seeded data too.

use rand::Rng;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use sqlx::PgPool;

use shelfwatch_core::{CompetitorProfile, NormalizedListing};

use crate::reconcile::{reconcile_retailer, vary_price, RetailerContext};
use crate::DbError;

/// Price variance band applied to the base price.
const MIN_VARIANCE: f64 = 0.85;
const MAX_VARIANCE: f64 = 1.15;

#[derive(Debug, Default, Clone, Copy)]
pub struct CompetitorSeedOutcome {
    pub competitors: usize,
    pub offers_created: i32,
    pub offers_updated: i32,
}

/// A sampled product with the cheapest live price as the variance base.
#[derive(Debug, sqlx::FromRow)]
struct SampledProduct {
    name: String,
    base_price: Decimal,
}

/// Assigns synthetic offers to each configured competitor.
///
/// Samples up to `offers_per_competitor` products that (a) have at least
/// one priced live offer and (b) are not yet offered by the competitor,
/// then reconciles them as normalized listings.
///
/// # Errors
///
/// Returns [`DbError`] if sampling or reconciliation fails. A failing
/// competitor aborts only its own transaction; earlier competitors stay
/// committed.
pub async fn seed_competitor_offers(
    pool: &PgPool,
    competitors: &[CompetitorProfile],
    offers_per_competitor: i64,
) -> Result<CompetitorSeedOutcome, DbError> {
    let mut outcome = CompetitorSeedOutcome::default();

    for competitor in competitors {
        let sampled = sample_products(pool, &competitor.name, offers_per_competitor).await?;
        if sampled.is_empty() {
            tracing::info!(
                competitor = %competitor.name,
                "no unassigned priced products to sample; skipping"
            );
            continue;
        }

        let listings: Vec<NormalizedListing> = {
            let mut rng = rand::rng();
            sampled
                .into_iter()
                .map(|product| {
                    let factor = rng.random_range(MIN_VARIANCE..=MAX_VARIANCE);
                    let factor = Decimal::from_f64(factor).unwrap_or(Decimal::ONE);
                    NormalizedListing {
                        normalized_name: product.name.clone(),
                        raw_name: product.name,
                        price: Some(vary_price(product.base_price, factor)),
                        image_url: None,
                        product_url: None,
                    }
                })
                .collect()
        };

        let context = RetailerContext::from(competitor);
        let reconciled = reconcile_retailer(pool, &context, &listings).await?;

        outcome.competitors += 1;
        outcome.offers_created += reconciled.offers_created;
        outcome.offers_updated += reconciled.offers_updated;
    }

    Ok(outcome)
}

/// Samples random products with a priced live offer that the competitor
/// does not already carry.
async fn sample_products(
    pool: &PgPool,
    competitor_name: &str,
    limit: i64,
) -> Result<Vec<SampledProduct>, DbError> {
    let rows = sqlx::query_as::<_, SampledProduct>(
        "SELECT p.name, MIN(o.price) AS base_price \
         FROM products p \
         JOIN product_offers o ON o.product_id = p.id \
         WHERE o.price IS NOT NULL \
           AND NOT EXISTS ( \
               SELECT 1 FROM product_offers po \
               JOIN retailers r ON r.id = po.retailer_id \
               WHERE po.product_id = p.id AND r.name = $1 \
           ) \
         GROUP BY p.id, p.name \
         ORDER BY random() \
         LIMIT $2",
    )
    .bind(competitor_name)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
