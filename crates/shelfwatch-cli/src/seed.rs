//! `seed-competitors` command handler.

use shelfwatch_core::AppConfig;

/// Assigns synthetic offers to the competitors configured in the retailers
/// file, routing them through the standard reconciliation path.
///
/// # Errors
///
/// Returns an error if configuration cannot be loaded or seeding fails.
pub(crate) async fn run_seed(
    pool: &sqlx::PgPool,
    config: &AppConfig,
    offers_per_competitor: i64,
) -> anyhow::Result<()> {
    let retailers_file = shelfwatch_core::load_retailers(&config.retailers_path)?;

    if retailers_file.competitors.is_empty() {
        println!("no competitors configured; nothing to seed");
        return Ok(());
    }

    let outcome = shelfwatch_db::seed_competitor_offers(
        pool,
        &retailers_file.competitors,
        offers_per_competitor,
    )
    .await?;

    println!(
        "seeded {} offers across {} competitors ({} updated)",
        outcome.offers_created, outcome.competitors, outcome.offers_updated
    );
    Ok(())
}
