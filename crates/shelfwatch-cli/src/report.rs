//! `runs` command handler: the operator-facing run outcome report.

/// Prints the most recent ingestion runs with their per-retailer outcomes.
///
/// # Errors
///
/// Returns an error if the ledger queries fail.
pub(crate) async fn run_report(pool: &sqlx::PgPool, limit: i64) -> anyhow::Result<()> {
    let runs = shelfwatch_db::list_ingestion_runs(pool, limit).await?;

    if runs.is_empty() {
        println!("no ingestion runs recorded");
        return Ok(());
    }

    for run in runs {
        println!(
            "run {} [{}] {} via {} — {} listings",
            run.id,
            run.status,
            run.created_at.format("%Y-%m-%d %H:%M:%S"),
            run.trigger_source,
            run.listings_processed,
        );
        if let Some(message) = &run.error_message {
            println!("  error: {message}");
        }

        for retailer in shelfwatch_db::list_run_retailers(pool, run.id).await? {
            let detail = retailer
                .error_message
                .map(|m| format!(" — {m}"))
                .unwrap_or_default();
            println!(
                "  {}: {} ({} listings){detail}",
                retailer.retailer_name, retailer.status, retailer.listings_processed,
            );
        }
    }

    Ok(())
}
