//! Database tests for the ingestion-run ledger and address backfill queries.

use sqlx::PgPool;

use shelfwatch_db::{
    complete_ingestion_run, create_ingestion_run, fail_ingestion_run, get_ingestion_run,
    list_ingestion_runs, list_run_retailers, list_ungeocoded_addresses, start_ingestion_run,
    update_address_coordinates, upsert_run_retailer, DbError,
};

#[sqlx::test(migrations = "../../migrations")]
async fn run_lifecycle_queued_running_completed(pool: PgPool) {
    let run = create_ingestion_run(&pool, "cli")
        .await
        .expect("create failed");
    assert_eq!(run.status, "queued");
    assert!(run.started_at.is_none());

    start_ingestion_run(&pool, run.id).await.expect("start failed");
    complete_ingestion_run(&pool, run.id, 240)
        .await
        .expect("complete failed");

    let fetched = get_ingestion_run(&pool, run.id).await.expect("get failed");
    assert_eq!(fetched.status, "completed");
    assert_eq!(fetched.listings_processed, 240);
    assert!(fetched.started_at.is_some());
    assert!(fetched.completed_at.is_some());
}

#[sqlx::test(migrations = "../../migrations")]
async fn completing_a_queued_run_is_an_invalid_transition(pool: PgPool) {
    let run = create_ingestion_run(&pool, "cli")
        .await
        .expect("create failed");

    let result = complete_ingestion_run(&pool, run.id, 0).await;
    assert!(
        matches!(
            result,
            Err(DbError::InvalidRunTransition {
                expected_status: "running",
                ..
            })
        ),
        "expected InvalidRunTransition, got: {result:?}"
    );
}

#[sqlx::test(migrations = "../../migrations")]
async fn starting_twice_is_an_invalid_transition(pool: PgPool) {
    let run = create_ingestion_run(&pool, "scheduler")
        .await
        .expect("create failed");
    start_ingestion_run(&pool, run.id).await.expect("start failed");

    let result = start_ingestion_run(&pool, run.id).await;
    assert!(matches!(result, Err(DbError::InvalidRunTransition { .. })));
}

#[sqlx::test(migrations = "../../migrations")]
async fn failing_a_running_run_records_the_message(pool: PgPool) {
    let run = create_ingestion_run(&pool, "cli")
        .await
        .expect("create failed");
    start_ingestion_run(&pool, run.id).await.expect("start failed");
    fail_ingestion_run(&pool, run.id, "ledger unavailable")
        .await
        .expect("fail failed");

    let fetched = get_ingestion_run(&pool, run.id).await.expect("get failed");
    assert_eq!(fetched.status, "failed");
    assert_eq!(fetched.error_message.as_deref(), Some("ledger unavailable"));
}

#[sqlx::test(migrations = "../../migrations")]
async fn run_retailer_rows_upsert_in_place(pool: PgPool) {
    let run = create_ingestion_run(&pool, "cli")
        .await
        .expect("create failed");

    upsert_run_retailer(&pool, run.id, "CoolMarket", "skipped", None, None, Some("timeout"))
        .await
        .expect("first upsert failed");
    // The same profile later succeeds from backup within the run.
    upsert_run_retailer(
        &pool,
        run.id,
        "CoolMarket",
        "succeeded_from_backup",
        Some("backup"),
        Some(80),
        None,
    )
    .await
    .expect("second upsert failed");

    let rows = list_run_retailers(&pool, run.id).await.expect("list failed");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].status, "succeeded_from_backup");
    assert_eq!(rows[0].source.as_deref(), Some("backup"));
    assert_eq!(rows[0].listings_processed, 80);
    assert!(rows[0].error_message.is_none());
}

#[sqlx::test(migrations = "../../migrations")]
async fn list_runs_returns_newest_first(pool: PgPool) {
    let first = create_ingestion_run(&pool, "cli")
        .await
        .expect("create failed");
    let second = create_ingestion_run(&pool, "scheduler")
        .await
        .expect("create failed");

    let runs = list_ingestion_runs(&pool, 10).await.expect("list failed");
    assert_eq!(runs.len(), 2);
    assert_eq!(runs[0].id, second.id);
    assert_eq!(runs[1].id, first.id);
}

#[sqlx::test(migrations = "../../migrations")]
async fn ungeocoded_addresses_are_listed_until_coordinates_arrive(pool: PgPool) {
    let retailer_id: i64 = sqlx::query_scalar(
        "INSERT INTO retailers (name) VALUES ('HiLo') RETURNING id",
    )
    .fetch_one(&pool)
    .await
    .expect("retailer insert failed");

    sqlx::query(
        "INSERT INTO retailer_addresses (retailer_id, address) \
         VALUES ($1, 'UWI Mona, Kingston 7'), ($1, 'Online Only')",
    )
    .bind(retailer_id)
    .execute(&pool)
    .await
    .expect("address insert failed");

    let pending = list_ungeocoded_addresses(&pool).await.expect("list failed");
    assert_eq!(pending.len(), 2);

    update_address_coordinates(&pool, pending[0].id, 18.006_245, -76.746_33)
        .await
        .expect("coordinate update failed");

    let pending = list_ungeocoded_addresses(&pool).await.expect("list failed");
    assert_eq!(pending.len(), 1);
}

#[sqlx::test(migrations = "../../migrations")]
async fn updating_coordinates_of_missing_address_is_not_found(pool: PgPool) {
    let result = update_address_coordinates(&pool, 424_242, 18.0, -76.8).await;
    assert!(matches!(result, Err(DbError::NotFound)));
}
