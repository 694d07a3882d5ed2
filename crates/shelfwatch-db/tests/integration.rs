//! Offline unit tests for shelfwatch-db pool configuration and row types.
//! These tests do not require a live database connection.

use shelfwatch_core::{AppConfig, Environment};
use shelfwatch_db::{IngestionRunRow, PoolConfig, ProductRow, RunRetailerRow};
use std::path::PathBuf;

fn make_app_config() -> AppConfig {
    AppConfig {
        database_url: "postgres://example".to_string(),
        env: Environment::Test,
        log_level: "info".to_string(),
        log_path: None,
        retailers_path: PathBuf::from("./config/retailers.yaml"),
        db_max_connections: 42,
        db_min_connections: 7,
        db_acquire_timeout_secs: 9,
        scraper_request_timeout_secs: 30,
        scraper_user_agent: "ua".to_string(),
        scraper_max_concurrent_retailers: 1,
        scraper_inter_page_delay_ms: 250,
        scraper_page_cap: 50,
        ingest_run_timeout_secs: 1800,
        geocode_endpoint: "https://nominatim.openstreetmap.org/search".to_string(),
        geocode_delay_ms: 1100,
    }
}

#[test]
fn pool_config_from_app_config_uses_core_values() {
    let pool_config = PoolConfig::from_app_config(&make_app_config());
    assert_eq!(pool_config.max_connections, 42);
    assert_eq!(pool_config.min_connections, 7);
    assert_eq!(pool_config.acquire_timeout_secs, 9);
}

/// Compile-time smoke test: confirm that [`IngestionRunRow`] has all
/// expected fields with the correct types. No database required.
#[test]
fn ingestion_run_row_has_expected_fields() {
    use chrono::Utc;
    use uuid::Uuid;

    let row = IngestionRunRow {
        id: 1_i64,
        public_id: Uuid::new_v4(),
        trigger_source: "cli".to_string(),
        status: "queued".to_string(),
        started_at: None,
        completed_at: None,
        listings_processed: 0_i32,
        error_message: None,
        created_at: Utc::now(),
    };

    assert_eq!(row.id, 1);
    assert_eq!(row.trigger_source, "cli");
    assert_eq!(row.status, "queued");
    assert!(row.started_at.is_none());
    assert!(row.completed_at.is_none());
    assert_eq!(row.listings_processed, 0);
    assert!(row.error_message.is_none());
}

/// Compile-time smoke test: confirm that [`ProductRow`] has all expected
/// fields with the correct types. No database required.
#[test]
fn product_row_has_expected_fields() {
    use chrono::Utc;

    let row = ProductRow {
        id: 42_i64,
        name: "best dressed chicken 1kg".to_string(),
        category_id: 1_i64,
        image_url: Some("https://cdn.example.com/chicken.jpg".to_string()),
        view_count: 0_i32,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    };

    assert_eq!(row.id, 42);
    assert_eq!(row.name, "best dressed chicken 1kg");
    assert_eq!(row.category_id, 1);
    assert_eq!(row.view_count, 0);
}

#[test]
fn run_retailer_row_has_expected_fields() {
    use chrono::Utc;

    let row = RunRetailerRow {
        id: 7_i64,
        ingestion_run_id: 1_i64,
        retailer_name: "CoolMarket".to_string(),
        status: "succeeded_from_backup".to_string(),
        source: Some("backup".to_string()),
        listings_processed: 120_i32,
        error_message: None,
        created_at: Utc::now(),
    };

    assert_eq!(row.retailer_name, "CoolMarket");
    assert_eq!(row.status, "succeeded_from_backup");
    assert_eq!(row.source.as_deref(), Some("backup"));
    assert_eq!(row.listings_processed, 120);
}
