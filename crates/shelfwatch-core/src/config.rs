use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files — useful for testing
/// or when the caller manages env setup.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// This is the core parsing/validation logic, decoupled from the actual environment
/// so it can be tested with a pure `HashMap` lookup — no `set_var`/`remove_var` needed.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<usize>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let database_url = require("DATABASE_URL")?;

    let env = parse_environment(&or_default("SHELFWATCH_ENV", "development"));

    let log_level = or_default("SHELFWATCH_LOG_LEVEL", "info");
    let log_path = lookup("SHELFWATCH_LOG_PATH").ok().map(PathBuf::from);
    let retailers_path = PathBuf::from(or_default(
        "SHELFWATCH_RETAILERS_PATH",
        "./config/retailers.yaml",
    ));

    let db_max_connections = parse_u32("SHELFWATCH_DB_MAX_CONNECTIONS", "10")?;
    let db_min_connections = parse_u32("SHELFWATCH_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_u64("SHELFWATCH_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    let scraper_request_timeout_secs = parse_u64("SHELFWATCH_SCRAPER_REQUEST_TIMEOUT_SECS", "30")?;
    let scraper_user_agent = or_default(
        "SHELFWATCH_SCRAPER_USER_AGENT",
        "shelfwatch/0.1 (price-comparison)",
    );
    let scraper_max_concurrent_retailers =
        parse_usize("SHELFWATCH_SCRAPER_MAX_CONCURRENT_RETAILERS", "1")?;
    let scraper_inter_page_delay_ms = parse_u64("SHELFWATCH_SCRAPER_INTER_PAGE_DELAY_MS", "250")?;
    let scraper_page_cap = parse_usize("SHELFWATCH_SCRAPER_PAGE_CAP", "50")?;

    let ingest_run_timeout_secs = parse_u64("SHELFWATCH_INGEST_RUN_TIMEOUT_SECS", "1800")?;

    let geocode_endpoint = or_default(
        "SHELFWATCH_GEOCODE_ENDPOINT",
        "https://nominatim.openstreetmap.org/search",
    );
    let geocode_delay_ms = parse_u64("SHELFWATCH_GEOCODE_DELAY_MS", "1100")?;

    Ok(AppConfig {
        database_url,
        env,
        log_level,
        log_path,
        retailers_path,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        scraper_request_timeout_secs,
        scraper_user_agent,
        scraper_max_concurrent_retailers,
        scraper_inter_page_delay_ms,
        scraper_page_cap,
        ingest_run_timeout_secs,
        geocode_endpoint,
        geocode_delay_ms,
    })
}

/// Parse a string into an `Environment` variant.
///
/// Unrecognized values default to `Environment::Development`.
fn parse_environment(s: &str) -> Environment {
    match s {
        "production" => Environment::Production,
        "test" => Environment::Test,
        _ => Environment::Development,
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
