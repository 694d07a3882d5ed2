use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub env: Environment,
    pub log_level: String,
    /// Optional secondary log sink. When set, everything written to the
    /// operational log stream is also appended to this file.
    pub log_path: Option<PathBuf>,
    pub retailers_path: PathBuf,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    /// Per-page fetch timeout. A page that exceeds it fails the profile's
    /// pagination rather than reading as "no more products".
    pub scraper_request_timeout_secs: u64,
    pub scraper_user_agent: String,
    pub scraper_max_concurrent_retailers: usize,
    pub scraper_inter_page_delay_ms: u64,
    /// Hard ceiling on pages fetched per retailer, regardless of content.
    pub scraper_page_cap: usize,
    /// Global budget for one ingestion run. Profiles still pending when it
    /// elapses are skipped; committed retailers are unaffected.
    pub ingest_run_timeout_secs: u64,
    pub geocode_endpoint: String,
    pub geocode_delay_ms: u64,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field("log_path", &self.log_path)
            .field("retailers_path", &self.retailers_path)
            .field("database_url", &"[redacted]")
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field(
                "scraper_request_timeout_secs",
                &self.scraper_request_timeout_secs,
            )
            .field("scraper_user_agent", &self.scraper_user_agent)
            .field(
                "scraper_max_concurrent_retailers",
                &self.scraper_max_concurrent_retailers,
            )
            .field(
                "scraper_inter_page_delay_ms",
                &self.scraper_inter_page_delay_ms,
            )
            .field("scraper_page_cap", &self.scraper_page_cap)
            .field("ingest_run_timeout_secs", &self.ingest_run_timeout_secs)
            .field("geocode_endpoint", &self.geocode_endpoint)
            .field("geocode_delay_ms", &self.geocode_delay_ms)
            .finish()
    }
}
