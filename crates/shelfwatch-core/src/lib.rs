use thiserror::Error;

pub mod app_config;
pub mod config;
pub mod listings;
pub mod retailers;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use listings::{NormalizedListing, RawListing};
pub use retailers::{
    load_retailers, CompetitorProfile, RetailerProfile, RetailersFile, SelectorSet,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read retailers file {path}: {source}")]
    RetailersFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse retailers file: {0}")]
    RetailersFileParse(#[from] serde_yaml::Error),

    #[error("retailers config validation failed: {0}")]
    Validation(String),
}
