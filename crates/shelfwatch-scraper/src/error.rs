use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("page not found: {url}")]
    NotFound { url: String },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("failed to read local document {path}: {source}")]
    Document {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read backup snapshot {path}: {source}")]
    BackupIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("backup snapshot {path} is not valid JSON: {source}")]
    BackupParse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("normalization error for listing \"{raw_name}\": {reason}")]
    Normalization { raw_name: String, reason: String },

    #[error("geocoding response for \"{address}\" could not be parsed: {source}")]
    GeocodeParse {
        address: String,
        #[source]
        source: serde_json::Error,
    },
}
