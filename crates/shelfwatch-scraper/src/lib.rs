pub mod backup;
pub mod client;
pub mod error;
pub mod extract;
pub mod geocode;
pub mod normalize;
pub mod pagination;
pub mod price;

pub use backup::load_backup_snapshot;
pub use client::{FetchedPage, PageClient};
pub use error::ScraperError;
pub use extract::extract_listings;
pub use geocode::{Coordinates, Geocoder};
pub use normalize::{normalize_listing, normalize_name};
pub use pagination::collect_listings;
pub use price::parse_price;
