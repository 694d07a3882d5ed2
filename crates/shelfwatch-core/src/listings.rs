//! Shared listing types carried between the scraper and the reconciler.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One scraped item, exactly as extracted from a retailer's listing page.
///
/// This is also the on-disk shape of backup snapshot files: a JSON array of
/// these objects. `price` is the raw price string as captured (`"$500.00"`,
/// `"3 for $10.00"`, `"Call for price"`); parsing happens at normalization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawListing {
    pub name: String,
    #[serde(default)]
    pub price: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub product_url: Option<String>,
}

impl RawListing {
    /// The key used to deduplicate listings within a retailer's page set:
    /// the detail-page URL, falling back to the image URL. An item with
    /// neither cannot be deduplicated and is dropped by the extractor.
    #[must_use]
    pub fn dedup_key(&self) -> Option<&str> {
        self.product_url
            .as_deref()
            .filter(|u| !u.is_empty())
            .or_else(|| self.image_url.as_deref().filter(|u| !u.is_empty()))
    }
}

/// A listing after name normalization and price parsing, ready for
/// reconciliation. Both the live scrape path and supplementary seeding
/// paths produce these; the reconciler accepts nothing else.
#[derive(Debug, Clone)]
pub struct NormalizedListing {
    /// Canonical matching key; exactly one product row exists per value.
    pub normalized_name: String,
    /// The vendor's original name, preserved on the offer row.
    pub raw_name: String,
    /// Parsed price, rescaled to 2 fractional digits. `None` means the
    /// price string carried no recoverable amount — stored as NULL, never 0.
    pub price: Option<Decimal>,
    pub image_url: Option<String>,
    pub product_url: Option<String>,
}
