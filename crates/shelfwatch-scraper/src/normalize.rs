//! Product-name normalization.
//!
//! Distinct vendor spellings of the same product must land on the same
//! canonical matching key: `"BDF Chicken Breast (Frozen) Tray"` and
//! `"bdf chicken breast frozen tray"` both normalize to
//! `"best dressed chicken breast"`. The normalized name is the unique
//! lookup/creation key for product rows, so this function must be pure and
//! deterministic — re-running ingestion over identical data may never mint
//! a second key for the same input.

use std::sync::LazyLock;

use regex::Regex;

use shelfwatch_core::{NormalizedListing, RawListing};

use crate::error::ScraperError;
use crate::price::parse_price;

/// Brand abbreviations expanded to their full names before stop-word
/// removal. Matched on word boundaries, input already lowercased.
const ABBREVIATIONS: &[(&str, &str)] = &[("bdf", "best dressed")];

static ABBREVIATION_RES: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    ABBREVIATIONS
        .iter()
        .map(|(abbr, full)| {
            let re = Regex::new(&format!(r"\b{abbr}\b")).expect("valid abbreviation regex");
            (re, *full)
        })
        .collect()
});

/// State descriptors, packaging words and grading words that carry no
/// product identity. `tray pack` precedes `tray`/`pack` so the two-word
/// form wins the alternation.
static STOP_WORDS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:frozen|chilled|tray pack|tray|bag|pack|a grade|grade|the)\b")
        .expect("valid stop-word regex")
});

static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));

/// Normalizes a raw product name into the canonical matching key.
///
/// Lowercases, expands brand abbreviations, removes stop words, strips
/// punctuation and collapses whitespace. Unit and weight tokens (`1kg`,
/// `500g`) are kept: stripping them would merge different package sizes
/// into one product and corrupt price comparison across retailers.
#[must_use]
pub fn normalize_name(raw: &str) -> String {
    let mut name = raw.to_lowercase();

    for (re, full) in ABBREVIATION_RES.iter() {
        name = re.replace_all(&name, *full).into_owned();
    }

    name = STOP_WORDS_RE.replace_all(&name, "").into_owned();

    name = name
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_' || c.is_whitespace())
        .collect();

    WHITESPACE_RE.replace_all(&name, " ").trim().to_string()
}

/// Converts a [`RawListing`] into a [`NormalizedListing`] ready for
/// reconciliation.
///
/// Price parsing never fails — an unparseable price becomes `None`. The
/// only rejection is a name that normalizes to the empty string, which
/// would otherwise collapse unrelated junk listings onto one product row.
///
/// # Errors
///
/// Returns [`ScraperError::Normalization`] when the normalized name is
/// empty; callers log and skip the listing.
pub fn normalize_listing(listing: RawListing) -> Result<NormalizedListing, ScraperError> {
    let normalized_name = normalize_name(&listing.name);
    if normalized_name.is_empty() {
        return Err(ScraperError::Normalization {
            raw_name: listing.name,
            reason: "name is empty after normalization".to_string(),
        });
    }

    let price = parse_price(&listing.price);

    Ok(NormalizedListing {
        normalized_name,
        raw_name: listing.name,
        price,
        image_url: listing.image_url,
        product_url: listing.product_url,
    })
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
