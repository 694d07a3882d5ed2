//! Price-string parsing.
//!
//! Listing prices arrive in whatever shape the storefront renders them:
//! `"$500.00"`, `"JMD $1,234.50/kg"`, `"3 for $10.00"`, screen-reader text
//! like `"current price is: $12.99"`, or no price at all (`"Call for
//! price"`). [`parse_price`] reduces all of these to an exact decimal with
//! two fractional digits, or `None` when no amount can be recovered —
//! callers store `None` as NULL, never as zero.

use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::{Decimal, RoundingStrategy};

/// Bulk notation, anchored to the whole string. `"3 for $10.00"` is a
/// per-unit deal; `"3 for $10.00 with loyalty card"` is promotional copy
/// and must not trigger the division.
static BULK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+)\s+for\s+\$([\d,]+(?:\.\d{1,2})?)$").expect("valid bulk regex")
});

/// Screen-reader price annotation emitted by some storefronts.
static CURRENT_PRICE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)current price (?:is|was):?\s*\$?(\d+(?:\.\d{1,2})?)")
        .expect("valid current-price regex")
});

static CURRENCY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:jmd|usd)\b|\$").expect("valid currency regex"));

static UNIT_SUFFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)/(?:kg|lb|g|oz|l)\s*$").expect("valid unit-suffix regex"));

static TRAILING_NON_NUMERIC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\d.]+$").expect("valid trailing regex"));

static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));

static CENTS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+\.\d{2}").expect("valid cents regex"));

/// Parses a raw price string into an exact decimal amount with 2 fractional
/// digits.
///
/// Passes are applied in order and each is a no-op when its pattern is
/// absent:
/// 1. whole-string bulk notation `<count> for $<total>` → `total / count`;
/// 2. `current price is/was $N` annotation → `N`;
/// 3. strip currency markers, thousands commas, trailing per-unit suffixes
///    (`/kg`, `/lb`, `/g`, `/oz`, `/l`), trailing non-numeric characters and
///    internal whitespace;
/// 4. take the first `N.NN` group if one survives, otherwise the best-effort
///    cleaned string.
///
/// Returns `None` when nothing numeric remains. A per-unit rate with no
/// absolute total (e.g. `"$4.99/lb"`) parses to the rate itself — a known
/// imprecision, preferable to discarding the listing.
#[must_use]
pub fn parse_price(raw: &str) -> Option<Decimal> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Some(caps) = BULK_RE.captures(trimmed) {
        let count = Decimal::from_str(&caps[1]).ok()?;
        let total = Decimal::from_str(&caps[2].replace(',', "")).ok()?;
        if count.is_zero() {
            return None;
        }
        return Some(two_places(total / count));
    }

    if let Some(caps) = CURRENT_PRICE_RE.captures(trimmed) {
        return Decimal::from_str(&caps[1]).ok().map(two_places);
    }

    let cleaned = CURRENCY_RE.replace_all(trimmed, "");
    let cleaned = cleaned.replace(',', "");
    let cleaned = UNIT_SUFFIX_RE.replace(&cleaned, "");
    let cleaned = TRAILING_NON_NUMERIC_RE.replace(&cleaned, "");
    let cleaned = WHITESPACE_RE.replace_all(&cleaned, "");

    let candidate = CENTS_RE
        .find(&cleaned)
        .map_or_else(|| cleaned.to_string(), |m| m.as_str().to_string());

    Decimal::from_str(&candidate).ok().map(two_places)
}

/// Rounds to 2 decimal places (half away from zero, matching storefront
/// display rounding) and pins the scale so `500` renders as `500.00`.
fn two_places(value: Decimal) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded
}

#[cfg(test)]
#[path = "price_test.rs"]
mod tests;
