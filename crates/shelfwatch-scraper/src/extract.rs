//! Generic listing extraction from rendered or static HTML.
//!
//! One extractor serves every retailer: site quirks live in the profile's
//! [`SelectorSet`] (ordered fallback chains per field), not in per-site
//! code. For each candidate element the chains are tried in priority order
//! and the first non-empty match wins. Extraction never raises for a
//! missing field — an item without a name, or without either URL needed as
//! a dedup key, is dropped and the rest of the page proceeds.

use std::collections::HashSet;

use scraper::{ElementRef, Html, Selector};
use url::Url;

use shelfwatch_core::{RawListing, SelectorSet};

/// Substring marking stand-in images that must not be persisted as a
/// product image (and would poison image-based dedup keys).
const PLACEHOLDER_MARKER: &str = "placeholder";

/// Extracts the deduplicated raw listings from one page.
///
/// `base_url` is the URL the document was fetched from (for local
/// documents, the retailer's website URL) and anchors relative link and
/// image resolution.
#[must_use]
pub fn extract_listings(html: &str, selectors: &SelectorSet, base_url: &str) -> Vec<RawListing> {
    let document = Html::parse_document(html);
    let base = Url::parse(base_url).ok();
    if base.is_none() {
        tracing::warn!(base_url, "base URL does not parse; relative URLs will be dropped");
    }

    let container_selectors = compile_chain(&selectors.containers);
    let name_selectors = compile_chain(&selectors.names);
    let price_selectors = compile_chain(&selectors.prices);
    let image_selectors = compile_chain(&selectors.images);
    let link_selectors = compile_chain(&selectors.links);

    let mut seen_keys: HashSet<String> = HashSet::new();
    let mut listings = Vec::new();

    for container in &container_selectors {
        for element in document.select(container) {
            let Some(name) = first_text(element, &name_selectors) else {
                continue;
            };
            let price = first_text(element, &price_selectors).unwrap_or_default();
            let image_url = first_image(element, &image_selectors)
                .and_then(|src| resolve_url(&src, base.as_ref()));
            let product_url = first_attr(element, &link_selectors, "href")
                .and_then(|href| resolve_url(&href, base.as_ref()));

            let listing = RawListing {
                name,
                price,
                image_url,
                product_url,
            };

            // An item with neither URL has no dedup key and is dropped.
            let Some(key) = listing.dedup_key() else {
                continue;
            };
            if seen_keys.insert(key.to_string()) {
                listings.push(listing);
            }
        }
    }

    listings
}

/// Compiles a selector chain, skipping (and logging) entries that fail to
/// parse so one bad configured selector cannot disable extraction.
fn compile_chain(chain: &[String]) -> Vec<Selector> {
    chain
        .iter()
        .filter_map(|raw| match Selector::parse(raw) {
            Ok(selector) => Some(selector),
            Err(e) => {
                tracing::warn!(selector = raw, error = %e, "skipping unparseable selector");
                None
            }
        })
        .collect()
}

/// First non-empty text content across the chain, in priority order.
fn first_text(element: ElementRef<'_>, chain: &[Selector]) -> Option<String> {
    for selector in chain {
        if let Some(found) = element.select(selector).next() {
            let text: String = found.text().collect::<String>().trim().to_string();
            if !text.is_empty() {
                return Some(text);
            }
        }
    }
    None
}

/// First non-empty attribute value across the chain, in priority order.
fn first_attr(element: ElementRef<'_>, chain: &[Selector], attr: &str) -> Option<String> {
    for selector in chain {
        if let Some(found) = element.select(selector).next() {
            if let Some(value) = found.value().attr(attr) {
                let value = value.trim();
                if !value.is_empty() {
                    return Some(value.to_string());
                }
            }
        }
    }
    None
}

/// First usable image `src` across the chain, skipping placeholder images.
fn first_image(element: ElementRef<'_>, chain: &[Selector]) -> Option<String> {
    for selector in chain {
        for found in element.select(selector) {
            if let Some(src) = found.value().attr("src") {
                let src = src.trim();
                if !src.is_empty() && !src.contains(PLACEHOLDER_MARKER) {
                    return Some(src.to_string());
                }
            }
        }
    }
    None
}

/// Resolves a possibly-relative URL against the page base. Absolute URLs
/// pass through; relative ones without a parseable base are dropped.
fn resolve_url(candidate: &str, base: Option<&Url>) -> Option<String> {
    if candidate.starts_with("http://") || candidate.starts_with("https://") {
        return Some(candidate.to_string());
    }
    base.and_then(|b| b.join(candidate).ok())
        .map(|u| u.to_string())
}

#[cfg(test)]
#[path = "extract_test.rs"]
mod tests;
