//! Per-retailer pagination.
//!
//! Drives the listing extractor across consecutive pages of a profile's
//! listing URL until a termination condition is met, merging every page's
//! listings into one deduplicated set. Termination conditions, in the order
//! they are checked:
//!
//! - the page cap is reached (bounds a misbehaving paginator);
//! - the page fetch reports not-found (the expected signal one page past
//!   the last real page);
//! - extraction yields zero items.
//!
//! Any other fetch error fails the whole profile — already-collected pages
//! are discarded and the error propagates so the orchestrator can apply the
//! backup-fallback policy. A partial listing set must never masquerade as a
//! complete scrape: it would read as "every missing product disappeared".

use std::collections::HashSet;
use std::time::Duration;

use shelfwatch_core::{RawListing, RetailerProfile};

use crate::client::PageClient;
use crate::error::ScraperError;
use crate::extract::extract_listings;

/// Collects the full listing set for one retailer profile.
///
/// Profiles without a page placeholder (including local documents) are
/// fetched exactly once. Paginated profiles start at page 1 and walk
/// forward, sleeping `inter_page_delay_ms` between requests.
///
/// # Errors
///
/// Propagates any [`ScraperError`] other than not-found from the page
/// fetch. Not-found terminates pagination normally.
pub async fn collect_listings(
    client: &PageClient,
    profile: &RetailerProfile,
    page_cap: usize,
    inter_page_delay_ms: u64,
) -> Result<Vec<RawListing>, ScraperError> {
    let mut all: Vec<RawListing> = Vec::new();
    let mut seen_keys: HashSet<String> = HashSet::new();

    if !profile.is_paginated() {
        let page = client.fetch_document(profile, &profile.listing_url).await?;
        let listings = extract_listings(&page.html, &profile.selectors, &page.base_url);
        merge_page(listings, &mut all, &mut seen_keys);
        tracing::debug!(
            retailer = %profile.name,
            listings = all.len(),
            "single-page profile collected"
        );
        return Ok(all);
    }

    let mut page_num = 1usize;

    loop {
        if page_num > page_cap {
            tracing::info!(
                retailer = %profile.name,
                page_cap,
                "page cap reached; stopping pagination"
            );
            break;
        }

        if page_num > 1 && inter_page_delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(inter_page_delay_ms)).await;
        }

        let url = profile.page_url(page_num);
        let page = match client.fetch_document(profile, &url).await {
            Ok(page) => page,
            Err(ScraperError::NotFound { url }) => {
                // Expected one page past the end; not an error.
                tracing::debug!(retailer = %profile.name, url, "not-found page ends pagination");
                break;
            }
            Err(e) => return Err(e),
        };

        let listings = extract_listings(&page.html, &profile.selectors, &page.base_url);
        if listings.is_empty() {
            tracing::debug!(retailer = %profile.name, page_num, "empty page ends pagination");
            break;
        }

        let merged = merge_page(listings, &mut all, &mut seen_keys);
        tracing::debug!(retailer = %profile.name, page_num, new_listings = merged, "page collected");
        page_num += 1;
    }

    Ok(all)
}

/// Appends a page's listings, skipping any whose dedup key was already seen
/// on an earlier (possibly overlapping) page. Returns how many were new.
fn merge_page(
    listings: Vec<RawListing>,
    all: &mut Vec<RawListing>,
    seen_keys: &mut HashSet<String>,
) -> usize {
    let mut added = 0usize;
    for listing in listings {
        let Some(key) = listing.dedup_key() else {
            continue;
        };
        if seen_keys.insert(key.to_string()) {
            all.push(listing);
            added += 1;
        }
    }
    added
}
