//! Retailer profile configuration.
//!
//! Profiles are defined in a YAML file (`config/retailers.yaml` by default)
//! and are immutable for the duration of an ingestion run. Each profile
//! carries the seed/listing URL (optionally with a `{page}` placeholder),
//! the retailer's known physical addresses, the category assigned to newly
//! created products, an optional backup snapshot path, and optional
//! overrides for the extraction selector chains.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Placeholder substituted with the 1-based page number in paginated
/// listing URLs, e.g. `https://shop.example.com/groceries?page={page}`.
pub const PAGE_PLACEHOLDER: &str = "{page}";

/// Ordered CSS-selector fallback chains consumed by the listing extractor.
///
/// Defaults cover the storefront platforms seen across the supported
/// retailers (WooCommerce, Magento, Storefront UI, Sencha grids); a profile
/// only overrides the chains its site actually deviates on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectorSet {
    #[serde(default = "default_container_selectors")]
    pub containers: Vec<String>,
    #[serde(default = "default_name_selectors")]
    pub names: Vec<String>,
    #[serde(default = "default_price_selectors")]
    pub prices: Vec<String>,
    #[serde(default = "default_image_selectors")]
    pub images: Vec<String>,
    #[serde(default = "default_link_selectors")]
    pub links: Vec<String>,
}

impl Default for SelectorSet {
    fn default() -> Self {
        Self {
            containers: default_container_selectors(),
            names: default_name_selectors(),
            prices: default_price_selectors(),
            images: default_image_selectors(),
            links: default_link_selectors(),
        }
    }
}

fn default_container_selectors() -> Vec<String> {
    [
        ".info-wrapper__product-info",
        ".product-item",
        ".product",
        ".item",
        ".x-dataview-item",
        ".product-item-info",
    ]
    .map(str::to_owned)
    .to_vec()
}

fn default_name_selectors() -> Vec<String> {
    [
        ".product-item-name",
        ".product-item-link",
        ".product-card__title",
        ".product-name",
        ".name",
        "h2",
        "h3",
        ".sms-catalog-item-tile-title",
    ]
    .map(str::to_owned)
    .to_vec()
}

fn default_price_selectors() -> Vec<String> {
    [
        ".sf-price__regular",
        ".price",
        ".amount",
        ".sms-catalog-item-tile-price span",
        ".price-box .price",
    ]
    .map(str::to_owned)
    .to_vec()
}

fn default_image_selectors() -> Vec<String> {
    [
        "img.product-image-photo",
        ".image-wrapper img",
        "img.sms-catalog-item-tile-img",
        "img",
    ]
    .map(str::to_owned)
    .to_vec()
}

fn default_link_selectors() -> Vec<String> {
    [".product-item-link", ".product-card__title-container", "a"]
        .map(str::to_owned)
        .to_vec()
}

/// One scrapeable retailer, as configured.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetailerProfile {
    pub name: String,
    /// Retailer homepage, persisted as `retailers.website_url` on create.
    pub website_url: String,
    /// Listing URL template (may contain [`PAGE_PLACEHOLDER`]) or a local
    /// document path for sites captured to disk.
    pub listing_url: String,
    #[serde(default)]
    pub addresses: Vec<String>,
    pub category_id: i64,
    /// JSON snapshot used when the live scrape fails. Read-only.
    #[serde(default)]
    pub backup_snapshot: Option<PathBuf>,
    #[serde(default)]
    pub selectors: SelectorSet,
}

impl RetailerProfile {
    /// Whether the listing URL paginates (carries a `{page}` placeholder).
    #[must_use]
    pub fn is_paginated(&self) -> bool {
        self.listing_url.contains(PAGE_PLACEHOLDER)
    }

    /// The listing URL for a given 1-based page number.
    #[must_use]
    pub fn page_url(&self, page: usize) -> String {
        self.listing_url
            .replace(PAGE_PLACEHOLDER, &page.to_string())
    }

    /// Whether the listing source is a local document rather than an HTTP URL.
    #[must_use]
    pub fn is_local_document(&self) -> bool {
        !self.listing_url.starts_with("http://") && !self.listing_url.starts_with("https://")
    }
}

/// A retailer with no scrapeable storefront, covered via synthetic offers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompetitorProfile {
    pub name: String,
    #[serde(default)]
    pub addresses: Vec<String>,
    pub category_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct RetailersFile {
    pub retailers: Vec<RetailerProfile>,
    #[serde(default)]
    pub competitors: Vec<CompetitorProfile>,
}

/// Load and validate the retailers configuration from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_retailers(path: &Path) -> Result<RetailersFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::RetailersFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let retailers_file: RetailersFile =
        serde_yaml::from_str(&content).map_err(ConfigError::RetailersFileParse)?;

    validate_retailers(&retailers_file)?;

    Ok(retailers_file)
}

fn validate_retailers(retailers_file: &RetailersFile) -> Result<(), ConfigError> {
    let mut seen_names = HashSet::new();

    for profile in &retailers_file.retailers {
        if profile.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "retailer name must be non-empty".to_string(),
            ));
        }

        if profile.listing_url.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "retailer '{}' has an empty listing_url",
                profile.name
            )));
        }

        if profile.category_id < 1 {
            return Err(ConfigError::Validation(format!(
                "retailer '{}' has invalid category_id {}; must be >= 1",
                profile.name, profile.category_id
            )));
        }

        if !seen_names.insert(profile.name.to_lowercase()) {
            return Err(ConfigError::Validation(format!(
                "duplicate retailer name: '{}'",
                profile.name
            )));
        }
    }

    // Competitors share the retailer namespace: the reconciler resolves both
    // by the same unique `retailers.name` key.
    for competitor in &retailers_file.competitors {
        if competitor.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "competitor name must be non-empty".to_string(),
            ));
        }

        if competitor.category_id < 1 {
            return Err(ConfigError::Validation(format!(
                "competitor '{}' has invalid category_id {}; must be >= 1",
                competitor.name, competitor.category_id
            )));
        }

        if !seen_names.insert(competitor.name.to_lowercase()) {
            return Err(ConfigError::Validation(format!(
                "duplicate retailer/competitor name: '{}'",
                competitor.name
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
#[path = "retailers_test.rs"]
mod tests;
