//! Page fetching for listing extraction.
//!
//! Two document sources exist: live HTTP pages, and local HTML captures for
//! sites whose live storefront is broken or hostile to scraping (configured
//! with a filesystem path as the listing URL). Both yield a [`FetchedPage`]
//! carrying the HTML and the base URL that relative links resolve against.

use std::path::Path;
use std::time::Duration;

use reqwest::Client;

use shelfwatch_core::RetailerProfile;

use crate::error::ScraperError;

/// One fetched listing document.
#[derive(Debug)]
pub struct FetchedPage {
    pub html: String,
    /// URL that anchors relative link/image resolution: the request URL for
    /// HTTP fetches, the retailer's website URL for local documents.
    pub base_url: String,
}

/// HTTP client for retailer listing pages.
///
/// Maps HTTP 404 to [`ScraperError::NotFound`] so pagination can treat it
/// as the expected past-the-last-page signal; every other non-2xx status is
/// [`ScraperError::UnexpectedStatus`]. Timeouts surface as
/// [`ScraperError::Http`] — a slow page is a page-level failure, never an
/// empty result.
pub struct PageClient {
    client: Client,
}

impl PageClient {
    /// Creates a `PageClient` with the configured timeout and `User-Agent`.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed (e.g., invalid TLS config).
    pub fn new(timeout_secs: u64, user_agent: &str) -> Result<Self, ScraperError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        Ok(Self { client })
    }

    /// Fetches the document behind one listing URL for the given profile.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::NotFound`] — HTTP 404.
    /// - [`ScraperError::UnexpectedStatus`] — any other non-2xx status.
    /// - [`ScraperError::Http`] — network failure or timeout.
    /// - [`ScraperError::Document`] — a local document that cannot be read.
    pub async fn fetch_document(
        &self,
        profile: &RetailerProfile,
        url: &str,
    ) -> Result<FetchedPage, ScraperError> {
        if profile.is_local_document() {
            return Self::read_local_document(profile, url).await;
        }

        let response = self
            .client
            .get(url)
            .header(
                reqwest::header::ACCEPT,
                "text/html,application/xhtml+xml;q=0.9,*/*;q=0.8",
            )
            .header(reqwest::header::ACCEPT_LANGUAGE, "en-US,en;q=0.9")
            .send()
            .await?;

        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ScraperError::NotFound {
                url: url.to_string(),
            });
        }

        if !status.is_success() {
            return Err(ScraperError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let html = response.text().await?;
        Ok(FetchedPage {
            html,
            base_url: url.to_string(),
        })
    }

    async fn read_local_document(
        profile: &RetailerProfile,
        path: &str,
    ) -> Result<FetchedPage, ScraperError> {
        let html = tokio::fs::read_to_string(Path::new(path))
            .await
            .map_err(|e| ScraperError::Document {
                path: path.to_string(),
                source: e,
            })?;

        // A file on disk has no origin of its own; relative URLs resolve
        // against the retailer's live site.
        Ok(FetchedPage {
            html,
            base_url: profile.website_url.clone(),
        })
    }
}
