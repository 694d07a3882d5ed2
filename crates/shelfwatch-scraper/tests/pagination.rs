//! Integration tests for `collect_listings` pagination behavior.
//!
//! Uses `wiremock` to stand up a local HTTP server per test so no real
//! network traffic is made. Covers the termination conditions (empty page,
//! not-found, page cap), cross-page dedup, single-page profiles, and the
//! error paths that must fail a profile rather than truncate it.

use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use shelfwatch_core::{RetailerProfile, SelectorSet};
use shelfwatch_scraper::{collect_listings, PageClient, ScraperError};

fn test_client() -> PageClient {
    PageClient::new(5, "shelfwatch-test/0.1").expect("failed to build test PageClient")
}

fn test_profile(listing_url: &str) -> RetailerProfile {
    RetailerProfile {
        name: "CoolMarket".to_string(),
        website_url: "https://www.coolmarket.com".to_string(),
        listing_url: listing_url.to_string(),
        addresses: vec![],
        category_id: 1,
        backup_snapshot: None,
        selectors: SelectorSet::default(),
    }
}

/// One product card per (name, url) pair, in the default selector shape.
fn product_page(items: &[(&str, &str)]) -> String {
    let cards: String = items
        .iter()
        .map(|(name, url)| {
            format!(
                r#"<div class="product-item">
                     <h2>{name}</h2>
                     <span class="price">$10.00</span>
                     <a href="{url}">view</a>
                   </div>"#
            )
        })
        .collect();
    format!("<html><body>{cards}</body></html>")
}

fn empty_page() -> String {
    "<html><body></body></html>".to_string()
}

#[tokio::test]
async fn empty_page_terminates_pagination() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/groceries"))
        .and(query_param("p", "1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(product_page(&[("Chicken 1kg", "/p/1"), ("Rice 2kg", "/p/2")])),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/groceries"))
        .and(query_param("p", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_string(empty_page()))
        .mount(&server)
        .await;

    let profile = test_profile(&format!("{}/groceries?p={{page}}", server.uri()));
    let listings = collect_listings(&test_client(), &profile, 50, 0)
        .await
        .expect("pagination should succeed");

    assert_eq!(listings.len(), 2);
    assert_eq!(listings[0].name, "Chicken 1kg");
}

#[tokio::test]
async fn not_found_is_expected_termination_not_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/groceries"))
        .and(query_param("p", "1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(product_page(&[("Chicken 1kg", "/p/1")])),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/groceries"))
        .and(query_param("p", "2"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let profile = test_profile(&format!("{}/groceries?p={{page}}", server.uri()));
    let listings = collect_listings(&test_client(), &profile, 50, 0)
        .await
        .expect("404 past the last page is a normal termination");

    assert_eq!(listings.len(), 1);
}

#[tokio::test]
async fn server_error_fails_the_profile() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/groceries"))
        .and(query_param("p", "1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(product_page(&[("Chicken 1kg", "/p/1")])),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/groceries"))
        .and(query_param("p", "2"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let profile = test_profile(&format!("{}/groceries?p={{page}}", server.uri()));
    let result = collect_listings(&test_client(), &profile, 50, 0).await;

    // Collected pages are discarded: a partial set must not pose as complete.
    assert!(
        matches!(result, Err(ScraperError::UnexpectedStatus { status: 500, .. })),
        "expected UnexpectedStatus(500), got: {result:?}"
    );
}

#[tokio::test]
async fn page_cap_forces_termination_with_collected_listings() {
    let server = MockServer::start().await;

    // Every page returns a fresh product, forever.
    for page in 1..=4u32 {
        let name = format!("Product {page}");
        let url = format!("/p/{page}");
        Mock::given(method("GET"))
            .and(path("/groceries"))
            .and(query_param("p", page.to_string()))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(product_page(&[(name.as_str(), url.as_str())])),
            )
            .mount(&server)
            .await;
    }

    let profile = test_profile(&format!("{}/groceries?p={{page}}", server.uri()));
    let listings = collect_listings(&test_client(), &profile, 3, 0)
        .await
        .expect("page cap should terminate, not fail");

    assert_eq!(listings.len(), 3, "cap of 3 pages collects 3 listings");
}

#[tokio::test]
async fn overlapping_pages_are_deduplicated_across_pages() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/groceries"))
        .and(query_param("p", "1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(product_page(&[("Chicken 1kg", "/p/1"), ("Rice 2kg", "/p/2")])),
        )
        .mount(&server)
        .await;

    // Page 2 repeats /p/2 (common with shifting sort orders) and adds /p/3.
    Mock::given(method("GET"))
        .and(path("/groceries"))
        .and(query_param("p", "2"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(product_page(&[("Rice 2kg", "/p/2"), ("Flour 1kg", "/p/3")])),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/groceries"))
        .and(query_param("p", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_string(empty_page()))
        .mount(&server)
        .await;

    let profile = test_profile(&format!("{}/groceries?p={{page}}", server.uri()));
    let listings = collect_listings(&test_client(), &profile, 50, 0)
        .await
        .expect("pagination should succeed");

    assert_eq!(listings.len(), 3);
}

#[tokio::test]
async fn single_page_profile_fetches_once() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/groceries"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(product_page(&[("Chicken 1kg", "/p/1")])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let profile = test_profile(&format!("{}/groceries", server.uri()));
    let listings = collect_listings(&test_client(), &profile, 50, 0)
        .await
        .expect("single-page fetch should succeed");

    assert_eq!(listings.len(), 1);
}

#[tokio::test]
async fn single_page_not_found_propagates() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/groceries"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let profile = test_profile(&format!("{}/groceries", server.uri()));
    let result = collect_listings(&test_client(), &profile, 50, 0).await;

    // In single-page mode there is no "past the last page"; a missing
    // listing page means the scrape produced nothing usable.
    assert!(
        matches!(result, Err(ScraperError::NotFound { .. })),
        "expected NotFound, got: {result:?}"
    );
}

#[tokio::test]
async fn slow_page_times_out_as_failure_not_empty_result() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/groceries"))
        .and(query_param("p", "1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(product_page(&[("Chicken 1kg", "/p/1")]))
                .set_delay(std::time::Duration::from_millis(1500)),
        )
        .mount(&server)
        .await;

    let client = PageClient::new(1, "shelfwatch-test/0.1").expect("client");
    let profile = test_profile(&format!("{}/groceries?p={{page}}", server.uri()));
    let result = collect_listings(&client, &profile, 50, 0).await;

    assert!(
        matches!(result, Err(ScraperError::Http(_))),
        "expected Http timeout error, got: {result:?}"
    );
}

#[tokio::test]
async fn local_document_profile_reads_from_disk() {
    use std::io::Write;

    let path = std::env::temp_dir().join(format!(
        "shelfwatch-local-doc-{}.html",
        std::process::id()
    ));
    let mut file = std::fs::File::create(&path).expect("create local document");
    file.write_all(product_page(&[("Flour 1kg", "/p/flour")]).as_bytes())
        .expect("write local document");

    let profile = test_profile(path.to_str().expect("utf-8 temp path"));
    let listings = collect_listings(&test_client(), &profile, 50, 0)
        .await
        .expect("local document should load");
    std::fs::remove_file(&path).ok();

    assert_eq!(listings.len(), 1);
    // Relative link resolved against the retailer's website URL.
    assert_eq!(
        listings[0].product_url.as_deref(),
        Some("https://www.coolmarket.com/p/flour")
    );
}

#[tokio::test]
async fn missing_local_document_fails_the_profile() {
    let profile = test_profile("/nonexistent/shelfwatch-no-such-file.html");
    let result = collect_listings(&test_client(), &profile, 50, 0).await;

    assert!(
        matches!(result, Err(ScraperError::Document { .. })),
        "expected Document error, got: {result:?}"
    );
}
