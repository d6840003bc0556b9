//! Integration tests for the provider clients
//!
//! These tests run the Firecrawl and Google Places clients against wiremock
//! servers and check request shapes, response decoding and error mapping.

use competitor_scout::places::{GooglePlacesClient, PlaceSearch};
use competitor_scout::provider::{CrawlOptions, CrawlProvider, FirecrawlClient, MapOptions};
use competitor_scout::state::CrawlStatus;
use competitor_scout::{ErrorKind, ScoutError};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const MAP_OPTIONS: MapOptions = MapOptions {
    include_subdomains: true,
    limit: 500,
};

fn firecrawl(server: &MockServer) -> FirecrawlClient {
    FirecrawlClient::new(reqwest::Client::new(), server.uri(), "fc-test-key")
}

fn places(server: &MockServer) -> GooglePlacesClient {
    GooglePlacesClient::new(reqwest::Client::new(), server.uri(), "places-test-key")
}

// ===== Firecrawl =====

#[tokio::test]
async fn test_map_sends_bearer_token_and_decodes_links() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/map"))
        .and(header("authorization", "Bearer fc-test-key"))
        .and(body_partial_json(json!({
            "url": "https://jumpco.com/",
            "includeSubdomains": true,
            "limit": 500
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "links": [
                "https://jumpco.com/rentals",
                {"url": "https://jumpco.com/contact", "title": "Contact"}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let result = firecrawl(&server)
        .map("https://jumpco.com/", MAP_OPTIONS)
        .await
        .unwrap();

    assert!(result.success);
    assert_eq!(
        result.links,
        vec!["https://jumpco.com/rentals", "https://jumpco.com/contact"]
    );
}

#[tokio::test]
async fn test_unsuccessful_map_is_not_an_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/map"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "error": "site blocked"
        })))
        .mount(&server)
        .await;

    let result = firecrawl(&server)
        .map("https://jumpco.com/", MAP_OPTIONS)
        .await
        .unwrap();

    assert!(!result.success);
    assert!(result.links.is_empty());
    assert_eq!(result.error.as_deref(), Some("site blocked"));
}

#[tokio::test]
async fn test_crawl_submission_and_status() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/crawl"))
        .and(body_partial_json(json!({"url": "https://jumpco.com/", "limit": 100})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "id": "job-42"
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/crawl/job-42"))
        .and(header("authorization", "Bearer fc-test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "completed",
            "data": [
                {"metadata": {"sourceURL": "https://jumpco.com/rentals"}},
                {"metadata": {"url": "https://jumpco.com/pricing"}},
                {"markdown": "no metadata"}
            ]
        })))
        .mount(&server)
        .await;

    let client = firecrawl(&server);
    let job_id = client
        .submit_crawl("https://jumpco.com/", CrawlOptions { limit: 100 })
        .await
        .unwrap();
    assert_eq!(job_id, "job-42");

    let report = client.crawl_status(&job_id).await.unwrap();
    assert_eq!(report.status, CrawlStatus::Completed);
    assert_eq!(
        report.links,
        vec!["https://jumpco.com/rentals", "https://jumpco.com/pricing"]
    );
}

#[tokio::test]
async fn test_crawl_submission_without_id_fails() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/crawl"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "error": "quota exceeded"
        })))
        .mount(&server)
        .await;

    let err = firecrawl(&server)
        .submit_crawl("https://jumpco.com/", CrawlOptions { limit: 100 })
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::ExternalService);
    assert!(err.to_string().contains("quota exceeded"));
}

#[tokio::test]
async fn test_unknown_crawl_status_is_a_parse_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/crawl/job-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "teleporting"})))
        .mount(&server)
        .await;

    let err = firecrawl(&server).crawl_status("job-1").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Parse);
}

#[tokio::test]
async fn test_scrape_returns_extract_payload() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/scrape"))
        .and(body_partial_json(json!({
            "url": "https://jumpco.com/rentals",
            "formats": ["extract"],
            "extract": {"prompt": "find products"}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {
                "extract": {
                    "products": [{"name": "Castle", "price": 199}]
                }
            }
        })))
        .mount(&server)
        .await;

    let schema = json!({"type": "object"});
    let payload = firecrawl(&server)
        .extract("https://jumpco.com/rentals", &schema, "find products")
        .await
        .unwrap();

    assert_eq!(payload["products"][0]["name"], "Castle");
}

#[tokio::test]
async fn test_scrape_without_extract_is_a_parse_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/scrape"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {"markdown": "# Rentals"}
        })))
        .mount(&server)
        .await;

    let err = firecrawl(&server)
        .extract("https://jumpco.com/rentals", &json!({}), "p")
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Parse);
}

#[tokio::test]
async fn test_http_429_maps_to_rate_limited() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/map"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let err = firecrawl(&server)
        .map("https://jumpco.com/", MAP_OPTIONS)
        .await
        .unwrap_err();

    assert!(matches!(err, ScoutError::RateLimited { ref service } if service == "firecrawl"));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_http_500_maps_to_external_service_with_excerpt() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/scrape"))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal explosion"))
        .mount(&server)
        .await;

    let err = firecrawl(&server)
        .extract("https://jumpco.com/rentals", &json!({}), "p")
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::ExternalService);
    assert!(err.to_string().contains("HTTP 500: internal explosion"));
}

#[tokio::test]
async fn test_malformed_body_maps_to_parse_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/map"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .mount(&server)
        .await;

    let err = firecrawl(&server)
        .map("https://jumpco.com/", MAP_OPTIONS)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Parse);
}

#[tokio::test]
async fn test_connection_refused_maps_to_external_service() {
    let server = MockServer::start().await;
    let uri = server.uri();
    drop(server);

    let client = FirecrawlClient::new(reqwest::Client::new(), uri, "key");
    let err = client
        .map("https://jumpco.com/", MAP_OPTIONS)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::ExternalService);
}

// ===== Google Places =====

#[tokio::test]
async fn test_text_search_sends_query_and_key() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/textsearch/json"))
        .and(query_param("query", "bounce house rentals in Austin, TX"))
        .and(query_param("key", "places-test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "OK",
            "results": [
                {"place_id": "p1", "name": "Jump Co"},
                {"place_id": "", "name": "Ghost Listing"},
                {"place_id": "p2", "name": "Splash Co"}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let found = places(&server)
        .text_search("bounce house rentals in Austin, TX")
        .await
        .unwrap();

    let names: Vec<&str> = found.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["Jump Co", "Splash Co"]);
    assert_eq!(found[0].id, "p1");
}

#[tokio::test]
async fn test_zero_results_is_an_empty_search() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/textsearch/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "ZERO_RESULTS",
            "results": []
        })))
        .mount(&server)
        .await;

    let found = places(&server).text_search("nowhere").await.unwrap();
    assert!(found.is_empty());
}

#[tokio::test]
async fn test_details_requests_website_field() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/details/json"))
        .and(query_param("place_id", "p1"))
        .and(query_param("fields", "website"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "OK",
            "result": {"website": "https://jumpco.com"}
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/details/json"))
        .and(query_param("place_id", "p2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "OK",
            "result": {"website": "   "}
        })))
        .mount(&server)
        .await;

    let client = places(&server);
    let listed = client.details("p1").await.unwrap();
    assert_eq!(listed.website.as_deref(), Some("https://jumpco.com"));

    let blank = client.details("p2").await.unwrap();
    assert_eq!(blank.website, None);
}

#[tokio::test]
async fn test_denied_request_maps_to_external_service() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/textsearch/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "REQUEST_DENIED",
            "error_message": "The provided API key is invalid."
        })))
        .mount(&server)
        .await;

    let err = places(&server).text_search("anything").await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::ExternalService);
    assert!(err
        .to_string()
        .contains("REQUEST_DENIED: The provided API key is invalid."));
}
