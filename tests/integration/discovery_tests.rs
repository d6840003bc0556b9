//! Integration tests for competitor discovery
//!
//! These tests use wiremock to stand in for both the place search and the
//! crawl provider, and run the full discovery cycle end-to-end with the real
//! HTTP clients, the shared rate limiter and an on-disk SQLite store.

use competitor_scout::config::{load_config_with_hash, parse_config, Config};
use competitor_scout::places::GooglePlacesClient;
use competitor_scout::provider::{build_http_client, FirecrawlClient};
use competitor_scout::storage::{load_location, open_store, RunStatus};
use competitor_scout::{
    CompetitorOrchestrator, Competitor, ErrorKind, ProductCategory, RateLimiter,
};
use serde_json::json;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use tempfile::{tempdir, NamedTempFile};
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const QUERY: &str = "bounce house rentals in Austin, TX";

/// Builds a config pointing both services at the mock server
fn config_toml(server_uri: &str, db_path: &Path) -> String {
    format!(
        r#"
[discovery]
crawl-poll-interval-ms = 10
crawl-max-polls = 5

[rate-limit]
capacity = 5
refill-interval-ms = 10

[provider]
base-url = "{server}"
api-key = "fc-test-key"

[places]
base-url = "{server}/maps/api/place"
api-key = "places-test-key"
retry-backoff-ms = 1

[user-agent]
crawler-name = "TestScout"
crawler-version = "1.0"
contact-email = "test@example.com"
timeout-secs = 5

[output]
database-path = "{db}"
"#,
        server = server_uri,
        db = db_path.display()
    )
}

fn orchestrator(config: &Config) -> CompetitorOrchestrator {
    let client = build_http_client(&config.user_agent).unwrap();
    let provider = FirecrawlClient::from_config(&config.provider, client.clone()).unwrap();
    let places = GooglePlacesClient::from_config(&config.places, client).unwrap();
    let limiter = Arc::new(RateLimiter::from_config(&config.rate_limit));

    CompetitorOrchestrator::new(config, Arc::new(places), Arc::new(provider), limiter)
}

/// Mounts three candidates: Jump Co (map hit), Splash Co (crawl fallback)
/// and No Site Co (no website listed)
async fn mount_market(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/maps/api/place/textsearch/json"))
        .and(query_param("query", QUERY))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "OK",
            "results": [
                {"place_id": "p-jump", "name": "Jump Co"},
                {"place_id": "p-splash", "name": "Splash Co"},
                {"place_id": "p-none", "name": "No Site Co"}
            ]
        })))
        .mount(server)
        .await;

    for (place_id, website) in [
        ("p-jump", Some("https://jumpco.com")),
        ("p-splash", Some("splashco.com")),
        ("p-none", None),
    ] {
        let result = match website {
            Some(website) => json!({"website": website}),
            None => json!({}),
        };
        Mock::given(method("GET"))
            .and(path("/maps/api/place/details/json"))
            .and(query_param("place_id", place_id))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"status": "OK", "result": result})),
            )
            .mount(server)
            .await;
    }

    // Jump Co: the site map already lists catalog pages
    Mock::given(method("POST"))
        .and(path("/v1/map"))
        .and(body_partial_json(json!({"url": "https://jumpco.com/"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "links": [
                "https://jumpco.com/about",
                "https://jumpco.com/rentals/castle",
                "https://jumpco.com/inflatables/broken"
            ]
        })))
        .mount(server)
        .await;

    // Splash Co: nothing relevant in the map, so a crawl runs
    Mock::given(method("POST"))
        .and(path("/v1/map"))
        .and(body_partial_json(json!({"url": "https://splashco.com/"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "links": ["https://splashco.com/contact"]
        })))
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v1/crawl"))
        .and(body_partial_json(json!({"url": "https://splashco.com/"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "id": "job-splash"
        })))
        .expect(1)
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/crawl/job-splash"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "completed",
            "data": [
                {"metadata": {"sourceURL": "https://splashco.com/contact"}},
                {"metadata": {"sourceURL": "https://splashco.com/inventory/tidal-wave"}}
            ]
        })))
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v1/scrape"))
        .and(body_partial_json(json!({"url": "https://jumpco.com/rentals/castle"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {"extract": {"products": [
                {"name": "Castle Deluxe", "price": "$199.99", "url": "/rentals/castle", "category": "Bounce House"}
            ]}}
        })))
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v1/scrape"))
        .and(body_partial_json(json!({"url": "https://jumpco.com/inflatables/broken"})))
        .respond_with(ResponseTemplate::new(500).set_body_string("render failed"))
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v1/scrape"))
        .and(body_partial_json(json!({"url": "https://splashco.com/inventory/tidal-wave"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {"extract": {"products": [
                {"name": "Tidal Wave", "price": "250-300", "category": "Water Slide"},
                {"name": "Mystery Slide", "price": "call us", "category": "Water Slide"}
            ]}}
        })))
        .mount(server)
        .await;
}

fn sorted(mut competitors: Vec<Competitor>) -> Vec<Competitor> {
    competitors.sort_by(|a, b| a.name.cmp(&b.name));
    competitors
}

#[tokio::test]
async fn test_full_discovery_with_map_and_crawl_fallback() {
    let server = MockServer::start().await;
    mount_market(&server).await;

    let dir = tempdir().unwrap();
    let db_path = dir.path().join("scout.db");
    let config = parse_config(&config_toml(&server.uri(), &db_path)).unwrap();

    let store = Arc::new(open_store(&db_path).unwrap());
    let orchestrator = orchestrator(&config).with_store(store.clone());

    let outcome = orchestrator
        .discover_detailed("  Austin, TX ", CancellationToken::new())
        .await
        .unwrap();

    assert!(!outcome.cancelled);
    assert_eq!(outcome.candidates, 3);
    assert_eq!(outcome.skipped, vec!["No Site Co"]);
    assert_eq!(outcome.result.location, "Austin, TX");
    assert_eq!(outcome.result.total_found, 2);

    let competitors = sorted(outcome.result.competitors.clone());

    let jump = &competitors[0];
    assert_eq!(jump.name, "Jump Co");
    assert_eq!(jump.website, "https://jumpco.com/");
    assert_eq!(jump.products.len(), 1);
    assert_eq!(jump.products[0].name, "Castle Deluxe");
    assert_eq!(jump.products[0].price, 199.99);
    assert_eq!(jump.products[0].url, "https://jumpco.com/rentals/castle");
    assert_eq!(jump.products[0].category, ProductCategory::BounceHouse);

    let splash = &competitors[1];
    assert_eq!(splash.name, "Splash Co");
    assert_eq!(splash.website, "https://splashco.com/");
    assert_eq!(splash.products.len(), 1);
    assert_eq!(splash.products[0].name, "Tidal Wave");
    assert_eq!(splash.products[0].price, 250.0);
    assert_eq!(
        splash.products[0].url,
        "https://splashco.com/inventory/tidal-wave"
    );
    assert_eq!(splash.products[0].category, ProductCategory::WaterSlide);

    // The broken Jump Co page is reported without costing the competitor
    assert_eq!(outcome.failures.len(), 1);
    let failure = &outcome.failures[0];
    assert_eq!(failure.business, "Jump Co");
    assert_eq!(failure.kind, ErrorKind::ExternalService);
    assert!(failure
        .message
        .starts_with("https://jumpco.com/inflatables/broken: "));

    let stored = load_location(store.as_ref(), "Austin, TX")
        .unwrap()
        .expect("location should be stored");
    assert_eq!(stored.name, "Austin, TX");
    assert_eq!(sorted(stored.competitors), competitors);

    // One location document, two competitors, two products
    assert_eq!(store.count_records("Austin, TX/").unwrap(), 5);
}

#[tokio::test]
async fn test_discovery_from_config_file_records_run() {
    let server = MockServer::start().await;
    mount_market(&server).await;

    let dir = tempdir().unwrap();
    let db_path = dir.path().join("scout.db");
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(config_toml(&server.uri(), &db_path).as_bytes())
        .unwrap();

    let (config, hash) = load_config_with_hash(file.path()).unwrap();
    assert_eq!(hash.len(), 64);

    let store = Arc::new(open_store(Path::new(&config.output.database_path)).unwrap());
    let run_id = store.create_run("Austin, TX", &hash).unwrap();

    let result = orchestrator(&config)
        .with_store(store.clone())
        .discover("Austin, TX")
        .await
        .unwrap();
    store
        .finish_run(run_id, RunStatus::Completed, Some(result.total_found))
        .unwrap();

    assert_eq!(result.total_found, 2);
    assert_eq!(result.product_count(), 2);

    let run = store.get_latest_run("Austin, TX").unwrap().unwrap();
    assert_eq!(run.id, run_id);
    assert_eq!(run.status, RunStatus::Completed);
    assert_eq!(run.competitors_found, Some(2));
    assert_eq!(run.config_hash, hash);

    assert!(load_location(store.as_ref(), "Austin, TX").unwrap().is_some());
}

#[tokio::test]
async fn test_place_search_failure_is_retried_then_reported() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/maps/api/place/textsearch/json"))
        .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
        .expect(3)
        .mount(&server)
        .await;

    let dir = tempdir().unwrap();
    let db_path = dir.path().join("scout.db");
    let config = parse_config(&config_toml(&server.uri(), &db_path)).unwrap();
    let store = Arc::new(open_store(&db_path).unwrap());

    let err = orchestrator(&config)
        .with_store(store.clone())
        .discover("Austin, TX")
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::ExternalService);
    assert!(err.to_string().contains("HTTP 503"));
    assert!(load_location(store.as_ref(), "Austin, TX").unwrap().is_none());
}

#[tokio::test]
async fn test_empty_market_yields_empty_result() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/maps/api/place/textsearch/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "ZERO_RESULTS",
            "results": []
        })))
        .mount(&server)
        .await;

    let dir = tempdir().unwrap();
    let config = parse_config(&config_toml(&server.uri(), &dir.path().join("scout.db"))).unwrap();

    let outcome = orchestrator(&config)
        .discover_detailed("Nowhere, NV", CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(outcome.candidates, 0);
    assert_eq!(outcome.result.total_found, 0);
    assert!(outcome.result.competitors.is_empty());
    assert!(outcome.failures.is_empty());
}
