use sumi_sift::config::{Config, RobotsUnavailablePolicy};
use sumi_sift::crawler::{
    run_extraction, ExtractionRequest, ExtractionResult, FetchOutcome, Fetcher,
    DISALLOWED_REASON,
};
use sumi_sift::output::render_json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const CATALOG: &str = r#"<html><body>
    <div class="product"><h2>Alpha</h2><a href="/alpha">view</a><span class="price">$10</span><p class="desc">First item</p></div>
    <div class="product"><h2>Beta</h2><a href="/beta">view</a><span class="price">$20</span><p class="desc">Second item</p></div>
    <div class="product"><h2>Gamma</h2><a href="/gamma">view</a><span class="price">$30</span><p class="desc">Third item</p></div>
</body></html>"#;

fn fetcher_with(config: &Config) -> Fetcher {
    Fetcher::new(config).expect("Failed to build fetcher")
}

fn fetcher() -> Fetcher {
    fetcher_with(&Config::default())
}

fn catalog_request(url: &str) -> ExtractionRequest {
    ExtractionRequest::new(url, ".product", "h2", "a", ".price", ".desc")
}

async fn mount_robots(server: &MockServer, body: &str) {
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

/// Mounts robots.txt and asserts it is requested exactly once
async fn mount_robots_once(server: &MockServer, body: &str) {
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .expect(1)
        .mount(server)
        .await;
}

fn closed_port() -> u16 {
    // Grab a free port, then close it so nothing is listening
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

async fn mount_page(server: &MockServer, page: &str, html: &str) {
    Mock::given(method("GET"))
        .and(path(page))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(html)
                .insert_header("content-type", "text/html; charset=utf-8"),
        )
        .mount(server)
        .await;
}

async fn run(fetcher: &Fetcher, request: ExtractionRequest) -> ExtractionResult {
    let validated = request.validate().expect("Request should be valid");
    run_extraction(fetcher, validated).await
}

#[tokio::test]
async fn test_extracts_all_records_in_order() {
    let mock_server = MockServer::start().await;
    mount_robots_once(&mock_server, "User-agent: *\nAllow: /").await;

    Mock::given(method("GET"))
        .and(path("/shop"))
        .respond_with(ResponseTemplate::new(200).set_body_string(CATALOG))
        .expect(1)
        .mount(&mock_server)
        .await;

    let url = format!("{}/shop", mock_server.uri());
    let result = run(&fetcher(), catalog_request(&url)).await;

    assert_eq!(result.url(), url);
    let records = result.records().expect("Expected a success result");
    assert_eq!(records.len(), 3);

    let titles: Vec<_> = records.iter().map(|r| r.title.as_deref()).collect();
    assert_eq!(titles, vec![Some("Alpha"), Some("Beta"), Some("Gamma")]);
    for record in records {
        assert!(record.title.is_some());
        assert!(record.link.is_some());
        assert!(record.price.is_some());
        assert!(record.description.is_some());
    }
    assert_eq!(records[1].link.as_deref(), Some("/beta"));
    assert_eq!(records[2].price.as_deref(), Some("$30"));
}

#[tokio::test]
async fn test_concrete_scenario_wire_shape() {
    let mock_server = MockServer::start().await;
    mount_robots(&mock_server, "User-agent: *\nDisallow: /admin").await;
    mount_page(
        &mock_server,
        "/widgets",
        r#"<div class="p"><h2>Widget</h2><a href="/w">buy</a><span class="price">$9</span></div>"#,
    )
    .await;

    let url = format!("{}/widgets", mock_server.uri());
    let request = ExtractionRequest::new(&url, ".p", "h2", "a", ".price", "em");
    let result = run(&fetcher(), request).await;

    let json: serde_json::Value = serde_json::to_value(&result).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "url": url,
            "products": [{ "title": "Widget", "imageUrl": "/w", "price": "$9" }]
        })
    );
}

#[tokio::test]
async fn test_disallowed_never_fetches_target() {
    let mock_server = MockServer::start().await;
    mount_robots_once(&mock_server, "User-agent: *\nDisallow: /shop").await;

    Mock::given(method("GET"))
        .and(path("/shop"))
        .respond_with(ResponseTemplate::new(200).set_body_string(CATALOG))
        .expect(0)
        .mount(&mock_server)
        .await;

    let url = format!("{}/shop", mock_server.uri());
    let result = run(&fetcher(), catalog_request(&url)).await;

    assert_eq!(
        result,
        ExtractionResult::Failure {
            url,
            error: "URL disallowed by robots.txt".to_string(),
        }
    );
}

#[tokio::test]
async fn test_agent_specific_group_applies() {
    let mock_server = MockServer::start().await;
    mount_robots(
        &mock_server,
        "User-agent: MyCoolScraper\nDisallow: /\n\nUser-agent: *\nAllow: /",
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/shop"))
        .respond_with(ResponseTemplate::new(200).set_body_string(CATALOG))
        .expect(0)
        .mount(&mock_server)
        .await;

    let url = format!("{}/shop", mock_server.uri());
    let result = run(&fetcher(), catalog_request(&url)).await;

    assert!(result.error().unwrap().contains("disallowed"));
}

#[tokio::test]
async fn test_longest_rule_allows_subpath() {
    let mock_server = MockServer::start().await;
    mount_robots(
        &mock_server,
        "User-agent: *\nDisallow: /catalog\nAllow: /catalog/public",
    )
    .await;
    mount_page(&mock_server, "/catalog/public", CATALOG).await;

    let url = format!("{}/catalog/public", mock_server.uri());
    let result = run(&fetcher(), catalog_request(&url)).await;

    assert_eq!(result.records().map(<[_]>::len), Some(3));
}

#[tokio::test]
async fn test_target_server_error_is_failure() {
    let mock_server = MockServer::start().await;
    mount_robots(&mock_server, "User-agent: *\nAllow: /").await;

    Mock::given(method("GET"))
        .and(path("/shop"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&mock_server)
        .await;

    let url = format!("{}/shop", mock_server.uri());
    let result = run(&fetcher(), catalog_request(&url)).await;

    assert!(!result.is_success());
    assert_eq!(result.records(), None);
    let error = result.error().unwrap();
    assert!(error.contains("500"), "unexpected error: {}", error);

    let json = serde_json::to_value(&result).unwrap();
    assert!(json.get("products").is_none());
    assert_eq!(json["url"], serde_json::json!(url));
}

#[tokio::test]
async fn test_target_not_found_is_failure() {
    let mock_server = MockServer::start().await;
    mount_robots(&mock_server, "").await;

    let url = format!("{}/missing", mock_server.uri());
    let result = run(&fetcher(), catalog_request(&url)).await;

    assert!(result.error().unwrap().contains("404"));
}

#[tokio::test]
async fn test_missing_robots_fails_by_default() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/shop"))
        .respond_with(ResponseTemplate::new(200).set_body_string(CATALOG))
        .expect(0)
        .mount(&mock_server)
        .await;

    let url = format!("{}/shop", mock_server.uri());
    let result = run(&fetcher(), catalog_request(&url)).await;

    let error = result.error().expect("Expected a failure result");
    assert!(error.starts_with("Robots.txt unavailable"), "got: {}", error);
    assert!(error.contains("404"));
}

#[tokio::test]
async fn test_missing_robots_allowed_when_configured() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;
    mount_page(&mock_server, "/shop", CATALOG).await;

    let mut config = Config::default();
    config.fetch.on_robots_unavailable = RobotsUnavailablePolicy::Allow;

    let url = format!("{}/shop", mock_server.uri());
    let result = run(&fetcher_with(&config), catalog_request(&url)).await;

    assert_eq!(result.records().map(<[_]>::len), Some(3));
}

#[tokio::test]
async fn test_unreachable_host_is_failure() {
    let url = format!("http://127.0.0.1:{}/shop", closed_port());
    let result = run(&fetcher(), catalog_request(&url)).await;

    let error = result.error().expect("Expected a failure result");
    assert!(error.starts_with("Robots.txt unavailable"), "got: {}", error);
}

#[tokio::test]
async fn test_unreachable_host_with_allow_policy_fails_on_target() {
    let mut config = Config::default();
    config.fetch.on_robots_unavailable = RobotsUnavailablePolicy::Allow;

    let url = format!("http://127.0.0.1:{}/shop", closed_port());
    let result = run(&fetcher_with(&config), catalog_request(&url)).await;

    let error = result.error().expect("Expected a failure result");
    assert!(error.starts_with("Could not connect to"), "got: {}", error);
    assert!(error.contains("/shop"), "got: {}", error);
}

#[tokio::test]
async fn test_slow_robots_fails_by_default() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("User-agent: *\nAllow: /")
                .set_delay(std::time::Duration::from_secs(5)),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/shop"))
        .respond_with(ResponseTemplate::new(200).set_body_string(CATALOG))
        .expect(0)
        .mount(&mock_server)
        .await;

    let mut config = Config::default();
    config.fetch.timeout_secs = 1;
    config.fetch.connect_timeout_secs = 1;

    let url = format!("{}/shop", mock_server.uri());
    let result = run(&fetcher_with(&config), catalog_request(&url)).await;

    let error = result.error().expect("Expected a failure result");
    assert!(
        error.starts_with("Robots.txt unavailable: Request timeout"),
        "got: {}",
        error
    );
}

#[tokio::test]
async fn test_slow_robots_allowed_when_configured() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("User-agent: *\nDisallow: /")
                .set_delay(std::time::Duration::from_secs(5)),
        )
        .expect(1)
        .mount(&mock_server)
        .await;
    mount_page(&mock_server, "/shop", CATALOG).await;

    let mut config = Config::default();
    config.fetch.timeout_secs = 1;
    config.fetch.connect_timeout_secs = 1;
    config.fetch.on_robots_unavailable = RobotsUnavailablePolicy::Allow;

    let url = format!("{}/shop", mock_server.uri());
    let result = run(&fetcher_with(&config), catalog_request(&url)).await;

    assert_eq!(result.records().map(<[_]>::len), Some(3));
}

#[tokio::test]
async fn test_sends_configured_user_agent() {
    let mock_server = MockServer::start().await;
    mount_robots(&mock_server, "User-agent: *\nAllow: /").await;

    Mock::given(method("GET"))
        .and(path("/shop"))
        .and(header("user-agent", "MyCoolScraper/1.0"))
        .respond_with(ResponseTemplate::new(200).set_body_string(CATALOG))
        .expect(1)
        .mount(&mock_server)
        .await;

    let url = format!("{}/shop", mock_server.uri());
    let result = run(&fetcher(), catalog_request(&url)).await;

    assert!(result.is_success(), "got: {:?}", result);
}

#[tokio::test]
async fn test_empty_body_is_failure() {
    let mock_server = MockServer::start().await;
    mount_robots(&mock_server, "User-agent: *\nAllow: /").await;
    mount_page(&mock_server, "/blank", "  \n ").await;

    let url = format!("{}/blank", mock_server.uri());
    let result = run(&fetcher(), catalog_request(&url)).await;

    assert!(result.error().unwrap().starts_with("Empty document body"));
}

#[tokio::test]
async fn test_binary_content_is_failure() {
    let mock_server = MockServer::start().await;
    mount_robots(&mock_server, "User-agent: *\nAllow: /").await;

    Mock::given(method("GET"))
        .and(path("/logo"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(vec![0x89, b'P', b'N', b'G'], "image/png"),
        )
        .mount(&mock_server)
        .await;

    let url = format!("{}/logo", mock_server.uri());
    let result = run(&fetcher(), catalog_request(&url)).await;

    assert!(result.error().unwrap().contains("image/png"));
}

#[tokio::test]
async fn test_oversized_body_is_failure() {
    let mock_server = MockServer::start().await;
    mount_robots(&mock_server, "User-agent: *\nAllow: /").await;
    mount_page(&mock_server, "/shop", CATALOG).await;

    let mut config = Config::default();
    config.fetch.max_body_bytes = 64;

    let url = format!("{}/shop", mock_server.uri());
    let result = run(&fetcher_with(&config), catalog_request(&url)).await;

    let error = result.error().expect("Expected a failure result");
    assert!(error.contains("exceeds 64 bytes"), "got: {}", error);
}

#[tokio::test]
async fn test_body_at_limit_is_accepted() {
    let mock_server = MockServer::start().await;
    mount_robots(&mock_server, "User-agent: *\nAllow: /").await;
    mount_page(&mock_server, "/shop", CATALOG).await;

    let mut config = Config::default();
    config.fetch.max_body_bytes = CATALOG.len();

    let url = format!("{}/shop", mock_server.uri());
    let result = run(&fetcher_with(&config), catalog_request(&url)).await;

    assert_eq!(result.records().map(<[_]>::len), Some(3));
}

#[tokio::test]
async fn test_slow_target_times_out() {
    let mock_server = MockServer::start().await;
    mount_robots(&mock_server, "User-agent: *\nAllow: /").await;

    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(CATALOG)
                .set_delay(std::time::Duration::from_secs(5)),
        )
        .mount(&mock_server)
        .await;

    let mut config = Config::default();
    config.fetch.timeout_secs = 1;
    config.fetch.connect_timeout_secs = 1;

    let url = format!("{}/slow", mock_server.uri());
    let result = run(&fetcher_with(&config), catalog_request(&url)).await;

    assert!(result.error().unwrap().starts_with("Request timeout"));
}

#[tokio::test]
async fn test_containers_without_fields_are_kept() {
    let mock_server = MockServer::start().await;
    mount_robots(&mock_server, "User-agent: *\nAllow: /").await;
    mount_page(
        &mock_server,
        "/sparse",
        r#"<div class="product"></div><div class="product"><h2>Only title</h2></div>"#,
    )
    .await;

    let url = format!("{}/sparse", mock_server.uri());
    let result = run(&fetcher(), catalog_request(&url)).await;

    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(
        json["products"],
        serde_json::json!([{}, { "title": "Only title" }])
    );
}

#[tokio::test]
async fn test_no_matching_containers_is_empty_success() {
    let mock_server = MockServer::start().await;
    mount_robots(&mock_server, "User-agent: *\nAllow: /").await;
    mount_page(&mock_server, "/shop", CATALOG).await;

    let url = format!("{}/shop", mock_server.uri());
    let request = ExtractionRequest::new(&url, ".listing", "h2", "a", ".price", ".desc");
    let result = run(&fetcher(), request).await;

    assert_eq!(result.records(), Some(&[][..]));
}

#[tokio::test]
async fn test_repeated_extraction_is_identical() {
    let mock_server = MockServer::start().await;
    mount_robots(&mock_server, "User-agent: *\nAllow: /").await;
    mount_page(&mock_server, "/shop", CATALOG).await;

    let url = format!("{}/shop", mock_server.uri());
    let fetcher = fetcher();

    let first = render_json(&run(&fetcher, catalog_request(&url)).await, false).unwrap();
    let second = render_json(&run(&fetcher, catalog_request(&url)).await, false).unwrap();

    assert_eq!(first, second);
}

#[tokio::test]
async fn test_fetch_outcome_fetched() {
    let mock_server = MockServer::start().await;
    mount_robots(&mock_server, "User-agent: *\nAllow: /").await;
    mount_page(&mock_server, "/shop", CATALOG).await;

    let url = url::Url::parse(&format!("{}/shop", mock_server.uri())).unwrap();
    let outcome = fetcher().fetch(&url).await;

    assert_eq!(
        outcome,
        FetchOutcome::Fetched {
            body: CATALOG.to_string()
        }
    );
}

#[tokio::test]
async fn test_fetch_outcome_disallowed() {
    let mock_server = MockServer::start().await;
    mount_robots(&mock_server, "User-agent: *\nDisallow: /").await;

    Mock::given(method("GET"))
        .and(path("/shop"))
        .respond_with(ResponseTemplate::new(200).set_body_string(CATALOG))
        .expect(0)
        .mount(&mock_server)
        .await;

    let url = url::Url::parse(&format!("{}/shop", mock_server.uri())).unwrap();
    let outcome = fetcher().fetch(&url).await;

    assert_eq!(
        outcome,
        FetchOutcome::Disallowed {
            reason: DISALLOWED_REASON.to_string()
        }
    );
}

#[tokio::test]
async fn test_fetch_outcome_failed() {
    let mock_server = MockServer::start().await;
    mount_robots(&mock_server, "User-agent: *\nAllow: /").await;

    Mock::given(method("GET"))
        .and(path("/shop"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let url = url::Url::parse(&format!("{}/shop", mock_server.uri())).unwrap();
    match fetcher().fetch(&url).await {
        FetchOutcome::Failed { reason } => assert!(reason.contains("503")),
        other => panic!("Expected Failed, got {:?}", other),
    }
}

#[tokio::test]
async fn test_pipeline_failure_carries_fetch_reason() {
    let mock_server = MockServer::start().await;
    mount_robots(&mock_server, "User-agent: *\nAllow: /").await;

    Mock::given(method("GET"))
        .and(path("/shop"))
        .respond_with(ResponseTemplate::new(503))
        .expect(2)
        .mount(&mock_server)
        .await;

    let fetcher = fetcher();
    let url = format!("{}/shop", mock_server.uri());

    let reason = match fetcher.fetch(&url::Url::parse(&url).unwrap()).await {
        FetchOutcome::Failed { reason } => reason,
        other => panic!("Expected Failed, got {:?}", other),
    };
    let result = run(&fetcher, catalog_request(&url)).await;

    assert_eq!(
        result,
        ExtractionResult::Failure {
            url,
            error: reason,
        }
    );
}
