//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and run full crawls
//! end-to-end: discovery, fetching, visibility checks and report output.

use async_trait::async_trait;
use link_sweeper::config::{parse_config, Config};
use link_sweeper::crawler::{run_crawl, Coordinator};
use link_sweeper::output::{write_reports, FailureKind};
use link_sweeper::verify::{VisibilityOracle, VisibilityVerifier};
use link_sweeper::SweeperError;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration for a crawl seeded at `seed`
///
/// `extra` is appended to the `[crawl]` section and may open further sections.
fn create_test_config(seed: &str, extra: &str) -> Config {
    let toml = format!(
        r#"[crawl]
initial-url = "{}"
timeout = 2
max-threads-count = 8
max-recursion = 3
{}
"#,
        seed, extra
    );
    parse_config(&toml).expect("Failed to parse test config")
}

fn html(body: impl Into<String>) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(body.into())
        .insert_header("content-type", "text/html")
}

async fn mount_page(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(html(body))
        .mount(server)
        .await;
}

/// Oracle whose renderer always crashes
struct CrashingOracle;

#[async_trait]
impl VisibilityOracle for CrashingOracle {
    async fn count_visible_anchors(&self, url: &str, _: &str) -> Result<usize, SweeperError> {
        Err(SweeperError::Verification {
            url: url.to_string(),
            message: "renderer crashed".to_string(),
        })
    }

    fn name(&self) -> &'static str {
        "crashing"
    }
}

#[tokio::test]
async fn test_visible_404_is_reported_once() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(
        &server,
        "/",
        format!(
            r#"<html><body>
            <a href="{base}/a">A</a>
            <a href="{base}/b">B</a>
            </body></html>"#
        ),
    )
    .await;
    mount_page(&server, "/a", "<html><body>No links</body></html>".to_string()).await;
    Mock::given(method("GET"))
        .and(path("/b"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let config = create_test_config(&format!("{}/", base), "");
    let outcome = run_crawl(config).await.expect("Crawl failed");

    assert_eq!(outcome.report.total(), 1);
    let missing = outcome.report.get(FailureKind::Status(404));
    assert_eq!(missing.len(), 1);
    assert_eq!(missing[0].url, format!("{}/b", base));
    assert_eq!(missing[0].parent, format!("{}/", base));
}

#[tokio::test]
async fn test_excluded_500_is_never_reported() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(
        &server,
        "/",
        format!(r#"<a href="{base}/ads/x">ad</a> <a href="{base}/ok">ok</a>"#),
    )
    .await;
    mount_page(&server, "/ok", String::new()).await;
    Mock::given(method("GET"))
        .and(path("/ads/x"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let config = create_test_config(
        &format!("{}/", base),
        "[filters]\nexclude-urls = [\"/ads/\"]",
    );
    let outcome = run_crawl(config).await.expect("Crawl failed");

    assert!(outcome.report.is_empty());
    assert_eq!(outcome.state.excluded, 1);
    assert!(!outcome.tested.iter().any(|u| u.contains("/ads/")));
}

#[tokio::test]
async fn test_ignored_candidates_are_never_fetched() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(
        &server,
        "/",
        format!(
            r#"<a href="{base}/share?to=mailto:someone@example.test">mail</a>
               <a href="{base}/about">about</a>"#
        ),
    )
    .await;
    mount_page(&server, "/about", String::new()).await;
    Mock::given(method("GET"))
        .and(path("/share"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let config = create_test_config(
        &format!("{}/", base),
        "[filters]\nignore-urls = \"mailto:\\njavascript:\"",
    );
    let outcome = run_crawl(config).await.expect("Crawl failed");

    assert_eq!(outcome.tested, vec![format!("{}/about", base)]);
    assert!(outcome.report.is_empty());
}

#[tokio::test]
async fn test_slow_link_is_reported_as_timeout() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(
        &server,
        "/",
        format!(r#"<a href="{base}/slow">slow</a> <a href="{base}/fast">fast</a>"#),
    )
    .await;
    mount_page(&server, "/fast", String::new()).await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
        .mount(&server)
        .await;

    let mut config = create_test_config(&format!("{}/", base), "");
    config.crawl.timeout = 1;

    let started = std::time::Instant::now();
    let outcome = run_crawl(config).await.expect("Crawl failed");

    assert!(started.elapsed() < Duration::from_secs(5));
    let timeouts = outcome.report.get(FailureKind::Timeout);
    assert_eq!(timeouts.len(), 1);
    assert_eq!(timeouts[0].url, format!("{}/slow", base));
    assert_eq!(outcome.report.total(), 1);
}

#[tokio::test]
async fn test_concurrency_limit_is_never_exceeded() {
    let server = MockServer::start().await;
    let base = server.uri();

    let body: String = (0..20)
        .map(|i| format!("<a href=\"{}/item/{}\">item</a>\n", base, i))
        .collect();
    mount_page(&server, "/", body).await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/item/\d+$"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(100)))
        .mount(&server)
        .await;

    let mut config = create_test_config(&format!("{}/", base), "concurrency-limit = 3");
    config.crawl.max_threads_count = 20;
    let coordinator = Coordinator::new(config).expect("Failed to build coordinator");
    let gate = coordinator.gate().clone();
    let outcome = coordinator.run().await.expect("Crawl failed");

    assert_eq!(outcome.state.fetched, 20);
    assert!(outcome.report.is_empty());
    assert!(outcome.peak_in_flight <= 3);
    assert!(gate.peak_in_flight() >= 1);
}

#[tokio::test]
async fn test_crashing_verifier_fails_open() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(&server, "/", format!(r#"<a href="{base}/gone">gone</a>"#)).await;
    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(410))
        .mount(&server)
        .await;

    let config = create_test_config(&format!("{}/", base), "");
    let verifier = VisibilityVerifier::new(Arc::new(CrashingOracle), Duration::from_secs(1), 1);
    let outcome = Coordinator::new(config)
        .expect("Failed to build coordinator")
        .with_verifier(Some(verifier))
        .run()
        .await
        .expect("Crawl failed");

    assert_eq!(outcome.report.get(FailureKind::Status(410)).len(), 1);
    assert_eq!(outcome.state.suppressed, 0);
}

#[tokio::test]
async fn test_hidden_failure_is_suppressed() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(
        &server,
        "/",
        format!(
            r#"<html><body>
            <a href="{base}/shown">shown</a>
            <div style="display: none"><a href="{base}/secret">secret</a></div>
            </body></html>"#
        ),
    )
    .await;

    // Neither /shown nor /secret is mounted: both answer 404
    let config = create_test_config(&format!("{}/", base), "[verify]\nbackend = \"static\"");
    let outcome = run_crawl(config).await.expect("Crawl failed");

    let missing = outcome.report.get(FailureKind::Status(404));
    assert_eq!(missing.len(), 1);
    assert_eq!(missing[0].url, format!("{}/shown", base));
    assert_eq!(outcome.state.suppressed, 1);
}

#[tokio::test]
async fn test_hidden_failure_reported_without_verification() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(
        &server,
        "/",
        format!(r#"<div class="hidden"><a href="{base}/secret">secret</a></div>"#),
    )
    .await;

    let config = create_test_config(&format!("{}/", base), "[verify]\nenabled = false");
    let outcome = run_crawl(config).await.expect("Crawl failed");

    assert_eq!(outcome.report.get(FailureKind::Status(404)).len(), 1);
    assert_eq!(outcome.state.suppressed, 0);
}

#[tokio::test]
async fn test_hop_limit_stops_expansion() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(&server, "/", format!(r#"<a href="{base}/p0">p0</a>"#)).await;
    mount_page(&server, "/p0", format!(r#"<a href="{base}/p1">p1</a>"#)).await;
    mount_page(&server, "/p1", format!(r#"<a href="{base}/p2">p2</a>"#)).await;
    Mock::given(method("GET"))
        .and(path("/p2"))
        .respond_with(html(format!(r#"<a href="{base}/p3">p3</a>"#)))
        .expect(0)
        .mount(&server)
        .await;

    let mut config = create_test_config(&format!("{}/", base), "");
    config.crawl.max_recursion = 1;
    let outcome = run_crawl(config).await.expect("Crawl failed");

    assert_eq!(outcome.rounds(), 2);
    assert_eq!(
        outcome.tested,
        vec![format!("{}/p0", base), format!("{}/p1", base)]
    );
    assert!(outcome.state.is_done());
}

#[tokio::test]
async fn test_out_of_scope_pages_are_checked_but_not_expanded() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(
        &server,
        "/",
        format!(r#"<a href="{base}/docs/intro">docs</a> <a href="{base}/blog/post">blog</a>"#),
    )
    .await;
    mount_page(&server, "/docs/intro", String::new()).await;
    mount_page(&server, "/blog/post", format!(r#"<a href="{base}/blog/deep">deep</a>"#)).await;
    Mock::given(method("GET"))
        .and(path("/blog/deep"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let config = create_test_config(
        &format!("{}/", base),
        "child-urls-should-contain = \"/docs/\"",
    );
    let outcome = run_crawl(config).await.expect("Crawl failed");

    assert_eq!(outcome.state.fetched, 2);
    assert_eq!(outcome.state.expanded, 1);
}

#[tokio::test]
async fn test_reports_are_written() {
    let server = MockServer::start().await;
    let base = server.uri();
    let dir = TempDir::new().expect("Failed to create temp dir");

    mount_page(
        &server,
        "/",
        format!(r#"<a href="{base}/a">A</a> <a href="{base}/b">B</a>"#),
    )
    .await;
    mount_page(&server, "/a", String::new()).await;

    let mut config = create_test_config(&format!("{}/", base), "[verify]\nenabled = false");
    config.output.results_file = dir.path().join("results.txt").display().to_string();
    config.output.links_file = dir.path().join("all_tested_links").display().to_string();
    config.output.html_report_name = Some(dir.path().join("report.html").display().to_string());

    let outcome = run_crawl(config.clone()).await.expect("Crawl failed");
    let written = write_reports(&outcome, &config).expect("Failed to write reports");

    let results = std::fs::read_to_string(&written.results).unwrap();
    assert_eq!(
        results,
        format!("404 {base}/b parent page: {base}/\n")
    );

    let links = std::fs::read_to_string(&written.links).unwrap();
    assert_eq!(links.lines().count(), 2);

    let report = std::fs::read_to_string(&written.html).unwrap();
    assert!(report.contains("<summary>404 (1)</summary>"));
    assert!(report.contains(&format!("{}/b", base)));
}
