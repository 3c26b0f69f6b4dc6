//! Integration tests for the harvester
//!
//! These tests use wiremock to serve a small help-center site and run the
//! full discover, fetch, decide, render and persist cycle end-to-end.

use std::fs;
use std::path::Path;
use tempfile::TempDir;
use tidemark::config::Config;
use tidemark::crawler::build_site_harvester;
use tidemark::ledger::LedgerStore;
use tidemark::report::{write_run_report, FailureStage, RunReport};
use tidemark::{ChangeReason, DocumentId, HarvestError};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const LISTING_PATH: &str = "/hc/en-us/articles";

/// Creates a test configuration pointing at the mock server
fn create_test_config(base_url: &str, output_dir: &Path) -> Config {
    let mut config = Config::default();
    config.crawler.base_url = base_url.to_string();
    config.crawler.listing_path = LISTING_PATH.to_string();
    config.crawler.request_delay_ms = 0; // No pacing in tests
    config.crawler.timeout_ms = 2_000;
    config.output.output_dir = output_dir.join("out").display().to_string();
    config.output.artifacts_dir = output_dir.join("artifacts").display().to_string();
    config
}

fn listing_page(base_url: &str) -> String {
    format!(
        r#"<html><head><title>Help Center</title></head><body>
        <header><a href="/hc/en-us">Home</a></header>
        <div class="knowledge-tree">
          <a href="/hc/en-us/articles/3-Screens">Screens</a>
          <a href="/hc/en-us/articles/1-Getting-Started">Getting Started</a>
          <a href="{}/hc/en-us/articles/2-Playlists#intro">Playlists</a>
          <a href="/hc/en-us/sections/7-Guides">Guides</a>
          <a href="https://elsewhere.example.com/hc/en-us/articles/9-Other">Other</a>
        </div>
        </body></html>"#,
        base_url
    )
}

fn article(title: &str, text: &str) -> String {
    format!(
        r#"<html><head><title>{} - OptiSigns</title></head><body>
        <nav>Breadcrumbs</nav>
        <h1>{}</h1><p>{}</p>
        <footer>Footer</footer>
        </body></html>"#,
        title, title, text
    )
}

async fn mount_page(server: &MockServer, page_path: &str, status: u16, body: String) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(
            ResponseTemplate::new(status)
                .set_body_string(body)
                .insert_header("content-type", "text/html"),
        )
        .mount(server)
        .await;
}

/// Mounts the listing page and the three articles
async fn mount_site(server: &MockServer, playlists_text: &str) {
    mount_page(server, LISTING_PATH, 200, listing_page(&server.uri())).await;
    mount_page(
        server,
        "/hc/en-us/articles/1-Getting-Started",
        200,
        article("Getting Started", "Install the app."),
    )
    .await;
    mount_page(
        server,
        "/hc/en-us/articles/2-Playlists",
        200,
        article("Playlists", playlists_text),
    )
    .await;
    mount_page(
        server,
        "/hc/en-us/articles/3-Screens",
        200,
        article("Screens", "Pair a screen."),
    )
    .await;
}

fn doc(server: &MockServer, slug: &str) -> DocumentId {
    DocumentId::parse(&format!("{}/hc/en-us/articles/{}", server.uri(), slug)).unwrap()
}

#[tokio::test]
async fn test_full_harvest_of_mock_site() {
    let server = MockServer::start().await;
    mount_site(&server, "Build a playlist.").await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server.uri(), dir.path());
    let mut harvester = build_site_harvester(config.clone()).unwrap();
    let outcome = harvester.run().await;

    assert!(outcome.is_success(), "run failed: {:?}", outcome.result);
    assert_eq!(outcome.discovered, 3);
    assert_eq!(outcome.selected, 3);
    assert_eq!(outcome.tally.new_count(), 3);
    assert_eq!(outcome.tally.error_count(), 0);
    // Alphabetical selection
    assert_eq!(
        outcome.tally.new,
        vec![
            doc(&server, "1-Getting-Started"),
            doc(&server, "2-Playlists"),
            doc(&server, "3-Screens"),
        ]
    );

    let out = dir.path().join("out");
    let markdown = fs::read_to_string(out.join("getting-started.md")).unwrap();
    assert!(markdown.starts_with(&format!(
        "---\nurl: {}/hc/en-us/articles/1-Getting-Started\n",
        server.uri()
    )));
    assert!(markdown.contains("Install the app."));
    assert!(!markdown.contains("Breadcrumbs"));
    assert!(out.join("playlists.md").exists());
    assert!(out.join("screens.md").exists());

    let ledger = LedgerStore::new(config.ledger_path()).load();
    assert_eq!(ledger.len(), 3);
    let entry = ledger.get(&doc(&server, "2-Playlists")).unwrap();
    assert_eq!(entry.output_name, "playlists.md");

    // The lock is released once the run is over
    assert!(!out.join(tidemark::crawler::LOCK_FILE_NAME).exists());
}

#[tokio::test]
async fn test_second_run_skips_unchanged_documents() {
    let server = MockServer::start().await;
    mount_site(&server, "Build a playlist.").await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server.uri(), dir.path());

    let first = build_site_harvester(config.clone()).unwrap().run().await;
    assert_eq!(first.tally.new_count(), 3);
    let ledger_after_first = fs::read_to_string(config.ledger_path()).unwrap();

    let second = build_site_harvester(config.clone()).unwrap().run().await;
    assert!(second.is_success());
    assert_eq!(second.tally.new_count(), 0);
    assert_eq!(second.tally.updated_count(), 0);
    assert_eq!(second.tally.unchanged_count(), 3);
    assert_eq!(second.skipped(), 3);

    // Nothing changed, so the persisted ledger is byte-identical
    assert_eq!(fs::read_to_string(config.ledger_path()).unwrap(), ledger_after_first);
}

#[tokio::test]
async fn test_changed_document_is_rematerialized() {
    let server = MockServer::start().await;
    mount_site(&server, "Build a playlist.").await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server.uri(), dir.path());
    build_site_harvester(config.clone()).unwrap().run().await;

    server.reset().await;
    mount_site(&server, "Build a playlist, then schedule it.").await;

    let outcome = build_site_harvester(config.clone()).unwrap().run().await;
    let playlists = doc(&server, "2-Playlists");

    assert_eq!(outcome.tally.updated, vec![playlists.clone()]);
    assert_eq!(outcome.tally.reason_for(&playlists), Some(ChangeReason::ContentChanged));
    assert_eq!(outcome.tally.unchanged_count(), 2);

    let markdown = fs::read_to_string(dir.path().join("out").join("playlists.md")).unwrap();
    assert!(markdown.contains("schedule it"));
}

#[tokio::test]
async fn test_force_all_reprocesses_unchanged_documents() {
    let server = MockServer::start().await;
    mount_site(&server, "Build a playlist.").await;

    let dir = TempDir::new().unwrap();
    let mut config = create_test_config(&server.uri(), dir.path());
    build_site_harvester(config.clone()).unwrap().run().await;

    config.incremental.force_all = true;
    let outcome = build_site_harvester(config).unwrap().run().await;

    assert_eq!(outcome.tally.updated_count(), 3);
    assert_eq!(outcome.tally.unchanged_count(), 0);
    assert!(outcome
        .tally
        .decisions
        .iter()
        .all(|(_, reason)| *reason == ChangeReason::ForceAll));
}

#[tokio::test]
async fn test_failing_document_does_not_stop_the_run() {
    let server = MockServer::start().await;
    mount_page(&server, LISTING_PATH, 200, listing_page(&server.uri())).await;
    mount_page(
        &server,
        "/hc/en-us/articles/1-Getting-Started",
        200,
        article("Getting Started", "Install the app."),
    )
    .await;
    mount_page(
        &server,
        "/hc/en-us/articles/2-Playlists",
        500,
        "Internal Server Error".to_string(),
    )
    .await;
    mount_page(
        &server,
        "/hc/en-us/articles/3-Screens",
        200,
        article("Screens", "Pair a screen."),
    )
    .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server.uri(), dir.path());
    let outcome = build_site_harvester(config.clone()).unwrap().run().await;

    assert!(outcome.is_success());
    assert_eq!(outcome.tally.new_count(), 2);
    assert_eq!(outcome.tally.error_count(), 1);
    assert_eq!(outcome.tally.failures[0].url, doc(&server, "2-Playlists"));
    assert_eq!(outcome.tally.failures[0].stage, FailureStage::Fetch);
    assert_eq!(outcome.skipped(), 1);

    let ledger = LedgerStore::new(config.ledger_path()).load();
    assert!(!ledger.contains(&doc(&server, "2-Playlists")));
    assert!(ledger.contains(&doc(&server, "3-Screens")));
}

#[tokio::test]
async fn test_slow_document_times_out() {
    let server = MockServer::start().await;
    mount_page(&server, LISTING_PATH, 200, listing_page(&server.uri())).await;
    Mock::given(method("GET"))
        .and(path("/hc/en-us/articles/1-Getting-Started"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(article("Getting Started", "Slow."))
                .set_delay(std::time::Duration::from_secs(5)),
        )
        .mount(&server)
        .await;
    mount_page(
        &server,
        "/hc/en-us/articles/2-Playlists",
        200,
        article("Playlists", "Fast."),
    )
    .await;
    mount_page(
        &server,
        "/hc/en-us/articles/3-Screens",
        200,
        article("Screens", "Fast."),
    )
    .await;

    let dir = TempDir::new().unwrap();
    let mut config = create_test_config(&server.uri(), dir.path());
    config.crawler.timeout_ms = 300;
    let outcome = build_site_harvester(config).unwrap().run().await;

    assert!(outcome.is_success());
    assert_eq!(outcome.tally.error_count(), 1);
    assert_eq!(outcome.tally.failures[0].url, doc(&server, "1-Getting-Started"));
    assert_eq!(outcome.tally.new_count(), 2);
}

#[tokio::test]
async fn test_listing_failure_is_fatal() {
    let server = MockServer::start().await;
    mount_page(&server, LISTING_PATH, 503, "Service Unavailable".to_string()).await;

    // No article may be requested once discovery failed
    Mock::given(method("GET"))
        .and(path("/hc/en-us/articles/1-Getting-Started"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server.uri(), dir.path());
    let outcome = build_site_harvester(config.clone()).unwrap().run().await;

    assert!(matches!(outcome.result, Err(HarvestError::Discovery(_))));
    assert_eq!(outcome.discovered, 0);
    assert!(!config.ledger_path().exists());
}

#[tokio::test]
async fn test_selection_limit_and_reverse_order() {
    let server = MockServer::start().await;
    mount_site(&server, "Build a playlist.").await;

    let dir = TempDir::new().unwrap();
    let mut config = create_test_config(&server.uri(), dir.path());
    config.crawler.max_documents = 2;
    config.crawler.sort_method = tidemark::SortStrategy::Reverse;
    let outcome = build_site_harvester(config).unwrap().run().await;

    assert_eq!(outcome.discovered, 3);
    assert_eq!(outcome.selected, 2);
    assert_eq!(
        outcome.tally.new,
        vec![doc(&server, "3-Screens"), doc(&server, "2-Playlists")]
    );
}

#[tokio::test]
async fn test_run_report_is_written() {
    let server = MockServer::start().await;
    mount_site(&server, "Build a playlist.").await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server.uri(), dir.path());
    let outcome = build_site_harvester(config.clone()).unwrap().run().await;

    let report = RunReport::new(&outcome, &config, None);
    let artifacts = Path::new(&config.output.artifacts_dir);
    let path = write_run_report(artifacts, &report.file_name(&outcome), &report).unwrap();

    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
    assert_eq!(json["success"], true);
    assert_eq!(json["stats"]["added"], 3);
    assert_eq!(json["stats"]["total_processed"], 3);
    assert_eq!(json["total_articles_found"], 3);
    assert!(artifacts.join("latest.json").exists());
}
