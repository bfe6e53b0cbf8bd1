// Tests for the batch orchestrator

use std::time::Duration;
use tempfile::TempDir;
use weft_core::batch::{self, BatchOptions, Entity, EntityOutcome, FailureReason};
use weft_core::store::SnapshotStore;
use weft_scanner::CrawlConfig;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_config() -> CrawlConfig {
    CrawlConfig::default().with_politeness_delay(Duration::ZERO)
}

fn entity(name: &str, seed_url: &str) -> Entity {
    Entity {
        name: name.to_string(),
        seed_url: seed_url.to_string(),
    }
}

async fn mount_html(server: &MockServer, at: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(at))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/html")
                .set_body_bytes(body.into_bytes()),
        )
        .mount(server)
        .await;
}

// ============================================================================
// Input Validation Outcomes
// ============================================================================

#[tokio::test]
async fn test_empty_seed_records_empty_input_failure() {
    let temp = TempDir::new().unwrap();
    let store = SnapshotStore::new(temp.path());

    let options = BatchOptions {
        entities: vec![entity("Blank Co", "   ")],
        config: test_config(),
    };

    let events = batch::run_batch(options, &store, None, None).await.unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(
        events[0].outcome,
        EntityOutcome::Failure(FailureReason::EmptyInput)
    );

    // No snapshot was written for the failed entity.
    assert!(store.load_all().unwrap().is_empty());
}

#[tokio::test]
async fn test_unparseable_seed_records_invalid_url_failure() {
    let temp = TempDir::new().unwrap();
    let store = SnapshotStore::new(temp.path());

    let options = BatchOptions {
        entities: vec![entity("Garbage Co", "not a valid url!!!")],
        config: test_config(),
    };

    let events = batch::run_batch(options, &store, None, None).await.unwrap();
    assert_eq!(
        events[0].outcome,
        EntityOutcome::Failure(FailureReason::InvalidUrl)
    );
    assert!(store.load_all().unwrap().is_empty());
}

// ============================================================================
// Crawl Outcomes
// ============================================================================

#[tokio::test]
async fn test_successful_crawl_is_persisted() {
    let server = MockServer::start().await;
    let root = format!(
        r#"<html><body><a href="{}/about">about</a></body></html>"#,
        server.uri()
    );
    mount_html(&server, "/", root).await;
    mount_html(&server, "/about", "<html><body>hi</body></html>".into()).await;

    let temp = TempDir::new().unwrap();
    let store = SnapshotStore::new(temp.path());

    let options = BatchOptions {
        entities: vec![entity("Acme", &server.uri())],
        config: test_config(),
    };

    let events = batch::run_batch(options, &store, None, None).await.unwrap();
    assert_eq!(events[0].outcome, EntityOutcome::Success { nodes: 2, edges: 1 });

    let snapshots = store.load_all().unwrap();
    assert_eq!(snapshots.len(), 1);
    assert_eq!(snapshots[0].company_name, "Acme");
    assert_eq!(snapshots[0].nodes.len(), 2);
}

#[tokio::test]
async fn test_seed_fetch_failure_still_reports_success() {
    // The seed node enters the graph before any fetch, so a completely dead
    // seed still yields a one-node snapshot and a success outcome. This pins
    // current behavior; it is not a bug fix waiting to happen.
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let temp = TempDir::new().unwrap();
    let store = SnapshotStore::new(temp.path());

    let options = BatchOptions {
        entities: vec![entity("Dead Seed Co", &server.uri())],
        config: test_config(),
    };

    let events = batch::run_batch(options, &store, None, None).await.unwrap();
    assert_eq!(events[0].outcome, EntityOutcome::Success { nodes: 1, edges: 0 });

    let snapshots = store.load_all().unwrap();
    assert_eq!(snapshots.len(), 1);
    assert_eq!(snapshots[0].nodes.len(), 1);
}

#[tokio::test]
async fn test_one_bad_entity_never_aborts_the_batch() {
    let server = MockServer::start().await;
    mount_html(&server, "/", "<html><body>ok</body></html>".into()).await;

    let temp = TempDir::new().unwrap();
    let store = SnapshotStore::new(temp.path());

    let options = BatchOptions {
        entities: vec![
            entity("Broken", ""),
            entity("Working", &server.uri()),
            entity("Also Broken", "not a url"),
        ],
        config: test_config(),
    };

    let events = batch::run_batch(options, &store, None, None).await.unwrap();
    assert_eq!(events.len(), 3);
    assert!(!events[0].outcome.is_success());
    assert!(events[1].outcome.is_success());
    assert!(!events[2].outcome.is_success());

    let summary = batch::summarize(&events);
    assert_eq!(summary.total, 3);
    assert_eq!(summary.succeeded, 1);
    assert_eq!(summary.failed, 2);
}
