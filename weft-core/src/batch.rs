//! Batch orchestration: one bounded crawl per roster entity.
//!
//! Outcomes are collected as an append-only event list and reduced into a
//! summary at report time. One entity failing — bad input, dead site,
//! storage trouble — never aborts the rest of the batch.

use crate::store::SnapshotStore;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tracing::{info, warn};
use weft_scanner::url::{is_valid, normalize};
use weft_scanner::{CrawlConfig, Crawler};

#[derive(Debug, Clone)]
pub struct Entity {
    pub name: String,
    pub seed_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum FailureReason {
    EmptyInput,
    InvalidUrl,
    /// Unreachable under the current frontier seeding: the seed node enters
    /// the graph before any fetch, so a finished crawl always has at least
    /// one node. Kept because recorded outcomes carry the full original
    /// failure set; see the pinning test in `tests/batch_tests.rs`.
    NoPages,
    CrawlFailed(String),
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::EmptyInput => write!(f, "Empty or invalid URL"),
            FailureReason::InvalidUrl => write!(f, "Invalid URL"),
            FailureReason::NoPages => write!(f, "No pages crawled"),
            FailureReason::CrawlFailed(message) => write!(f, "{}", message),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum EntityOutcome {
    Success { nodes: usize, edges: usize },
    Failure(FailureReason),
}

impl EntityOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, EntityOutcome::Success { .. })
    }
}

/// One entry in the batch event log.
#[derive(Debug, Clone, Serialize)]
pub struct BatchEvent {
    pub entity: String,
    pub seed_url: String,
    pub outcome: EntityOutcome,
}

#[derive(Debug, Clone, Serialize)]
pub struct FailureEntry {
    pub entity: String,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub failures: Vec<FailureEntry>,
}

pub struct BatchOptions {
    pub entities: Vec<Entity>,
    pub config: CrawlConfig,
}

/// Callback for batch-level progress messages.
pub type BatchProgressCallback = Arc<dyn Fn(String) + Send + Sync>;

/// Crawl every entity in order, persisting successful snapshots to `store`.
///
/// `progress_callback` receives one message per entity; `page_callback` is
/// handed to the crawler and fires once per fetched page.
///
/// Returns the full event log. The only fatal error is failing to construct
/// the HTTP client; everything per-entity is recorded as an outcome.
pub async fn run_batch(
    options: BatchOptions,
    store: &SnapshotStore,
    progress_callback: Option<BatchProgressCallback>,
    page_callback: Option<weft_scanner::ProgressCallback>,
) -> weft_scanner::error::Result<Vec<BatchEvent>> {
    let BatchOptions { entities, config } = options;

    let mut crawler = Crawler::new(config)?;
    if let Some(callback) = page_callback {
        crawler = crawler.with_progress_callback(callback);
    }
    let total = entities.len();
    let mut events = Vec::with_capacity(total);

    for (idx, entity) in entities.iter().enumerate() {
        if let Some(callback) = &progress_callback {
            callback(format!("Crawling {}/{}: {}", idx + 1, total, entity.name));
        }

        let outcome = crawl_entity(&crawler, store, entity).await;
        match &outcome {
            EntityOutcome::Success { nodes, edges } => {
                info!("{}: {} nodes, {} edges", entity.name, nodes, edges);
            }
            EntityOutcome::Failure(reason) => {
                warn!("{}: {}", entity.name, reason);
            }
        }

        events.push(BatchEvent {
            entity: entity.name.clone(),
            seed_url: entity.seed_url.clone(),
            outcome,
        });
    }

    Ok(events)
}

async fn crawl_entity(
    crawler: &Crawler,
    store: &SnapshotStore,
    entity: &Entity,
) -> EntityOutcome {
    let raw = entity.seed_url.trim();
    if raw.is_empty() {
        return EntityOutcome::Failure(FailureReason::EmptyInput);
    }

    let seed = normalize(raw);
    if !is_valid(&seed) {
        return EntityOutcome::Failure(FailureReason::InvalidUrl);
    }

    match crawler.crawl(&entity.name, &seed).await {
        Ok(snapshot) => {
            if snapshot.nodes.is_empty() {
                return EntityOutcome::Failure(FailureReason::NoPages);
            }
            let nodes = snapshot.nodes.len();
            let edges = snapshot.edges.len();
            match store.save(&snapshot) {
                Ok(_) => EntityOutcome::Success { nodes, edges },
                Err(err) => EntityOutcome::Failure(FailureReason::CrawlFailed(err.to_string())),
            }
        }
        Err(err) => EntityOutcome::Failure(FailureReason::CrawlFailed(err.to_string())),
    }
}

/// Reduce the event log into summary statistics.
pub fn summarize(events: &[BatchEvent]) -> BatchSummary {
    let succeeded = events.iter().filter(|e| e.outcome.is_success()).count();
    let failures: Vec<FailureEntry> = events
        .iter()
        .filter_map(|event| match &event.outcome {
            EntityOutcome::Failure(reason) => Some(FailureEntry {
                entity: event.entity.clone(),
                reason: reason.to_string(),
            }),
            EntityOutcome::Success { .. } => None,
        })
        .collect();

    BatchSummary {
        total: events.len(),
        succeeded,
        failed: failures.len(),
        failures,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(entity: &str, outcome: EntityOutcome) -> BatchEvent {
        BatchEvent {
            entity: entity.to_string(),
            seed_url: format!("https://{}.test", entity.to_lowercase()),
            outcome,
        }
    }

    #[test]
    fn test_summarize_counts_and_failures() {
        let events = vec![
            event("Acme", EntityOutcome::Success { nodes: 4, edges: 3 }),
            event("Globex", EntityOutcome::Failure(FailureReason::InvalidUrl)),
            event("Initech", EntityOutcome::Failure(FailureReason::EmptyInput)),
        ];

        let summary = summarize(&events);
        assert_eq!(summary.total, 3);
        assert_eq!(summary.succeeded, 1);
        assert_eq!(summary.failed, 2);
        assert_eq!(summary.failures[0].entity, "Globex");
        assert_eq!(summary.failures[0].reason, "Invalid URL");
        assert_eq!(summary.failures[1].reason, "Empty or invalid URL");
    }

    #[test]
    fn test_summarize_empty_batch() {
        let summary = summarize(&[]);
        assert_eq!(summary.total, 0);
        assert_eq!(summary.succeeded, 0);
        assert_eq!(summary.failed, 0);
        assert!(summary.failures.is_empty());
    }

    #[test]
    fn test_failure_reason_display_matches_recorded_strings() {
        assert_eq!(FailureReason::EmptyInput.to_string(), "Empty or invalid URL");
        assert_eq!(FailureReason::InvalidUrl.to_string(), "Invalid URL");
        assert_eq!(FailureReason::NoPages.to_string(), "No pages crawled");
        assert_eq!(
            FailureReason::CrawlFailed("boom".to_string()).to_string(),
            "boom"
        );
    }
}
