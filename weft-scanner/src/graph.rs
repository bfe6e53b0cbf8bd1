//! Link-graph accumulation and the persisted snapshot contract.
//!
//! The node/edge field names (`id`/`label`/`title`/`color`, `from`/`to`/
//! `title`) and the top-level `company_name`/`start_url`/`crawl_date` keys are
//! a wire contract shared with downstream graph renderers. They must
//! round-trip exactly; do not rename them.

use crate::url::domain_of;
use serde::{Deserialize, Serialize};

/// Node color for pages on the seed's own domain.
pub const SEED_DOMAIN_COLOR: &str = "#97c2fc";
/// Node color for pages on any other domain.
pub const EXTERNAL_DOMAIN_COLOR: &str = "#ffa07a";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotNode {
    /// Normalized URL; unique within one snapshot.
    pub id: String,
    /// Canonical domain of the URL.
    pub label: String,
    /// Full URL, shown on hover by renderers.
    pub title: String,
    /// Seed-domain vs external classification, encoded as the render color.
    pub color: String,
}

impl SnapshotNode {
    pub fn is_seed_domain(&self) -> bool {
        self.color == SEED_DOMAIN_COLOR
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotEdge {
    pub from: String,
    pub to: String,
    pub title: String,
}

/// The finished per-entity link graph plus crawl metadata.
///
/// Immutable once produced; the store writes it verbatim and the aggregator
/// reads it back through the same type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub nodes: Vec<SnapshotNode>,
    pub edges: Vec<SnapshotEdge>,
    pub company_name: String,
    pub start_url: String,
    pub crawl_date: String,
}

/// Append-only accumulator driven by the crawler.
///
/// One node per distinct normalized URL, created at first discovery; one edge
/// per node (except the seed), from the page that discovered it. Insertion
/// order is discovery order. The crawler's visited set is the only
/// deduplication; the builder never checks for repeats.
pub struct GraphBuilder {
    seed_domain: String,
    nodes: Vec<SnapshotNode>,
    edges: Vec<SnapshotEdge>,
}

impl GraphBuilder {
    /// Start a graph rooted at the (already normalized) seed URL.
    pub fn new(seed_url: &str) -> Self {
        let seed_domain = domain_of(seed_url).unwrap_or_default();
        let mut builder = Self {
            seed_domain,
            nodes: Vec::new(),
            edges: Vec::new(),
        };
        builder.push_node(seed_url);
        builder
    }

    /// Record a newly discovered URL and the edge from its discoverer.
    pub fn record_discovery(&mut self, discovered_from: &str, url: &str) {
        self.push_node(url);
        self.edges.push(SnapshotEdge {
            from: discovered_from.to_string(),
            to: url.to_string(),
            title: format!("{} → {}", discovered_from, url),
        });
    }

    fn push_node(&mut self, url: &str) {
        let domain = domain_of(url).unwrap_or_default();
        let color = if domain == self.seed_domain {
            SEED_DOMAIN_COLOR
        } else {
            EXTERNAL_DOMAIN_COLOR
        };
        self.nodes.push(SnapshotNode {
            id: url.to_string(),
            label: domain,
            title: url.to_string(),
            color: color.to_string(),
        });
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Close the graph and stamp the crawl metadata.
    pub fn finish(self, company_name: &str, start_url: &str) -> Snapshot {
        Snapshot {
            nodes: self.nodes,
            edges: self.edges,
            company_name: company_name.to_string(),
            start_url: start_url.to_string(),
            crawl_date: chrono::Utc::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}
