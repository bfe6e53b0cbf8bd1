//! Cross-entity domain aggregation.
//!
//! Folds every persisted snapshot into domain-level ownership and edge maps,
//! then emits the shared-domain graph: which domains show up in more than one
//! company's link graph, and which domains link to which.

use crate::exclude::ExclusionFilter;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use weft_scanner::Snapshot;
use weft_scanner::url::domain_of;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
    Shared,
    Exclusive,
}

/// One domain in the emitted graph. Weight is the number of entities whose
/// crawl produced a node on this domain.
#[derive(Debug, Clone, Serialize)]
pub struct DomainNode {
    pub domain: String,
    pub weight: usize,
    pub classification: Classification,
}

#[derive(Debug, Clone, Serialize)]
pub struct SharedDomain {
    pub domain: String,
    pub owners: Vec<String>,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct AggregateStats {
    pub total_domains: usize,
    pub shared_domain_count: usize,
    /// All recorded domain→domain pairs, counted before the emission-time
    /// ownership drop.
    pub total_cross_edges: usize,
}

/// The finished cross-entity graph plus its statistics.
pub struct DomainGraph {
    pub graph: DiGraph<DomainNode, ()>,
    pub stats: AggregateStats,
    pub shared: Vec<SharedDomain>,
}

impl DomainGraph {
    pub fn domain_nodes(&self) -> impl Iterator<Item = &DomainNode> {
        self.graph.node_weights()
    }

    /// Emitted edges as (from-domain, to-domain) pairs.
    pub fn domain_edges(&self) -> Vec<(&str, &str)> {
        self.graph
            .edge_references()
            .map(|edge| {
                (
                    self.graph[edge.source()].domain.as_str(),
                    self.graph[edge.target()].domain.as_str(),
                )
            })
            .collect()
    }
}

/// Order-independent accumulator over snapshots.
///
/// Ownership and edge maps only ever grow during a run; every aggregation run
/// starts from scratch over the full snapshot corpus.
pub struct DomainAggregator {
    filter: ExclusionFilter,
    ownership: BTreeMap<String, BTreeSet<String>>,
    cross_edges: BTreeMap<String, BTreeSet<String>>,
}

impl DomainAggregator {
    pub fn new(filter: ExclusionFilter) -> Self {
        Self {
            filter,
            ownership: BTreeMap::new(),
            cross_edges: BTreeMap::new(),
        }
    }

    /// Fold one entity's snapshot into the domain maps.
    pub fn add_snapshot(&mut self, snapshot: &Snapshot) {
        for node in &snapshot.nodes {
            if self.filter.is_excluded(&node.id) {
                continue;
            }
            let Some(domain) = domain_of(&node.id) else {
                continue;
            };
            self.ownership
                .entry(domain)
                .or_default()
                .insert(snapshot.company_name.clone());
        }

        // Edges are recorded as soon as both endpoints pass the filter, even
        // when the target domain has not (yet) been seen as a node anywhere.
        for edge in &snapshot.edges {
            if self.filter.is_excluded(&edge.from) || self.filter.is_excluded(&edge.to) {
                continue;
            }
            let (Some(from), Some(to)) = (domain_of(&edge.from), domain_of(&edge.to)) else {
                continue;
            };
            self.cross_edges.entry(from).or_default().insert(to);
        }
    }

    pub fn add_snapshots<'a>(&mut self, snapshots: impl IntoIterator<Item = &'a Snapshot>) {
        for snapshot in snapshots {
            self.add_snapshot(snapshot);
        }
    }

    /// Emit the cross-entity graph.
    ///
    /// Nodes: every domain with at least one owning entity. Edges: only
    /// between emitted nodes — targets whose domain was filtered out or never
    /// discovered as a node are dropped, as are self-loops.
    pub fn finish(self) -> DomainGraph {
        let total_cross_edges = self.cross_edges.values().map(BTreeSet::len).sum();

        let mut graph = DiGraph::new();
        let mut index: BTreeMap<&str, NodeIndex> = BTreeMap::new();

        for (domain, owners) in &self.ownership {
            let weight = owners.len();
            let classification = if weight > 1 {
                Classification::Shared
            } else {
                Classification::Exclusive
            };
            let node_index = graph.add_node(DomainNode {
                domain: domain.clone(),
                weight,
                classification,
            });
            index.insert(domain.as_str(), node_index);
        }

        for (from, targets) in &self.cross_edges {
            let Some(&from_index) = index.get(from.as_str()) else {
                continue;
            };
            for to in targets {
                if to == from {
                    continue;
                }
                if let Some(&to_index) = index.get(to.as_str()) {
                    graph.add_edge(from_index, to_index, ());
                }
            }
        }

        let shared: Vec<SharedDomain> = self
            .ownership
            .iter()
            .filter(|(_, owners)| owners.len() > 1)
            .map(|(domain, owners)| SharedDomain {
                domain: domain.clone(),
                owners: owners.iter().cloned().collect(),
            })
            .collect();

        let stats = AggregateStats {
            total_domains: self.ownership.len(),
            shared_domain_count: shared.len(),
            total_cross_edges,
        };

        DomainGraph {
            graph,
            stats,
            shared,
        }
    }
}
