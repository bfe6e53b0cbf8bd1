// Report generation for batch runs and domain aggregation

use crate::aggregate::DomainGraph;
use crate::batch::{BatchEvent, BatchSummary, EntityOutcome};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;

const RULE: &str =
    "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ReportFormat {
    Text,
    Json,
}

impl ReportFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" => Some(ReportFormat::Text),
            "json" => Some(ReportFormat::Json),
            _ => None,
        }
    }
}

pub fn generate_batch_text_report(summary: &BatchSummary, events: &[BatchEvent]) -> String {
    let mut report = String::new();

    report.push_str(RULE);
    report.push_str("\n                            WEFT BATCH CRAWL REPORT\n");
    report.push_str(RULE);
    report.push_str("\n\n");

    report.push_str(&format!("Generated:           {}\n", now_human()));
    report.push_str(&format!("Entities processed:  {}\n", summary.total));
    report.push_str(&format!("Successful crawls:   {}\n", summary.succeeded));
    report.push_str(&format!("Failed crawls:       {}\n", summary.failed));
    report.push('\n');

    let successes: Vec<&BatchEvent> = events
        .iter()
        .filter(|e| e.outcome.is_success())
        .collect();

    if !successes.is_empty() {
        report.push_str(RULE);
        report.push_str("\nSUCCESSFUL CRAWLS\n");
        report.push_str(RULE);
        report.push_str("\n\n");

        for event in successes {
            if let EntityOutcome::Success { nodes, edges } = &event.outcome {
                report.push_str(&format!(
                    "  ✓ {}  ({})\n      {} nodes, {} edges\n",
                    event.entity, event.seed_url, nodes, edges
                ));
            }
        }
        report.push('\n');
    }

    if !summary.failures.is_empty() {
        report.push_str(RULE);
        report.push_str("\nFAILED CRAWLS\n");
        report.push_str(RULE);
        report.push_str("\n\n");

        for failure in &summary.failures {
            report.push_str(&format!("  ✗ {}\n      {}\n", failure.entity, failure.reason));
        }
        report.push('\n');
    }

    report.push_str(RULE);
    report.push_str("\n                                End of Report\n");
    report.push_str(RULE);
    report.push('\n');

    report
}

pub fn generate_batch_json_report(
    summary: &BatchSummary,
    events: &[BatchEvent],
) -> Result<String, serde_json::Error> {
    let json_report = serde_json::json!({
        "report": {
            "metadata": {
                "generator": "weft",
                "version": env!("CARGO_PKG_VERSION"),
                "generated_at": chrono::Utc::now().to_rfc3339(),
                "format": "json"
            },
            "summary": {
                "total_entities": summary.total,
                "succeeded": summary.succeeded,
                "failed": summary.failed
            },
            "failures": summary.failures,
            "entities": events
        }
    });

    serde_json::to_string_pretty(&json_report)
}

pub fn generate_aggregate_text_report(graph: &DomainGraph) -> String {
    let mut report = String::new();

    report.push_str(RULE);
    report.push_str("\n                         CROSS-COMPANY DOMAIN REPORT\n");
    report.push_str(RULE);
    report.push_str("\n\n");

    report.push_str(&format!("Generated:          {}\n", now_human()));
    report.push_str(&format!("Total domains:      {}\n", graph.stats.total_domains));
    report.push_str(&format!("Shared domains:     {}\n", graph.stats.shared_domain_count));
    report.push_str(&format!("Total connections:  {}\n", graph.stats.total_cross_edges));
    report.push('\n');

    if graph.shared.is_empty() {
        report.push_str("No domains are shared between companies.\n\n");
    } else {
        report.push_str(RULE);
        report.push_str("\nDOMAINS SHARED BY MULTIPLE COMPANIES\n");
        report.push_str(RULE);
        report.push_str("\n\n");

        for shared in &graph.shared {
            report.push_str(&format!(
                "  {}  ({} companies)\n      {}\n",
                shared.domain,
                shared.owners.len(),
                shared.owners.join(", ")
            ));
        }
        report.push('\n');
    }

    report.push_str(RULE);
    report.push_str("\n                                End of Report\n");
    report.push_str(RULE);
    report.push('\n');

    report
}

pub fn generate_aggregate_json_report(graph: &DomainGraph) -> Result<String, serde_json::Error> {
    let json_report = serde_json::json!({
        "report": {
            "metadata": {
                "generator": "weft",
                "version": env!("CARGO_PKG_VERSION"),
                "generated_at": chrono::Utc::now().to_rfc3339(),
                "format": "json"
            },
            "statistics": {
                "total_domains": graph.stats.total_domains,
                "shared_domain_count": graph.stats.shared_domain_count,
                "total_cross_edges": graph.stats.total_cross_edges
            },
            "shared_domains": graph.shared
        }
    });

    serde_json::to_string_pretty(&json_report)
}

/// The domain graph as a standalone artifact for external renderers:
/// nodes with weight/classification, edges as domain pairs.
pub fn graph_artifact_json(graph: &DomainGraph) -> Result<String, serde_json::Error> {
    let nodes: Vec<_> = graph.domain_nodes().collect();
    let edges: Vec<_> = graph
        .domain_edges()
        .into_iter()
        .map(|(from, to)| serde_json::json!({ "from": from, "to": to }))
        .collect();

    serde_json::to_string_pretty(&serde_json::json!({
        "nodes": nodes,
        "edges": edges
    }))
}

pub fn save_report(content: &str, path: &Path) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(content.as_bytes())?;
    Ok(())
}

fn now_human() -> String {
    chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string()
}
