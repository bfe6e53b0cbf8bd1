//! Bounded breadth-first crawl of a single site.
//!
//! The crawler expands a seed URL page by page, strictly one fetch at a time,
//! and feeds every first discovery into a [`GraphBuilder`]. Traversal is
//! bounded by depth and by total page count; a per-page fetch failure only
//! skips that page.

use crate::error::{CrawlError, Result};
use crate::graph::{GraphBuilder, Snapshot};
use crate::url::{is_valid, normalize};
use reqwest::Client;
use scraper::{Html, Selector};
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

pub type ProgressCallback = Arc<dyn Fn(usize, String) + Send + Sync>;

/// Traversal bounds and pacing for one crawl.
///
/// Passed into [`Crawler::new`] explicitly; there is no process-wide
/// configuration.
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    /// Maximum discovery depth; pages at this depth become leaf nodes.
    pub max_depth: usize,
    /// Maximum number of nodes in the snapshot, seed included.
    pub max_pages: usize,
    /// Unconditional pause after each successfully fetched page.
    pub politeness_delay: Duration,
    /// Per-request timeout for the HTTP client.
    pub request_timeout: Duration,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            max_depth: 5,
            max_pages: 100,
            politeness_delay: Duration::from_secs(2),
            request_timeout: Duration::from_secs(10),
        }
    }
}

impl CrawlConfig {
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn with_max_pages(mut self, pages: usize) -> Self {
        self.max_pages = pages;
        self
    }

    pub fn with_politeness_delay(mut self, delay: Duration) -> Self {
        self.politeness_delay = delay;
        self
    }
}

pub struct Crawler {
    client: Client,
    config: CrawlConfig,
    progress_callback: Option<ProgressCallback>,
}

impl Crawler {
    pub fn new(config: CrawlConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!(
                "Weft/",
                env!("CARGO_PKG_VERSION"),
                " (https://github.com/trapdoorsec/weft)"
            ))
            .timeout(config.request_timeout)
            .connect_timeout(config.request_timeout / 2)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()?;

        Ok(Self {
            client,
            config,
            progress_callback: None,
        })
    }

    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Crawl one site and return its link-graph snapshot.
    ///
    /// The seed is normalized and becomes the first visited node before any
    /// fetch happens, so the snapshot always contains at least the seed --
    /// even when the seed page itself cannot be fetched.
    ///
    /// A URL is marked visited at *discovery*, not at fetch. When a budget
    /// runs out first, discovered-but-unfetched URLs stay in the snapshot as
    /// leaf nodes.
    pub async fn crawl(&self, entity_name: &str, seed_url: &str) -> Result<Snapshot> {
        let seed = normalize(seed_url);
        if !is_valid(&seed) {
            return Err(CrawlError::InvalidUrl(seed));
        }

        info!("Starting crawl of {} for {}", seed, entity_name);

        let mut frontier: VecDeque<(String, usize)> = VecDeque::new();
        let mut visited: HashSet<String> = HashSet::new();
        let mut builder = GraphBuilder::new(&seed);

        visited.insert(seed.clone());
        frontier.push_back((seed.clone(), 0));

        let mut pages_fetched = 0usize;

        while visited.len() < self.config.max_pages {
            let Some((current, depth)) = frontier.pop_front() else {
                break;
            };

            // Already a node; past the depth budget it contributes no edges.
            if depth >= self.config.max_depth {
                continue;
            }

            let body = match self.fetch_page(&current).await {
                Ok(Some(body)) => body,
                Ok(None) => continue,
                Err(err) => {
                    warn!("Skipping {}: {}", current, err);
                    continue;
                }
            };

            pages_fetched += 1;
            if let Some(callback) = &self.progress_callback {
                callback(pages_fetched, current.clone());
            }

            for href in extract_hrefs(&body) {
                if visited.len() >= self.config.max_pages {
                    break;
                }
                let Some(resolved) = resolve_href(&current, &href) else {
                    continue;
                };
                let candidate = normalize(&resolved);
                if !is_valid(&candidate) || visited.contains(&candidate) {
                    continue;
                }
                visited.insert(candidate.clone());
                frontier.push_back((candidate.clone(), depth + 1));
                builder.record_discovery(&current, &candidate);
            }

            // Be nice to the server before the next fetch.
            tokio::time::sleep(self.config.politeness_delay).await;
        }

        info!(
            "Crawl of {} finished: {} nodes, {} edges, {} pages fetched",
            seed,
            builder.node_count(),
            builder.edge_count(),
            pages_fetched
        );

        Ok(builder.finish(entity_name, &seed))
    }

    /// Fetch one page. `Ok(None)` means the page was reachable but yields
    /// nothing to expand (non-success status); transport failures surface as
    /// errors and are skipped by the caller.
    async fn fetch_page(&self, url: &str) -> Result<Option<String>> {
        debug!("Fetching {}", url);

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            debug!("Skipping {} (status {})", url, status);
            return Ok(None);
        }

        let is_html = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|ct| ct.contains("text/html"))
            .unwrap_or(false);

        if !is_html {
            // Fetched fine, but there is nothing to extract links from.
            return Ok(Some(String::new()));
        }

        Ok(Some(response.text().await?))
    }
}

/// Pull raw `href` values out of a fetched page.
fn extract_hrefs(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let link_selector = Selector::parse("a[href]").unwrap();

    document
        .select(&link_selector)
        .filter_map(|element| element.value().attr("href"))
        .map(str::to_string)
        .collect()
}

/// Resolve an href against the page it appeared on. Fragments are dropped so
/// `/page` and `/page#section` collapse into one URL. Non-hierarchical
/// schemes (`mailto:`, `tel:`, ...) resolve as-is and are left for the
/// aggregation-time exclusion filter to weed out.
fn resolve_href(base: &str, href: &str) -> Option<String> {
    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let base_url = Url::parse(base).ok()?;
    let mut resolved = base_url.join(href).ok()?;
    resolved.set_fragment(None);

    Some(resolved.to_string())
}
