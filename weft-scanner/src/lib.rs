pub mod crawler;
pub mod error;
pub mod graph;
pub mod url;

pub use crawler::{CrawlConfig, Crawler, ProgressCallback};
pub use error::CrawlError;
pub use graph::{GraphBuilder, Snapshot, SnapshotEdge, SnapshotNode};
