pub mod aggregate;
pub mod batch;
pub mod data;
pub mod exclude;
pub mod report;
pub mod store;

pub use aggregate::{AggregateStats, DomainAggregator, DomainGraph};
pub use batch::{BatchEvent, BatchOptions, BatchSummary, Entity, EntityOutcome, FailureReason};
pub use exclude::ExclusionFilter;
pub use store::SnapshotStore;

/// Printed by the CLI on startup unless `--quiet` is set.
pub fn print_banner() {
    println!(
        r#"
 __      __    _____  ___
/  \    /  \__/ ____\/  _|_
\   \/\/   / __\  __\   _| |_
 \        /  __/ |  |  |_   _|
  \__/\__/\____|_|  |__| |_|

 weft v{} - shared-domain mapper
"#,
        env!("CARGO_PKG_VERSION")
    );
}
