//! On-disk persistence of per-entity crawl snapshots.
//!
//! Layout mirrors what downstream tooling expects: one directory per entity
//! under the store root, holding a single `graph_data.json`.

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};
use weft_scanner::Snapshot;

pub const SNAPSHOT_FILENAME: &str = "graph_data.json";

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed snapshot at {path}: {source}")]
    Malformed {
        path: PathBuf,
        source: serde_json::Error,
    },
}

pub type Result<T> = std::result::Result<T, StoreError>;

pub struct SnapshotStore {
    root: PathBuf,
}

impl SnapshotStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory an entity's snapshot lives in.
    pub fn entity_dir(&self, entity_name: &str) -> PathBuf {
        self.root.join(sanitize_entity_name(entity_name))
    }

    /// Persist a snapshot, creating the entity directory as needed.
    /// Returns the path of the written file.
    pub fn save(&self, snapshot: &Snapshot) -> Result<PathBuf> {
        let dir = self.entity_dir(&snapshot.company_name);
        fs::create_dir_all(&dir)?;

        let path = dir.join(SNAPSHOT_FILENAME);
        let json = serde_json::to_string_pretty(snapshot).map_err(|source| {
            StoreError::Malformed {
                path: path.clone(),
                source,
            }
        })?;
        fs::write(&path, json)?;

        debug!("Saved snapshot for {} to {}", snapshot.company_name, path.display());
        Ok(path)
    }

    /// Load one entity directory's snapshot. Missing fields in the JSON are a
    /// hard error; the wire contract has no optional parts.
    pub fn load_dir(&self, dir: &Path) -> Result<Snapshot> {
        let path = dir.join(SNAPSHOT_FILENAME);
        let content = fs::read_to_string(&path)?;
        serde_json::from_str(&content).map_err(|source| StoreError::Malformed { path, source })
    }

    /// Load every readable snapshot under the store root.
    ///
    /// A missing or malformed snapshot means "no data for this entity": it is
    /// logged and skipped, never fatal to the aggregation run.
    pub fn load_all(&self) -> Result<Vec<Snapshot>> {
        let mut snapshots = Vec::new();

        if !self.root.exists() {
            warn!("Snapshot root {} does not exist", self.root.display());
            return Ok(snapshots);
        }

        let mut dirs: Vec<PathBuf> = fs::read_dir(&self.root)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_dir())
            .collect();
        dirs.sort();

        for dir in dirs {
            match self.load_dir(&dir) {
                Ok(snapshot) => snapshots.push(snapshot),
                Err(err) => {
                    warn!("Skipping {}: {}", dir.display(), err);
                }
            }
        }

        Ok(snapshots)
    }
}

/// Filesystem-safe directory name for an entity: alphanumerics, dashes and
/// underscores kept, spaces collapsed to underscores, everything else
/// dropped.
pub fn sanitize_entity_name(name: &str) -> String {
    let kept: String = name
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == ' ' || *c == '-' || *c == '_')
        .collect();
    kept.trim().replace(' ', "_")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use weft_scanner::GraphBuilder;

    fn sample_snapshot(name: &str, seed: &str) -> Snapshot {
        let mut builder = GraphBuilder::new(seed);
        builder.record_discovery(seed, &format!("{}/about", seed));
        builder.finish(name, seed)
    }

    #[test]
    fn test_sanitize_entity_name() {
        assert_eq!(sanitize_entity_name("Acme Corp"), "Acme_Corp");
        assert_eq!(sanitize_entity_name("Sløgan & Sons!"), "Sløgan__Sons");
        assert_eq!(sanitize_entity_name("  padded  "), "padded");
    }

    #[test]
    fn test_save_then_load_round_trips() {
        let temp = TempDir::new().unwrap();
        let store = SnapshotStore::new(temp.path());

        let snapshot = sample_snapshot("Acme Corp", "https://acme.test");
        let path = store.save(&snapshot).unwrap();
        assert!(path.ends_with("Acme_Corp/graph_data.json"));

        let loaded = store.load_all().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0], snapshot);
    }

    #[test]
    fn test_load_all_skips_malformed_entries() {
        let temp = TempDir::new().unwrap();
        let store = SnapshotStore::new(temp.path());

        store.save(&sample_snapshot("Good", "https://good.test")).unwrap();

        let bad_dir = temp.path().join("Bad");
        fs::create_dir_all(&bad_dir).unwrap();
        fs::write(bad_dir.join(SNAPSHOT_FILENAME), "{ not json").unwrap();

        let empty_dir = temp.path().join("Empty");
        fs::create_dir_all(&empty_dir).unwrap();

        let loaded = store.load_all().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].company_name, "Good");
    }

    #[test]
    fn test_load_all_on_missing_root() {
        let temp = TempDir::new().unwrap();
        let store = SnapshotStore::new(temp.path().join("never_created"));
        assert!(store.load_all().unwrap().is_empty());
    }

    #[test]
    fn test_load_dir_reports_malformed_error() {
        let temp = TempDir::new().unwrap();
        let store = SnapshotStore::new(temp.path());

        let dir = temp.path().join("Broken");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(SNAPSHOT_FILENAME), r#"{"nodes": []}"#).unwrap();

        let err = store.load_dir(&dir).unwrap_err();
        assert!(matches!(err, StoreError::Malformed { .. }));
    }
}
