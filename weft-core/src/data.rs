use crate::batch::{BatchEvent, EntityOutcome};
use rusqlite::{Connection, Result, params};
use std::fs;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

/// Run-history database: one row per batch run, one row per entity outcome.
pub struct Database {
    conn: Connection,
}

#[derive(Debug, Clone)]
pub struct RunRow {
    pub id: String,
    pub started_at: i64,
    pub finished_at: Option<i64>,
    pub status: String,
    pub total_entities: i64,
}

#[derive(Debug, Clone)]
pub struct OutcomeRow {
    pub entity: String,
    pub seed_url: String,
    pub status: String,
    pub failure_reason: Option<String>,
    pub nodes: i64,
    pub edges: i64,
}

fn current_timestamp() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0) as i64
}

impl Database {
    pub fn remove(path: &Path) -> std::io::Result<()> {
        fs::remove_file(path)
    }

    pub fn exists(path: &Path) -> bool {
        path.exists()
    }

    pub fn new(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            ",
        )?;

        let db = Database { conn };
        db.init_schema()?;
        Ok(db)
    }

    fn init_schema(&self) -> Result<()> {
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS crawl_runs (
                id TEXT PRIMARY KEY,
                started_at INTEGER NOT NULL,
                finished_at INTEGER,
                status TEXT NOT NULL CHECK(status IN ('running', 'completed', 'failed')),
                total_entities INTEGER NOT NULL DEFAULT 0
            );

            CREATE TABLE IF NOT EXISTS entity_outcomes (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                run_id TEXT NOT NULL,
                entity TEXT NOT NULL,
                seed_url TEXT NOT NULL,
                status TEXT NOT NULL CHECK(status IN ('success', 'failure')),
                failure_reason TEXT,
                nodes INTEGER NOT NULL DEFAULT 0,
                edges INTEGER NOT NULL DEFAULT 0,
                recorded_at INTEGER NOT NULL,
                FOREIGN KEY(run_id) REFERENCES crawl_runs(id) ON DELETE CASCADE
            );

            CREATE INDEX IF NOT EXISTS idx_outcomes_run ON entity_outcomes(run_id);
            CREATE INDEX IF NOT EXISTS idx_outcomes_status ON entity_outcomes(run_id, status);
            ",
        )?;
        Ok(())
    }

    pub fn create_run(&self, total_entities: usize) -> Result<String> {
        let run_id = uuid::Uuid::new_v4().to_string();
        let timestamp = current_timestamp();

        self.conn.execute(
            "INSERT INTO crawl_runs (id, started_at, status, total_entities) VALUES (?1, ?2, ?3, ?4)",
            params![&run_id, timestamp, "running", total_entities as i64],
        )?;

        Ok(run_id)
    }

    pub fn complete_run(&self, run_id: &str) -> Result<()> {
        let timestamp = current_timestamp();
        self.conn.execute(
            "UPDATE crawl_runs SET status = ?1, finished_at = ?2 WHERE id = ?3",
            params!["completed", timestamp, run_id],
        )?;
        Ok(())
    }

    pub fn fail_run(&self, run_id: &str) -> Result<()> {
        let timestamp = current_timestamp();
        self.conn.execute(
            "UPDATE crawl_runs SET status = ?1, finished_at = ?2 WHERE id = ?3",
            params!["failed", timestamp, run_id],
        )?;
        Ok(())
    }

    pub fn record_outcome(&self, run_id: &str, event: &BatchEvent) -> Result<i64> {
        let timestamp = current_timestamp();

        let (status, failure_reason, nodes, edges) = match &event.outcome {
            EntityOutcome::Success { nodes, edges } => {
                ("success", None, *nodes as i64, *edges as i64)
            }
            EntityOutcome::Failure(reason) => ("failure", Some(reason.to_string()), 0, 0),
        };

        self.conn.execute(
            "INSERT INTO entity_outcomes (
                run_id, entity, seed_url, status, failure_reason, nodes, edges, recorded_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                run_id,
                &event.entity,
                &event.seed_url,
                status,
                failure_reason,
                nodes,
                edges,
                timestamp,
            ],
        )?;

        Ok(self.conn.last_insert_rowid())
    }

    pub fn get_runs(&self) -> Result<Vec<RunRow>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, started_at, finished_at, status, total_entities
             FROM crawl_runs ORDER BY started_at DESC",
        )?;

        let runs = stmt
            .query_map([], |row| {
                Ok(RunRow {
                    id: row.get(0)?,
                    started_at: row.get(1)?,
                    finished_at: row.get(2)?,
                    status: row.get(3)?,
                    total_entities: row.get(4)?,
                })
            })?
            .collect::<Result<Vec<_>>>()?;

        Ok(runs)
    }

    pub fn get_latest_run(&self) -> Result<Option<RunRow>> {
        Ok(self.get_runs()?.into_iter().next())
    }

    pub fn get_outcomes_by_run(&self, run_id: &str) -> Result<Vec<OutcomeRow>> {
        let mut stmt = self.conn.prepare(
            "SELECT entity, seed_url, status, failure_reason, nodes, edges
             FROM entity_outcomes WHERE run_id = ?1 ORDER BY id",
        )?;

        let outcomes = stmt
            .query_map(params![run_id], |row| {
                Ok(OutcomeRow {
                    entity: row.get(0)?,
                    seed_url: row.get(1)?,
                    status: row.get(2)?,
                    failure_reason: row.get(3)?,
                    nodes: row.get(4)?,
                    edges: row.get(5)?,
                })
            })?
            .collect::<Result<Vec<_>>>()?;

        Ok(outcomes)
    }

    pub fn get_connection(&self) -> &Connection {
        &self.conn
    }
}
