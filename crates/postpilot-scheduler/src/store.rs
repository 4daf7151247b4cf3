//! SQLite-backed job storage.

use chrono::{DateTime, Utc};
use rusqlite::{Connection, Row, params};
use std::path::Path;
use std::sync::Mutex;

use postpilot_types::{ContentSettings, Job, JobStatus, RunStats, Schedule};

use crate::error::Result;

const SCHEMA: &str = "PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS jobs (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    agent_id TEXT NOT NULL,
    agent_name TEXT NOT NULL,
    business_ids TEXT NOT NULL,
    schedule TEXT NOT NULL,
    status TEXT NOT NULL,
    timezone TEXT NOT NULL DEFAULT 'UTC',
    settings TEXT NOT NULL,
    total_runs INTEGER NOT NULL DEFAULT 0,
    successful_runs INTEGER NOT NULL DEFAULT 0,
    failed_runs INTEGER NOT NULL DEFAULT 0,
    last_run TEXT,
    next_run TEXT,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_jobs_due ON jobs (status, next_run);";

const JOB_COLUMNS: &str = "id, name, agent_id, agent_name, business_ids, schedule, status, \
     timezone, settings, total_runs, successful_runs, failed_runs, last_run, next_run, created_at";

/// Persistent storage for jobs.
pub struct JobStore {
    conn: Mutex<Connection>,
}

fn decode_job(row: &Row<'_>) -> std::result::Result<Job, String> {
    let sql = |e: rusqlite::Error| e.to_string();
    let business_ids: Vec<String> =
        serde_json::from_str(&row.get::<_, String>(4).map_err(sql)?).map_err(|e| e.to_string())?;
    let schedule: Schedule =
        serde_json::from_str(&row.get::<_, String>(5).map_err(sql)?).map_err(|e| e.to_string())?;
    let status: JobStatus = row.get::<_, String>(6).map_err(sql)?.parse()?;
    let settings: ContentSettings =
        serde_json::from_str(&row.get::<_, String>(8).map_err(sql)?).map_err(|e| e.to_string())?;
    let parse_ts = |s: Option<String>| -> std::result::Result<Option<DateTime<Utc>>, String> {
        s.map(|s| s.parse().map_err(|e: chrono::ParseError| e.to_string()))
            .transpose()
    };
    Ok(Job {
        id: row.get(0).map_err(sql)?,
        name: row.get(1).map_err(sql)?,
        agent_id: row.get(2).map_err(sql)?,
        agent_name: row.get(3).map_err(sql)?,
        business_ids,
        schedule,
        status,
        timezone: row.get(7).map_err(sql)?,
        settings,
        stats: RunStats {
            total_runs: row.get(9).map_err(sql)?,
            successful_runs: row.get(10).map_err(sql)?,
            failed_runs: row.get(11).map_err(sql)?,
            last_run: parse_ts(row.get(12).map_err(sql)?)?,
            next_run: parse_ts(row.get(13).map_err(sql)?)?,
        },
        created_at: row
            .get::<_, String>(14)
            .map_err(sql)?
            .parse()
            .map_err(|e: chrono::ParseError| e.to_string())?,
    })
}

impl JobStore {
    /// Open (or create) the job database at the given path.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch(SCHEMA)?;
        tracing::info!("Job store opened: {}", path.display());
        Ok(Self { conn: Mutex::new(conn) })
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn: Mutex::new(conn) })
    }

    /// Insert or replace a job record.
    pub fn upsert(&self, job: &Job) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT OR REPLACE INTO jobs
                (id, name, agent_id, agent_name, business_ids, schedule, status, timezone,
                 settings, total_runs, successful_runs, failed_runs, last_run, next_run, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
            params![
                job.id,
                job.name,
                job.agent_id,
                job.agent_name,
                serde_json::to_string(&job.business_ids).unwrap_or_default(),
                serde_json::to_string(&job.schedule).unwrap_or_default(),
                job.status.as_str(),
                job.timezone,
                serde_json::to_string(&job.settings).unwrap_or_default(),
                job.stats.total_runs,
                job.stats.successful_runs,
                job.stats.failed_runs,
                job.stats.last_run.map(|t| t.to_rfc3339()),
                job.stats.next_run.map(|t| t.to_rfc3339()),
                job.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Get a job by ID.
    pub fn get(&self, id: &str) -> Result<Option<Job>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt =
            conn.prepare(&format!("SELECT {JOB_COLUMNS} FROM jobs WHERE id = ?1"))?;
        let mut rows = stmt.query(params![id])?;
        match rows.next()? {
            Some(row) => match decode_job(row) {
                Ok(job) => Ok(Some(job)),
                Err(e) => {
                    tracing::warn!(job_id = %id, error = %e, "Corrupt job record");
                    Ok(None)
                }
            },
            None => Ok(None),
        }
    }

    /// Delete a job. Returns false when the id is unknown.
    pub fn delete(&self, id: &str) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let count = conn.execute("DELETE FROM jobs WHERE id = ?1", params![id])?;
        Ok(count > 0)
    }

    /// List all jobs, newest first. Corrupt records are skipped and
    /// logged rather than failing the whole listing.
    pub fn list(&self) -> Result<Vec<Job>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT {JOB_COLUMNS} FROM jobs ORDER BY created_at DESC, id"
        ))?;
        let mut rows = stmt.query([])?;
        let mut jobs = Vec::new();
        while let Some(row) = rows.next()? {
            match decode_job(row) {
                Ok(job) => jobs.push(job),
                Err(e) => tracing::warn!(error = %e, "Skipping corrupt job record"),
            }
        }
        Ok(jobs)
    }

    /// Active jobs with `next_run <= as_of`, ascending by next_run then
    /// id. RFC 3339 UTC strings sort lexicographically in time order,
    /// so the comparison happens in SQL. Corrupt records are skipped
    /// and logged so one bad row cannot blind the scheduler.
    pub fn list_due(&self, as_of: DateTime<Utc>) -> Result<Vec<Job>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT {JOB_COLUMNS} FROM jobs
             WHERE status = 'active' AND next_run IS NOT NULL AND next_run <= ?1
             ORDER BY next_run, id"
        ))?;
        let mut rows = stmt.query(params![as_of.to_rfc3339()])?;
        let mut jobs = Vec::new();
        while let Some(row) = rows.next()? {
            match decode_job(row) {
                Ok(job) => jobs.push(job),
                Err(e) => tracing::warn!(error = %e, "Skipping corrupt job record in due scan"),
            }
        }
        Ok(jobs)
    }

    /// Record one run outcome in a single statement so counter updates
    /// are atomic even with multiple store handles on the same database.
    pub fn record_outcome(
        &self,
        id: &str,
        succeeded: bool,
        ran_at: DateTime<Utc>,
        next_run: Option<DateTime<Utc>>,
    ) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let count = conn.execute(
            "UPDATE jobs SET
                total_runs = total_runs + 1,
                successful_runs = successful_runs + ?2,
                failed_runs = failed_runs + ?3,
                last_run = ?4,
                next_run = ?5
             WHERE id = ?1",
            params![
                id,
                succeeded as i64,
                (!succeeded) as i64,
                ran_at.to_rfc3339(),
                next_run.map(|t| t.to_rfc3339()),
            ],
        )?;
        Ok(count > 0)
    }

    /// Overwrite a raw schedule column, bypassing `Schedule` validation.
    #[cfg(test)]
    pub fn corrupt_schedule(&self, id: &str, raw: &str) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute("UPDATE jobs SET schedule = ?2 WHERE id = ?1", params![id, raw])?;
        Ok(())
    }
}
