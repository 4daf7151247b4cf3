//! The scheduling registry: authoritative job set and run accounting.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::info;

use postpilot_types::{ContentSettings, Job, JobStatus, RunStats, Schedule};

use crate::error::{Result, SchedulerError};
use crate::schedule::{CronEvaluator, next_run, parse_timezone};
use crate::store::JobStore;

/// Input for creating a job. Stats are never caller-supplied.
#[derive(Debug, Clone)]
pub struct JobSpec {
    pub name: String,
    pub agent_id: String,
    pub agent_name: String,
    pub business_ids: Vec<String>,
    pub schedule: Schedule,
    /// IANA timezone; defaults to UTC when absent.
    pub timezone: Option<String>,
    pub settings: ContentSettings,
}

/// Partial update for an existing job. `None` fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct JobUpdate {
    pub name: Option<String>,
    pub agent_id: Option<String>,
    pub agent_name: Option<String>,
    pub business_ids: Option<Vec<String>>,
    pub schedule: Option<Schedule>,
    pub status: Option<JobStatus>,
    pub timezone: Option<String>,
    pub settings: Option<ContentSettings>,
}

/// Owns the job set and answers "what is due".
///
/// All mutating operations validate first and persist through the
/// store; `next_run` is recomputed whenever the schedule, timezone, or
/// status changes and after every recorded run.
pub struct JobRegistry {
    store: Arc<JobStore>,
    cron: Option<Arc<dyn CronEvaluator>>,
}

impl JobRegistry {
    /// A registry without a cron evaluator rejects `Cron` schedules.
    pub fn new(store: Arc<JobStore>) -> Self {
        Self { store, cron: None }
    }

    pub fn with_cron_evaluator(store: Arc<JobStore>, evaluator: Arc<dyn CronEvaluator>) -> Self {
        Self { store, cron: Some(evaluator) }
    }

    fn cron(&self) -> Option<&dyn CronEvaluator> {
        self.cron.as_deref()
    }

    fn validate_spec(&self, spec: &JobSpec) -> Result<()> {
        if spec.name.trim().is_empty() {
            return Err(SchedulerError::Validation("job name is empty".into()));
        }
        if spec.agent_id.trim().is_empty() {
            return Err(SchedulerError::Validation("agent reference is empty".into()));
        }
        if spec.business_ids.is_empty() {
            return Err(SchedulerError::Validation(
                "job has no target businesses".into(),
            ));
        }
        self.validate_schedule(&spec.schedule)?;
        if let Some(tz) = &spec.timezone {
            parse_timezone(tz)?;
        }
        Ok(())
    }

    fn validate_schedule(&self, schedule: &Schedule) -> Result<()> {
        schedule
            .validate()
            .map_err(|e| SchedulerError::Validation(e.to_string()))?;
        if let Schedule::Cron { expression } = schedule {
            match self.cron() {
                Some(eval) => eval.validate(expression)?,
                None => return Err(SchedulerError::UnsupportedSchedule),
            }
        }
        Ok(())
    }

    /// Create a job. Assigns a fresh id, zeroes stats, and computes the
    /// initial `next_run` from the schedule.
    pub fn create(&self, spec: JobSpec) -> Result<Job> {
        self.validate_spec(&spec)?;
        let now = Utc::now();
        let timezone = spec.timezone.unwrap_or_else(|| "UTC".to_string());
        let first_run = next_run(&spec.schedule, &timezone, now, self.cron())?;
        let job = Job {
            id: uuid::Uuid::new_v4().to_string(),
            name: spec.name,
            agent_id: spec.agent_id,
            agent_name: spec.agent_name,
            business_ids: spec.business_ids,
            schedule: spec.schedule,
            status: JobStatus::Active,
            timezone,
            settings: spec.settings,
            stats: RunStats {
                next_run: Some(first_run),
                ..RunStats::default()
            },
            created_at: now,
        };
        self.store.upsert(&job)?;
        info!(job_id = %job.id, name = %job.name, "Created job");
        Ok(job)
    }

    /// Fetch a job by id.
    pub fn get(&self, id: &str) -> Result<Job> {
        self.store
            .get(id)?
            .ok_or_else(|| SchedulerError::NotFound(id.to_string()))
    }

    /// List all jobs.
    pub fn list(&self) -> Result<Vec<Job>> {
        self.store.list()
    }

    /// Merge a partial update into a job. Recomputes `next_run` when
    /// the schedule, timezone, or status changed; paused and archived
    /// jobs carry no `next_run`.
    pub fn update(&self, id: &str, update: JobUpdate) -> Result<Job> {
        let mut job = self.get(id)?;

        let reschedule = update.schedule.is_some()
            || update.timezone.is_some()
            || update.status.is_some_and(|s| s != job.status);

        if let Some(name) = update.name {
            if name.trim().is_empty() {
                return Err(SchedulerError::Validation("job name is empty".into()));
            }
            job.name = name;
        }
        if let Some(agent_id) = update.agent_id {
            if agent_id.trim().is_empty() {
                return Err(SchedulerError::Validation("agent reference is empty".into()));
            }
            job.agent_id = agent_id;
        }
        if let Some(agent_name) = update.agent_name {
            job.agent_name = agent_name;
        }
        if let Some(business_ids) = update.business_ids {
            if business_ids.is_empty() {
                return Err(SchedulerError::Validation(
                    "job has no target businesses".into(),
                ));
            }
            job.business_ids = business_ids;
        }
        if let Some(schedule) = update.schedule {
            self.validate_schedule(&schedule)?;
            job.schedule = schedule;
        }
        if let Some(timezone) = update.timezone {
            parse_timezone(&timezone)?;
            job.timezone = timezone;
        }
        if let Some(status) = update.status {
            job.status = status;
        }
        if let Some(settings) = update.settings {
            job.settings = settings;
        }

        if reschedule {
            job.stats.next_run = match job.status {
                JobStatus::Active => {
                    Some(next_run(&job.schedule, &job.timezone, Utc::now(), self.cron())?)
                }
                JobStatus::Paused | JobStatus::Archived => None,
            };
        }

        self.store.upsert(&job)?;
        Ok(job)
    }

    /// Suspend a job: clears `next_run` so it never appears in a due
    /// scan. Idempotent.
    pub fn pause(&self, id: &str) -> Result<Job> {
        let mut job = self.get(id)?;
        if job.status == JobStatus::Paused {
            return Ok(job);
        }
        job.status = JobStatus::Paused;
        job.stats.next_run = None;
        self.store.upsert(&job)?;
        info!(job_id = %id, "Paused job");
        Ok(job)
    }

    /// Reactivate a job: recomputes `next_run` strictly after the
    /// resume instant. Idempotent.
    pub fn resume(&self, id: &str) -> Result<Job> {
        let mut job = self.get(id)?;
        if job.status == JobStatus::Active {
            return Ok(job);
        }
        job.status = JobStatus::Active;
        job.stats.next_run = Some(next_run(&job.schedule, &job.timezone, Utc::now(), self.cron())?);
        self.store.upsert(&job)?;
        info!(job_id = %id, "Resumed job");
        Ok(job)
    }

    /// Delete a job permanently.
    pub fn delete(&self, id: &str) -> Result<()> {
        if !self.store.delete(id)? {
            return Err(SchedulerError::NotFound(id.to_string()));
        }
        info!(job_id = %id, "Deleted job");
        Ok(())
    }

    /// Active jobs due at `as_of`, ascending by `next_run` then id.
    pub fn list_due(&self, as_of: DateTime<Utc>) -> Result<Vec<Job>> {
        self.store.list_due(as_of)
    }

    /// Record one run attempt: bumps the counters, stamps `last_run`,
    /// and advances `next_run` strictly past `ran_at`. Must be called
    /// exactly once per attempt.
    pub fn record_run_outcome(
        &self,
        id: &str,
        succeeded: bool,
        ran_at: DateTime<Utc>,
    ) -> Result<()> {
        let job = self.get(id)?;
        let next = match job.status {
            JobStatus::Active => {
                Some(next_run(&job.schedule, &job.timezone, ran_at, self.cron())?)
            }
            JobStatus::Paused | JobStatus::Archived => None,
        };
        if !self.store.record_outcome(id, succeeded, ran_at, next)? {
            return Err(SchedulerError::NotFound(id.to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use postpilot_types::{ContentType, Tone};

    fn registry() -> JobRegistry {
        JobRegistry::new(Arc::new(JobStore::open_in_memory().unwrap()))
    }

    fn spec(name: &str) -> JobSpec {
        JobSpec {
            name: name.to_string(),
            agent_id: "agent-1".into(),
            agent_name: "Promo Agent".into(),
            business_ids: vec!["biz-1".into()],
            schedule: Schedule::Daily { time: "09:00".into() },
            timezone: None,
            settings: ContentSettings {
                content_type: ContentType::Promotional,
                tone: Tone::Friendly,
                include_images: false,
                max_posts_per_day: 1,
            },
        }
    }

    #[test]
    fn test_create_initializes_stats_and_next_run() {
        let reg = registry();
        let before = Utc::now();
        let job = reg.create(spec("Morning promo")).unwrap();
        assert_eq!(job.status, JobStatus::Active);
        assert_eq!(job.stats.total_runs, 0);
        assert!(job.stats.next_run.unwrap() > before);
        assert!(!job.id.is_empty());
    }

    #[test]
    fn test_create_rejects_bad_specs() {
        let reg = registry();
        let mut s = spec("  ");
        assert!(matches!(reg.create(s).unwrap_err(), SchedulerError::Validation(_)));

        s = spec("ok");
        s.business_ids.clear();
        assert!(matches!(reg.create(s).unwrap_err(), SchedulerError::Validation(_)));

        s = spec("ok");
        s.agent_id = "".into();
        assert!(matches!(reg.create(s).unwrap_err(), SchedulerError::Validation(_)));

        s = spec("ok");
        s.schedule = Schedule::Hourly { hours: vec![] };
        assert!(matches!(reg.create(s).unwrap_err(), SchedulerError::Validation(_)));

        s = spec("ok");
        s.timezone = Some("Mars/OlympusMons".into());
        assert!(matches!(reg.create(s).unwrap_err(), SchedulerError::InvalidTimezone(_)));
    }

    #[test]
    fn test_cron_schedule_requires_evaluator() {
        let reg = registry();
        let mut s = spec("cron job");
        s.schedule = Schedule::Cron { expression: "0 9 * * *".into() };
        assert!(matches!(
            reg.create(s.clone()).unwrap_err(),
            SchedulerError::UnsupportedSchedule
        ));

        let reg = JobRegistry::with_cron_evaluator(
            Arc::new(JobStore::open_in_memory().unwrap()),
            Arc::new(crate::schedule::CronExpressionEvaluator),
        );
        let job = reg.create(s).unwrap();
        assert!(job.stats.next_run.is_some());
    }

    #[test]
    fn test_update_merges_and_reschedules() {
        let reg = registry();
        let job = reg.create(spec("promo")).unwrap();
        let updated = reg
            .update(
                &job.id,
                JobUpdate {
                    name: Some("Evening promo".into()),
                    schedule: Some(Schedule::Daily { time: "18:00".into() }),
                    ..JobUpdate::default()
                },
            )
            .unwrap();
        assert_eq!(updated.name, "Evening promo");
        assert_ne!(updated.stats.next_run, job.stats.next_run);
        assert_eq!(updated.agent_id, job.agent_id);
    }

    #[test]
    fn test_update_unknown_id() {
        let reg = registry();
        let err = reg.update("nope", JobUpdate::default()).unwrap_err();
        assert!(matches!(err, SchedulerError::NotFound(_)));
    }

    #[test]
    fn test_update_to_archived_clears_next_run() {
        let reg = registry();
        let job = reg.create(spec("promo")).unwrap();
        let updated = reg
            .update(
                &job.id,
                JobUpdate { status: Some(JobStatus::Archived), ..JobUpdate::default() },
            )
            .unwrap();
        assert!(updated.stats.next_run.is_none());
        assert!(reg.list_due(Utc::now() + chrono::Duration::days(30)).unwrap().is_empty());
    }

    #[test]
    fn test_pause_resume_cycle() {
        // Scenario C: pause clears next_run and hides the job from due
        // scans; resume recomputes strictly after the resume instant.
        let reg = registry();
        let job = reg.create(spec("promo")).unwrap();

        let paused = reg.pause(&job.id).unwrap();
        assert_eq!(paused.status, JobStatus::Paused);
        assert!(paused.stats.next_run.is_none());
        let far_future = Utc::now() + chrono::Duration::days(365);
        assert!(reg.list_due(far_future).unwrap().is_empty());

        // Idempotent.
        let again = reg.pause(&job.id).unwrap();
        assert_eq!(again.status, JobStatus::Paused);

        let before_resume = Utc::now();
        let resumed = reg.resume(&job.id).unwrap();
        assert_eq!(resumed.status, JobStatus::Active);
        assert!(resumed.stats.next_run.unwrap() > before_resume);
    }

    #[test]
    fn test_delete() {
        let reg = registry();
        let job = reg.create(spec("promo")).unwrap();
        reg.delete(&job.id).unwrap();
        assert!(matches!(reg.delete(&job.id).unwrap_err(), SchedulerError::NotFound(_)));
        assert!(matches!(reg.get(&job.id).unwrap_err(), SchedulerError::NotFound(_)));
    }

    #[test]
    fn test_list_due_ordering() {
        // P2: exactly the active jobs with next_run <= as_of, ascending
        // by next_run then id.
        let reg = registry();
        let a = reg.create(spec("a")).unwrap();
        let b = reg.create(spec("b")).unwrap();
        let c = reg.create(spec("c")).unwrap();
        reg.pause(&c.id).unwrap();

        let horizon = Utc::now() + chrono::Duration::days(2);
        let due = reg.list_due(horizon).unwrap();
        assert_eq!(due.len(), 2);
        let mut expected = vec![a.id.clone(), b.id.clone()];
        expected.sort();
        let got: Vec<_> = due.iter().map(|j| j.id.clone()).collect();
        // Equal next_run (same daily schedule), so ties break by id.
        assert_eq!(got, expected);
        assert!(reg.list_due(Utc::now()).unwrap().is_empty());
    }

    #[test]
    fn test_record_run_outcome_accounting() {
        // P5: counters, last_run, and a next_run strictly past ran_at.
        let reg = registry();
        let job = reg.create(spec("promo")).unwrap();
        let t1 = Utc.with_ymd_and_hms(2024, 1, 2, 9, 0, 0).unwrap();
        let t2 = Utc.with_ymd_and_hms(2024, 1, 3, 9, 0, 0).unwrap();

        reg.record_run_outcome(&job.id, true, t1).unwrap();
        reg.record_run_outcome(&job.id, false, t2).unwrap();

        let job = reg.get(&job.id).unwrap();
        assert_eq!(job.stats.total_runs, 2);
        assert_eq!(job.stats.successful_runs, 1);
        assert_eq!(job.stats.failed_runs, 1);
        assert_eq!(job.stats.last_run, Some(t2));
        assert!(job.stats.next_run.unwrap() > t2);
    }

    #[test]
    fn test_record_run_outcome_unknown_id() {
        let reg = registry();
        let err = reg.record_run_outcome("nope", true, Utc::now()).unwrap_err();
        assert!(matches!(err, SchedulerError::NotFound(_)));
    }
}
