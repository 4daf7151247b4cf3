//! `postpilot job` subcommands.

use std::str::FromStr;
use std::sync::Arc;

use anyhow::{Context, bail};
use clap::Subcommand;

use postpilot_config::PostpilotConfig;
use postpilot_scheduler::{CronExpressionEvaluator, JobRegistry, JobSpec, JobStore};
use postpilot_types::{ContentSettings, ContentType, Job, Schedule, Tone};

#[derive(Subcommand)]
pub enum JobAction {
    /// Create a job
    Add {
        /// Display name
        #[arg(long)]
        name: String,

        /// Content-generation agent id
        #[arg(long)]
        agent_id: String,

        /// Agent display name
        #[arg(long, default_value = "")]
        agent_name: String,

        /// Target business ids (repeatable)
        #[arg(long = "business", required = true)]
        businesses: Vec<String>,

        /// Daily schedule, e.g. "09:00"
        #[arg(long, group = "sched")]
        daily: Option<String>,

        /// Hourly schedule, comma-separated hours, e.g. "9,14,20"
        #[arg(long, group = "sched")]
        hourly: Option<String>,

        /// Weekly schedule, "days@HH:MM" with 0 = Sunday, e.g. "1,3,5@12:00"
        #[arg(long, group = "sched")]
        weekly: Option<String>,

        /// Cron expression, e.g. "0 9 * * *"
        #[arg(long, group = "sched")]
        cron: Option<String>,

        /// IANA timezone (defaults to the configured default)
        #[arg(long)]
        timezone: Option<String>,

        /// Content type tag
        #[arg(long, default_value = "promotional")]
        content_type: String,

        /// Tone tag
        #[arg(long, default_value = "friendly")]
        tone: String,
    },
    /// List all jobs
    List,
    /// Show one job as JSON
    Get { id: String },
    /// Pause a job
    Pause { id: String },
    /// Resume a paused job
    Resume { id: String },
    /// Delete a job permanently
    Rm { id: String },
}

/// Parse exactly one of the schedule flags into a descriptor.
pub fn parse_schedule(
    daily: Option<String>,
    hourly: Option<String>,
    weekly: Option<String>,
    cron: Option<String>,
) -> anyhow::Result<Schedule> {
    match (daily, hourly, weekly, cron) {
        (Some(time), None, None, None) => Ok(Schedule::Daily { time }),
        (None, Some(hours), None, None) => {
            let hours = hours
                .split(',')
                .map(|h| h.trim().parse::<u8>().context("bad hour"))
                .collect::<anyhow::Result<Vec<u8>>>()?;
            Ok(Schedule::Hourly { hours })
        }
        (None, None, Some(spec), None) => {
            let (days, time) = spec
                .split_once('@')
                .context("weekly schedule must be days@HH:MM")?;
            let days = days
                .split(',')
                .map(|d| d.trim().parse::<u8>().context("bad day"))
                .collect::<anyhow::Result<Vec<u8>>>()?;
            Ok(Schedule::Weekly { days, time: time.to_string() })
        }
        (None, None, None, Some(expression)) => Ok(Schedule::Cron { expression }),
        _ => bail!("exactly one of --daily, --hourly, --weekly, --cron is required"),
    }
}

fn open_registry(config: &PostpilotConfig) -> anyhow::Result<JobRegistry> {
    let db_path = config.db_path()?;
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let store = Arc::new(JobStore::open(&db_path)?);
    Ok(JobRegistry::with_cron_evaluator(store, Arc::new(CronExpressionEvaluator)))
}

fn print_job(job: &Job) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(job)?);
    Ok(())
}

pub fn handle(action: JobAction, config: &PostpilotConfig) -> anyhow::Result<()> {
    let registry = open_registry(config)?;
    match action {
        JobAction::Add {
            name,
            agent_id,
            agent_name,
            businesses,
            daily,
            hourly,
            weekly,
            cron,
            timezone,
            content_type,
            tone,
        } => {
            let schedule = parse_schedule(daily, hourly, weekly, cron)?;
            let settings = ContentSettings {
                content_type: ContentType::from_str(&content_type)?,
                tone: Tone::from_str(&tone)?,
                include_images: false,
                max_posts_per_day: 1,
            };
            let job = registry.create(JobSpec {
                name,
                agent_id,
                agent_name,
                business_ids: businesses,
                schedule,
                timezone: timezone
                    .or_else(|| Some(config.scheduler.default_timezone.clone())),
                settings,
            })?;
            print_job(&job)
        }
        JobAction::List => {
            for job in registry.list()? {
                let next = job
                    .stats
                    .next_run
                    .map(|t| t.to_rfc3339())
                    .unwrap_or_else(|| "-".to_string());
                println!(
                    "{}  {:<10} {:<24} next: {}",
                    job.id,
                    job.status.as_str(),
                    job.name,
                    next
                );
            }
            Ok(())
        }
        JobAction::Get { id } => print_job(&registry.get(&id)?),
        JobAction::Pause { id } => print_job(&registry.pause(&id)?),
        JobAction::Resume { id } => print_job(&registry.resume(&id)?),
        JobAction::Rm { id } => {
            registry.delete(&id)?;
            println!("deleted {id}");
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_schedule_variants() {
        assert_eq!(
            parse_schedule(Some("09:00".into()), None, None, None).unwrap(),
            Schedule::Daily { time: "09:00".into() }
        );
        assert_eq!(
            parse_schedule(None, Some("9, 14".into()), None, None).unwrap(),
            Schedule::Hourly { hours: vec![9, 14] }
        );
        assert_eq!(
            parse_schedule(None, None, Some("1,3,5@12:00".into()), None).unwrap(),
            Schedule::Weekly { days: vec![1, 3, 5], time: "12:00".into() }
        );
        assert_eq!(
            parse_schedule(None, None, None, Some("0 9 * * *".into())).unwrap(),
            Schedule::Cron { expression: "0 9 * * *".into() }
        );
    }

    #[test]
    fn test_parse_schedule_rejects_none_or_malformed() {
        assert!(parse_schedule(None, None, None, None).is_err());
        assert!(parse_schedule(None, Some("nine".into()), None, None).is_err());
        assert!(parse_schedule(None, None, Some("1,3,5".into()), None).is_err());
    }
}
