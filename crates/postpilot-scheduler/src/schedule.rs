//! Next-run computation for job schedules.
//!
//! All schedules are evaluated in the job's IANA timezone and the
//! resulting instant is returned in UTC, strictly after the reference
//! instant. Cron expressions are delegated to a [`CronEvaluator`].

use chrono::{DateTime, Datelike, Days, Duration, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;
use std::str::FromStr;

use postpilot_types::{Schedule, parse_hhmm};

use crate::error::{Result, SchedulerError};

/// Evaluates cron expressions on behalf of the registry.
///
/// The registry itself never interprets cron syntax; a registry built
/// without an evaluator rejects cron-scheduled jobs outright.
pub trait CronEvaluator: Send + Sync {
    /// Check expression syntax without computing anything.
    fn validate(&self, expression: &str) -> Result<()>;

    /// Next occurrence strictly after `after`, evaluated in `tz`.
    fn next_after(&self, expression: &str, tz: Tz, after: DateTime<Utc>) -> Result<DateTime<Utc>>;
}

/// Cron evaluator backed by the `cron` crate.
pub struct CronExpressionEvaluator;

/// Convert a standard 5-field Unix cron expression to the 7-field
/// format the `cron` crate expects (seconds prepended, year appended).
fn to_seven_field(expression: &str) -> String {
    if expression.split_whitespace().count() == 5 {
        format!("0 {expression} *")
    } else {
        expression.to_string()
    }
}

impl CronEvaluator for CronExpressionEvaluator {
    fn validate(&self, expression: &str) -> Result<()> {
        cron::Schedule::from_str(&to_seven_field(expression))
            .map_err(|e| SchedulerError::InvalidCronExpression(e.to_string()))?;
        Ok(())
    }

    fn next_after(&self, expression: &str, tz: Tz, after: DateTime<Utc>) -> Result<DateTime<Utc>> {
        let parsed = cron::Schedule::from_str(&to_seven_field(expression))
            .map_err(|e| SchedulerError::InvalidCronExpression(e.to_string()))?;
        let local_after = after.with_timezone(&tz);
        let next = parsed.after(&local_after).next().ok_or_else(|| {
            SchedulerError::InvalidCronExpression(format!("no next occurrence for {expression}"))
        })?;
        Ok(next.with_timezone(&Utc))
    }
}

/// Parse and validate an IANA timezone string.
pub fn parse_timezone(timezone: &str) -> Result<Tz> {
    timezone
        .parse()
        .map_err(|_| SchedulerError::InvalidTimezone(timezone.to_string()))
}

/// Resolve a local wall-clock time to a UTC instant.
///
/// Ambiguous times (DST fall-back) resolve to the earlier instant.
/// Nonexistent times (DST spring-forward gap) shift forward an hour.
fn resolve_local(tz: Tz, date: NaiveDate, hour: u32, minute: u32) -> Option<DateTime<Utc>> {
    let naive = date.and_hms_opt(hour, minute, 0)?;
    if let Some(dt) = tz.from_local_datetime(&naive).earliest() {
        return Some(dt.with_timezone(&Utc));
    }
    tz.from_local_datetime(&(naive + Duration::hours(1)))
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Compute the next run strictly after `after` for a schedule evaluated
/// in `timezone`.
///
/// `Cron` schedules require `evaluator`; without one this fails with
/// [`SchedulerError::UnsupportedSchedule`].
pub fn next_run(
    schedule: &Schedule,
    timezone: &str,
    after: DateTime<Utc>,
    evaluator: Option<&dyn CronEvaluator>,
) -> Result<DateTime<Utc>> {
    schedule
        .validate()
        .map_err(|e| SchedulerError::Validation(e.to_string()))?;
    let tz = parse_timezone(timezone)?;
    let local_date = after.with_timezone(&tz).date_naive();

    match schedule {
        Schedule::Daily { time } => {
            let (hour, minute) = parse_hhmm(time).expect("validated above");
            // Extra day of slack for DST gap shifts.
            for offset in 0..=2u64 {
                let date = local_date + Days::new(offset);
                if let Some(at) = resolve_local(tz, date, hour, minute) {
                    if at > after {
                        return Ok(at);
                    }
                }
            }
            unreachable!("a daily schedule always has an occurrence within two days")
        }
        Schedule::Hourly { hours } => {
            let mut hours = hours.clone();
            hours.sort_unstable();
            hours.dedup();
            for offset in 0..=2u64 {
                let date = local_date + Days::new(offset);
                for &hour in &hours {
                    if let Some(at) = resolve_local(tz, date, u32::from(hour), 0) {
                        if at > after {
                            return Ok(at);
                        }
                    }
                }
            }
            unreachable!("an hourly schedule always has an occurrence within two days")
        }
        Schedule::Weekly { days, time } => {
            let (hour, minute) = parse_hhmm(time).expect("validated above");
            for offset in 0..=8u64 {
                let date = local_date + Days::new(offset);
                let weekday = date.weekday().num_days_from_sunday() as u8;
                if !days.contains(&weekday) {
                    continue;
                }
                if let Some(at) = resolve_local(tz, date, hour, minute) {
                    if at > after {
                        return Ok(at);
                    }
                }
            }
            unreachable!("a weekly schedule always has an occurrence within eight days")
        }
        Schedule::Cron { expression } => match evaluator {
            Some(eval) => eval.next_after(expression, tz, after),
            None => Err(SchedulerError::UnsupportedSchedule),
        },
    }
}
