//! postpilot-scheduler: The scheduling registry.
//!
//! Owns the authoritative set of recurring content jobs, computes each
//! job's next eligible run time from its schedule descriptor, and tracks
//! run statistics. Backed by SQLite.

pub mod error;
pub mod registry;
pub mod schedule;
pub mod store;

pub use error::{Result, SchedulerError};
pub use registry::{JobRegistry, JobSpec, JobUpdate};
pub use schedule::{CronEvaluator, CronExpressionEvaluator, next_run};
pub use store::JobStore;
