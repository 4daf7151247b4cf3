//! postpilot-automation: Runs due jobs end to end.
//!
//! Pulls due jobs from the scheduling registry, generates content for
//! each target business, hands it to the posting collaborator, and
//! records exactly one run outcome per attempt.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{error, info, warn};

use postpilot_content::ContentGenerator;
use postpilot_scheduler::JobRegistry;
use postpilot_types::{BusinessContext, ContentOptions, ContentSettings, GeneratedContent, Job};

/// Resolves business-profile ids to profile snapshots.
#[async_trait]
pub trait BusinessDirectory: Send + Sync {
    async fn lookup(&self, business_id: &str) -> anyhow::Result<BusinessContext>;
}

/// Directory backed by a fixed map; used by the CLI (profiles loaded
/// from a file) and by tests.
pub struct StaticDirectory {
    businesses: HashMap<String, BusinessContext>,
}

impl StaticDirectory {
    pub fn new(businesses: HashMap<String, BusinessContext>) -> Self {
        Self { businesses }
    }
}

#[async_trait]
impl BusinessDirectory for StaticDirectory {
    async fn lookup(&self, business_id: &str) -> anyhow::Result<BusinessContext> {
        self.businesses
            .get(business_id)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("unknown business: {business_id}"))
    }
}

/// Publishes generated content for a business profile.
#[async_trait]
pub trait Publisher: Send + Sync {
    async fn publish(&self, business_id: &str, content: &GeneratedContent) -> anyhow::Result<()>;
}

/// Dry-run publisher: logs the post instead of sending it anywhere.
pub struct LogPublisher;

#[async_trait]
impl Publisher for LogPublisher {
    async fn publish(&self, business_id: &str, content: &GeneratedContent) -> anyhow::Result<()> {
        info!(
            business_id = %business_id,
            title = %content.title,
            hashtags = content.hashtags.len(),
            fallback = content.used_fallback,
            "Would publish post"
        );
        Ok(())
    }
}

/// Outcome summary for one job run.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub job_id: String,
    pub published: usize,
    pub failed: usize,
    pub succeeded: bool,
}

fn options_for(settings: &ContentSettings) -> ContentOptions {
    ContentOptions {
        content_type: settings.content_type,
        tone: settings.tone,
        include_services: true,
        include_locations: true,
        focus_local_seo: true,
        seasonal_context: None,
    }
}

/// Drives the data flow: due jobs -> generator -> publisher -> stats.
pub struct AutomationService {
    registry: Arc<JobRegistry>,
    generator: Arc<ContentGenerator>,
    directory: Arc<dyn BusinessDirectory>,
    publisher: Arc<dyn Publisher>,
}

impl AutomationService {
    pub fn new(
        registry: Arc<JobRegistry>,
        generator: Arc<ContentGenerator>,
        directory: Arc<dyn BusinessDirectory>,
        publisher: Arc<dyn Publisher>,
    ) -> Self {
        Self { registry, generator, directory, publisher }
    }

    /// Run one job: generate and publish for every target business,
    /// then record exactly one outcome. The run counts as successful
    /// only when every publish succeeded.
    pub async fn run_job(&self, job: &Job, ran_at: DateTime<Utc>) -> anyhow::Result<RunReport> {
        let options = options_for(&job.settings);
        let mut published = 0usize;
        let mut failed = 0usize;

        for business_id in &job.business_ids {
            let business = match self.directory.lookup(business_id).await {
                Ok(b) => b,
                Err(e) => {
                    warn!(job_id = %job.id, business_id = %business_id, error = %e,
                          "Business lookup failed");
                    failed += 1;
                    continue;
                }
            };
            // Generation never fails; publishing can.
            let content = self.generator.generate(&business, &options).await;
            match self.publisher.publish(business_id, &content).await {
                Ok(()) => published += 1,
                Err(e) => {
                    warn!(job_id = %job.id, business_id = %business_id, error = %e,
                          "Publish failed");
                    failed += 1;
                }
            }
        }

        let succeeded = failed == 0 && published > 0;
        self.registry.record_run_outcome(&job.id, succeeded, ran_at)?;
        info!(job_id = %job.id, published, failed, succeeded, "Job run recorded");
        Ok(RunReport { job_id: job.id.clone(), published, failed, succeeded })
    }

    /// Run everything due at `as_of`. A failing job never blocks the
    /// rest of the batch.
    pub async fn run_due(&self, as_of: DateTime<Utc>) -> anyhow::Result<Vec<RunReport>> {
        let due = self.registry.list_due(as_of)?;
        let mut reports = Vec::with_capacity(due.len());
        for job in due {
            match self.run_job(&job, as_of).await {
                Ok(report) => reports.push(report),
                Err(e) => error!(job_id = %job.id, error = %e, "Job run failed"),
            }
        }
        Ok(reports)
    }

    /// Tick loop: drain due jobs, sleep, repeat. The caller usually
    /// spawns this and keeps the service alive for the process lifetime.
    pub async fn run_loop(self: Arc<Self>, interval: Duration) {
        info!("Automation loop started ({}s interval)", interval.as_secs());
        loop {
            if let Err(e) = self.run_due(Utc::now()).await {
                error!(error = %e, "Due scan failed");
            }
            tokio::time::sleep(interval).await;
        }
    }
}
