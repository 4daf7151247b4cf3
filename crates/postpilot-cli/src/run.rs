//! `postpilot generate`, `run-due`, and `serve` commands.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use chrono::Utc;
use tracing::info;

use postpilot_automation::{AutomationService, LogPublisher, StaticDirectory};
use postpilot_config::PostpilotConfig;
use postpilot_content::{ContentGenerator, HttpGenerationBackend, parse_options};
use postpilot_scheduler::{CronExpressionEvaluator, JobRegistry, JobStore};
use postpilot_types::BusinessContext;

fn generator(config: &PostpilotConfig) -> Arc<ContentGenerator> {
    let backend = HttpGenerationBackend::new(
        config.backend.url.clone(),
        config.backend.api_key.clone(),
        config.backend.timeout_secs,
    );
    Arc::new(ContentGenerator::new(Arc::new(backend)))
}

fn load_businesses(path: &Path) -> anyhow::Result<HashMap<String, BusinessContext>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading businesses file {}", path.display()))?;
    serde_json::from_str(&text).context("parsing businesses file")
}

fn automation(
    config: &PostpilotConfig,
    businesses_path: &Path,
) -> anyhow::Result<Arc<AutomationService>> {
    let store = Arc::new(JobStore::open(&config.db_path()?)?);
    let registry = Arc::new(JobRegistry::with_cron_evaluator(
        store,
        Arc::new(CronExpressionEvaluator),
    ));
    let directory = Arc::new(StaticDirectory::new(load_businesses(businesses_path)?));
    Ok(Arc::new(AutomationService::new(
        registry,
        generator(config),
        directory,
        Arc::new(LogPublisher),
    )))
}

pub async fn generate_once(
    config: &PostpilotConfig,
    name: String,
    category: String,
    address: String,
    content_type: &str,
    tone: &str,
    seasonal_context: Option<String>,
) -> anyhow::Result<()> {
    let options = parse_options(content_type, tone, seasonal_context)?;
    let business = BusinessContext {
        name,
        category,
        address,
        website: None,
        phone: None,
        service_area: None,
        service_types: vec![],
        all_categories: vec![],
        rating: None,
        review_count: None,
    };
    let content = generator(config).generate(&business, &options).await;
    println!("{}", serde_json::to_string_pretty(&content)?);
    Ok(())
}

pub async fn run_due(
    config: &PostpilotConfig,
    businesses_path: &Path,
    dry_run: bool,
) -> anyhow::Result<()> {
    // The LogPublisher only logs, so dry-run is the shipped behavior;
    // the flag exists so a real publisher can be wired in later without
    // changing the command surface.
    let _ = dry_run;
    let svc = automation(config, businesses_path)?;
    let reports = svc.run_due(Utc::now()).await?;
    if reports.is_empty() {
        info!("Nothing due");
    }
    for report in reports {
        println!(
            "{}  published: {}  failed: {}  ok: {}",
            report.job_id, report.published, report.failed, report.succeeded
        );
    }
    Ok(())
}

pub async fn serve(config: &PostpilotConfig, businesses_path: &Path) -> anyhow::Result<()> {
    let svc = automation(config, businesses_path)?;
    svc.run_loop(Duration::from_secs(config.scheduler.tick_secs))
        .await;
    Ok(())
}
