mod jobs;
mod run;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "postpilot", about = "Local-SEO content scheduling engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage scheduled content jobs
    Job {
        #[command(subcommand)]
        action: jobs::JobAction,
    },
    /// Generate one post for a business profile and print it
    Generate {
        /// Business name
        #[arg(long)]
        name: String,

        /// Primary business category (e.g. "Plumbing")
        #[arg(long)]
        category: String,

        /// Comma-separated postal address
        #[arg(long, default_value = "")]
        address: String,

        /// Content type (promotional, educational, community_spotlight,
        /// seasonal, behind_the_scenes, customer_story, service_highlight)
        #[arg(long, default_value = "promotional")]
        content_type: String,

        /// Tone (professional, friendly, casual, enthusiastic, informative)
        #[arg(long, default_value = "friendly")]
        tone: String,

        /// Seasonal context (e.g. "spring cleaning season")
        #[arg(long)]
        seasonal_context: Option<String>,
    },
    /// Run all currently due jobs once
    RunDue {
        /// JSON file mapping business ids to profiles
        #[arg(long)]
        businesses: std::path::PathBuf,

        /// Log posts instead of publishing them
        #[arg(long)]
        dry_run: bool,
    },
    /// Run the automation tick loop
    Serve {
        /// JSON file mapping business ids to profiles
        #[arg(long)]
        businesses: std::path::PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = postpilot_config::PostpilotConfig::load()?;

    match cli.command {
        Commands::Job { action } => jobs::handle(action, &config),
        Commands::Generate {
            name,
            category,
            address,
            content_type,
            tone,
            seasonal_context,
        } => {
            run::generate_once(
                &config,
                name,
                category,
                address,
                &content_type,
                &tone,
                seasonal_context,
            )
            .await
        }
        Commands::RunDue { businesses, dry_run } => {
            run::run_due(&config, &businesses, dry_run).await
        }
        Commands::Serve { businesses } => run::serve(&config, &businesses).await,
    }
}
