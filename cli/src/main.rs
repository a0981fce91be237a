//! CLI entrypoint for delve
//!
//! This is the main binary that wires together all layers using
//! dependency injection: configuration, the Azure adapters, the job store
//! and the research service with its four strategy executors.

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use delve_application::{
    DeepExecutor, DeepResearchSettings, FastExecutor, JobStore, ResearchService, SimpleExecutor,
    StructuredExecutor,
};
use delve_domain::{JobStatus, ResearchKind, ResearchRequest, ResearchStrategy};
use delve_infrastructure::{AdoWorkItems, AzureAgentsGateway, ConfigLoader, LocalDocumentStore};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "delve", about = "Research job orchestration over Azure AI agents", version)]
struct Cli {
    /// Increase logging verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to a config file (merged over delve.toml and the global config)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Submit a research job and follow it to completion
    Run {
        /// Research strategy: simple, fast, async or deep
        #[arg(short, long)]
        strategy: String,

        /// Work item (user story) id to research
        #[arg(long)]
        story: String,

        /// Custom research instructions (deep strategy)
        #[arg(long)]
        prompt: Option<String>,

        /// Research types to produce (technical, market, risk, stakeholder);
        /// repeatable, defaults per strategy
        #[arg(long = "type")]
        research_types: Vec<String>,

        /// Output format for the finished report
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        output: OutputFormat,

        /// Seconds between status polls
        #[arg(long, default_value_t = 2)]
        poll_secs: u64,
    },

    /// List the available research strategies
    Strategies,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity level
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    match cli.command {
        Command::Strategies => {
            println!("Available research strategies:");
            for strategy in ResearchStrategy::all() {
                println!("  {:<8} est. {}", strategy.as_str(), strategy.estimated_duration());
            }
            Ok(())
        }
        Command::Run {
            strategy,
            story,
            prompt,
            research_types,
            output,
            poll_secs,
        } => {
            let strategy: ResearchStrategy = strategy.parse()?;
            let types = research_types
                .iter()
                .map(|t| t.parse::<ResearchKind>())
                .collect::<Result<Vec<_>, _>>()?;

            let mut request = ResearchRequest::new(story);
            if let Some(prompt) = prompt {
                request = request.with_prompt(prompt);
            }
            if !types.is_empty() {
                request = request.with_research_types(types);
            }

            run_job(cli.config.as_ref(), strategy, request, output, poll_secs).await
        }
    }
}

async fn run_job(
    config_path: Option<&PathBuf>,
    strategy: ResearchStrategy,
    request: ResearchRequest,
    output: OutputFormat,
    poll_secs: u64,
) -> Result<()> {
    let config = ConfigLoader::load(config_path).context("loading configuration")?;

    // === Dependency Injection ===
    let pat = std::env::var(&config.ado.pat_env)
        .with_context(|| format!("work-item access token missing; set {}", config.ado.pat_env))?;
    let work_items = Arc::new(AdoWorkItems::new(&config.ado, &pat));

    let token = std::env::var(&config.azure.token_env).unwrap_or_default();
    if token.is_empty() && strategy != ResearchStrategy::Fast {
        bail!(
            "{} strategy needs an Azure AI token; set {}",
            strategy,
            config.azure.token_env
        );
    }
    let agent = Arc::new(AzureAgentsGateway::new(&config.azure, token));

    let documents = Arc::new(
        LocalDocumentStore::new(config.documents.output_dir.clone())
            .with_tracker(Arc::clone(&work_items)),
    );

    let store = Arc::new(JobStore::new());
    let service = ResearchService::builder(Arc::clone(&store))
        .executor(Arc::new(SimpleExecutor::new(
            work_items.clone(),
            agent.clone(),
        )))
        .executor(Arc::new(FastExecutor::new(
            work_items.clone(),
            documents.clone(),
        )))
        .executor(Arc::new(StructuredExecutor::new(
            work_items.clone(),
            agent.clone(),
            documents.clone(),
        )))
        .executor(Arc::new(DeepExecutor::new(
            work_items,
            agent,
            documents,
            DeepResearchSettings {
                timeout: config.research.deep_timeout(),
            },
        )))
        .build();

    let id = service.submit(strategy, request)?;
    println!("Submitted job {} (est. {})", id, strategy.estimated_duration());
    info!(job = %id, "following job until terminal");

    // Follow the job: print progress notes as they land, cancel on Ctrl-C
    let mut notes_printed = 0;
    let job = loop {
        tokio::select! {
            _ = tokio::time::sleep(Duration::from_secs(poll_secs)) => {}
            _ = tokio::signal::ctrl_c() => {
                println!("Cancelling {}...", id);
                service.cancel(&id)?;
            }
        }

        let job = service.status(&id)?;
        for note in &job.progress[notes_printed..] {
            println!("[{}] {}: {}", note.at.format("%H:%M:%S"), note.stage, note.message);
        }
        notes_printed = job.progress.len();

        if job.is_terminal() {
            break job;
        }
    };

    match output {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&job)?),
        OutputFormat::Text => match job.status {
            JobStatus::Completed => {
                if let Some(report) = &job.result {
                    println!();
                    println!("{}", report.to_markdown());
                    if let Some(url) = &report.document_url {
                        println!("Document: {}", url);
                    }
                }
            }
            JobStatus::Cancelled => println!("Job {} cancelled", job.id),
            JobStatus::Failed => {}
            _ => {}
        },
    }

    if job.status == JobStatus::Failed {
        let detail = job
            .error
            .as_ref()
            .map(|e| format!("{} (stage {}, {})", e.message, e.stage, e.kind))
            .unwrap_or_else(|| "no failure detail recorded".to_string());
        bail!("Job {} failed: {}", job.id, detail);
    }

    Ok(())
}
