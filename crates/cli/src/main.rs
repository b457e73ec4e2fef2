//! Operator CLI for permanently purging wiki pages.

use anyhow::{Context, Result, anyhow, bail};
use clap::{Args, Parser, Subcommand};
use expunge_core::config::AppConfig;
use expunge_core::{Namespace, PageId, PageKey, PageTarget, PageTitle};
use expunge_engine::{
    ArtifactPurger, Authorization, NullLinkCache, PurgeError, PurgeOutcome, PurgePreview, Purger,
    RefreshOutcome, RefreshReport, refresh_category, refresh_channel,
};
use figment::Figment;
use figment::providers::{Env, Format, Toml};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Exit code when `purge` runs without `--confirm`.
const EXIT_NOT_CONFIRMED: u8 = 2;

#[derive(Parser)]
#[command(name = "expungectl")]
#[command(about = "Permanently delete wiki pages and everything that depends on them")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(
        short,
        long,
        global = true,
        env = "EXPUNGE_CONFIG",
        default_value = "config/expunge.toml"
    )]
    config: PathBuf,

    /// Print results as JSON
    #[arg(long, global = true, default_value_t = false)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Clone, Debug)]
struct TargetArgs {
    /// Page id
    #[arg(long, conflicts_with_all = ["namespace", "title"])]
    id: Option<i64>,

    /// Namespace number (0 = main, 6 = file, ...)
    #[arg(long, requires = "title", allow_negative_numbers = true)]
    namespace: Option<i32>,

    /// Page title; spaces and underscores are equivalent
    #[arg(long, requires = "namespace")]
    title: Option<String>,
}

impl TargetArgs {
    fn target(&self) -> Result<PageTarget> {
        match (self.id, self.namespace, self.title.as_deref()) {
            (Some(id), _, _) => Ok(PageTarget::Id(PageId::new(id)?)),
            (None, Some(ns), Some(title)) => Ok(PageTarget::Key(PageKey::new(
                Namespace::new(ns),
                PageTitle::new(title)?,
            ))),
            _ => bail!("specify either --id or --namespace together with --title"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Permanently delete a page. Without --confirm, only shows what would
    /// be deleted.
    Purge {
        #[command(flatten)]
        target: TargetArgs,
        /// Actually delete
        #[arg(long, default_value_t = false)]
        confirm: bool,
    },
    /// Check whether a page can be permanently deleted
    Check {
        #[command(flatten)]
        target: TargetArgs,
    },
    /// Show the detected schema capabilities
    Probe,
    /// Recompute one category's member counts
    RefreshCategory {
        /// Category name without namespace prefix
        name: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match run(cli).await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let config = load_config(&cli.config)?;

    match cli.command {
        Commands::Probe => probe(&config, cli.json).await,
        Commands::RefreshCategory { name } => refresh_one(&config, &name, cli.json).await,
        Commands::Check { target } => {
            let target = target.target()?;
            let (purger, worker) = build_purger(&config).await?;
            let result = purger.preview(&target).await;
            finish_worker(purger, worker).await;
            match result {
                Ok(preview) => {
                    print_preview(&preview, cli.json)?;
                    Ok(ExitCode::SUCCESS)
                }
                Err(err) => Ok(report_purge_error(&err)),
            }
        }
        Commands::Purge { target, confirm } => {
            let target = target.target()?;
            let (purger, worker) = build_purger(&config).await?;

            if !confirm {
                let result = purger.preview(&target).await;
                finish_worker(purger, worker).await;
                return match result {
                    Ok(preview) => {
                        print_preview(&preview, cli.json)?;
                        eprintln!("Nothing deleted. Re-run with --confirm to purge.");
                        Ok(ExitCode::from(EXIT_NOT_CONFIRMED))
                    }
                    Err(err) => Ok(report_purge_error(&err)),
                };
            }

            // The operator running this tool holds the purge right.
            let result = purger.purge(&target, Authorization::Granted).await;
            let refresh = finish_worker(purger, worker).await;
            match result {
                Ok(outcome) => {
                    print_outcome(&outcome, &refresh, cli.json)?;
                    Ok(ExitCode::SUCCESS)
                }
                Err(err) => Ok(report_purge_error(&err)),
            }
        }
    }
}

/// Load configuration from an optional TOML file and `EXPUNGE_` variables.
fn load_config(path: &Path) -> Result<AppConfig> {
    let mut figment = Figment::new();
    let has_config_file = path.exists();

    if has_config_file {
        tracing::debug!(config_path = %path.display(), "Loading configuration from file");
        figment = figment.merge(Toml::file(path));
    } else {
        tracing::debug!("No config file found at {}", path.display());
    }

    let has_env_config = std::env::vars()
        .any(|(key, _)| key.starts_with("EXPUNGE_") && key != "EXPUNGE_CONFIG");

    if !has_config_file && !has_env_config {
        bail!(
            "No configuration provided.\n\n\
             Provide configuration via one of:\n  \
             1. Config file: expungectl --config /path/to/expunge.toml\n  \
             2. Environment variables: EXPUNGE_METADATA__TYPE=sqlite \
             EXPUNGE_METADATA__PATH=/srv/wiki/wiki.db expungectl\n\n\
             See config/expunge.example.toml for example configuration."
        );
    }

    let config: AppConfig = figment
        .merge(Env::prefixed("EXPUNGE_").split("__"))
        .extract()
        .context("failed to load configuration")?;
    config
        .validate()
        .map_err(|e| anyhow!(e))
        .context("invalid configuration")?;
    Ok(config)
}

async fn build_purger(config: &AppConfig) -> Result<(Purger, JoinHandle<RefreshReport>)> {
    let (store, layout) = expunge_storage::from_config(&config.storage)
        .await
        .context("failed to initialize artifact storage")?;
    store
        .health_check()
        .await
        .context("artifact storage health check failed")?;

    let metadata = expunge_metadata::from_config(&config.metadata)
        .await
        .context("failed to initialize metadata store")?;

    let (queue, worker) = refresh_channel(config.refresh.queue_capacity, metadata.clone());
    let handle = worker.spawn();

    let purger = Purger::new(
        metadata,
        ArtifactPurger::new(store, layout),
        Arc::new(NullLinkCache),
        queue,
        config.purge.clone(),
    )
    .await
    .context("failed to start purge engine")?;

    Ok((purger, handle))
}

/// Drop the purger so the refresh queue closes, then wait for the worker
/// to drain it.
async fn finish_worker(purger: Purger, worker: JoinHandle<RefreshReport>) -> RefreshReport {
    drop(purger);
    match worker.await {
        Ok(report) => report,
        Err(e) => {
            tracing::error!(error = %e, "Category refresh worker panicked");
            RefreshReport::default()
        }
    }
}

fn report_purge_error(err: &PurgeError) -> ExitCode {
    tracing::debug!(code = err.code(), error = %err, "Purge did not complete");
    eprintln!("{}", err.user_message());
    ExitCode::FAILURE
}

async fn probe(config: &AppConfig, json: bool) -> Result<ExitCode> {
    let metadata = expunge_metadata::from_config(&config.metadata)
        .await
        .context("failed to initialize metadata store")?;
    let capabilities = metadata
        .probe_capabilities()
        .await
        .context("schema probe failed")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&capabilities)?);
    } else {
        println!("content layout: {}", capabilities.content_layout);
        println!(
            "search index:   {}",
            if capabilities.search_index { "yes" } else { "no" }
        );
    }
    Ok(ExitCode::SUCCESS)
}

async fn refresh_one(config: &AppConfig, name: &str, json: bool) -> Result<ExitCode> {
    let metadata = expunge_metadata::from_config(&config.metadata)
        .await
        .context("failed to initialize metadata store")?;
    let title = PageTitle::new(name)?;
    let outcome = refresh_category(metadata.as_ref(), title.as_str())
        .await
        .context("category refresh failed")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(ExitCode::SUCCESS);
    }
    match outcome {
        RefreshOutcome::Refreshed(counts) => println!(
            "{title}: {} pages, {} subcategories, {} files",
            counts.pages, counts.subcats, counts.files
        ),
        RefreshOutcome::Skipped => println!("{title}: no category row, nothing to refresh"),
    }
    Ok(ExitCode::SUCCESS)
}

fn print_preview(preview: &PurgePreview, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(preview)?);
        return Ok(());
    }
    println!(
        "Would permanently delete {} (page {})",
        preview.page, preview.page_id
    );
    println!("  revisions:      {}", preview.revisions);
    println!("  content layout: {}", preview.content_layout);
    if preview.is_redirect {
        println!("  redirect:       yes");
    }
    if !preview.categories.is_empty() {
        println!("  categories:     {}", preview.categories.join(", "));
    }
    Ok(())
}

fn print_outcome(outcome: &PurgeOutcome, refresh: &RefreshReport, json: bool) -> Result<()> {
    if json {
        let value = serde_json::json!({
            "outcome": outcome,
            "category_refresh": refresh,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!("Purged {} (page {})", outcome.page, outcome.page_id);
    println!("  rows deleted:        {}", outcome.stats.total_rows());
    println!(
        "  content units:       {} deleted, {} retained",
        outcome.stats.content_deleted, outcome.stats.content_retained
    );
    if let Some(artifacts) = &outcome.artifacts {
        println!(
            "  artifacts:           {} removed, {} already gone",
            artifacts.removed, artifacts.already_gone
        );
    }
    println!(
        "  categories:          {} refreshed, {} skipped, {} failed",
        refresh.refreshed, refresh.skipped, refresh.failed
    );
    for category in &outcome.refreshed_inline {
        println!("note: category {category} was refreshed without the queue");
    }
    for category in &outcome.refresh_failed {
        println!("warning: category {category} could not be refreshed");
    }
    for failure in outcome.artifact_failures() {
        println!(
            "warning: could not remove artifact {}: {}",
            failure.key, failure.message
        );
    }
    Ok(())
}
