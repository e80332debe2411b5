//! Job Radar CLI
//!
//! Local execution entry point, suitable for a cron job or CI schedule.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use job_radar::{
    error::Result,
    models::{Config, HttpConfig, ScorerProvider, SourceDescriptor, load_sources},
    pipeline::Scanner,
    services::{
        HttpSourceFetcher, LogNotifier, Notifier, RelevanceScorer, TelegramNotifier,
        notify::report_error,
        scorer::{self, GeminiClient, OpenAiClient},
    },
    storage::LocalLedger,
    utils::http,
};

/// Job Radar - job board watcher with AI relevance scoring
#[derive(Parser, Debug)]
#[command(
    name = "job-radar",
    version,
    about = "Scans company job boards and notifies on relevant postings"
)]
struct Cli {
    /// Path to storage directory containing config, source list and ledger
    #[arg(short, long, default_value = "storage")]
    storage_dir: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Scan every configured source once
    Scan {
        /// Log notifications instead of sending them
        #[arg(long)]
        dry_run: bool,

        /// Path to source list (default: {storage_dir}/{pipeline.sources_file})
        #[arg(long)]
        sources: Option<PathBuf>,
    },

    /// Validate configuration and source list
    Validate,

    /// Show ledger and source list info
    Info,

    /// List models offered by the scorer provider
    Models,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Read a secret from the environment variable `name`.
fn secret(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Client for scorer calls, which get their own timeout.
fn scorer_client(config: &Config) -> Result<reqwest::Client> {
    http::create_client(&HttpConfig {
        timeout_secs: config.scorer.timeout_secs,
        ..config.http.clone()
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_logging(cli.verbose);

    log::info!("Job Radar starting...");

    let config_path = cli.storage_dir.join("config.toml");
    let config = Config::load_or_default(&config_path);
    log::info!("Loaded configuration from {}", cli.storage_dir.display());

    let sources_path = cli.storage_dir.join(&config.pipeline.sources_file);
    let ledger = LocalLedger::new(cli.storage_dir.join(&config.pipeline.ledger_file));

    match cli.command {
        Command::Scan { dry_run, sources } => {
            if let Err(e) = config.validate() {
                log::error!("Config validation failed, not scanning: {}", e);
                return Ok(());
            }
            let sources = load_sources(sources.unwrap_or(sources_path));
            if let Err(e) = run_scan(&config, &sources, &ledger, dry_run).await {
                log::error!("Scan failed: {}", e);
            }
        }

        Command::Validate => {
            log::info!("Validating configuration...");

            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            log::info!("✓ Config OK");

            let sources = load_sources(&sources_path);
            if sources.is_empty() {
                log::warn!("No usable sources in {}", sources_path.display());
            } else {
                log::info!("✓ {} sources", sources.len());
            }

            for name in [
                &config.scorer.api_key_env,
                &config.notify.token_env,
                &config.notify.chat_id_env,
            ] {
                if secret(name).is_none() {
                    log::warn!("Environment variable {} is not set", name);
                }
            }

            log::info!("All validations passed!");
        }

        Command::Info => {
            log::info!("Storage directory: {}", cli.storage_dir.display());
            log::info!(
                "Sources: {} in {}",
                load_sources(&sources_path).len(),
                sources_path.display()
            );
            print_ledger_info(&ledger).await;
            log::info!(
                "Scorer: {:?} (threshold {})",
                config.scorer.provider,
                config.pipeline.threshold
            );
        }

        Command::Models => {
            let Some(api_key) = secret(&config.scorer.api_key_env) else {
                log::error!("{} is not set", config.scorer.api_key_env);
                return Ok(());
            };
            match config.scorer.provider {
                ScorerProvider::Gemini => {
                    let client = scorer_client(&config)?;
                    match GeminiClient::list_models(&client, &api_key).await {
                        Ok(models) => {
                            for model in models {
                                log::info!("  {}", model);
                            }
                        }
                        Err(e) => log::error!("Model listing failed: {}", e),
                    }
                }
                ScorerProvider::Openai => {
                    log::info!(
                        "OpenAI model: {}",
                        config
                            .scorer
                            .model
                            .as_deref()
                            .unwrap_or(OpenAiClient::DEFAULT_MODEL)
                    );
                }
            }
        }
    }

    log::info!("Done!");

    Ok(())
}

/// One scan run. Failures after startup are reported through the notifier
/// and the log; the returned error covers client construction only.
async fn run_scan(
    config: &Config,
    sources: &[SourceDescriptor],
    ledger: &LocalLedger,
    dry_run: bool,
) -> Result<()> {
    if sources.is_empty() {
        log::warn!("No sources configured, nothing to scan");
        return Ok(());
    }

    let Some(api_key) = secret(&config.scorer.api_key_env) else {
        log::error!("{} is not set, cannot score postings", config.scorer.api_key_env);
        return Ok(());
    };

    let client = http::create_client(&config.http)?;
    let notifier: Box<dyn Notifier> = if dry_run {
        log::info!("Dry run: notifications go to the log");
        Box::new(LogNotifier)
    } else {
        match (
            secret(&config.notify.token_env),
            secret(&config.notify.chat_id_env),
        ) {
            (Some(token), Some(chat_id)) => Box::new(
                TelegramNotifier::new(client.clone(), token, chat_id)
                    .with_timeout(config.notify.timeout_secs),
            ),
            _ => {
                log::error!(
                    "{} and {} must be set to send notifications",
                    config.notify.token_env,
                    config.notify.chat_id_env
                );
                return Ok(());
            }
        }
    };

    let generator = match scorer::connect(scorer_client(config)?, &config.scorer, api_key).await {
        Ok(Some(generator)) => generator,
        Ok(None) => {
            report_error(notifier.as_ref(), "no AI models available for this API key").await;
            return Ok(());
        }
        Err(e) => {
            report_error(notifier.as_ref(), &format!("AI provider unavailable: {e}")).await;
            return Ok(());
        }
    };

    let relevance = RelevanceScorer::new(generator, &config.scorer);
    log::info!("Scoring with {}", relevance.model_name());

    let fetcher = HttpSourceFetcher::new(client, &config.filter.include);
    let scanner = Scanner::new(config, &fetcher, &relevance, notifier.as_ref());
    let report = scanner.run(sources, ledger).await;

    if let Some(e) = report.aborted {
        log::error!("Scan aborted: {}", e);
    }
    Ok(())
}

async fn print_ledger_info(ledger: &LocalLedger) {
    let path = ledger.path();
    match ledger.read().await {
        Ok(Some(seen)) => log::info!("Ledger: {} seen postings in {}", seen.len(), path.display()),
        Ok(None) => log::info!("No ledger yet at {}", path.display()),
        Err(e) => log::warn!("Ledger at {} is unreadable: {}", path.display(), e),
    }
}
