//! Main entry point for the dispatcher binary
//!
//! Wires the real services into the dispatcher and runs either a single pass
//! (the usual mode under an external scheduler) or a periodic loop.

use anyhow::Context;
use chrono::Local;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tokio::sync::mpsc;

use dispatcher::{
    services::{pacing_from_millis, DryRunMutator, FileAuditLog, JiraClient, LogOnlyAuditSink},
    AuditSink, DispatchConfig, Dispatcher, LoadProber, TicketMutator, TicketSource,
};
use shared::logging::{self, LogPaths, RotatingFileWriter};

/// Assigns pending tracker tickets to the least-loaded member of the matching team
#[derive(Parser)]
#[command(name = "dispatcher")]
#[command(about = "Classifies pending tickets and assigns them to the least-loaded team member")]
pub struct Args {
    /// Path to a TOML configuration file (defaults to the embedded configuration)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Log level for stdout (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Base directory for log files (overrides logging.directory)
    #[arg(long)]
    pub log_dir: Option<PathBuf>,

    /// Classify and pick assignees without changing any ticket
    #[arg(long)]
    pub dry_run: bool,

    /// Repeat the pass every N seconds until Ctrl+C instead of running once
    #[arg(long)]
    pub interval_secs: Option<u64>,

    /// Print the run summary as JSON on stdout after a single pass
    #[arg(long)]
    pub json_summary: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    match run(args).await {
        Ok(code) => code,
        Err(e) => {
            // Logging may not be initialised yet
            eprintln!("❌ dispatcher failed: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> anyhow::Result<ExitCode> {
    let mut config = DispatchConfig::load(args.config.as_deref()).with_context(|| match &args.config {
        Some(path) => format!("Failed to load configuration from {}", path.display()),
        None => "Failed to load embedded configuration".to_string(),
    })?;
    config.apply_process_env();
    if let Some(dir) = &args.log_dir {
        config.logging.directory = dir.clone();
    }
    config.validate().context("Invalid configuration")?;

    let paths = LogPaths::for_run(&config.logging.directory, Local::now());
    let operational_log = RotatingFileWriter::open(
        &paths.operational,
        config.logging.max_bytes,
        config.logging.backups,
    )
    .context("Failed to open operational log")?;
    logging::init_tracing(Some(args.log_level.as_str()), Some(operational_log))
        .context("Failed to initialise logging")?;

    logging::log_startup(if args.dry_run {
        "ticket dispatcher (dry run)"
    } else {
        "ticket dispatcher"
    });
    tracing::debug!(
        operational = %paths.operational.display(),
        audit = %paths.audit.display(),
        "Log files"
    );

    let pacing = pacing_from_millis(config.pacing.min_interval_ms);
    let client = Arc::new(JiraClient::from_config(&config, pacing).context("Failed to build tracker client")?);

    if args.dry_run {
        let dispatcher = Dispatcher::new(&config, client.clone(), client, DryRunMutator, LogOnlyAuditSink)?;
        return Ok(execute(dispatcher, &args).await);
    }

    let audit = FileAuditLog::open(&paths.audit, config.logging.max_bytes, config.logging.backups)
        .context("Failed to open audit log")?;
    let dispatcher = Dispatcher::new(&config, client.clone(), client.clone(), client, audit)?;
    Ok(execute(dispatcher, &args).await)
}

async fn execute<S, L, M, A>(dispatcher: Dispatcher<S, L, M, A>, args: &Args) -> ExitCode
where
    S: TicketSource,
    L: LoadProber,
    M: TicketMutator,
    A: AuditSink,
{
    if let Some(secs) = args.interval_secs {
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);
        tokio::spawn(async move {
            match signal::ctrl_c().await {
                Ok(()) => {
                    logging::log_shutdown("Received Ctrl+C signal");
                    let _ = shutdown_tx.send(()).await;
                }
                Err(err) => {
                    logging::log_error("Signal handling", &err);
                }
            }
        });

        let passes = dispatcher
            .run_every(Duration::from_secs(secs.max(1)), shutdown_rx)
            .await;
        logging::log_success(&format!("Dispatcher stopped after {passes} passes"));
        return ExitCode::SUCCESS;
    }

    match dispatcher.run_once().await {
        Ok(summary) => {
            if args.json_summary {
                match serde_json::to_string_pretty(&summary) {
                    Ok(json) => println!("{json}"),
                    Err(e) => logging::log_error("Summary serialization", &e),
                }
            }
            logging::log_success(&format!("Dispatch finished: {}", summary.counts()));
            ExitCode::SUCCESS
        }
        Err(e) => {
            logging::log_error("Ticket distribution", &e);
            ExitCode::FAILURE
        }
    }
}
