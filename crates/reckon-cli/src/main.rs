//! reckon: coordinator, worker and one-shot calculator.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use reckon_core::calc::{calc, format_result};
use reckon_core::config::{Config, EvaluationMode, IdScheme};
use reckon_core::coordinator::Coordinator;
use reckon_core::registry::ClaimMode;
use reckon_core::worker::{HttpCoordinatorClient, WorkerGroup};

/// Distributed arithmetic evaluation
#[derive(Parser)]
#[command(name = "reckon", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the client and worker APIs
    Coordinator {
        /// TOML config file; flags override its values
        #[arg(long, env = "RECKON_CONFIG")]
        config: Option<PathBuf>,

        #[arg(long, env = "RECKON_BIND")]
        bind: Option<String>,

        /// sync | local | workers
        #[arg(long, env = "RECKON_MODE")]
        mode: Option<EvaluationMode>,

        /// exclusive | shared
        #[arg(long, env = "RECKON_CLAIM_MODE")]
        claim_mode: Option<ClaimMode>,

        #[arg(long, env = "RECKON_CLAIM_TIMEOUT_MS")]
        claim_timeout_ms: Option<u64>,

        /// sequential | ulid
        #[arg(long, env = "RECKON_ID_SCHEME")]
        id_scheme: Option<IdScheme>,
    },

    /// Pull jobs from a coordinator until Ctrl-C
    Worker {
        #[arg(long, env = "RECKON_CONFIG")]
        config: Option<PathBuf>,

        #[arg(long, env = "RECKON_COORDINATOR_URL")]
        coordinator_url: Option<String>,

        #[arg(long, env = "RECKON_CONCURRENCY")]
        concurrency: Option<usize>,

        #[arg(long, env = "RECKON_POLL_INTERVAL_MS")]
        poll_interval_ms: Option<u64>,

        #[arg(long, env = "RECKON_REQUEST_TIMEOUT_MS")]
        request_timeout_ms: Option<u64>,
    },

    /// Evaluate one expression and print the result
    Calc {
        expression: String,
    },
}

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}

async fn run_coordinator(config: Config) -> Result<()> {
    let addr = config.coordinator.bind_addr()?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    let coordinator = Arc::new(Coordinator::from_config(config.coordinator));
    coordinator.serve(listener, shutdown_signal()).await?;
    Ok(())
}

async fn run_worker(config: Config) -> Result<()> {
    let worker = config.worker;
    let client = HttpCoordinatorClient::new(&worker.coordinator_url, worker.request_timeout())?;
    info!(coordinator = %worker.coordinator_url, concurrency = worker.concurrency, "starting workers");

    let group = WorkerGroup::spawn(worker.concurrency, Arc::new(client), worker.poll_interval());
    shutdown_signal().await;
    group.shutdown_and_join().await;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Calc { expression } => {
            let value = calc(&expression).with_context(|| format!("cannot evaluate {expression:?}"))?;
            println!("{}", format_result(value));
            Ok(())
        }
        Command::Coordinator {
            config,
            bind,
            mode,
            claim_mode,
            claim_timeout_ms,
            id_scheme,
        } => {
            init_logging();
            let mut config = Config::load(config.as_deref())?;
            let c = &mut config.coordinator;
            if let Some(bind) = bind {
                c.bind = bind;
            }
            if let Some(mode) = mode {
                c.mode = mode;
            }
            if let Some(claim_mode) = claim_mode {
                c.claim_mode = claim_mode;
            }
            if let Some(ms) = claim_timeout_ms {
                c.claim_timeout_ms = ms;
            }
            if let Some(id_scheme) = id_scheme {
                c.id_scheme = id_scheme;
            }
            config.coordinator.validate()?;
            run_coordinator(config).await
        }
        Command::Worker {
            config,
            coordinator_url,
            concurrency,
            poll_interval_ms,
            request_timeout_ms,
        } => {
            init_logging();
            let mut config = Config::load(config.as_deref())?;
            let w = &mut config.worker;
            if let Some(url) = coordinator_url {
                w.coordinator_url = url;
            }
            if let Some(n) = concurrency {
                w.concurrency = n;
            }
            if let Some(ms) = poll_interval_ms {
                w.poll_interval_ms = ms;
            }
            if let Some(ms) = request_timeout_ms {
                w.request_timeout_ms = ms;
            }
            config.worker.validate()?;
            run_worker(config).await
        }
    }
}
