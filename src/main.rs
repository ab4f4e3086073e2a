mod cli;
mod group;
mod kubernetes;
mod lifetime;
mod output;
mod reconcile;
mod registry;
mod stream;
mod types;
mod utils;

use clap::Parser;
use std::io::IsTerminal;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{info, warn};

use cli::Cli;
use group::StreamContext;
use kubernetes::{KubePodSource, initialize_client};
use lifetime::Lifetime;
use reconcile::Reconciler;
use registry::PodRegistry;
use types::{LogMessage, StreamFailure};

/// How long queued records get to reach stdout after shutdown starts.
const FLUSH_GRACE: Duration = Duration::from_secs(1);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Diagnostics go to stderr; stdout carries only log records
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // Fixed before anything else so every subscription shares the same bound
    let since = cli.effective_start(chrono::Utc::now());
    let lifetime = Lifetime::new(cli.deadline());

    let (client, default_namespace) =
        initialize_client(cli.kubeconfig.as_deref(), cli.context.clone()).await?;
    let namespace = cli.namespace.clone().unwrap_or(default_namespace);
    info!("Streaming logs from namespace: {}", namespace);

    let (log_tx, log_rx) = mpsc::channel::<LogMessage>(cli.buffer_size);
    let (failure_tx, failure_rx) = mpsc::unbounded_channel::<StreamFailure>();

    let color = !cli.no_color && std::io::stdout().is_terminal();
    let printer = tokio::spawn(output::print_logs(log_rx, std::io::stdout(), color));
    tokio::spawn(output::report_failures(failure_rx));

    let ctx = StreamContext {
        source: Arc::new(KubePodSource::new(client, &namespace)),
        registry: Arc::new(PodRegistry::new()),
        since,
        tx: log_tx,
        failures: failure_tx,
    };
    let reconciler = Reconciler::new(ctx, namespace, lifetime);

    tokio::select! {
        result = reconciler.run() => result?,
        signal = tokio::signal::ctrl_c() => {
            signal?;
            info!("Interrupted, stopping all streams");
            reconciler.shutdown();
        }
    }

    // Senders held by cancelled groups drop as their tasks wind down
    drop(reconciler);
    match tokio::time::timeout(FLUSH_GRACE, printer).await {
        Ok(Ok(Err(e))) => warn!("Writing log output failed: {}", e),
        Ok(Err(e)) => warn!("Output task failed: {}", e),
        _ => {}
    }
    Ok(())
}
