use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

use crate::types::EffectiveStart;
use crate::utils::parse_duration;

#[derive(Parser, Debug)]
#[command(name = "kubectl-stream")]
#[command(about = "Stream logs from every running pod in a namespace, discovering new pods as they start")]
pub struct Cli {
    /// New contents only; no history
    #[arg(short = 't', long)]
    pub tail: bool,

    /// Only show logs newer than this duration (e.g. 30s, 10m, 1h30m)
    #[arg(long, value_parser = parse_duration, default_value = "0")]
    pub since: Duration,

    /// Stop streaming and exit after this duration (e.g. 2s, 5m); 0 runs forever
    #[arg(short = 'w', long, value_parser = parse_duration, default_value = "0")]
    pub wait: Duration,

    /// Namespace (defaults to the kubeconfig context's namespace)
    #[arg(short = 'n', long)]
    pub namespace: Option<String>,

    /// Path to the kubeconfig file
    #[arg(long)]
    pub kubeconfig: Option<PathBuf>,

    /// Context
    #[arg(long)]
    pub context: Option<String>,

    /// Capacity of the aggregated output channel
    #[arg(long, default_value_t = 1024)]
    pub buffer_size: usize,

    /// Disable coloured pod/container prefixes
    #[arg(long)]
    pub no_color: bool,

    /// Verbose diagnostics
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Lower bound for every log subscription, fixed once at startup.
    pub fn effective_start(&self, now: chrono::DateTime<chrono::Utc>) -> EffectiveStart {
        EffectiveStart::select(self.tail, self.since, now)
    }

    pub fn deadline(&self) -> Option<Duration> {
        (!self.wait.is_zero()).then_some(self.wait)
    }
}
