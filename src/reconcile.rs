use crate::group::{StreamContext, spawn_pod_group};
use crate::kubernetes::PodSource;
use crate::lifetime::Lifetime;
use crate::registry::TrackingHandle;
use crate::types::PodPhase;
use anyhow::Context;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

pub const POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Polls the namespace and starts a tracking group for every running pod
/// that is not already being streamed.
pub struct Reconciler<S> {
    ctx: StreamContext<S>,
    namespace: String,
    lifetime: Lifetime,
    poll_interval: Duration,
}

impl<S: PodSource> Reconciler<S> {
    pub fn new(ctx: StreamContext<S>, namespace: String, lifetime: Lifetime) -> Self {
        Self {
            ctx,
            namespace,
            lifetime,
            poll_interval: POLL_INTERVAL,
        }
    }

    #[allow(dead_code)]
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// One reconciliation pass. Returns how many groups were started.
    /// A failed pod listing is fatal.
    pub async fn tick(&self) -> anyhow::Result<usize> {
        let pods = self
            .ctx
            .source
            .list_pods()
            .await
            .with_context(|| format!("Failed to list pods in namespace {}", self.namespace))?;

        let registry = &self.ctx.registry;
        let mut started = 0;
        for pod in pods {
            if pod.phase != PodPhase::Running || registry.is_tracked(&pod.name) {
                continue;
            }
            if pod.containers.is_empty() {
                debug!("Pod {} has no containers, skipping", pod.name);
                continue;
            }
            let handle = TrackingHandle::new();
            if !registry.try_register(&pod.name, handle.clone()) {
                debug!("Pod {} registered concurrently, skipping", pod.name);
                continue;
            }
            info!(
                "NEW POD: {} | Containers: {}",
                pod.name,
                pod.containers.join(",")
            );
            spawn_pod_group(self.ctx.clone(), pod, handle);
            started += 1;
        }
        Ok(started)
    }

    /// Poll until the lifetime expires (Ok) or listing fails (Err).
    pub async fn run(&self) -> anyhow::Result<()> {
        let mut interval = tokio::time::interval(self.poll_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            interval.tick().await;
            self.tick().await?;

            if self.lifetime.expired() {
                info!(
                    "Wait time elapsed, stopping {} tracked pod(s)",
                    self.ctx.registry.len()
                );
                self.ctx.registry.cancel_all();
                return Ok(());
            }
        }
    }

    pub fn shutdown(&self) {
        self.ctx.registry.cancel_all();
    }
}
