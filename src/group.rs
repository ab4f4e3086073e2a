use crate::kubernetes::PodSource;
use crate::registry::{PodRegistry, TrackingHandle};
use crate::stream::{StreamEnd, stream_container};
use crate::types::{EffectiveStart, LogMessage, PodSnapshot, StreamFailure};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::mpsc;
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, warn};

/// Everything a tracking group needs besides the pod itself.
pub struct StreamContext<S> {
    pub source: Arc<S>,
    pub registry: Arc<PodRegistry>,
    pub since: EffectiveStart,
    pub tx: mpsc::Sender<LogMessage>,
    pub failures: mpsc::UnboundedSender<StreamFailure>,
}

impl<S> Clone for StreamContext<S> {
    fn clone(&self) -> Self {
        Self {
            source: self.source.clone(),
            registry: self.registry.clone(),
            since: self.since,
            tx: self.tx.clone(),
            failures: self.failures.clone(),
        }
    }
}

/// Shared state of one pod's container fan-out.
pub struct PodGroup {
    pod_name: String,
    handle: TrackingHandle,
    registry: Arc<PodRegistry>,
    failures: mpsc::UnboundedSender<StreamFailure>,
    failed: AtomicBool,
}

impl PodGroup {
    pub fn pod_name(&self) -> &str {
        &self.pod_name
    }

    pub fn handle(&self) -> &TrackingHandle {
        &self.handle
    }

    /// A container's stream could not be opened: stop the siblings, drop the
    /// pod from the registry and report the cause. Teardown runs once per
    /// group; every failing container is still reported.
    pub fn fail(&self, container_name: &str, cause: anyhow::Error) {
        if !self.failed.swap(true, Ordering::SeqCst) {
            self.handle.cancel();
            self.registry.release(&self.pod_name, &self.handle);
        }
        let failure = StreamFailure {
            pod_name: self.pod_name.clone(),
            container_name: container_name.to_string(),
            cause: format!("{:#}", cause),
        };
        if self.failures.send(failure).is_err() {
            debug!("Failure reporter closed, dropping report for {}", self.pod_name);
        }
    }

    fn finish(&self) {
        if self.registry.release(&self.pod_name, &self.handle) {
            debug!("All streams for pod {} ended, no longer tracked", self.pod_name);
        }
    }
}

/// Start one stream task per container of `pod` under the cancellation scope
/// of `handle`. The pod is released from the registry once every task ends,
/// unless a stream broke mid-read: that pod stays tracked and is not resumed.
pub fn spawn_pod_group<S: PodSource>(
    ctx: StreamContext<S>,
    pod: PodSnapshot,
    handle: TrackingHandle,
) -> JoinHandle<()> {
    let PodSnapshot {
        name, containers, ..
    } = pod;
    let group = Arc::new(PodGroup {
        pod_name: name,
        handle,
        registry: ctx.registry.clone(),
        failures: ctx.failures.clone(),
        failed: AtomicBool::new(false),
    });

    tokio::spawn(async move {
        let mut tasks = JoinSet::new();
        for container in containers {
            tasks.spawn(stream_container(
                ctx.source.clone(),
                ctx.since,
                ctx.tx.clone(),
                group.clone(),
                container,
            ));
        }
        drop(ctx);

        let mut broken = false;
        while let Some(result) = tasks.join_next().await {
            match result {
                Ok(StreamEnd::ReadFailed) => broken = true,
                Ok(_) => {}
                Err(e) => warn!("Stream task for pod {} panicked: {}", group.pod_name, e),
            }
        }
        if broken {
            warn!(
                "Log stream for pod {} broke, not streaming it again",
                group.pod_name
            );
        } else {
            group.finish();
        }
    })
}
