use crate::types::{EffectiveStart, PodPhase, PodSnapshot};
use futures::io::{AsyncBufRead, AsyncBufReadExt};
use futures::stream::{self, BoxStream, StreamExt};
use k8s_openapi::api::core::v1::Pod;
use kube::api::{ListParams, LogParams};
use kube::{Api, Client, ResourceExt, config};
use std::path::Path;
use tracing::info;

/// Lines of one container's log, newline stripped.
pub type LogLines = BoxStream<'static, std::io::Result<String>>;

/// The orchestrator as seen by the reconciler and the stream tasks.
#[async_trait::async_trait]
pub trait PodSource: Send + Sync + 'static {
    async fn list_pods(&self) -> anyhow::Result<Vec<PodSnapshot>>;

    /// Open a follow-mode, timestamped log stream for one container.
    async fn stream_logs(
        &self,
        pod_name: &str,
        container_name: &str,
        since: EffectiveStart,
    ) -> anyhow::Result<LogLines>;
}

pub struct KubePodSource {
    api: Api<Pod>,
}

impl KubePodSource {
    pub fn new(client: Client, namespace: &str) -> Self {
        Self {
            api: Api::namespaced(client, namespace),
        }
    }
}

#[async_trait::async_trait]
impl PodSource for KubePodSource {
    async fn list_pods(&self) -> anyhow::Result<Vec<PodSnapshot>> {
        let pods = self.api.list(&ListParams::default()).await?;
        Ok(pods.items.iter().map(snapshot_from_pod).collect())
    }

    async fn stream_logs(
        &self,
        pod_name: &str,
        container_name: &str,
        since: EffectiveStart,
    ) -> anyhow::Result<LogLines> {
        let lp = LogParams {
            follow: true,
            timestamps: true,
            container: Some(container_name.to_string()),
            since_seconds: since.since_seconds(chrono::Utc::now()),
            ..Default::default()
        };
        let stream = self.api.log_stream(pod_name, &lp).await?;
        Ok(lossy_lines(stream))
    }
}

/// Split a log body on newlines. Bytes that are not valid UTF-8 are replaced
/// rather than ending the stream. A final line without a newline is kept.
pub fn lossy_lines<R>(reader: R) -> LogLines
where
    R: AsyncBufRead + Send + 'static,
{
    stream::unfold(Some(Box::pin(reader)), |reader| async move {
        let mut reader = reader?;
        let mut buf = Vec::new();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => None,
            Ok(_) => {
                if buf.last() == Some(&b'\n') {
                    buf.pop();
                    if buf.last() == Some(&b'\r') {
                        buf.pop();
                    }
                }
                let line = String::from_utf8_lossy(&buf).into_owned();
                Some((Ok(line), Some(reader)))
            }
            Err(e) => Some((Err(e), None)),
        }
    })
    .boxed()
}

pub fn snapshot_from_pod(pod: &Pod) -> PodSnapshot {
    let phase = pod.status.as_ref().and_then(|s| s.phase.as_deref());
    let containers = pod
        .spec
        .as_ref()
        .map(|spec| spec.containers.iter().map(|c| c.name.clone()).collect())
        .unwrap_or_default();
    PodSnapshot {
        name: pod.name_any(),
        phase: PodPhase::parse(phase),
        containers,
    }
}

/// Build a client from an explicit kubeconfig and/or context, or infer one.
/// Returns the client and the namespace the selected context defaults to.
pub async fn initialize_client(
    kubeconfig: Option<&Path>,
    context: Option<String>,
) -> anyhow::Result<(Client, String)> {
    let options = config::KubeConfigOptions {
        context: context.clone(),
        ..Default::default()
    };
    let config = match (kubeconfig, &context) {
        (Some(path), _) => {
            let kc = config::Kubeconfig::read_from(path).map_err(|e| {
                anyhow::anyhow!("Could not read kubeconfig {}: {}", path.display(), e)
            })?;
            config::Config::from_custom_kubeconfig(kc, &options).await?
        }
        (None, Some(ctx)) => config::Config::from_kubeconfig(&options)
            .await
            .map_err(|e| anyhow::anyhow!("Context '{}' not found in kubeconfig: {}", ctx, e))?,
        (None, None) => config::Config::infer().await?,
    };
    let namespace = config.default_namespace.clone();
    let client = Client::try_from(config)?;
    match context {
        Some(ctx) => info!("Initialized client for context: {}", ctx),
        None => info!("Using current context"),
    }
    Ok((client, namespace))
}
