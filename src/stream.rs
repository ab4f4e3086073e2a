use crate::group::PodGroup;
use crate::kubernetes::PodSource;
use crate::types::{EffectiveStart, LogMessage};
use futures::stream::StreamExt;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Why a container's stream task stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamEnd {
    Closed,
    Cancelled,
    OpenFailed,
    ReadFailed,
    SinkClosed,
}

/// Stream one container's log into `tx` until the stream closes or the
/// group is cancelled. Blank lines are dropped.
pub async fn stream_container<S: PodSource>(
    source: Arc<S>,
    since: EffectiveStart,
    tx: mpsc::Sender<LogMessage>,
    group: Arc<PodGroup>,
    container_name: String,
) -> StreamEnd {
    let pod_name = group.pod_name().to_string();
    let token = group.handle().token().clone();

    debug!("Starting to stream logs for pod {}/{}", pod_name, container_name);
    let opened = tokio::select! {
        _ = token.cancelled() => return StreamEnd::Cancelled,
        opened = source.stream_logs(&pod_name, &container_name, since) => opened,
    };
    let mut lines = match opened {
        Ok(lines) => lines,
        Err(e) => {
            group.fail(&container_name, e);
            return StreamEnd::OpenFailed;
        }
    };

    loop {
        let next = tokio::select! {
            biased;
            _ = token.cancelled() => {
                debug!("Stream for pod {}/{} cancelled", pod_name, container_name);
                return StreamEnd::Cancelled;
            }
            next = lines.next() => next,
        };

        match next {
            Some(Ok(line)) => {
                if line.trim().is_empty() {
                    continue;
                }
                let msg = LogMessage {
                    pod_name: pod_name.clone(),
                    container_name: container_name.clone(),
                    line,
                };
                tokio::select! {
                    _ = token.cancelled() => return StreamEnd::Cancelled,
                    sent = tx.send(msg) => {
                        if sent.is_err() {
                            return StreamEnd::SinkClosed;
                        }
                    }
                }
            }
            Some(Err(e)) => {
                warn!(
                    "Error reading log line from pod {}/{}: {}, stopping",
                    pod_name, container_name, e
                );
                return StreamEnd::ReadFailed;
            }
            None => {
                debug!("Log stream ended for pod {}/{}", pod_name, container_name);
                return StreamEnd::Closed;
            }
        }
    }
}
