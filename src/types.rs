use chrono::{DateTime, TimeDelta, Utc};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogMessage {
    pub pod_name: String,
    pub container_name: String,
    pub line: String,
}

impl LogMessage {
    /// `[pod/container]` annotation placed in front of every emitted line.
    pub fn prefix(&self) -> String {
        format!("[{}/{}]", self.pod_name, self.container_name)
    }
}

/// A container whose log stream could not be opened.
#[derive(Debug, Clone)]
pub struct StreamFailure {
    pub pod_name: String,
    pub container_name: String,
    pub cause: String,
}

impl std::fmt::Display for StreamFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}/{} yielded error trying to get logs: {}",
            self.pod_name, self.container_name, self.cause
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PodPhase {
    Pending,
    Running,
    Succeeded,
    Failed,
    Unknown,
}

impl PodPhase {
    pub fn parse(phase: Option<&str>) -> Self {
        match phase {
            Some("Pending") => PodPhase::Pending,
            Some("Running") => PodPhase::Running,
            Some("Succeeded") => PodPhase::Succeeded,
            Some("Failed") => PodPhase::Failed,
            _ => PodPhase::Unknown,
        }
    }
}

/// Read-only view of a pod as returned by one list call.
#[derive(Debug, Clone)]
pub struct PodSnapshot {
    pub name: String,
    pub phase: PodPhase,
    pub containers: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EffectiveStart(DateTime<Utc>);

impl EffectiveStart {
    pub fn epoch() -> Self {
        EffectiveStart(DateTime::UNIX_EPOCH)
    }

    #[allow(dead_code)]
    pub fn at(ts: DateTime<Utc>) -> Self {
        EffectiveStart(ts)
    }

    /// A nonzero `since` wins over `tail`; with neither the full history is shown.
    pub fn select(tail: bool, since: Duration, now: DateTime<Utc>) -> Self {
        if !since.is_zero() {
            let start = TimeDelta::from_std(since)
                .ok()
                .and_then(|since| now.checked_sub_signed(since))
                .unwrap_or(DateTime::UNIX_EPOCH);
            EffectiveStart(start)
        } else if tail {
            EffectiveStart(now)
        } else {
            Self::epoch()
        }
    }

    #[allow(dead_code)]
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.0
    }

    pub fn is_epoch(&self) -> bool {
        self.0 <= DateTime::UNIX_EPOCH
    }

    /// Relative form sent to the API server when a stream is opened at `now`.
    /// `None` means no lower bound. The API rejects values below one second.
    pub fn since_seconds(&self, now: DateTime<Utc>) -> Option<i64> {
        if self.is_epoch() {
            return None;
        }
        let elapsed = now.signed_duration_since(self.0);
        let mut secs = elapsed.num_seconds();
        if elapsed.subsec_nanos() > 0 {
            secs += 1;
        }
        Some(secs.max(1))
    }
}
