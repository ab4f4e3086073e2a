use parking_lot::RwLock;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio_util::sync::CancellationToken;

static NEXT_GENERATION: AtomicU64 = AtomicU64::new(1);

/// Cancellation capability for one pod's streaming group.
#[derive(Debug, Clone)]
pub struct TrackingHandle {
    generation: u64,
    cancel: CancellationToken,
}

impl TrackingHandle {
    pub fn new() -> Self {
        Self {
            generation: NEXT_GENERATION.fetch_add(1, Ordering::Relaxed),
            cancel: CancellationToken::new(),
        }
    }

    pub fn token(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    #[allow(dead_code)]
    pub fn is_active(&self) -> bool {
        !self.cancel.is_cancelled()
    }
}

impl Default for TrackingHandle {
    fn default() -> Self {
        Self::new()
    }
}

/// Set of pods currently being streamed, keyed by pod name.
///
/// A name is present exactly while a tracking group for it is running. Only
/// the reconciler inserts; groups remove themselves when they end.
#[derive(Debug, Default)]
pub struct PodRegistry {
    pods: RwLock<HashMap<String, TrackingHandle>>,
}

impl PodRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_tracked(&self, pod_name: &str) -> bool {
        self.pods.read().contains_key(pod_name)
    }

    /// Insert `handle` unless the pod is already tracked. Returns whether this
    /// caller won the right to start a group.
    pub fn try_register(&self, pod_name: &str, handle: TrackingHandle) -> bool {
        match self.pods.write().entry(pod_name.to_string()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(handle);
                true
            }
        }
    }

    #[allow(dead_code)]
    pub fn deregister(&self, pod_name: &str) {
        self.pods.write().remove(pod_name);
    }

    /// Remove the entry only if it still belongs to `handle`, so a finished
    /// group cannot evict a newer group started under the same pod name.
    pub fn release(&self, pod_name: &str, handle: &TrackingHandle) -> bool {
        let mut pods = self.pods.write();
        match pods.get(pod_name) {
            Some(current) if current.generation == handle.generation => {
                pods.remove(pod_name);
                true
            }
            _ => false,
        }
    }

    /// Cancel every registered group. The registry is empty afterwards.
    pub fn cancel_all(&self) {
        let drained: Vec<(String, TrackingHandle)> = self.pods.write().drain().collect();
        for (_, handle) in drained {
            handle.cancel();
        }
    }

    pub fn len(&self) -> usize {
        self.pods.read().len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.pods.read().is_empty()
    }

    #[allow(dead_code)]
    pub fn tracked(&self) -> Vec<String> {
        let mut names: Vec<String> = self.pods.read().keys().cloned().collect();
        names.sort();
        names
    }
}
