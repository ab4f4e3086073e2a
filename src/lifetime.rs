use std::time::Duration;
use tokio::time::Instant;

/// Optional wall-clock budget for the whole run, checked once per poll.
#[derive(Debug, Clone, Copy)]
pub struct Lifetime {
    started_at: Instant,
    wait: Option<Duration>,
}

impl Lifetime {
    pub fn new(wait: Option<Duration>) -> Self {
        Self::starting_at(Instant::now(), wait)
    }

    #[allow(dead_code)]
    pub fn forever() -> Self {
        Self::new(None)
    }

    pub fn starting_at(started_at: Instant, wait: Option<Duration>) -> Self {
        Self { started_at, wait }
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.wait.map(|wait| self.started_at + wait)
    }

    pub fn expired_at(&self, now: Instant) -> bool {
        self.deadline().is_some_and(|deadline| now >= deadline)
    }

    pub fn expired(&self) -> bool {
        self.expired_at(Instant::now())
    }
}
