use std::time::Duration;
use tokio::time::Instant;

/// Bounded polling parameters. Every wait in the engine is bounded; a policy
/// with a zero timeout degenerates to a single probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitPolicy {
    pub timeout: Duration,
    pub interval: Duration,
}

impl WaitPolicy {
    pub fn new(timeout: Duration, interval: Duration) -> Self {
        Self { timeout, interval }
    }

    pub fn deadline(&self) -> Instant {
        Instant::now() + self.timeout
    }
}

impl Default for WaitPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            interval: Duration::from_millis(500),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn deadline_is_now_plus_timeout() {
        let policy = WaitPolicy::new(Duration::from_secs(5), Duration::from_millis(10));
        let before = Instant::now();
        let deadline = policy.deadline();
        assert!(deadline >= before + policy.timeout);
        assert!(deadline <= Instant::now() + policy.timeout);
    }

    #[tokio::test]
    async fn zero_timeout_deadline_is_already_due() {
        let policy = WaitPolicy::new(Duration::ZERO, Duration::from_millis(10));
        let deadline = policy.deadline();
        assert!(Instant::now() >= deadline);
    }
}
