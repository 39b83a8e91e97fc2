//! Cancellation and deadline propagation for a single pipeline run.
//!
//! Every subprocess launch and every outbound network call is wrapped in
//! [`RunContext::run`], so cancelling the context (or letting its deadline
//! pass) drops the in-flight future. Child processes are spawned with
//! `kill_on_drop`, which turns that drop into a terminated child.

use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Why an operation governed by a [`RunContext`] stopped early
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Interrupted {
    #[error("Operation cancelled")]
    Cancelled,

    #[error("Operation deadline exceeded")]
    DeadlineExceeded,
}

/// Cancellation token plus an optional deadline, shared by every step of one run
#[derive(Debug, Clone, Default)]
pub struct RunContext {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl RunContext {
    /// Create a context with no deadline
    pub fn new() -> Self {
        Self::default()
    }

    /// Bound the context by `timeout` from now.
    ///
    /// An earlier deadline that is already set is kept.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        let candidate = Instant::now() + timeout;
        self.deadline = Some(match self.deadline {
            Some(existing) if existing < candidate => existing,
            _ => candidate,
        });
        self
    }

    /// Cancel this context
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// The underlying token, for wiring external signals (Ctrl-C)
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// Remaining time before the deadline, if one is set
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }

    /// Whether the context is already cancelled or past its deadline
    pub fn interruption(&self) -> Option<Interrupted> {
        if self.token.is_cancelled() {
            return Some(Interrupted::Cancelled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Some(Interrupted::DeadlineExceeded),
            _ => None,
        }
    }

    /// Drive `future` to completion unless the context is cancelled or its
    /// deadline passes first, in which case the future is dropped.
    pub async fn run<F, T>(&self, future: F) -> Result<T, Interrupted>
    where
        F: Future<Output = T>,
    {
        if let Some(reason) = self.interruption() {
            return Err(reason);
        }

        let deadline = self.deadline;
        let expired = async move {
            match deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            biased;
            _ = self.token.cancelled() => Err(Interrupted::Cancelled),
            _ = expired => Err(Interrupted::DeadlineExceeded),
            output = future => Ok(output),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_run_completes_without_deadline() {
        let ctx = RunContext::new();
        let value = ctx.run(async { 42 }).await;
        assert_eq!(value, Ok(42));
    }

    #[tokio::test]
    async fn test_cancelled_context_short_circuits() {
        let ctx = RunContext::new();
        ctx.cancel();
        let value = ctx.run(async { 1 }).await;
        assert_eq!(value, Err(Interrupted::Cancelled));
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_interrupts_slow_future() {
        let ctx = RunContext::new().with_timeout(Duration::from_millis(50));
        let value = ctx
            .run(tokio::time::sleep(Duration::from_secs(10)))
            .await;
        assert_eq!(value, Err(Interrupted::DeadlineExceeded));
    }

    #[tokio::test(start_paused = true)]
    async fn test_with_timeout_keeps_earlier_deadline() {
        let ctx = RunContext::new()
            .with_timeout(Duration::from_secs(1))
            .with_timeout(Duration::from_secs(60));
        let remaining = ctx.remaining().unwrap();
        assert!(remaining <= Duration::from_secs(1));
    }
}
