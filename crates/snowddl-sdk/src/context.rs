//! Per-operation context: cancellation, deadline and account routing.

use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::{CancellationToken, WaitForCancellationFuture};

/// Context passed to every operation.
///
/// Clones share the same cancellation token, so cancelling any clone aborts
/// every in-flight operation using it.
#[derive(Debug, Clone, Default)]
pub struct Context {
    token: CancellationToken,
    deadline: Option<Instant>,
    account_locator: Option<String>,
}

impl Context {
    /// Creates a context with no deadline.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy with a deadline `timeout` from now.
    #[must_use]
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Returns a copy with an absolute deadline.
    #[must_use]
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(match self.deadline {
            Some(current) => current.min(deadline),
            None => deadline,
        });
        self
    }

    /// Returns a copy routed to `locator`.
    #[must_use]
    pub fn with_account_locator(mut self, locator: impl Into<String>) -> Self {
        self.account_locator = Some(locator.into());
        self
    }

    /// Returns a context cancelled together with this one, but which can
    /// also be cancelled on its own.
    #[must_use]
    pub fn child(&self) -> Self {
        Self {
            token: self.token.child_token(),
            deadline: self.deadline,
            account_locator: self.account_locator.clone(),
        }
    }

    /// Cancels this context and its children.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Returns whether the context was cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Completes when the context is cancelled.
    pub fn cancelled(&self) -> WaitForCancellationFuture<'_> {
        self.token.cancelled()
    }

    /// Returns the deadline.
    #[must_use]
    pub const fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Returns the time left before the deadline, zero once it has passed.
    #[must_use]
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }

    /// Returns the account locator.
    #[must_use]
    pub fn account_locator(&self) -> Option<&str> {
        self.account_locator.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_child_follows_parent() {
        let parent = Context::new();
        let child = parent.child();
        assert!(!child.is_cancelled());
        parent.cancel();
        assert!(child.is_cancelled());
        child.cancelled().await;
    }

    #[tokio::test]
    async fn test_child_cancel_does_not_reach_parent() {
        let parent = Context::new();
        let child = parent.child();
        child.cancel();
        assert!(!parent.is_cancelled());
    }

    #[tokio::test]
    async fn test_deadline_keeps_earliest() {
        let ctx = Context::new()
            .with_timeout(Duration::from_secs(60))
            .with_timeout(Duration::from_secs(3600));
        let remaining = ctx.remaining().unwrap();
        assert!(remaining <= Duration::from_secs(60));
    }

    #[test]
    fn test_account_locator() {
        let ctx = Context::new().with_account_locator("XY12345");
        assert_eq!(ctx.account_locator(), Some("XY12345"));
        assert!(ctx.remaining().is_none());
    }
}
