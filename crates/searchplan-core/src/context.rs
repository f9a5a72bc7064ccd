//! Per-call cancellation and deadline token.
//!
//! Engines check the context before doing any work. An engine that cannot
//! cancel cooperatively keeps running once the call has started, even past
//! the deadline.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::error::{Error, Result};

/// Clones share the cancellation flag.
#[derive(Debug, Clone, Default)]
pub struct Context {
    deadline: Option<Instant>,
    cancelled: Arc<AtomicBool>,
}

impl Context {
    /// A context that is never cancelled and has no deadline.
    pub fn background() -> Self {
        Self::default()
    }

    /// A timeout too large to represent as an instant means no deadline.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self { deadline: Instant::now().checked_add(timeout), cancelled: Arc::default() }
    }

    pub fn with_deadline(deadline: Instant) -> Self {
        Self { deadline: Some(deadline), cancelled: Arc::default() }
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Why the context is done, or `None` while it is still live.
    pub fn err(&self) -> Option<Error> {
        if self.is_cancelled() {
            return Some(Error::Cancelled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Some(Error::DeadlineExceeded),
            _ => None,
        }
    }

    pub fn check(&self) -> Result<()> {
        self.err().map_or(Ok(()), Err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn background_is_live() {
        let ctx = Context::background();
        assert!(ctx.check().is_ok());
        assert!(ctx.deadline().is_none());
    }

    #[test]
    fn cancel_is_shared_between_clones() {
        let ctx = Context::with_timeout(Duration::from_secs(60));
        let clone = ctx.clone();
        clone.cancel();
        assert!(matches!(ctx.check(), Err(Error::Cancelled)));
    }

    #[test]
    fn unrepresentable_timeout_has_no_deadline() {
        let ctx = Context::with_timeout(Duration::MAX);
        assert!(ctx.deadline().is_none());
        assert!(ctx.check().is_ok());
    }

    #[test]
    fn expired_deadline_reports_error() {
        let ctx = Context::with_deadline(Instant::now());
        assert!(matches!(ctx.check(), Err(Error::DeadlineExceeded)));
    }
}
