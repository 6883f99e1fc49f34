//! Cancellation and deadline propagation.
//!
//! Every store operation takes a [`Context`]. I/O-bound backends check it
//! before (and, for listings, during) filesystem work and abort with
//! [`StoreError::Cancelled`] or [`StoreError::DeadlineExceeded`]. The
//! in-memory store is CPU-bound and completes before any cancellation
//! could be observed, so it never consults the context.

use crate::error::{StoreError, StoreResult};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// A cancellation and deadline handle passed to every store operation.
///
/// Contexts are cheap to clone; clones share the same cancellation flag.
///
/// # Example
///
/// ```rust
/// use optikv_store::Context;
///
/// let (ctx, token) = Context::cancellable();
/// assert!(ctx.ensure_active().is_ok());
/// token.cancel();
/// assert!(ctx.ensure_active().is_err());
/// ```
#[derive(Debug, Clone)]
pub struct Context {
    cancelled: Arc<AtomicBool>,
    deadline: Option<Instant>,
}

impl Context {
    /// Creates a context that is never cancelled and carries no deadline.
    #[must_use]
    pub fn background() -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
            deadline: None,
        }
    }

    /// Creates a context that expires at the given instant.
    #[must_use]
    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
            deadline: Some(deadline),
        }
    }

    /// Creates a context that expires after the given duration.
    #[must_use]
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::with_deadline(Instant::now() + timeout)
    }

    /// Creates a context together with a token that cancels it.
    #[must_use]
    pub fn cancellable() -> (Self, CancelToken) {
        let ctx = Self::background();
        let token = CancelToken(Arc::clone(&ctx.cancelled));
        (ctx, token)
    }

    /// Returns a copy of this context with the given deadline attached.
    ///
    /// The cancellation flag stays shared with the parent.
    #[must_use]
    pub fn deadline_at(&self, deadline: Instant) -> Self {
        Self {
            cancelled: Arc::clone(&self.cancelled),
            deadline: Some(deadline),
        }
    }

    /// Returns `Err` if the context was cancelled or its deadline passed.
    ///
    /// # Errors
    ///
    /// [`StoreError::Cancelled`] or [`StoreError::DeadlineExceeded`].
    pub fn ensure_active(&self) -> StoreResult<()> {
        if self.cancelled.load(Ordering::Relaxed) {
            return Err(StoreError::Cancelled);
        }
        if let Some(deadline) = self.deadline {
            if Instant::now() >= deadline {
                return Err(StoreError::DeadlineExceeded);
            }
        }
        Ok(())
    }

    /// Returns true if the context was cancelled or its deadline passed.
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.ensure_active().is_err()
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::background()
    }
}

/// Cancels the [`Context`] it was created with.
///
/// Tokens are cheap to clone and may be triggered from any thread.
#[derive(Debug, Clone)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Cancels the associated context. Idempotent.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn background_is_active() {
        let ctx = Context::background();
        assert!(ctx.ensure_active().is_ok());
        assert!(!ctx.is_done());
    }

    #[test]
    fn cancel_token_cancels_all_clones() {
        let (ctx, token) = Context::cancellable();
        let clone = ctx.clone();

        token.cancel();

        assert!(matches!(ctx.ensure_active(), Err(StoreError::Cancelled)));
        assert!(matches!(clone.ensure_active(), Err(StoreError::Cancelled)));
    }

    #[test]
    fn cancel_is_idempotent() {
        let (ctx, token) = Context::cancellable();
        token.cancel();
        token.cancel();
        assert!(ctx.is_done());
    }

    #[test]
    fn passed_deadline_expires() {
        let ctx = Context::with_deadline(Instant::now() - Duration::from_secs(1));
        assert!(matches!(
            ctx.ensure_active(),
            Err(StoreError::DeadlineExceeded)
        ));
    }

    #[test]
    fn future_deadline_is_active() {
        let ctx = Context::with_timeout(Duration::from_secs(60));
        assert!(ctx.ensure_active().is_ok());
    }

    #[test]
    fn deadline_at_shares_cancellation() {
        let (ctx, token) = Context::cancellable();
        let child = ctx.deadline_at(Instant::now() + Duration::from_secs(60));
        token.cancel();
        assert!(child.is_done());
    }
}
