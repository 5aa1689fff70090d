//! Cooperative cancellation for streaming executions.

use std::sync::Arc;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicBool, Ordering};

const DEFAULT_REASON: &str = "stream cancelled";

/// A cheaply clonable cancellation flag.
///
/// The engine polls the token once per loop iteration, immediately before
/// issuing the next fetch; an in-flight fetch is never interrupted. The
/// stored reason is propagated verbatim in
/// [`StreamError::Cancelled`](crate::error::StreamError::Cancelled).
#[derive(Clone, Default)]
pub struct CancelToken {
    inner: Arc<Inner>,
}

#[derive(Default)]
struct Inner {
    cancelled: AtomicBool,
    reason: OnceLock<String>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel with the default reason.
    pub fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::SeqCst);
    }

    /// Cancel and record a cause. The first recorded reason wins.
    pub fn cancel_with_reason(&self, reason: impl Into<String>) {
        let _ = self.inner.reason.set(reason.into());
        self.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    pub(crate) fn reason(&self) -> String {
        self.inner
            .reason
            .get()
            .cloned()
            .unwrap_or_else(|| DEFAULT_REASON.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn token_starts_unset() {
        let token = CancelToken::new();
        assert!(!token.is_cancelled());
    }

    #[test]
    fn cancel_is_visible_through_clones() {
        let token = CancelToken::new();
        let clone = token.clone();
        clone.cancel();
        assert!(token.is_cancelled());
        assert_eq!(token.reason(), DEFAULT_REASON);
    }

    #[test]
    fn first_reason_wins() {
        let token = CancelToken::new();
        token.cancel_with_reason("shutting down");
        token.cancel_with_reason("too late");
        assert_eq!(token.reason(), "shutting down");
    }
}
