//! Cooperative cancellation (spec.md §5): polled between parse jobs and
//! between resolver phases, never preemptive.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// An observation token shared between the caller and a running `load`.
/// Setting it does not stop work immediately; the loader and resolver poll
/// it at defined checkpoints and, on observing it set, stop and return the
/// partial `Mib` with a `load-cancelled` diagnostic.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(false)))
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_uncancelled_and_observes_cancel() {
        let token = CancellationToken::new();
        assert!(!token.is_cancelled());
        token.cancel();
        assert!(token.is_cancelled());
    }

    #[test]
    fn clone_shares_cancellation_state() {
        let token = CancellationToken::new();
        let clone = token.clone();
        clone.cancel();
        assert!(token.is_cancelled());
    }
}
