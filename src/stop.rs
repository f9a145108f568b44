//! Cooperative cancellation token for long-running simplification drivers
//!
//! Replaces the source's global `stop_requested()` free function with an
//! injected, cloneable handle so drivers never reach for process-global
//! state. Cloning a `StopToken` shares the same underlying flag.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A cheap, shareable flag that drivers poll between iterations.
#[derive(Clone, Debug, Default)]
pub struct StopToken(Arc<AtomicBool>);

impl StopToken {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(false)))
    }

    /// Signal every clone of this token to stop at the next checkpoint.
    pub fn request_stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Polled by drivers between rule passes, rule applications, and
    /// optimizer iterations.
    pub fn stop_requested(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shared_across_clones() {
        let token = StopToken::new();
        let clone = token.clone();
        assert!(!clone.stop_requested());
        token.request_stop();
        assert!(clone.stop_requested());
    }
}
