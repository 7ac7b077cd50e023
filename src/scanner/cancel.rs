//! Cancellation shared between the orchestrator and a running walker.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A set-once cancellation signal.
///
/// Clones share the same flag. Once [`CancelToken::cancel`] has been called
/// every clone reports cancelled for the rest of its lifetime.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    canceled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Signals cancellation. Returns `true` only for the call that set it.
    pub fn cancel(&self) -> bool {
        !self.canceled.swap(true, Ordering::SeqCst)
    }

    #[inline]
    pub fn is_canceled(&self) -> bool {
        self.canceled.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_token_is_not_canceled() {
        assert!(!CancelToken::new().is_canceled());
    }

    #[test]
    fn cancel_is_visible_to_clones_and_set_once() {
        let token = CancelToken::new();
        let shared = token.clone();
        assert!(token.cancel());
        assert!(!shared.cancel());
        assert!(shared.is_canceled());
    }
}
