//! Cooperative cancellation.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// A handle for cancelling a running interpretation.
///
/// The flag is checked between instructions, so a long-running interpretation
/// stops at the next operator boundary after [`Cookie::cancel`] is called.
/// Cloning the cookie shares the underlying flag.
#[derive(Clone, Debug, Default)]
pub struct Cookie {
    cancelled: Arc<AtomicBool>,
}

impl Cookie {
    /// Create a new cookie.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation of the interpretation this cookie was passed to.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    /// Whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}
