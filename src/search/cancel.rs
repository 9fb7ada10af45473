//! Cooperative cancellation token
//!
//! One byte of memory observable by both the controller and the engine
//! worker. The controller writes 1 to request a stop; the engine polls at
//! its own checkpoints. There is no deadline and no forceful termination:
//! correctness never depends on an immediate stop, only on the eventual
//! cessation of further messages.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

const CONTINUE: u8 = 0;
const STOP: u8 = 1;

/// Handle to the shared stop byte. Clones observe the same byte; allocate
/// a fresh token per search request, never reuse one.
#[derive(Debug, Clone)]
pub struct CancelToken {
    flag: Arc<AtomicU8>,
}

impl CancelToken {
    /// A fresh token in the "continue" state.
    pub fn new() -> Self {
        Self {
            flag: Arc::new(AtomicU8::new(CONTINUE)),
        }
    }

    /// Request a stop. Advisory only; idempotent.
    pub fn cancel(&self) {
        self.flag.store(STOP, Ordering::Relaxed);
    }

    /// Poll the byte. Engines call this at their checkpoints.
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed) != CONTINUE
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}
