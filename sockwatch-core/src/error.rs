//! Error types for the readiness selector.

use crate::handle::Handle;
use nix::errno::Errno;
use thiserror::Error;

/// Errors reported by the strict selector API.
///
/// The lenient calls (`add`, `wait`) never return these; they log and carry
/// on, reporting zero ready handles where a wait fails.
#[derive(Debug, Error)]
pub enum SelectorError {
    /// The handle is negative or the invalid-handle sentinel.
    #[error("invalid socket handle {0}")]
    InvalidHandle(Handle),

    /// The handle does not fit in the backend's descriptor set.
    #[error("socket handle {handle} exceeds the backend limit of {limit}")]
    HandleOutOfRange {
        /// The rejected handle.
        handle: Handle,
        /// Exclusive upper bound accepted by the backend.
        limit: Handle,
    },

    /// The OS readiness call failed.
    #[error("readiness wait failed: {0}")]
    Wait(#[from] Errno),

    /// A timeout in seconds that is negative or NaN.
    #[error("invalid wait timeout of {0} seconds")]
    InvalidTimeout(f32),
}

impl SelectorError {
    /// Returns `true` if the wait was interrupted by a signal.
    pub fn is_interrupted(&self) -> bool {
        matches!(self, Self::Wait(Errno::EINTR))
    }
}
