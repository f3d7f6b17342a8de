//! Readiness-polling backends.
//!
//! This module wraps the OS facility that blocks until watched handles
//! become readable. `select(2)` is the default; `poll(2)` is available for
//! descriptor values at or above `FD_SETSIZE`.

pub mod poll;
pub mod select;

pub use poll::PollBackend;
pub use select::SelectBackend;

use crate::error::SelectorError;
use crate::handle::Handle;
use crate::set::HandleSet;
use crate::timeout::WaitTimeout;

/// An OS readiness-polling primitive.
pub trait ReadinessBackend: Send {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Exclusive upper bound on handle values, if the backend has one.
    fn handle_limit(&self) -> Option<Handle>;

    /// Blocks until a handle in `watched` is readable or `timeout` elapses.
    ///
    /// On success `ready` holds exactly the readable subset of `watched`,
    /// pushed in ascending order. On failure `ready` is left empty.
    fn wait_readable(
        &mut self,
        watched: &HandleSet,
        timeout: WaitTimeout,
        ready: &mut Vec<Handle>,
    ) -> Result<(), SelectorError>;
}

/// Which readiness primitive a selector uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackendKind {
    /// `select(2)`, bounded by `FD_SETSIZE`.
    #[default]
    Select,

    /// `poll(2)`, no descriptor ceiling.
    Poll,
}

impl BackendKind {
    /// Creates a fresh backend of this kind.
    pub fn build(self) -> Box<dyn ReadinessBackend> {
        match self {
            Self::Select => Box::new(SelectBackend::new()),
            Self::Poll => Box::new(PollBackend::new()),
        }
    }

    /// Returns a human-readable description of this backend
    pub fn description(&self) -> &'static str {
        match self {
            Self::Select => "select(2) over a fixed-size descriptor set",
            Self::Poll => "poll(2) over a dynamic descriptor list",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_backend_is_select() {
        assert_eq!(BackendKind::default(), BackendKind::Select);
        assert_eq!(BackendKind::Select.build().name(), "select");
        assert_eq!(BackendKind::Poll.build().name(), "poll");
    }

    #[test]
    fn test_backend_limits() {
        let select = BackendKind::Select.build();
        assert_eq!(select.handle_limit(), Some(libc::FD_SETSIZE as Handle));

        let poll = BackendKind::Poll.build();
        assert_eq!(poll.handle_limit(), None);
    }

    #[test]
    fn test_backend_description() {
        assert!(BackendKind::Select.description().contains("select"));
        assert!(BackendKind::Poll.description().contains("poll"));
    }
}
