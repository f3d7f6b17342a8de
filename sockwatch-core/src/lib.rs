//! Sockwatch Core - Socket readiness multiplexing
//!
//! This library tracks a set of open socket handles and reports which of
//! them are ready to read within a bounded time. It never performs I/O on
//! the sockets itself.

/// Error types
pub mod error;

/// Raw socket handles and the invalid-handle sentinel
pub mod handle;

/// Wait timeout encoding
pub mod timeout;

/// Watched and ready handle sets
pub mod set;

/// OS readiness-polling backends (select, poll)
pub mod backend;

/// The readiness selector
pub mod selector;

/// Selector over socket objects
pub mod typed;

pub use backend::{BackendKind, ReadinessBackend};
pub use error::SelectorError;
pub use handle::{is_valid_handle, Handle, INVALID_HANDLE};
pub use selector::{ReadinessSelector, SelectorConfig};
pub use set::{HandleSet, ReadyList};
pub use timeout::WaitTimeout;
pub use typed::SocketSelector;
