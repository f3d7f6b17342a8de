//! The readiness selector.
//!
//! A [`ReadinessSelector`] tracks a set of socket handles and answers which
//! of them are readable within a bounded time. Usage follows a
//! wait-then-enumerate loop:
//!
//! ```no_run
//! use sockwatch_core::{ReadinessSelector, INVALID_HANDLE};
//! # let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
//! use std::os::unix::io::AsRawFd;
//!
//! let mut selector = ReadinessSelector::new();
//! selector.add(listener.as_raw_fd());
//!
//! let ready = selector.wait(0.5);
//! for index in 0..ready {
//!     let handle = selector.get_ready_socket(index);
//!     assert_ne!(handle, INVALID_HANDLE);
//!     // read from `handle`
//! }
//! ```
//!
//! The selector does not own the handles it watches. Remove a handle before
//! closing it, otherwise a later wait may observe a reused descriptor.

use crate::backend::{BackendKind, ReadinessBackend};
use crate::error::SelectorError;
use crate::handle::{is_valid_handle, Handle};
use crate::set::{HandleSet, ReadyList};
use crate::timeout::WaitTimeout;
use std::fmt;
use std::time::{Duration, Instant};
use tracing::{debug, trace, warn};

/// Configuration for a readiness selector.
#[derive(Debug, Clone)]
pub struct SelectorConfig {
    /// Readiness primitive to wait on.
    pub backend: BackendKind,

    /// Restart a wait interrupted by a signal with the time remaining,
    /// instead of reporting zero ready handles.
    pub retry_on_interrupt: bool,

    /// Log OS errors swallowed by [`ReadinessSelector::wait`].
    pub log_wait_errors: bool,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::Select,
            retry_on_interrupt: false,
            log_wait_errors: true,
        }
    }
}

/// Watches socket handles for read readiness.
///
/// Not meant to be shared across threads while a wait is in flight; the
/// watched set is read by the OS call without synchronisation.
pub struct ReadinessSelector {
    /// Configuration the selector was built with.
    config: SelectorConfig,

    /// OS readiness primitive.
    backend: Box<dyn ReadinessBackend>,

    /// Handles registered for monitoring.
    watched: HandleSet,

    /// Handles readable as of the last wait.
    ready: ReadyList,

    /// Filled by the backend, then moved into `ready`.
    scratch: Vec<Handle>,
}

impl ReadinessSelector {
    /// Creates an empty selector with the default configuration.
    pub fn new() -> Self {
        Self::with_config(SelectorConfig::default())
    }

    /// Creates an empty selector with the given configuration.
    pub fn with_config(config: SelectorConfig) -> Self {
        let backend = config.backend.build();
        debug!(
            "Readiness selector using {} backend ({})",
            backend.name(),
            config.backend.description()
        );

        Self {
            config,
            backend,
            watched: HandleSet::new(),
            ready: ReadyList::new(),
            scratch: Vec::new(),
        }
    }

    /// Returns the selector's configuration.
    pub fn config(&self) -> &SelectorConfig {
        &self.config
    }

    /// Name of the readiness backend in use.
    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// Starts watching `handle`. Adding a watched handle again is a no-op.
    ///
    /// Handles the backend cannot represent are logged and ignored; use
    /// [`try_add`](Self::try_add) to observe the rejection.
    pub fn add(&mut self, handle: Handle) {
        if let Err(err) = self.try_add(handle) {
            warn!("Ignoring socket handle: {}", err);
        }
    }

    /// Starts watching `handle`, rejecting negative handles and handles
    /// beyond the backend's limit.
    pub fn try_add(&mut self, handle: Handle) -> Result<(), SelectorError> {
        if !is_valid_handle(handle) {
            return Err(SelectorError::InvalidHandle(handle));
        }
        if let Some(limit) = self.backend.handle_limit() {
            if handle >= limit {
                return Err(SelectorError::HandleOutOfRange { handle, limit });
            }
        }

        if self.watched.insert(handle) {
            trace!("Watching socket handle {}", handle);
        }
        Ok(())
    }

    /// Stops watching `handle`. Unknown handles are ignored.
    ///
    /// The high-water mark is not lowered.
    pub fn remove(&mut self, handle: Handle) {
        if self.watched.remove(handle) {
            trace!("No longer watching socket handle {}", handle);
        }
    }

    /// Forgets every watched and ready handle and resets the high-water mark.
    pub fn clear(&mut self) {
        self.watched.clear();
        self.ready.clear();
        debug!("Readiness selector cleared");
    }

    /// Waits up to `timeout_seconds` for a watched handle to become readable.
    ///
    /// Returns the number of ready handles. Zero means the timeout elapsed or
    /// the OS call failed; the two are not distinguished here, see
    /// [`try_wait`](Self::try_wait). A timeout of `0.0` polls once without
    /// blocking. Negative or NaN timeouts are treated as `0.0`.
    pub fn wait(&mut self, timeout_seconds: f32) -> usize {
        self.wait_timeout(WaitTimeout::saturating_from_secs_f32(timeout_seconds))
    }

    /// Waits up to `timeout` for a watched handle to become readable.
    pub fn wait_for(&mut self, timeout: Duration) -> usize {
        self.wait_timeout(WaitTimeout::from(timeout))
    }

    /// Blocks until a watched handle becomes readable.
    ///
    /// With nothing watched this never returns, unless a signal interrupts
    /// the wait.
    pub fn wait_indefinitely(&mut self) -> usize {
        self.wait_timeout(WaitTimeout::Infinite)
    }

    /// Waits according to `timeout`, reporting OS errors as zero ready.
    pub fn wait_timeout(&mut self, timeout: WaitTimeout) -> usize {
        match self.try_wait(timeout) {
            Ok(count) => count,
            Err(err) => {
                if self.config.log_wait_errors {
                    warn!("Readiness wait failed, reporting no ready sockets: {}", err);
                }
                0
            }
        }
    }

    /// Waits according to `timeout`, surfacing OS errors.
    ///
    /// On error the ready set is left empty.
    pub fn try_wait(&mut self, timeout: WaitTimeout) -> Result<usize, SelectorError> {
        let deadline = timeout
            .as_duration()
            .and_then(|duration| Instant::now().checked_add(duration));
        let mut remaining = timeout;

        loop {
            let result =
                self.backend
                    .wait_readable(&self.watched, remaining, &mut self.scratch);

            match result {
                Ok(()) => {
                    self.ready.replace(self.scratch.drain(..));
                    let count = self.ready.len();
                    trace!(
                        "Readiness wait over {} handles returned {} ready",
                        self.watched.len(),
                        count
                    );
                    return Ok(count);
                }
                Err(err) if err.is_interrupted() && self.config.retry_on_interrupt => {
                    remaining = match deadline {
                        Some(deadline) => {
                            WaitTimeout::from(deadline.saturating_duration_since(Instant::now()))
                        }
                        None => timeout,
                    };
                    debug!("Readiness wait interrupted, retrying with {:?}", remaining);
                }
                Err(err) => {
                    self.ready.clear();
                    return Err(err);
                }
            }
        }
    }

    /// Returns the `index`-th handle found ready by the last wait, in
    /// ascending handle order.
    ///
    /// Out-of-range indices return [`INVALID_HANDLE`](crate::INVALID_HANDLE).
    /// Bound the loop with the count returned by the wait.
    pub fn get_ready_socket(&self, index: usize) -> Handle {
        self.ready.get(index)
    }

    /// Iterates over the handles found ready by the last wait.
    pub fn ready_sockets(&self) -> impl Iterator<Item = Handle> + '_ {
        self.ready.iter()
    }

    /// Number of handles found ready by the last wait.
    pub fn ready_count(&self) -> usize {
        self.ready.len()
    }

    /// Returns `true` if `handle` was ready at the last wait.
    pub fn is_ready(&self, handle: Handle) -> bool {
        self.ready.contains(handle)
    }

    /// Returns `true` if `handle` is being watched.
    pub fn contains(&self, handle: Handle) -> bool {
        self.watched.contains(handle)
    }

    /// Number of watched handles.
    pub fn len(&self) -> usize {
        self.watched.len()
    }

    /// Returns `true` if no handle is watched.
    pub fn is_empty(&self) -> bool {
        self.watched.is_empty()
    }

    /// Largest handle added since the last clear.
    pub fn high_water_mark(&self) -> Handle {
        self.watched.high_water_mark()
    }

    /// Iterates over the watched handles in ascending order.
    pub fn watched_sockets(&self) -> impl Iterator<Item = Handle> + '_ {
        self.watched.iter()
    }
}

impl Default for ReadinessSelector {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ReadinessSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReadinessSelector")
            .field("backend", &self.backend.name())
            .field("watched", &self.watched)
            .field("ready", &self.ready)
            .finish()
    }
}
