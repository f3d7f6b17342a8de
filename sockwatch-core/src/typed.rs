//! A selector over socket objects.
//!
//! [`SocketSelector`] stores the sockets it watches and hands back
//! references to them, so callers do not have to map raw handles back to
//! their connections. Because the selector holds each socket until it is
//! removed, a watched handle cannot be closed behind the selector's back.

use crate::error::SelectorError;
use crate::handle::Handle;
use crate::selector::{ReadinessSelector, SelectorConfig};
use crate::timeout::WaitTimeout;
use std::collections::HashMap;
use std::os::unix::io::{AsFd, AsRawFd};
use std::time::Duration;

/// Watches socket objects for read readiness.
///
/// `S` is anything that borrows a descriptor: `TcpStream`, `TcpListener`,
/// `UdpSocket`, or shared forms such as `Arc<TcpStream>` and `&TcpStream`.
#[derive(Debug)]
pub struct SocketSelector<S: AsFd> {
    selector: ReadinessSelector,
    sockets: HashMap<Handle, S>,
}

impl<S: AsFd> SocketSelector<S> {
    /// Creates an empty selector with the default configuration.
    pub fn new() -> Self {
        Self::with_config(SelectorConfig::default())
    }

    /// Creates an empty selector with the given configuration.
    pub fn with_config(config: SelectorConfig) -> Self {
        Self {
            selector: ReadinessSelector::with_config(config),
            sockets: HashMap::new(),
        }
    }

    /// Starts watching `socket` and returns its handle.
    ///
    /// A socket already stored under the same handle is replaced and handed
    /// back alongside the handle.
    pub fn add(&mut self, socket: S) -> Result<(Handle, Option<S>), SelectorError> {
        let handle = socket.as_fd().as_raw_fd();
        self.selector.try_add(handle)?;
        let previous = self.sockets.insert(handle, socket);
        Ok((handle, previous))
    }

    /// Stops watching the socket with `handle` and gives it back.
    pub fn remove(&mut self, handle: Handle) -> Option<S> {
        self.selector.remove(handle);
        self.sockets.remove(&handle)
    }

    /// Stops watching every socket and gives them all back, in ascending
    /// handle order.
    pub fn clear(&mut self) -> Vec<S> {
        self.selector.clear();
        let mut sockets: Vec<_> = self.sockets.drain().collect();
        sockets.sort_unstable_by_key(|(handle, _)| *handle);
        sockets.into_iter().map(|(_, socket)| socket).collect()
    }

    /// Waits up to `timeout_seconds`; see [`ReadinessSelector::wait`].
    pub fn wait(&mut self, timeout_seconds: f32) -> usize {
        self.selector.wait(timeout_seconds)
    }

    /// Waits up to `timeout`.
    pub fn wait_for(&mut self, timeout: Duration) -> usize {
        self.selector.wait_for(timeout)
    }

    /// Waits according to `timeout`, surfacing OS errors.
    pub fn try_wait(&mut self, timeout: WaitTimeout) -> Result<usize, SelectorError> {
        self.selector.try_wait(timeout)
    }

    /// Returns the `index`-th socket found ready by the last wait.
    pub fn get_ready(&self, index: usize) -> Option<&S> {
        self.sockets.get(&self.selector.get_ready_socket(index))
    }

    /// Mutable form of [`get_ready`](Self::get_ready).
    pub fn get_ready_mut(&mut self, index: usize) -> Option<&mut S> {
        let handle = self.selector.get_ready_socket(index);
        self.sockets.get_mut(&handle)
    }

    /// Iterates over the sockets found ready by the last wait, ascending by
    /// handle.
    pub fn ready(&self) -> impl Iterator<Item = &S> + '_ {
        self.selector
            .ready_sockets()
            .filter_map(move |handle| self.sockets.get(&handle))
    }

    /// Returns the watched socket with `handle`.
    pub fn get(&self, handle: Handle) -> Option<&S> {
        self.sockets.get(&handle)
    }

    /// Number of watched sockets.
    pub fn len(&self) -> usize {
        self.sockets.len()
    }

    /// Returns `true` if no socket is watched.
    pub fn is_empty(&self) -> bool {
        self.sockets.is_empty()
    }

    /// The underlying handle selector.
    pub fn selector(&self) -> &ReadinessSelector {
        &self.selector
    }
}

impl<S: AsFd> Default for SocketSelector<S> {
    fn default() -> Self {
        Self::new()
    }
}
