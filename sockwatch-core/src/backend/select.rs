//! `select(2)` backend.
//!
//! The watched set is copied into a fresh `fd_set` on every wait, since the
//! kernel overwrites the set in place with the readable subset.

use super::ReadinessBackend;
use crate::error::SelectorError;
use crate::handle::Handle;
use crate::set::HandleSet;
use crate::timeout::WaitTimeout;
use nix::sys::select::{select, FdSet};

/// Readiness polling through `select(2)`.
#[derive(Debug, Default)]
pub struct SelectBackend {
    _private: (),
}

impl SelectBackend {
    /// Creates a select backend.
    pub fn new() -> Self {
        Self::default()
    }
}

impl ReadinessBackend for SelectBackend {
    fn name(&self) -> &'static str {
        "select"
    }

    fn handle_limit(&self) -> Option<Handle> {
        Some(libc::FD_SETSIZE as Handle)
    }

    fn wait_readable(
        &mut self,
        watched: &HandleSet,
        timeout: WaitTimeout,
        ready: &mut Vec<Handle>,
    ) -> Result<(), SelectorError> {
        ready.clear();

        // FdSet::insert panics past FD_SETSIZE; refuse before building the set.
        let limit = libc::FD_SETSIZE as Handle;
        if let Some(handle) = watched.last().filter(|&handle| handle >= limit) {
            return Err(SelectorError::HandleOutOfRange { handle, limit });
        }

        let mut read_fds = FdSet::new();
        for handle in watched.iter() {
            read_fds.insert(handle);
        }

        let mut timeval = timeout.to_timeval();
        // A removed handle may have pushed the high-water mark past the set.
        let nfds = (watched.high_water_mark() + 1).min(limit);

        select(
            Some(nfds),
            Some(&mut read_fds),
            None::<&mut FdSet>,
            None::<&mut FdSet>,
            timeval.as_mut(),
        )?;

        // O(watched) instead of a scan over 0..=high_water_mark.
        ready.extend(watched.iter().filter(|&handle| read_fds.contains(handle)));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::os::unix::io::AsRawFd;
    use std::os::unix::net::UnixStream;
    use std::time::{Duration, Instant};

    #[test]
    fn test_select_reports_readable_handle() {
        let (mut writer, reader) = UnixStream::pair().unwrap();
        let (_idle_writer, idle_reader) = UnixStream::pair().unwrap();

        let mut watched = HandleSet::new();
        watched.insert(reader.as_raw_fd());
        watched.insert(idle_reader.as_raw_fd());

        writer.write_all(b"ping").unwrap();

        let mut backend = SelectBackend::new();
        let mut ready = Vec::new();
        backend
            .wait_readable(&watched, WaitTimeout::from(Duration::from_secs(1)), &mut ready)
            .unwrap();

        assert_eq!(ready, vec![reader.as_raw_fd()]);
    }

    #[test]
    fn test_select_rejects_handles_beyond_fd_setsize() {
        let limit = libc::FD_SETSIZE as Handle;
        let mut watched = HandleSet::new();
        watched.insert(limit + 5);

        let mut backend = SelectBackend::new();
        let mut ready = Vec::new();
        let result = backend.wait_readable(&watched, WaitTimeout::IMMEDIATE, &mut ready);

        assert!(matches!(
            result,
            Err(SelectorError::HandleOutOfRange { handle, limit: l }) if handle == limit + 5 && l == limit
        ));
        assert!(ready.is_empty());
    }

    #[test]
    fn test_select_ignores_negative_handles() {
        let (_writer, reader) = UnixStream::pair().unwrap();
        let mut watched = HandleSet::new();
        watched.insert(crate::handle::INVALID_HANDLE);
        watched.insert(reader.as_raw_fd());

        let mut backend = SelectBackend::new();
        let mut ready = Vec::new();
        backend
            .wait_readable(&watched, WaitTimeout::IMMEDIATE, &mut ready)
            .unwrap();
        assert!(ready.is_empty());
    }

    #[test]
    fn test_select_bound_survives_removed_large_handle() {
        let limit = libc::FD_SETSIZE as Handle;
        let (mut writer, reader) = UnixStream::pair().unwrap();

        let mut watched = HandleSet::new();
        watched.insert(limit + 100);
        watched.remove(limit + 100);
        watched.insert(reader.as_raw_fd());
        assert!(watched.high_water_mark() >= limit);

        writer.write_all(b"x").unwrap();

        let mut backend = SelectBackend::new();
        let mut ready = Vec::new();
        backend
            .wait_readable(&watched, WaitTimeout::from(Duration::from_secs(1)), &mut ready)
            .unwrap();
        assert_eq!(ready, vec![reader.as_raw_fd()]);
    }

    #[test]
    fn test_select_zero_timeout_returns_immediately() {
        let (_writer, reader) = UnixStream::pair().unwrap();

        let mut watched = HandleSet::new();
        watched.insert(reader.as_raw_fd());

        let mut backend = SelectBackend::new();
        let mut ready = vec![42];
        let start = Instant::now();
        backend
            .wait_readable(&watched, WaitTimeout::IMMEDIATE, &mut ready)
            .unwrap();

        assert!(ready.is_empty());
        assert!(start.elapsed() < Duration::from_millis(200));
    }
}
