//! `poll(2)` backend.
//!
//! Same observable behaviour as the select backend without the
//! `FD_SETSIZE` ceiling. Timeouts are rounded up to whole milliseconds.

use super::ReadinessBackend;
use crate::error::SelectorError;
use crate::handle::Handle;
use crate::set::HandleSet;
use crate::timeout::WaitTimeout;
use nix::poll::{poll, PollFd, PollFlags};

/// Events `select(2)` would report as readable: data, hang-up or error.
fn readable_events() -> PollFlags {
    PollFlags::POLLIN | PollFlags::POLLHUP | PollFlags::POLLERR
}

/// Readiness polling through `poll(2)`.
#[derive(Debug, Default)]
pub struct PollBackend {
    /// Reused between waits.
    poll_fds: Vec<PollFd>,
}

impl PollBackend {
    /// Creates a poll backend.
    pub fn new() -> Self {
        Self::default()
    }
}

impl ReadinessBackend for PollBackend {
    fn name(&self) -> &'static str {
        "poll"
    }

    fn handle_limit(&self) -> Option<Handle> {
        None
    }

    fn wait_readable(
        &mut self,
        watched: &HandleSet,
        timeout: WaitTimeout,
        ready: &mut Vec<Handle>,
    ) -> Result<(), SelectorError> {
        ready.clear();

        self.poll_fds.clear();
        self.poll_fds
            .extend(watched.iter().map(|handle| PollFd::new(handle, PollFlags::POLLIN)));

        poll(&mut self.poll_fds, timeout.to_poll_millis())?;

        // poll_fds was built from watched.iter(), so the zip keeps ascending order.
        let readable = readable_events();
        ready.extend(
            watched
                .iter()
                .zip(self.poll_fds.iter())
                .filter(|(_, poll_fd)| {
                    poll_fd
                        .revents()
                        .map_or(false, |revents| revents.intersects(readable))
                })
                .map(|(handle, _)| handle),
        );
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
    fn test_poll_reports_readable_handles_in_order() {
        let (mut writer_a, reader_a) = UnixStream::pair().unwrap();
        let (mut writer_b, reader_b) = UnixStream::pair().unwrap();
        let (_idle_writer, idle_reader) = UnixStream::pair().unwrap();

        let mut watched = HandleSet::new();
        watched.insert(reader_b.as_raw_fd());
        watched.insert(idle_reader.as_raw_fd());
        watched.insert(reader_a.as_raw_fd());

        writer_a.write_all(b"a").unwrap();
        writer_b.write_all(b"b").unwrap();

        let mut backend = PollBackend::new();
        let mut ready = Vec::new();
        backend
            .wait_readable(&watched, WaitTimeout::from(Duration::from_secs(1)), &mut ready)
            .unwrap();

        let mut expected = vec![reader_a.as_raw_fd(), reader_b.as_raw_fd()];
        expected.sort_unstable();
        assert_eq!(ready, expected);
    }

    #[test]
    fn test_poll_reports_hang_up_as_readable() {
        let (writer, reader) = UnixStream::pair().unwrap();
        drop(writer);

        let mut watched = HandleSet::new();
        watched.insert(reader.as_raw_fd());

        let mut backend = PollBackend::new();
        let mut ready = Vec::new();
        backend
            .wait_readable(&watched, WaitTimeout::IMMEDIATE, &mut ready)
            .unwrap();

        assert_eq!(ready, vec![reader.as_raw_fd()]);
    }

    #[test]
    fn test_poll_times_out_with_nothing_ready() {
        let (_writer, reader) = UnixStream::pair().unwrap();

        let mut watched = HandleSet::new();
        watched.insert(reader.as_raw_fd());

        let mut backend = PollBackend::new();
        let mut ready = Vec::new();
        let start = Instant::now();
        backend
            .wait_readable(&watched, WaitTimeout::from(Duration::from_millis(100)), &mut ready)
            .unwrap();

        assert!(ready.is_empty());
        assert!(start.elapsed() >= Duration::from_millis(100));
    }
}
