//! Raw socket handles.
//!
//! A handle is the OS-level identifier of an open socket. The selector never
//! interprets it beyond ordering and computing a maximum.

use std::os::unix::io::RawFd;

/// An OS-level socket identifier.
pub type Handle = RawFd;

/// Sentinel returned when no handle is available at a requested position.
pub const INVALID_HANDLE: Handle = -1;

/// Returns `true` if `handle` can be stored in a handle set.
///
/// Negative values (including [`INVALID_HANDLE`]) are never valid.
pub fn is_valid_handle(handle: Handle) -> bool {
    handle >= 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinel_is_not_valid() {
        assert!(!is_valid_handle(INVALID_HANDLE));
        assert!(!is_valid_handle(-42));
    }

    #[test]
    fn test_non_negative_handles_are_valid() {
        assert!(is_valid_handle(0));
        assert!(is_valid_handle(3));
        assert!(is_valid_handle(1023));
    }
}
