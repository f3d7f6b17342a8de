//! Wait timeouts.
//!
//! Callers express timeouts as floating-point seconds. The OS readiness
//! calls want either a `timeval` (seconds + microseconds) or a millisecond
//! count, and both reserve an "absent" value meaning block forever. A zero
//! timeout must stay a single non-blocking check, so it is kept apart from
//! [`WaitTimeout::Infinite`].

use crate::error::SelectorError;
use nix::sys::time::TimeVal;
use std::time::Duration;

const MICROS_PER_SEC: u64 = 1_000_000;

/// How long a wait may block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitTimeout {
    /// Return after at most this long. Zero means poll once and return.
    Bounded {
        /// Whole seconds.
        seconds: u64,
        /// Microseconds, always below one million.
        microseconds: u32,
    },

    /// Block until at least one handle is ready.
    Infinite,
}

impl WaitTimeout {
    /// A zero timeout: check readiness once without blocking.
    pub const IMMEDIATE: Self = Self::Bounded {
        seconds: 0,
        microseconds: 0,
    };

    /// Encodes `seconds` at microsecond resolution.
    ///
    /// Fails for NaN and negative values. `f32::INFINITY` maps to
    /// [`WaitTimeout::Infinite`].
    pub fn from_secs_f32(seconds: f32) -> Result<Self, SelectorError> {
        if seconds.is_nan() || seconds < 0.0 {
            return Err(SelectorError::InvalidTimeout(seconds));
        }
        if seconds.is_infinite() {
            return Ok(Self::Infinite);
        }

        // Rounding the total keeps 0.9999999 from encoding as 0s + 1_000_000us.
        let total_micros = (f64::from(seconds) * MICROS_PER_SEC as f64).round() as u64;
        Ok(Self::from_micros(total_micros))
    }

    /// Like [`from_secs_f32`](Self::from_secs_f32), but clamps invalid input
    /// to [`WaitTimeout::IMMEDIATE`].
    pub fn saturating_from_secs_f32(seconds: f32) -> Self {
        Self::from_secs_f32(seconds).unwrap_or(Self::IMMEDIATE)
    }

    fn from_micros(total_micros: u64) -> Self {
        Self::Bounded {
            seconds: total_micros / MICROS_PER_SEC,
            microseconds: (total_micros % MICROS_PER_SEC) as u32,
        }
    }

    /// Returns `true` for a zero timeout.
    pub fn is_immediate(&self) -> bool {
        *self == Self::IMMEDIATE
    }

    /// The bounded duration, or `None` when the wait may block forever.
    pub fn as_duration(&self) -> Option<Duration> {
        match *self {
            Self::Bounded {
                seconds,
                microseconds,
            } => Some(Duration::new(seconds, microseconds * 1_000)),
            Self::Infinite => None,
        }
    }

    /// Encodes the timeout for `select(2)`. `None` is the null pointer.
    pub fn to_timeval(&self) -> Option<TimeVal> {
        match *self {
            Self::Bounded {
                seconds,
                microseconds,
            } => Some(TimeVal::new(
                seconds.min(libc::time_t::MAX as u64) as libc::time_t,
                microseconds as libc::suseconds_t,
            )),
            Self::Infinite => None,
        }
    }

    /// Encodes the timeout for `poll(2)`, in milliseconds.
    ///
    /// Partial milliseconds round up so a bounded wait never returns early.
    /// `-1` blocks forever.
    pub fn to_poll_millis(&self) -> libc::c_int {
        match *self {
            Self::Bounded {
                seconds,
                microseconds,
            } => {
                let millis = seconds
                    .saturating_mul(1_000)
                    .saturating_add(u64::from(microseconds).div_ceil(1_000));
                millis.min(libc::c_int::MAX as u64) as libc::c_int
            }
            Self::Infinite => -1,
        }
    }
}

impl From<Duration> for WaitTimeout {
    fn from(duration: Duration) -> Self {
        Self::Bounded {
            seconds: duration.as_secs(),
            microseconds: duration.subsec_micros(),
        }
    }
}

impl Default for WaitTimeout {
    fn default() -> Self {
        Self::IMMEDIATE
    }
}
