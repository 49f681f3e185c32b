// Copyright 2026 the Glint Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Monotonic timestamps for trace events.
//!
//! [`HostTime`] is a point on the tracer's monotonic clock in nanoseconds.
//! [`Duration`] is the distance between two such points. Trace JSON wants
//! microseconds, so both expose an `f64` microsecond view.

use core::fmt;

/// A point in time as nanoseconds on a monotonic clock.
///
/// Zero is reserved by recorders to mean "not stamped yet".
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct HostTime(pub u64);

impl HostTime {
    /// The unset timestamp.
    pub const UNSET: Self = Self(0);

    /// Returns the raw nanosecond value.
    #[inline]
    #[must_use]
    pub const fn nanos(self) -> u64 {
        self.0
    }

    /// Whether this timestamp has been stamped.
    #[inline]
    #[must_use]
    pub const fn is_set(self) -> bool {
        self.0 != 0
    }

    /// Returns the duration between `self` and an earlier time, or zero if
    /// `earlier` is after `self`.
    #[inline]
    #[must_use]
    pub const fn saturating_duration_since(self, earlier: Self) -> Duration {
        Duration(self.0.saturating_sub(earlier.0))
    }

    /// Microseconds elapsed since `origin`, clamped at zero.
    #[inline]
    #[must_use]
    pub fn micros_since(self, origin: Self) -> f64 {
        self.saturating_duration_since(origin).as_micros_f64()
    }
}

impl fmt::Debug for HostTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HostTime({}ns)", self.0)
    }
}

/// A span of time in nanoseconds.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Duration(pub u64);

impl Duration {
    /// Returns the raw nanosecond value.
    #[inline]
    #[must_use]
    pub const fn nanos(self) -> u64 {
        self.0
    }

    /// The duration in fractional microseconds.
    #[inline]
    #[must_use]
    pub fn as_micros_f64(self) -> f64 {
        self.0 as f64 / 1_000.0
    }
}

impl fmt::Debug for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Duration({}ns)", self.0)
    }
}
