// Copyright 2026 the Glint Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Trace event phases and per-event flags.
//!
//! A [`Phase`] is the single-character tag Chrome Trace Event Format uses to
//! classify an event. The tag is stored verbatim, so phases outside the
//! vocabulary below still round-trip through a recording.

use core::fmt;

/// Single-character classification of a trace event.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Phase(pub u8);

impl Phase {
    /// Start of a duration on the recording thread.
    pub const BEGIN: Self = Self(b'B');
    /// End of a duration on the recording thread.
    pub const END: Self = Self(b'E');
    /// A duration recorded as one event and closed through its handle.
    pub const COMPLETE: Self = Self(b'X');
    /// A point in time with no duration.
    pub const INSTANT: Self = Self(b'I');
    /// Counter sample; every argument is a series.
    pub const COUNTER: Self = Self(b'C');
    /// Start of an asynchronous operation keyed by id.
    pub const ASYNC_BEGIN: Self = Self(b'S');
    /// Step into a new stage of an asynchronous operation.
    pub const ASYNC_STEP_INTO: Self = Self(b'T');
    /// Step past a stage of an asynchronous operation.
    pub const ASYNC_STEP_PAST: Self = Self(b'p');
    /// End of an asynchronous operation keyed by id.
    pub const ASYNC_END: Self = Self(b'F');
    /// Start of a nestable asynchronous operation.
    pub const NESTABLE_ASYNC_BEGIN: Self = Self(b'b');
    /// End of a nestable asynchronous operation.
    pub const NESTABLE_ASYNC_END: Self = Self(b'e');
    /// Instant inside a nestable asynchronous operation.
    pub const NESTABLE_ASYNC_INSTANT: Self = Self(b'n');
    /// Start of a flow arrow.
    pub const FLOW_BEGIN: Self = Self(b's');
    /// Intermediate step of a flow arrow.
    pub const FLOW_STEP: Self = Self(b't');
    /// End of a flow arrow.
    pub const FLOW_END: Self = Self(b'f');
    /// Metadata such as process or thread names.
    pub const METADATA: Self = Self(b'M');
    /// Navigation-style timing mark.
    pub const MARK: Self = Self(b'R');
    /// A tracked object was created.
    pub const CREATE_OBJECT: Self = Self(b'N');
    /// State of a tracked object at a point in time.
    pub const SNAPSHOT_OBJECT: Self = Self(b'O');
    /// A tracked object was destroyed.
    pub const DELETE_OBJECT: Self = Self(b'D');

    /// Returns the phase as a character.
    #[inline]
    #[must_use]
    pub const fn as_char(self) -> char {
        self.0 as char
    }

    /// Whether this is an instant event (`I`, or the legacy lowercase `i`).
    #[inline]
    #[must_use]
    pub const fn is_instant(self) -> bool {
        matches!(self.0, b'I' | b'i')
    }
}

impl fmt::Debug for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Phase({:?})", self.as_char())
    }
}

/// Visibility of an instant event in a trace viewer.
///
/// The default is [`Global`](Self::Global), the scope encoded by zero scope
/// bits, so `EventFlags::NONE.scope() == InstantScope::default()`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum InstantScope {
    /// Spans every process and thread.
    #[default]
    Global,
    /// Spans every thread of the process.
    Process,
    /// Attached to the recording thread only.
    Thread,
}

impl InstantScope {
    /// The single-letter `s` value used in Chrome trace JSON.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Global => "g",
            Self::Process => "p",
            Self::Thread => "t",
        }
    }
}

/// Per-event flag bits stored in the record header.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct EventFlags(pub u8);

impl EventFlags {
    /// No flags.
    pub const NONE: Self = Self(0);
    /// The event carries a meaningful id.
    pub const HAS_ID: Self = Self(1 << 1);
    /// Instant scope: process.
    pub const SCOPE_PROCESS: Self = Self(1 << 3);
    /// Instant scope: thread.
    pub const SCOPE_THREAD: Self = Self(2 << 3);

    const SCOPE_MASK: u8 = 3 << 3;

    /// Returns the flags with the scope bits replaced by `scope`.
    #[must_use]
    pub const fn with_scope(self, scope: InstantScope) -> Self {
        let bits = match scope {
            InstantScope::Global => 0,
            InstantScope::Process => Self::SCOPE_PROCESS.0,
            InstantScope::Thread => Self::SCOPE_THREAD.0,
        };
        Self((self.0 & !Self::SCOPE_MASK) | bits)
    }

    /// Decodes the instant scope bits.
    #[must_use]
    pub const fn scope(self) -> InstantScope {
        match self.0 & Self::SCOPE_MASK {
            0 => InstantScope::Global,
            b if b == Self::SCOPE_PROCESS.0 => InstantScope::Process,
            _ => InstantScope::Thread,
        }
    }

    /// Whether every bit in `other` is set.
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl core::ops::BitOr for EventFlags {
    type Output = Self;

    #[inline]
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl fmt::Debug for EventFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EventFlags({:#04x})", self.0)
    }
}
