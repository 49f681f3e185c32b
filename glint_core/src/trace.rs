// Copyright 2026 the Glint Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The event-tracer capability and its call-site wrapper.
//!
//! [`EventTracer`] is what a recording backend implements: "start an event,
//! get a handle back" plus "close an event given its handle". Backends are
//! shared between threads, so every method takes `&self`.
//!
//! [`Tracer`] wraps an optional `&dyn EventTracer`. When the `trace` feature
//! is **off**, every `Tracer` method compiles to nothing (zero overhead). When
//! **on**, each method performs a single `Option` branch and a category check
//! before dispatching.
//!
//! [`ScopedEvent`] records a complete (`X`) event and closes it when dropped.

use core::fmt;

use crate::arg::Arg;
use crate::phase::{EventFlags, InstantScope, Phase};

// ---------------------------------------------------------------------------
// Handles and categories
// ---------------------------------------------------------------------------

/// Opaque token naming a recorded event, used to close it later.
///
/// The bit layout belongs to the backend that issued it.
/// [`EventHandle::NONE`] never names an event.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct EventHandle(pub u64);

impl EventHandle {
    /// The handle returned when nothing was recorded.
    pub const NONE: Self = Self(0);

    /// Whether this is [`EventHandle::NONE`].
    #[inline]
    #[must_use]
    pub const fn is_none(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Debug for EventHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EventHandle({:#x})", self.0)
    }
}

/// A category group as resolved by a tracer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Category {
    index: u32,
    enabled: bool,
}

impl Category {
    /// A category that records nothing.
    pub const DISABLED: Self = Self {
        index: u32::MAX,
        enabled: false,
    };

    /// Creates a category descriptor for the tracer-assigned `index`.
    #[inline]
    #[must_use]
    pub const fn new(index: u32, enabled: bool) -> Self {
        Self { index, enabled }
    }

    /// Tracer-assigned index of the category group.
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.index
    }

    /// Whether events in this category are recorded.
    #[inline]
    #[must_use]
    pub const fn is_enabled(self) -> bool {
        self.enabled
    }
}

// ---------------------------------------------------------------------------
// EventTracer trait
// ---------------------------------------------------------------------------

/// A recording backend for trace events.
///
/// Recording must never fail or block the caller for long; implementations
/// swallow their own errors.
pub trait EventTracer: Send + Sync {
    /// Resolves a category group name, registering it on first use.
    fn category(&self, group: &'static str) -> Category;

    /// Returns the name a category was registered under.
    fn category_name(&self, category: Category) -> &'static str;

    /// Records one event and returns a handle to it.
    ///
    /// `name` and argument names are kept by reference. Values of
    /// [`ArgValue::CopyStr`](crate::arg::ArgValue::CopyStr) arguments are
    /// copied before this returns.
    fn add_trace_event(
        &self,
        phase: Phase,
        category: Category,
        name: &'static str,
        id: u64,
        args: &[Arg<'_>],
        flags: EventFlags,
    ) -> EventHandle;

    /// Stamps the end time of a previously recorded event.
    fn update_trace_event_duration(&self, handle: EventHandle);

    /// Marks the start of a named section of the trace.
    fn new_tracing_section(&self, name: &str) {
        _ = name;
    }
}

// ---------------------------------------------------------------------------
// NoopTracer
// ---------------------------------------------------------------------------

/// An [`EventTracer`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopTracer;

impl EventTracer for NoopTracer {
    fn category(&self, group: &'static str) -> Category {
        _ = group;
        Category::DISABLED
    }

    fn category_name(&self, category: Category) -> &'static str {
        _ = category;
        ""
    }

    fn add_trace_event(
        &self,
        phase: Phase,
        category: Category,
        name: &'static str,
        id: u64,
        args: &[Arg<'_>],
        flags: EventFlags,
    ) -> EventHandle {
        _ = (phase, category, name, id, args, flags);
        EventHandle::NONE
    }

    fn update_trace_event_duration(&self, handle: EventHandle) {
        _ = handle;
    }
}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Thin wrapper around an optional [`EventTracer`].
///
/// When the `trace` feature is **off**, every method compiles to nothing and
/// returns [`EventHandle::NONE`].
#[derive(Clone, Copy)]
pub struct Tracer<'a> {
    #[cfg(feature = "trace")]
    inner: Option<&'a dyn EventTracer>,
    #[cfg(not(feature = "trace"))]
    _marker: core::marker::PhantomData<&'a dyn EventTracer>,
}

impl fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

impl<'a> Tracer<'a> {
    /// Creates a tracer that dispatches to the given backend.
    #[inline]
    #[must_use]
    pub fn new(tracer: &'a dyn EventTracer) -> Self {
        #[cfg(feature = "trace")]
        {
            Self {
                inner: Some(tracer),
            }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = tracer;
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        #[cfg(feature = "trace")]
        {
            Self { inner: None }
        }
        #[cfg(not(feature = "trace"))]
        {
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Whether events in `category` would be recorded.
    #[inline]
    #[must_use]
    pub fn is_enabled(&self, category: &'static str) -> bool {
        #[cfg(feature = "trace")]
        if let Some(t) = self.inner {
            return t.category(category).is_enabled();
        }
        _ = category;
        false
    }

    /// Records an event with an explicit phase.
    #[inline]
    pub fn event(
        &self,
        phase: Phase,
        category: &'static str,
        name: &'static str,
        id: u64,
        args: &[Arg<'_>],
        flags: EventFlags,
    ) -> EventHandle {
        #[cfg(feature = "trace")]
        if let Some(t) = self.inner {
            let category = t.category(category);
            if category.is_enabled() {
                return t.add_trace_event(phase, category, name, id, args, flags);
            }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = (phase, category, name, id, args, flags);
        }
        EventHandle::NONE
    }

    /// Opens a duration on the current thread.
    #[inline]
    pub fn begin(&self, category: &'static str, name: &'static str, args: &[Arg<'_>]) {
        self.event(Phase::BEGIN, category, name, 0, args, EventFlags::NONE);
    }

    /// Closes the innermost duration named `name` on the current thread.
    #[inline]
    pub fn end(&self, category: &'static str, name: &'static str) {
        self.event(Phase::END, category, name, 0, &[], EventFlags::NONE);
    }

    /// Records a complete event; close it with [`close`](Self::close).
    #[inline]
    pub fn complete(
        &self,
        category: &'static str,
        name: &'static str,
        args: &[Arg<'_>],
    ) -> EventHandle {
        self.event(Phase::COMPLETE, category, name, 0, args, EventFlags::NONE)
    }

    /// Records a complete event that is closed when the guard drops.
    #[inline]
    #[must_use = "the event closes as soon as the guard is dropped"]
    pub fn scoped(
        &self,
        category: &'static str,
        name: &'static str,
        args: &[Arg<'_>],
    ) -> ScopedEvent<'a> {
        ScopedEvent {
            tracer: *self,
            handle: self.complete(category, name, args),
        }
    }

    /// Records an instant event.
    #[inline]
    pub fn instant(
        &self,
        category: &'static str,
        name: &'static str,
        scope: InstantScope,
        args: &[Arg<'_>],
    ) {
        let flags = EventFlags::NONE.with_scope(scope);
        self.event(Phase::INSTANT, category, name, 0, args, flags);
    }

    /// Records a counter sample; each argument is one series.
    #[inline]
    pub fn counter(&self, category: &'static str, name: &'static str, args: &[Arg<'_>]) {
        self.event(Phase::COUNTER, category, name, 0, args, EventFlags::NONE);
    }

    /// Starts an asynchronous operation identified by `id`.
    #[inline]
    pub fn async_begin(
        &self,
        category: &'static str,
        name: &'static str,
        id: u64,
        args: &[Arg<'_>],
    ) {
        self.event(Phase::ASYNC_BEGIN, category, name, id, args, EventFlags::HAS_ID);
    }

    /// Ends an asynchronous operation identified by `id`.
    #[inline]
    pub fn async_end(&self, category: &'static str, name: &'static str, id: u64) {
        self.event(Phase::ASYNC_END, category, name, id, &[], EventFlags::HAS_ID);
    }

    /// Records the creation of a tracked object.
    #[inline]
    pub fn object_created(&self, category: &'static str, name: &'static str, id: u64) {
        self.event(Phase::CREATE_OBJECT, category, name, id, &[], EventFlags::HAS_ID);
    }

    /// Records a snapshot of a tracked object.
    ///
    /// `name` may differ from the name used at creation; the serializer then
    /// annotates the snapshot with the creation-time base type.
    #[inline]
    pub fn object_snapshot(
        &self,
        category: &'static str,
        name: &'static str,
        id: u64,
        snapshot: &[Arg<'_>],
    ) {
        self.event(
            Phase::SNAPSHOT_OBJECT,
            category,
            name,
            id,
            snapshot,
            EventFlags::HAS_ID,
        );
    }

    /// Records the destruction of a tracked object.
    #[inline]
    pub fn object_deleted(&self, category: &'static str, name: &'static str, id: u64) {
        self.event(Phase::DELETE_OBJECT, category, name, id, &[], EventFlags::HAS_ID);
    }

    /// Stamps the end time of an event returned by
    /// [`complete`](Self::complete).
    #[inline]
    pub fn close(&self, handle: EventHandle) {
        #[cfg(feature = "trace")]
        if let Some(t) = self.inner
            && !handle.is_none()
        {
            t.update_trace_event_duration(handle);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = handle;
        }
    }

    /// Marks the start of a named section of the trace.
    #[inline]
    pub fn section(&self, name: &str) {
        #[cfg(feature = "trace")]
        if let Some(t) = self.inner {
            t.new_tracing_section(name);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = name;
        }
    }
}

// ---------------------------------------------------------------------------
// ScopedEvent
// ---------------------------------------------------------------------------

/// Guard returned by [`Tracer::scoped`]; closes its event on drop.
#[derive(Debug)]
pub struct ScopedEvent<'a> {
    tracer: Tracer<'a>,
    handle: EventHandle,
}

impl ScopedEvent<'_> {
    /// The handle of the underlying complete event.
    #[must_use]
    pub fn handle(&self) -> EventHandle {
        self.handle
    }
}

impl Drop for ScopedEvent<'_> {
    fn drop(&mut self) {
        self.tracer.close(self.handle);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
