// Copyright 2026 the Glint Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Event model and tracer capability for graphics tooling instrumentation.
//!
//! `glint_core` defines what host code (benchmark runners, GM harnesses,
//! renderer CLIs) calls to mark trace events. It is `no_std` compatible and
//! holds no recording state of its own; backends such as `glint_chrome`
//! implement [`EventTracer`](trace::EventTracer).
//!
//! ```text
//!   host code ──► Tracer ──► EventTracer::add_trace_event ──► EventHandle
//!                   │                                            │
//!                   └──── ScopedEvent drop ──► update_trace_event_duration
//! ```
//!
//! **[`phase`]**: Phase vocabulary, instant scopes, and event flags.
//!
//! **[`arg`]**: Typed event arguments, including strings copied into the
//! recording.
//!
//! **[`time`]**: Nanosecond monotonic timestamps and durations.
//!
//! **[`trace`]**: The [`EventTracer`](trace::EventTracer) trait, handles,
//! categories, and the zero-overhead [`Tracer`](trace::Tracer) wrapper.
//!
//! # Crate features
//!
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one
//!   branch per call site).

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

pub mod arg;
pub mod phase;
pub mod time;
pub mod trace;
