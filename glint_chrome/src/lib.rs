// Copyright 2026 the Glint Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chrome Trace Event Format recording for glint instrumentation.
//!
//! [`ChromeTracingTracer`] is an [`EventTracer`](glint_core::trace::EventTracer)
//! that keeps events as compact binary records in fixed-size blocks while the
//! program runs, then writes a JSON array loadable by `chrome://tracing` or
//! Perfetto when flushed.
//!
//! - [`record`]: the binary record layout and [`record::RecordView`] decoder.
//! - [`block`]: block allocation, event handles, and [`block::Recording`].
//! - [`chrome`]: the JSON serializer.
//! - [`tracer`]: the tracer itself and [`ChromeTracingConfig`].
//! - [`error`]: output failures.

pub mod block;
pub mod chrome;
pub mod error;
pub mod record;
pub mod tracer;

mod category;
mod clock;
mod strings;

pub use error::TraceOutputError;
pub use tracer::{ChromeTracingConfig, ChromeTracingTracer};
