// Copyright 2026 the Glint Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The Chrome tracing backend.
//!
//! [`ChromeTracingTracer`] implements [`EventTracer`] by appending packed
//! records to a [`BlockArena`] under a spinlock. Nothing is formatted or
//! written until [`flush`](ChromeTracingTracer::flush), which detaches the
//! recorded blocks and serializes them to the configured file.
//!
//! # Example
//!
//! ```no_run
//! use glint_chrome::ChromeTracingTracer;
//! use glint_core::trace::Tracer;
//!
//! let backend = ChromeTracingTracer::new("out/trace.json");
//! let tracer = Tracer::new(&backend);
//! {
//!     let _frame = tracer.scoped("app", "frame", &[]);
//! }
//! backend.flush();
//! ```

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use glint_core::arg::Arg;
use glint_core::phase::{EventFlags, InstantScope, Phase};
use glint_core::trace::{Category, EventHandle, EventTracer};
use log::{debug, warn};
use spinning_top::Spinlock;

use crate::block::{BlockArena, DEFAULT_BLOCK_SIZE, Recording};
use crate::category::CategoryRegistry;
use crate::chrome;
use crate::clock;
use crate::error::TraceOutputError;
use crate::record::{MAX_ARGS, RecordHeader};

/// Environment variable overriding the output path.
pub const TRACE_FILE_ENV: &str = "GLINT_TRACE_FILE";
/// Environment variable overriding the block size in bytes.
pub const BLOCK_SIZE_ENV: &str = "GLINT_TRACE_BLOCK_SIZE";
/// Output path used when none is configured.
pub const DEFAULT_TRACE_FILE: &str = "trace.json";

/// Category used by [`EventTracer::new_tracing_section`] events.
pub const SECTION_CATEGORY: &str = "section";

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Configuration for a [`ChromeTracingTracer`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChromeTracingConfig {
    /// File the trace is written to on flush.
    pub path: PathBuf,
    /// Capacity of each recording block in bytes. Clamped to
    /// [`MIN_BLOCK_SIZE`](crate::block::MIN_BLOCK_SIZE)..=[`MAX_BLOCK_SIZE`](crate::block::MAX_BLOCK_SIZE)
    /// when the tracer is built.
    pub block_size: usize,
}

impl Default for ChromeTracingConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_TRACE_FILE),
            block_size: DEFAULT_BLOCK_SIZE,
        }
    }
}

impl ChromeTracingConfig {
    /// Default configuration writing to `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::default().with_path(path)
    }

    /// Replaces the output path.
    #[must_use]
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = path.into();
        self
    }

    /// Replaces the block size.
    #[must_use]
    pub fn with_block_size(mut self, block_size: usize) -> Self {
        self.block_size = block_size;
        self
    }

    /// Default configuration with [`TRACE_FILE_ENV`] and [`BLOCK_SIZE_ENV`]
    /// applied when set.
    #[must_use]
    pub fn from_env() -> Self {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(path) = lookup(TRACE_FILE_ENV).filter(|p| !p.is_empty()) {
            self.path = PathBuf::from(path);
        }
        if let Some(raw) = lookup(BLOCK_SIZE_ENV) {
            match raw.trim().parse() {
                Ok(block_size) => self.block_size = block_size,
                Err(err) => warn!("ignoring {BLOCK_SIZE_ENV}={raw:?}: {err}"),
            }
        }
        self
    }
}

// ---------------------------------------------------------------------------
// ChromeTracingTracer
// ---------------------------------------------------------------------------

/// Records trace events in memory and writes them as Chrome Trace Event
/// Format JSON on [`flush`](Self::flush) and on drop.
///
/// Recording takes one short spinlock per call and does no I/O. All threads
/// share one ordered event stream.
pub struct ChromeTracingTracer {
    path: PathBuf,
    arena: Spinlock<BlockArena>,
    categories: CategoryRegistry,
}

impl core::fmt::Debug for ChromeTracingTracer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ChromeTracingTracer")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl ChromeTracingTracer {
    /// Creates a tracer writing to `path` with the default block size.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_config(ChromeTracingConfig::new(path))
    }

    /// Creates a tracer from an explicit configuration.
    #[must_use]
    pub fn with_config(config: ChromeTracingConfig) -> Self {
        let arena = BlockArena::new(config.block_size);
        debug!(
            "chrome tracing to {} with {} byte blocks",
            config.path.display(),
            arena.block_size()
        );
        Self {
            path: config.path,
            arena: Spinlock::new(arena),
            categories: CategoryRegistry::default(),
        }
    }

    /// Output file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Effective block capacity after clamping.
    #[must_use]
    pub fn block_size(&self) -> usize {
        self.arena.lock().block_size()
    }

    /// Number of events recorded since the last flush.
    #[must_use]
    pub fn event_count(&self) -> usize {
        self.arena.lock().event_count()
    }

    /// Copies the events recorded so far, leaving them in place.
    #[must_use]
    pub fn recording(&self) -> Recording {
        let snapshot = self.arena.lock().snapshot();
        Recording::new(snapshot, self.categories.names())
    }

    /// Writes the events recorded so far to `writer` without clearing them.
    ///
    /// # Errors
    ///
    /// Returns any error from `writer`.
    pub fn write_json(&self, writer: &mut dyn Write) -> io::Result<()> {
        chrome::write_trace(&self.recording(), writer)
    }

    /// Writes every recorded event to the output file and clears the
    /// buffers.
    ///
    /// Handles issued before the flush no longer refer to anything; closing
    /// them is a no-op. Output failures are logged, never returned. Callers
    /// should stop recording on other threads before the final flush so the
    /// file holds a consistent picture.
    pub fn flush(&self) {
        let taken = self.arena.lock().take();
        let recording = Recording::new(taken, self.categories.names());
        match self.write_file(&recording) {
            Ok(()) => debug!(
                "wrote {} trace events in {} blocks to {}",
                recording.event_count(),
                recording.blocks().len(),
                self.path.display()
            ),
            Err(err) => warn!("{err}; {} trace events discarded", recording.event_count()),
        }
    }

    fn write_file(&self, recording: &Recording) -> Result<(), TraceOutputError> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty())
            && let Err(source) = fs::create_dir_all(dir)
        {
            warn!(
                "{}",
                TraceOutputError::CreateDir {
                    path: dir.to_path_buf(),
                    source,
                }
            );
        }

        let file = File::create(&self.path).map_err(|source| TraceOutputError::Open {
            path: self.path.clone(),
            source,
        })?;
        let mut writer = BufWriter::new(file);
        chrome::write_trace(recording, &mut writer).map_err(|source| TraceOutputError::Write {
            path: self.path.clone(),
            source,
        })
    }
}

impl EventTracer for ChromeTracingTracer {
    fn category(&self, group: &'static str) -> Category {
        self.categories.resolve(group)
    }

    fn category_name(&self, category: Category) -> &'static str {
        self.categories.name(category)
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
        if !category.is_enabled() {
            return EventHandle::NONE;
        }
        let args = if args.len() > MAX_ARGS {
            warn!(
                "trace event {name:?} has {} arguments; keeping the first {MAX_ARGS}",
                args.len()
            );
            &args[..MAX_ARGS]
        } else {
            args
        };
        let flags = if id == 0 {
            flags
        } else {
            flags | EventFlags::HAS_ID
        };
        let thread_id = clock::current_thread_id();

        let mut arena = self.arena.lock();
        // Stamped under the lock so record order and timestamps agree.
        let header = RecordHeader {
            phase,
            flags,
            name,
            category: category.index(),
            id,
            clock_begin: clock::now(),
            thread_id,
        };
        arena.append(&header, args)
    }

    fn update_trace_event_duration(&self, handle: EventHandle) {
        let mut arena = self.arena.lock();
        let closed = arena.close(handle, clock::now());
        drop(arena);
        if !closed {
            debug!("ignoring duration update for stale handle {handle:?}");
        }
    }

    fn new_tracing_section(&self, name: &str) {
        let category = self.category(SECTION_CATEGORY);
        self.add_trace_event(
            Phase::INSTANT,
            category,
            "section",
            0,
            &[Arg::copy_str("name", name)],
            EventFlags::NONE.with_scope(InstantScope::Global),
        );
    }
}

impl Drop for ChromeTracingTracer {
    fn drop(&mut self) {
        if self.event_count() > 0 {
            self.flush();
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn events(tracer: &ChromeTracingTracer) -> Vec<Value> {
        let mut out = Vec::new();
        tracer.write_json(&mut out).expect("write to vec");
        match serde_json::from_slice(&out).expect("valid JSON") {
            Value::Array(events) => events,
            other => panic!("expected array, got {other}"),
        }
    }

    /// The directory outlives the tracer, which flushes into it on drop.
    fn memory_tracer() -> (tempfile::TempDir, ChromeTracingTracer) {
        let dir = tempfile::tempdir().expect("temp dir");
        let tracer = ChromeTracingTracer::new(dir.path().join("trace.json"));
        (dir, tracer)
    }

    #[test]
    fn config_defaults_and_builders() {
        let config = ChromeTracingConfig::default();
        assert_eq!(config.path, Path::new(DEFAULT_TRACE_FILE));
        assert_eq!(config.block_size, DEFAULT_BLOCK_SIZE);

        let config = ChromeTracingConfig::new("a.json").with_block_size(4096);
        assert_eq!(config.path, Path::new("a.json"));
        assert_eq!(config.block_size, 4096);
    }

    #[test]
    fn config_overrides_from_lookup() {
        let config = ChromeTracingConfig::default().with_overrides(|key| match key {
            TRACE_FILE_ENV => Some("env/trace.json".into()),
            BLOCK_SIZE_ENV => Some(" 8192 ".into()),
            _ => None,
        });
        assert_eq!(config.path, Path::new("env/trace.json"));
        assert_eq!(config.block_size, 8192);

        let config = ChromeTracingConfig::default().with_overrides(|key| match key {
            TRACE_FILE_ENV => Some(String::new()),
            BLOCK_SIZE_ENV => Some("lots".into()),
            _ => None,
        });
        assert_eq!(config, ChromeTracingConfig::default(), "bad values ignored");
    }

    #[test]
    fn block_size_is_clamped_on_build() {
        let tracer = ChromeTracingTracer::with_config(
            ChromeTracingConfig::new("unused.json").with_block_size(1),
        );
        assert_eq!(tracer.block_size(), crate::block::MIN_BLOCK_SIZE);
    }

    #[test]
    fn write_json_does_not_clear() {
        let (_dir, tracer) = memory_tracer();
        let cat = tracer.category("test");
        tracer.add_trace_event(Phase::BEGIN, cat, "a", 0, &[], EventFlags::NONE);
        assert_eq!(events(&tracer).len(), 1);
        assert_eq!(events(&tracer).len(), 1, "still there");
        assert_eq!(tracer.event_count(), 1);
    }

    #[test]
    fn disabled_category_records_nothing() {
        let (_dir, tracer) = memory_tracer();
        let handle = tracer.add_trace_event(
            Phase::BEGIN,
            Category::DISABLED,
            "a",
            0,
            &[],
            EventFlags::NONE,
        );
        assert!(handle.is_none());
        assert_eq!(tracer.event_count(), 0);
    }

    #[test]
    fn nonzero_id_sets_has_id_flag() {
        let (_dir, tracer) = memory_tracer();
        let cat = tracer.category("test");
        tracer.add_trace_event(Phase::ASYNC_BEGIN, cat, "a", 7, &[], EventFlags::NONE);
        let recording = tracer.recording();
        let view = recording.records().next().expect("one record");
        assert!(view.flags().contains(EventFlags::HAS_ID));
    }

    #[test]
    fn excess_arguments_are_truncated() {
        let (_dir, tracer) = memory_tracer();
        let cat = tracer.category("test");
        let args = vec![Arg::new("n", 1_u32); MAX_ARGS + 10];
        let handle = tracer.add_trace_event(Phase::COUNTER, cat, "many", 0, &args, EventFlags::NONE);
        assert!(!handle.is_none());
        let recording = tracer.recording();
        let view = recording.records().next().expect("one record");
        assert_eq!(view.num_args(), MAX_ARGS);
    }

    #[test]
    fn section_is_a_global_instant() {
        let (_dir, tracer) = memory_tracer();
        let owned = String::from("warmup");
        tracer.new_tracing_section(&owned);
        drop(owned);

        let events = events(&tracer);
        assert_eq!(events[0]["ph"], "I");
        assert_eq!(events[0]["cat"], SECTION_CATEGORY);
        assert_eq!(events[0]["s"], "g");
        assert_eq!(events[0]["args"]["name"], "warmup");
    }

    #[test]
    fn category_names_resolve() {
        let (_dir, tracer) = memory_tracer();
        let cat = tracer.category("skia.gpu");
        assert_eq!(tracer.category_name(cat), "skia.gpu");
    }
}
