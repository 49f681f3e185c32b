// Copyright 2026 the Glint Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Errors raised while writing a trace file.
//!
//! Recording itself never fails. These only surface from the output path,
//! where [`ChromeTracingTracer::flush`](crate::ChromeTracingTracer::flush)
//! logs them instead of returning them.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failure to produce the trace output file.
#[derive(Debug, Error)]
pub enum TraceOutputError {
    /// The output file's parent directory could not be created.
    #[error("failed to create trace directory {}: {source}", .path.display())]
    CreateDir {
        /// Directory that could not be created.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// The output file could not be opened for writing.
    #[error("failed to open trace file {}: {source}", .path.display())]
    Open {
        /// File that could not be opened.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// Serializing events into the output file failed part way.
    #[error("failed to write trace file {}: {source}", .path.display())]
    Write {
        /// File being written.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },
}
