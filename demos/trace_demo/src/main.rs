// Copyright 2026 the Glint Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Simulated multi-threaded frame loop recorded with the Chrome tracer.
//!
//! Each worker thread runs a number of synthetic frames, emitting nested
//! durations, counters, instants, async loads, and object lifetimes. The
//! result is written as Chrome Trace Event Format JSON, ready for
//! `chrome://tracing` or <https://ui.perfetto.dev/>.

use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use anyhow::{Result, ensure};
use clap::Parser;
use env_logger::Env;
use glint_chrome::tracer::{BLOCK_SIZE_ENV, TRACE_FILE_ENV};
use glint_chrome::{ChromeTracingConfig, ChromeTracingTracer};
use glint_core::arg::Arg;
use glint_core::phase::InstantScope;
use glint_core::trace::Tracer;
use log::info;

/// Record a synthetic multi-threaded workload as a Chrome trace.
#[derive(Parser, Debug)]
#[command(name = "trace_demo", version, about, long_about = None)]
struct Cli {
    /// Output path for the trace JSON.
    #[arg(short, long, env = TRACE_FILE_ENV, default_value = "trace.json")]
    output: PathBuf,

    /// Number of worker threads.
    #[arg(short, long, default_value_t = 4)]
    threads: usize,

    /// Frames recorded per thread.
    #[arg(short, long, default_value_t = 60)]
    frames: u64,

    /// Recording block size in bytes.
    #[arg(long, env = BLOCK_SIZE_ENV)]
    block_size: Option<usize>,

    /// Enable debug logging.
    #[arg(short, long)]
    verbose: bool,
}

const CATEGORY: &str = "demo";

fn main() -> Result<()> {
    let cli = Cli::parse();
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();
    ensure!(cli.threads > 0, "--threads must be at least 1");

    let mut config = ChromeTracingConfig::new(&cli.output);
    if let Some(block_size) = cli.block_size {
        config = config.with_block_size(block_size);
    }
    let backend = ChromeTracingTracer::with_config(config);
    let tracer = Tracer::new(&backend);

    tracer.section("startup");
    tracer.instant(CATEGORY, "launch", InstantScope::Process, &[]);

    tracer.section("frames");
    thread::scope(|scope| {
        for worker in 0..cli.threads {
            scope.spawn(move || run_worker(tracer, worker as u64, cli.frames));
        }
    });

    info!(
        "recorded {} events, writing {}",
        backend.event_count(),
        backend.path().display()
    );
    backend.flush();
    Ok(())
}

fn run_worker(tracer: Tracer<'_>, worker: u64, frames: u64) {
    // Object ids must not collide between workers.
    let surface = (worker + 1) << 32;
    tracer.object_created(CATEGORY, "Surface", surface);

    for frame in 0..frames {
        let _frame = tracer.scoped(
            CATEGORY,
            "frame",
            &[Arg::new("worker", worker), Arg::new("frame", frame)],
        );

        {
            let _plan = tracer.scoped(CATEGORY, "plan", &[]);
            spin(Duration::from_micros(200 + 50 * (frame % 4)));
        }

        let load = surface | (frame + 1);
        if frame % 10 == 0 {
            tracer.async_begin(CATEGORY, "texture_upload", load, &[]);
        }

        {
            let label = format!("worker {worker} frame {frame}");
            let _draw = tracer.scoped(CATEGORY, "draw", &[Arg::copy_str("label", &label)]);
            spin(Duration::from_micros(400));
        }

        if frame % 10 == 0 {
            tracer.async_end(CATEGORY, "texture_upload", load);
        }

        tracer.counter(
            CATEGORY,
            "queue_depth",
            &[Arg::new("pending", (frame * 7 + worker) % 5)],
        );

        if frame % 15 == 0 {
            // Snapshots name the concrete type; the serializer records the
            // base type from creation.
            tracer.object_snapshot(
                CATEGORY,
                "GpuSurface",
                surface,
                &[
                    Arg::new("width", 1920_u32),
                    Arg::new("height", 1080_u32),
                    Arg::new("#device", 1_u64),
                ],
            );
        }

        if frame % 30 == 29 {
            tracer.instant(
                CATEGORY,
                "frame_dropped",
                InstantScope::Thread,
                &[Arg::new("frame", frame)],
            );
        }
    }

    tracer.object_deleted(CATEGORY, "Surface", surface);
}

fn spin(duration: Duration) {
    let start = std::time::Instant::now();
    while start.elapsed() < duration {
        std::hint::spin_loop();
    }
}
