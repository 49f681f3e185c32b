// Copyright 2026 the Glint Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! End-to-end tests: record through the public API, flush to disk, parse the
//! JSON back.

use std::path::Path;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use glint_chrome::block::MIN_BLOCK_SIZE;
use glint_chrome::{ChromeTracingConfig, ChromeTracingTracer};
use glint_core::arg::Arg;
use glint_core::phase::{EventFlags, InstantScope, Phase};
use glint_core::trace::{EventTracer, Tracer};
use serde_json::Value;

fn read_events(path: &Path) -> Vec<Value> {
    let text = std::fs::read_to_string(path).expect("trace file exists");
    serde_json::from_str(&text).expect("trace file is a JSON array")
}

#[test]
fn begin_event_with_duration() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("trace.json");
    let tracer = ChromeTracingTracer::new(&path);

    let cat = tracer.category("test");
    let handle = tracer.add_trace_event(Phase::BEGIN, cat, "Foo", 0, &[], EventFlags::NONE);
    thread::sleep(Duration::from_millis(5));
    tracer.update_trace_event_duration(handle);
    tracer.flush();

    let events = read_events(&path);
    assert_eq!(events.len(), 1);
    let event = &events[0];
    assert_eq!(event["ph"], "B");
    assert_eq!(event["name"], "Foo");
    assert!(event.get("id").is_none(), "zero id is omitted");
    assert_eq!(event["tid"], 0);
    assert_eq!(event["pid"], 0);
    let dur = event["dur"].as_f64().expect("closed event has dur");
    assert!((5_000.0..1_000_000.0).contains(&dur), "dur = {dur}");
}

#[test]
fn threads_are_numbered_by_first_appearance() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("trace.json");
    let tracer = Arc::new(ChromeTracingTracer::new(&path));

    let record = |name: &'static str| {
        let tracer = Arc::clone(&tracer);
        thread::spawn(move || {
            let cat = tracer.category("test");
            tracer.add_trace_event(Phase::INSTANT, cat, name, 0, &[], EventFlags::NONE);
        })
        .join()
        .unwrap();
    };
    let cat = tracer.category("test");
    record("a");
    record("b");
    // The test thread first appears after two workers.
    tracer.add_trace_event(Phase::INSTANT, cat, "main1", 0, &[], EventFlags::NONE);
    record("c");
    tracer.add_trace_event(Phase::INSTANT, cat, "main2", 0, &[], EventFlags::NONE);
    tracer.flush();

    let tids: Vec<_> = read_events(&path)
        .iter()
        .map(|e| e["tid"].as_u64().unwrap())
        .collect();
    assert_eq!(tids, [0, 1, 2, 3, 2]);
}

#[test]
fn only_closed_events_have_duration() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("trace.json");
    let tracer = ChromeTracingTracer::new(&path);
    let t = Tracer::new(&tracer);

    {
        let _scope = t.scoped("test", "closed", &[]);
    }
    t.begin("test", "open", &[]);
    tracer.flush();

    let events = read_events(&path);
    assert_eq!(events[0]["ph"], "X");
    assert!(events[0]["dur"].is_number(), "scoped event is closed");
    assert_eq!(events[0]["cat"], "test");
    assert!(events[1].get("dur").is_none(), "begin was never closed");
}

#[test]
fn snapshot_base_type_follows_creation_name() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("trace.json");
    let tracer = ChromeTracingTracer::new(&path);
    let t = Tracer::new(&tracer);

    t.object_created("test", "Foo", 1);
    t.object_snapshot("test", "Bar", 1, &[Arg::new("width", 10_u32)]);
    t.object_snapshot("test", "Foo", 1, &[Arg::new("width", 11_u32)]);
    t.object_deleted("test", "Foo", 1);
    tracer.flush();

    let events = read_events(&path);
    assert_eq!(events.len(), 4);
    assert_eq!(events[1]["args"]["snapshot"]["base_type"], "Foo");
    assert_eq!(events[1]["args"]["snapshot"]["width"], 10);
    assert!(events[2]["args"].get("snapshot").is_none(), "same name");
    assert_eq!(events[2]["args"]["width"], 11);
    assert_eq!(events[3]["id"], "0x1");
}

#[test]
fn copied_strings_outlive_the_caller() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("trace.json");
    let tracer = ChromeTracingTracer::new(&path);
    let cat = tracer.category("test");

    let mut buffer = String::from("before");
    tracer.add_trace_event(
        Phase::INSTANT,
        cat,
        "copy",
        0,
        &[Arg::copy_str("value", &buffer)],
        EventFlags::NONE,
    );
    buffer.clear();
    buffer.push_str("after!");
    drop(buffer);
    tracer.flush();

    assert_eq!(read_events(&path)[0]["args"]["value"], "before");
}

#[test]
fn concurrent_appends_are_all_recorded() {
    const THREADS: usize = 8;
    const EVENTS: usize = 500;
    const NAMES: [&str; 4] = ["alpha", "beta", "gamma", "delta"];

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("trace.json");
    let tracer = Arc::new(ChromeTracingTracer::with_config(
        ChromeTracingConfig::new(&path).with_block_size(MIN_BLOCK_SIZE * 4),
    ));

    let workers: Vec<_> = (0..THREADS)
        .map(|worker| {
            let tracer = Arc::clone(&tracer);
            thread::spawn(move || {
                let cat = tracer.category("stress");
                for i in 0..EVENTS {
                    let label = format!("w{worker}-{i}");
                    let handle = tracer.add_trace_event(
                        Phase::COMPLETE,
                        cat,
                        NAMES[i % NAMES.len()],
                        0,
                        &[
                            Arg::new("worker", worker as u64),
                            Arg::new("i", i as u64),
                            Arg::copy_str("label", &label),
                        ],
                        EventFlags::NONE,
                    );
                    tracer.update_trace_event_duration(handle);
                }
            })
        })
        .collect();
    for worker in workers {
        worker.join().unwrap();
    }
    assert_eq!(tracer.event_count(), THREADS * EVENTS);
    tracer.flush();
    assert_eq!(tracer.event_count(), 0, "flush clears");

    let events = read_events(&path);
    assert_eq!(events.len(), THREADS * EVENTS);
    let mut next = [0_u64; THREADS];
    for event in &events {
        let worker = event["args"]["worker"].as_u64().unwrap();
        let i = event["args"]["i"].as_u64().unwrap();
        let slot = &mut next[usize::try_from(worker).unwrap()];
        assert_eq!(i, *slot, "per-thread order is preserved");
        *slot += 1;
        assert_eq!(event["ph"], "X");
        assert_eq!(event["name"], NAMES[usize::try_from(i).unwrap() % NAMES.len()]);
        assert_eq!(event["args"]["label"], format!("w{worker}-{i}"));
        assert!(event["dur"].is_number(), "every event was closed");
    }
    assert_eq!(next, [EVENTS as u64; THREADS]);
}

#[test]
fn id_ref_and_instant_scope() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("trace.json");
    let tracer = ChromeTracingTracer::new(&path);
    let t = Tracer::new(&tracer);

    t.instant(
        "test",
        "mark",
        InstantScope::Process,
        &[Arg::new("#target", 0x10_u64)],
    );
    tracer.flush();

    let events = read_events(&path);
    assert_eq!(events[0]["s"], "p");
    assert_eq!(events[0]["args"]["#target"]["id_ref"], 16);
}

#[test]
fn handles_from_before_a_flush_are_ignored() {
    let dir = tempfile::tempdir().unwrap();
    let first = dir.path().join("first.json");
    let tracer = ChromeTracingTracer::new(&first);
    let cat = tracer.category("test");

    let stale = tracer.add_trace_event(Phase::BEGIN, cat, "old", 0, &[], EventFlags::NONE);
    tracer.flush();
    tracer.add_trace_event(Phase::BEGIN, cat, "new", 0, &[], EventFlags::NONE);
    tracer.update_trace_event_duration(stale);

    let mut out = Vec::new();
    tracer.write_json(&mut out).unwrap();
    let events: Vec<Value> = serde_json::from_slice(&out).unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0]["name"], "new");
    assert!(events[0].get("dur").is_none(), "stale close had no effect");
    assert!(read_events(&first)[0].get("dur").is_none());
}

#[test]
fn missing_directories_are_created() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested/deeper/trace.json");
    let tracer = ChromeTracingTracer::new(&path);
    Tracer::new(&tracer).counter("test", "fps", &[Arg::new("value", 60_u32)]);
    tracer.flush();

    assert_eq!(read_events(&path)[0]["args"]["value"], 60);
}

#[test]
fn unwritable_output_is_not_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("file");
    std::fs::write(&blocker, b"not a directory").unwrap();

    let tracer = ChromeTracingTracer::new(blocker.join("trace.json"));
    Tracer::new(&tracer).begin("test", "lost", &[]);
    tracer.flush();
    assert_eq!(tracer.event_count(), 0, "events are discarded");
}

#[test]
fn empty_flush_writes_an_empty_array() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("trace.json");
    let tracer = ChromeTracingTracer::new(&path);
    tracer.flush();
    assert!(read_events(&path).is_empty());
}

#[test]
fn drop_flushes_pending_events() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("trace.json");
    {
        let tracer = ChromeTracingTracer::new(&path);
        Tracer::new(&tracer).section("load");
    }
    let events = read_events(&path);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0]["cat"], "section");
    assert_eq!(events[0]["args"]["name"], "load");
}
