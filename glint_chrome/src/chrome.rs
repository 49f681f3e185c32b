// Copyright 2026 the Glint Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chrome Trace Event Format serializer.
//!
//! [`write_trace`] walks a [`Recording`] in append order and writes a
//! [Chrome Trace Event Format][format] JSON array, suitable for loading into
//! `chrome://tracing` or [Perfetto](https://ui.perfetto.dev/).
//!
//! Timestamps are microseconds relative to the first recorded event. Thread
//! ids are replaced by small integers in order of first appearance.
//!
//! [format]: https://docs.google.com/document/d/1CvAClvFfyA5R-PhYUmn5OOQtYMH4h6I0nSsKchNAySU

use std::collections::HashMap;
use std::io::{self, Write};

use glint_core::arg::ArgType;
use glint_core::phase::Phase;
use glint_core::time::HostTime;
use serde_json::{Map, Value, json};

use crate::block::Recording;
use crate::record::{ArgView, RecordView};

/// Argument names starting with this marker are emitted as `{"id_ref": v}`.
pub const ID_REF_MARKER: char = '#';

/// Per-flush bookkeeping.
#[derive(Debug)]
struct SerializationState {
    clock_offset: HostTime,
    object_names: HashMap<u64, &'static str>,
    thread_ids: HashMap<u64, u32>,
}

impl SerializationState {
    fn new(clock_offset: HostTime) -> Self {
        Self {
            clock_offset,
            object_names: HashMap::new(),
            thread_ids: HashMap::new(),
        }
    }

    fn tid(&mut self, thread_id: u64) -> u32 {
        let next = u32::try_from(self.thread_ids.len()).unwrap_or(u32::MAX);
        *self.thread_ids.entry(thread_id).or_insert(next)
    }

    fn event(&mut self, record: &RecordView<'_>, recording: &Recording) -> Value {
        let phase = record.phase();
        let name = recording.string(record.name_index());
        let id = record.id();

        if phase == Phase::CREATE_OBJECT {
            self.object_names.insert(id, name);
        } else if phase == Phase::DELETE_OBJECT {
            self.object_names.remove(&id);
        }

        let mut event = Map::new();
        event.insert("ph".into(), Value::String(phase.as_char().to_string()));
        event.insert("name".into(), Value::from(name));
        event.insert(
            "cat".into(),
            Value::from(recording.category(record.category_index())),
        );
        if id != 0 {
            event.insert("id".into(), Value::String(format!("{id:#x}")));
        }
        event.insert(
            "ts".into(),
            Value::from(record.clock_begin().micros_since(self.clock_offset)),
        );
        let end = record.clock_end();
        if end.is_set() {
            event.insert(
                "dur".into(),
                Value::from(end.micros_since(record.clock_begin())),
            );
        }
        event.insert("tid".into(), Value::from(self.tid(record.thread_id())));
        event.insert("pid".into(), Value::from(0));
        if phase.is_instant() {
            event.insert("s".into(), Value::from(record.flags().scope().as_str()));
        }

        if record.num_args() > 0 {
            let base_type = if phase == Phase::SNAPSHOT_OBJECT {
                self.object_names.get(&id).copied().filter(|&b| b != name)
            } else {
                None
            };
            let mut args = Map::new();
            if let Some(base_type) = base_type {
                args.insert("base_type".into(), Value::from(base_type));
            }
            for arg in record.args() {
                let arg_name = recording.string(arg.name_index);
                let value = arg_value(&arg, record, recording);
                let value = if arg_name.starts_with(ID_REF_MARKER) {
                    json!({ "id_ref": value })
                } else {
                    value
                };
                args.insert(arg_name.into(), value);
            }
            let args = if base_type.is_some() {
                let mut outer = Map::new();
                outer.insert("snapshot".into(), Value::Object(args));
                outer
            } else {
                args
            };
            event.insert("args".into(), Value::Object(args));
        }

        Value::Object(event)
    }
}

fn arg_value(arg: &ArgView, record: &RecordView<'_>, recording: &Recording) -> Value {
    match arg.arg_type() {
        Some(ArgType::Bool) => Value::Bool(arg.value != 0),
        Some(ArgType::Uint) => Value::from(arg.value),
        // Two's-complement bits.
        Some(ArgType::Int) => Value::from(arg.value as i64),
        Some(ArgType::Double) => Value::from(f64::from_bits(arg.value)),
        Some(ArgType::Pointer) => Value::String(format!("{:#x}", arg.value)),
        Some(ArgType::Str) => u32::try_from(arg.value)
            .map_or(Value::Null, |i| Value::from(recording.string(i))),
        Some(ArgType::CopyStr) => record
            .copied_str(arg.value)
            .map_or(Value::Null, Value::from),
        None => Value::Null,
    }
}

/// Writes `recording` as a Chrome trace JSON array and flushes `writer`.
pub fn write_trace(recording: &Recording, writer: &mut dyn Write) -> io::Result<()> {
    let clock_offset = recording
        .records()
        .next()
        .map_or(HostTime::UNSET, |r| r.clock_begin());
    let mut state = SerializationState::new(clock_offset);

    writer.write_all(b"[")?;
    for (i, record) in recording.records().enumerate() {
        let separator: &[u8] = if i == 0 { b"\n" } else { b",\n" };
        writer.write_all(separator)?;
        let event = state.event(&record, recording);
        serde_json::to_writer(&mut *writer, &event)?;
    }
    writer.write_all(b"\n]\n")?;
    writer.flush()
}
