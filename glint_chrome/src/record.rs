// Copyright 2026 the Glint Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Binary layout of one trace event.
//!
//! A record is a 48-byte header, `num_args` 16-byte argument entries, and a
//! table of NUL-terminated copied strings, padded to a multiple of 8 bytes.
//! All integers are little-endian.
//!
//! ```text
//!   0  phase u8 │ num_args u8 │ flags u8 │ reserved u8 │ size u32
//!   8  name u32 │ category u32
//!  16  id u64
//!  24  clock_begin u64
//!  32  clock_end u64          (0 until closed)
//!  40  thread_id u64
//!  48  args: [tag u8, pad 3, name u32, value u64] * num_args
//!  ..  string table
//! ```
//!
//! Names are indices into the owning tracer's string table. The `value` of a
//! copy-string argument is the byte offset of its copy inside this record's
//! string table, so a record never points outside itself.

use glint_core::arg::{Arg, ArgType, ArgValue};
use glint_core::phase::{EventFlags, Phase};
use glint_core::time::HostTime;

use crate::strings::StaticStrings;

/// Size of the fixed record header in bytes.
pub const HEADER_SIZE: usize = 48;
/// Size of one argument entry in bytes.
pub const ARG_SIZE: usize = 16;
/// Most arguments a single record can carry.
pub const MAX_ARGS: usize = u8::MAX as usize;

const OFF_PHASE: usize = 0;
const OFF_NUM_ARGS: usize = 1;
const OFF_FLAGS: usize = 2;
const OFF_SIZE: usize = 4;
const OFF_NAME: usize = 8;
const OFF_CATEGORY: usize = 12;
const OFF_ID: usize = 16;
const OFF_CLOCK_BEGIN: usize = 24;
const OFF_CLOCK_END: usize = 32;
const OFF_THREAD_ID: usize = 40;

/// Rounds `n` up to the next multiple of 8.
#[inline]
#[must_use]
pub const fn round_up_to_8(n: usize) -> usize {
    (n + 7) & !7
}

/// Total encoded size of an event carrying `args`.
///
/// Callers cap `args` at [`MAX_ARGS`] before encoding.
#[must_use]
pub fn record_size(args: &[Arg<'_>]) -> usize {
    let strings: usize = args.iter().map(|a| a.value.copied_len()).sum();
    round_up_to_8(HEADER_SIZE + args.len() * ARG_SIZE + strings)
}

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

/// Fixed fields of an event, captured before the record is written.
#[derive(Clone, Copy, Debug)]
pub(crate) struct RecordHeader {
    pub(crate) phase: Phase,
    pub(crate) flags: EventFlags,
    pub(crate) name: &'static str,
    pub(crate) category: u32,
    pub(crate) id: u64,
    pub(crate) clock_begin: HostTime,
    pub(crate) thread_id: u64,
}

struct RecordWriter<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl RecordWriter<'_> {
    fn write_u8(&mut self, v: u8) {
        self.buf[self.pos] = v;
        self.pos += 1;
    }

    fn write_u32(&mut self, v: u32) {
        self.write_bytes(&v.to_le_bytes());
    }

    fn write_u64(&mut self, v: u64) {
        self.write_bytes(&v.to_le_bytes());
    }

    fn write_bytes(&mut self, bytes: &[u8]) {
        self.buf[self.pos..self.pos + bytes.len()].copy_from_slice(bytes);
        self.pos += bytes.len();
    }
}

/// Encodes one event into `out`, which must be exactly
/// [`record_size(args)`](record_size) bytes long.
#[expect(
    clippy::cast_possible_truncation,
    reason = "record size is bounded by the block size and args by MAX_ARGS"
)]
pub(crate) fn encode(
    out: &mut [u8],
    header: &RecordHeader,
    args: &[Arg<'_>],
    strings: &mut StaticStrings,
) {
    debug_assert_eq!(out.len(), record_size(args), "buffer must match record size");
    debug_assert!(args.len() <= MAX_ARGS, "too many arguments");

    let size = out.len();
    let mut w = RecordWriter {
        buf: &mut *out,
        pos: 0,
    };

    w.write_u8(header.phase.0);
    w.write_u8(args.len() as u8);
    w.write_u8(header.flags.0);
    w.write_u8(0);
    w.write_u32(size as u32);
    w.write_u32(strings.intern(header.name));
    w.write_u32(header.category);
    w.write_u64(header.id);
    w.write_u64(header.clock_begin.nanos());
    w.write_u64(HostTime::UNSET.nanos());
    w.write_u64(header.thread_id);

    let mut table_offset = 0_usize;
    for arg in args {
        let value = match arg.value {
            ArgValue::Bool(b) => u64::from(b),
            ArgValue::Uint(v) | ArgValue::Pointer(v) => v,
            ArgValue::Int(v) => v as u64,
            ArgValue::Double(v) => v.to_bits(),
            ArgValue::Str(s) => u64::from(strings.intern(s)),
            ArgValue::CopyStr(s) => {
                let offset = table_offset;
                table_offset += s.len() + 1;
                offset as u64
            }
        };
        w.write_u8(arg.value.arg_type().tag());
        w.write_bytes(&[0; 3]);
        w.write_u32(strings.intern(arg.name));
        w.write_u64(value);
    }

    for arg in args {
        if let ArgValue::CopyStr(s) = arg.value {
            w.write_bytes(s.as_bytes());
            w.write_u8(0);
        }
    }

    let end = w.pos;
    out[end..].fill(0);
}

/// Stamps `clock_end` on an encoded record.
pub(crate) fn stamp_clock_end(record: &mut [u8], t: HostTime) {
    record[OFF_CLOCK_END..OFF_CLOCK_END + 8].copy_from_slice(&t.nanos().to_le_bytes());
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

fn read_u32(bytes: &[u8], at: usize) -> u32 {
    let mut b = [0; 4];
    b.copy_from_slice(&bytes[at..at + 4]);
    u32::from_le_bytes(b)
}

fn read_u64(bytes: &[u8], at: usize) -> u64 {
    let mut b = [0; 8];
    b.copy_from_slice(&bytes[at..at + 8]);
    u64::from_le_bytes(b)
}

/// Read-only view over one encoded record.
#[derive(Clone, Copy, Debug)]
pub struct RecordView<'a> {
    bytes: &'a [u8],
}

impl<'a> RecordView<'a> {
    /// Views the record starting at `offset` in `data`.
    ///
    /// Returns `None` if the header or the declared size runs past the end of
    /// `data`, or the declared size is smaller than a header.
    #[must_use]
    pub fn parse(data: &'a [u8], offset: usize) -> Option<Self> {
        let header_end = offset.checked_add(HEADER_SIZE)?;
        if header_end > data.len() {
            return None;
        }
        let size = read_u32(data, offset + OFF_SIZE) as usize;
        if size < HEADER_SIZE || offset + size > data.len() {
            return None;
        }
        let bytes = &data[offset..offset + size];
        let table_start = HEADER_SIZE + usize::from(bytes[OFF_NUM_ARGS]) * ARG_SIZE;
        if table_start > size {
            return None;
        }
        Some(Self { bytes })
    }

    /// Event phase.
    #[must_use]
    pub fn phase(&self) -> Phase {
        Phase(self.bytes[OFF_PHASE])
    }

    /// Number of argument entries.
    #[must_use]
    pub fn num_args(&self) -> usize {
        usize::from(self.bytes[OFF_NUM_ARGS])
    }

    /// Event flags.
    #[must_use]
    pub fn flags(&self) -> EventFlags {
        EventFlags(self.bytes[OFF_FLAGS])
    }

    /// Total record size in bytes, including padding.
    #[must_use]
    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    /// Interned index of the event name.
    #[must_use]
    pub fn name_index(&self) -> u32 {
        read_u32(self.bytes, OFF_NAME)
    }

    /// Index of the event's category group.
    #[must_use]
    pub fn category_index(&self) -> u32 {
        read_u32(self.bytes, OFF_CATEGORY)
    }

    /// Event id; 0 when unused.
    #[must_use]
    pub fn id(&self) -> u64 {
        read_u64(self.bytes, OFF_ID)
    }

    /// Time the event was recorded.
    #[must_use]
    pub fn clock_begin(&self) -> HostTime {
        HostTime(read_u64(self.bytes, OFF_CLOCK_BEGIN))
    }

    /// Time the event was closed, or [`HostTime::UNSET`].
    #[must_use]
    pub fn clock_end(&self) -> HostTime {
        HostTime(read_u64(self.bytes, OFF_CLOCK_END))
    }

    /// Identifier of the recording thread.
    #[must_use]
    pub fn thread_id(&self) -> u64 {
        read_u64(self.bytes, OFF_THREAD_ID)
    }

    /// Iterates over the argument entries.
    pub fn args(&self) -> impl Iterator<Item = ArgView> + use<'a> {
        let bytes = self.bytes;
        (0..self.num_args()).map(move |i| {
            let at = HEADER_SIZE + i * ARG_SIZE;
            ArgView {
                tag: bytes[at],
                name_index: read_u32(bytes, at + 4),
                value: read_u64(bytes, at + 8),
            }
        })
    }

    /// The copied string at `offset` in this record's string table.
    ///
    /// Reads up to the first NUL; invalid UTF-8 yields `None`.
    #[must_use]
    pub fn copied_str(&self, offset: u64) -> Option<&'a str> {
        let table = &self.bytes[HEADER_SIZE + self.num_args() * ARG_SIZE..];
        let start = usize::try_from(offset).ok()?;
        let tail = table.get(start..)?;
        let len = tail.iter().position(|&b| b == 0)?;
        core::str::from_utf8(&tail[..len]).ok()
    }
}

/// One decoded argument entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ArgView {
    tag: u8,
    /// Interned index of the argument name.
    pub name_index: u32,
    /// Raw 64-bit value slot.
    pub value: u64,
}

impl ArgView {
    /// The argument's type, if the tag is known.
    #[must_use]
    pub fn arg_type(&self) -> Option<ArgType> {
        ArgType::from_tag(self.tag)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
