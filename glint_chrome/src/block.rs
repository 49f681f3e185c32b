// Copyright 2026 the Glint Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Fixed-capacity blocks of packed event records.
//!
//! [`BlockArena`] appends encoded records into the current [`Block`] and
//! starts a new one when the next record does not fit. Blocks are never moved
//! or resized after creation; a handle is the block index, the record's byte
//! offset, and the flush epoch it was issued in.
//!
//! [`Recording`] is a detached list of blocks plus the name tables needed to
//! decode them, handed to the serializer.

use glint_core::arg::Arg;
use glint_core::time::HostTime;
use glint_core::trace::EventHandle;
use log::warn;

use crate::record::{self, RecordHeader, RecordView};
use crate::strings::StaticStrings;

/// Default block capacity in bytes.
pub const DEFAULT_BLOCK_SIZE: usize = 512 * 1024;
/// Smallest accepted block capacity.
pub const MIN_BLOCK_SIZE: usize = 256;
/// Largest block capacity a handle can address.
pub const MAX_BLOCK_SIZE: usize = 1 << OFFSET_BITS;

const OFFSET_BITS: u32 = 24;
const BLOCK_BITS: u32 = 20;
const EPOCH_BITS: u32 = 19;
const OFFSET_MASK: u64 = (1 << OFFSET_BITS) - 1;
const BLOCK_MASK: u64 = (1 << BLOCK_BITS) - 1;
const EPOCH_MASK: u64 = (1 << EPOCH_BITS) - 1;
const VALID_BIT: u64 = 1 << 63;

// ---------------------------------------------------------------------------
// Block
// ---------------------------------------------------------------------------

/// A fixed-capacity buffer of tightly packed records.
#[derive(Clone)]
pub struct Block {
    data: Box<[u8]>,
    used: usize,
    /// Byte offset of every record, ascending.
    starts: Vec<u32>,
}

impl core::fmt::Debug for Block {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Block")
            .field("capacity", &self.data.len())
            .field("used", &self.used)
            .field("events", &self.starts.len())
            .finish_non_exhaustive()
    }
}

impl Block {
    fn new(capacity: usize) -> Self {
        Self {
            data: vec![0; capacity].into_boxed_slice(),
            used: 0,
            starts: Vec::new(),
        }
    }

    /// Bytes occupied by records.
    #[must_use]
    pub fn used(&self) -> usize {
        self.used
    }

    /// Number of records appended.
    #[must_use]
    pub fn event_count(&self) -> usize {
        self.starts.len()
    }

    fn is_record_start(&self, offset: usize) -> bool {
        u32::try_from(offset).is_ok_and(|o| self.starts.binary_search(&o).is_ok())
    }

    fn fits(&self, size: usize) -> bool {
        self.used + size <= self.data.len()
    }

    /// Iterates over the records in append order.
    #[must_use]
    pub fn records(&self) -> Records<'_> {
        Records {
            data: &self.data[..self.used],
            pos: 0,
        }
    }
}

/// Iterator over the records of one [`Block`], advancing by each record's
/// `size` field.
#[derive(Debug)]
pub struct Records<'a> {
    data: &'a [u8],
    pos: usize,
}

impl Records<'_> {
    /// Byte offset of the next record.
    #[must_use]
    pub fn position(&self) -> usize {
        self.pos
    }
}

impl<'a> Iterator for Records<'a> {
    type Item = RecordView<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let view = RecordView::parse(self.data, self.pos)?;
        self.pos += view.size();
        Some(view)
    }
}

// ---------------------------------------------------------------------------
// Handles
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Slot {
    epoch: u64,
    block: u64,
    offset: u64,
}

impl Slot {
    fn pack(self) -> Option<EventHandle> {
        if self.block > BLOCK_MASK || self.offset > OFFSET_MASK {
            return None;
        }
        Some(EventHandle(
            VALID_BIT
                | (self.epoch & EPOCH_MASK) << (BLOCK_BITS + OFFSET_BITS)
                | self.block << OFFSET_BITS
                | self.offset,
        ))
    }

    fn unpack(handle: EventHandle) -> Option<Self> {
        if handle.0 & VALID_BIT == 0 {
            return None;
        }
        Some(Self {
            epoch: (handle.0 >> (BLOCK_BITS + OFFSET_BITS)) & EPOCH_MASK,
            block: (handle.0 >> OFFSET_BITS) & BLOCK_MASK,
            offset: handle.0 & OFFSET_MASK,
        })
    }
}

// ---------------------------------------------------------------------------
// BlockArena
// ---------------------------------------------------------------------------

/// The tracer's mutable recording state. Callers serialize access.
#[derive(Debug)]
pub(crate) struct BlockArena {
    block_size: usize,
    blocks: Vec<Block>,
    epoch: u64,
    strings: StaticStrings,
}

impl BlockArena {
    pub(crate) fn new(block_size: usize) -> Self {
        Self {
            block_size: block_size.clamp(MIN_BLOCK_SIZE, MAX_BLOCK_SIZE),
            blocks: Vec::new(),
            epoch: 0,
            strings: StaticStrings::default(),
        }
    }

    pub(crate) fn block_size(&self) -> usize {
        self.block_size
    }

    /// Encodes one record into the current block, rolling over to a fresh
    /// block when it does not fit.
    pub(crate) fn append(&mut self, header: &RecordHeader, args: &[Arg<'_>]) -> EventHandle {
        let size = record::record_size(args);
        debug_assert!(
            size <= self.block_size,
            "trace event of {size} bytes exceeds block size {}",
            self.block_size
        );
        if size > self.block_size {
            warn!(
                "dropping trace event {:?}: {size} bytes exceeds block size {}",
                header.name, self.block_size
            );
            return EventHandle::NONE;
        }

        if !self.blocks.last().is_some_and(|b| b.fits(size)) {
            self.blocks.push(Block::new(self.block_size));
        }
        let block_index = self.blocks.len() - 1;
        let Some(block) = self.blocks.last_mut() else {
            return EventHandle::NONE;
        };

        let offset = block.used;
        record::encode(
            &mut block.data[offset..offset + size],
            header,
            args,
            &mut self.strings,
        );
        block.used += size;
        block.starts.push(u32::try_from(offset).unwrap_or(u32::MAX));

        Slot {
            epoch: self.epoch,
            block: block_index as u64,
            offset: offset as u64,
        }
        .pack()
        .unwrap_or(EventHandle::NONE)
    }

    /// Stamps `clock_end` on the record named by `handle`.
    ///
    /// Returns `false` for handles from an earlier epoch, or that do not name
    /// the start of a written record.
    pub(crate) fn close(&mut self, handle: EventHandle, t: HostTime) -> bool {
        let Some(slot) = Slot::unpack(handle) else {
            return false;
        };
        if slot.epoch != self.epoch & EPOCH_MASK {
            return false;
        }
        let (Ok(block), Ok(offset)) = (usize::try_from(slot.block), usize::try_from(slot.offset))
        else {
            return false;
        };
        let Some(block) = self.blocks.get_mut(block) else {
            return false;
        };
        // A handle whose epoch wrapped around may point anywhere.
        if !block.is_record_start(offset) {
            return false;
        }
        record::stamp_clock_end(&mut block.data[offset..block.used], t);
        true
    }

    /// Number of records held.
    pub(crate) fn event_count(&self) -> usize {
        self.blocks.iter().map(Block::event_count).sum()
    }

    /// Detaches all blocks and starts a new epoch, invalidating every handle
    /// issued so far.
    pub(crate) fn take(&mut self) -> (Vec<Block>, Vec<&'static str>) {
        self.epoch = self.epoch.wrapping_add(1);
        (core::mem::take(&mut self.blocks), self.strings.to_vec())
    }

    /// Copies the current blocks without detaching them.
    pub(crate) fn snapshot(&self) -> (Vec<Block>, Vec<&'static str>) {
        (self.blocks.clone(), self.strings.to_vec())
    }
}

// ---------------------------------------------------------------------------
// Recording
// ---------------------------------------------------------------------------

/// Recorded blocks together with the tables that name their strings and
/// categories.
#[derive(Debug, Default)]
pub struct Recording {
    blocks: Vec<Block>,
    strings: Vec<&'static str>,
    categories: Vec<&'static str>,
}

impl Recording {
    pub(crate) fn new(
        (blocks, strings): (Vec<Block>, Vec<&'static str>),
        categories: Vec<&'static str>,
    ) -> Self {
        Self {
            blocks,
            strings,
            categories,
        }
    }

    /// Blocks in creation order.
    #[must_use]
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Every record, oldest block first.
    pub fn records(&self) -> impl Iterator<Item = RecordView<'_>> {
        self.blocks.iter().flat_map(Block::records)
    }

    /// Number of records.
    #[must_use]
    pub fn event_count(&self) -> usize {
        self.blocks.iter().map(Block::event_count).sum()
    }

    /// Resolves an interned string index.
    #[must_use]
    pub fn string(&self, index: u32) -> &'static str {
        self.strings.get(index as usize).copied().unwrap_or("")
    }

    /// Resolves a category index.
    #[must_use]
    pub fn category(&self, index: u32) -> &'static str {
        self.categories.get(index as usize).copied().unwrap_or("")
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
