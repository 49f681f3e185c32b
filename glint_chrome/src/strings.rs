// Copyright 2026 the Glint Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Interning of `&'static str` names referenced by records.

use std::collections::HashMap;

/// Maps static strings to stable `u32` indices.
///
/// Keys are the string's address and length, so the same literal resolves
/// without hashing its contents. Indices are never reused.
#[derive(Debug, Default)]
pub(crate) struct StaticStrings {
    strings: Vec<&'static str>,
    index: HashMap<(usize, usize), u32>,
}

impl StaticStrings {
    /// Returns the index for `s`, assigning one on first sight.
    pub(crate) fn intern(&mut self, s: &'static str) -> u32 {
        let key = (s.as_ptr() as usize, s.len());
        if let Some(&i) = self.index.get(&key) {
            return i;
        }
        let i = u32::try_from(self.strings.len()).unwrap_or(u32::MAX);
        self.strings.push(s);
        self.index.insert(key, i);
        i
    }

    /// Resolves an index; unknown indices resolve to `""`.
    pub(crate) fn get(&self, i: u32) -> &'static str {
        self.strings.get(i as usize).copied().unwrap_or("")
    }

    /// Copies the table for use outside the tracer lock.
    pub(crate) fn to_vec(&self) -> Vec<&'static str> {
        self.strings.clone()
    }
}
