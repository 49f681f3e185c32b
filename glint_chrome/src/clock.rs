// Copyright 2026 the Glint Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Monotonic clock and recording-thread identity.

use std::sync::OnceLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use glint_core::time::HostTime;

static EPOCH: OnceLock<Instant> = OnceLock::new();
static NEXT_THREAD_ID: AtomicU64 = AtomicU64::new(1);

thread_local! {
    static THREAD_ID: u64 = NEXT_THREAD_ID.fetch_add(1, Ordering::Relaxed);
}

/// Nanoseconds since the first call in this process. Never returns
/// [`HostTime::UNSET`].
pub(crate) fn now() -> HostTime {
    let epoch = *EPOCH.get_or_init(Instant::now);
    let nanos = u64::try_from(epoch.elapsed().as_nanos()).unwrap_or(u64::MAX);
    HostTime(nanos.max(1))
}

/// Process-unique id of the calling thread, assigned on first use.
pub(crate) fn current_thread_id() -> u64 {
    THREAD_ID.with(|id| *id)
}
