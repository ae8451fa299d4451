//! Process-wide accounting of bytes duplicated by copy-set entry points.
//! Move-set entry points never touch the counter.

use crate::element::Element;
use std::sync::atomic::{AtomicU64, Ordering};

static COPIED: AtomicU64 = AtomicU64::new(0);

/// Counts `elements` values of `T` copied out of caller-owned memory.
pub(crate) fn record_copy<T: Element>(elements: usize) {
    let bytes = elements.saturating_mul(T::DTYPE.size_of()) as u64;
    COPIED.fetch_add(bytes, Ordering::Relaxed);
}

/// Bytes copied since start-up or the last reset.
pub fn copy_bytes_total() -> u64 {
    COPIED.load(Ordering::Relaxed)
}

/// Returns the running total and clears it.
pub fn take_copy_bytes() -> u64 {
    COPIED.swap(0, Ordering::Relaxed)
}

pub fn reset_copy_bytes() {
    COPIED.store(0, Ordering::Relaxed);
}
