//! Round-robin cursor with liveness skipping.

use std::sync::atomic::{AtomicU64, Ordering};

/// Monotonic round-robin cursor.
///
/// The effective index is always `cursor % len`. Every liveness evaluation
/// a selection performs advances the cursor by exactly one, so a call that
/// skips `k` dead entries before finding a live one leaves the cursor
/// `k + 1` positions further on, and the next call starts right after the
/// selected entry.
#[derive(Debug, Default)]
pub struct RoundRobin {
    cursor: AtomicU64,
}

impl RoundRobin {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current raw cursor value.
    pub fn position(&self) -> u64 {
        self.cursor.load(Ordering::Relaxed)
    }

    /// Pick the next index in `0..len` for which `is_alive` holds.
    ///
    /// Scans at most one full pass. The starting position is claimed with a
    /// single atomic increment and the skipped positions are accounted for
    /// afterwards, so `is_alive` runs outside any critical section and
    /// concurrent callers each still see all `len` entries.
    /// Returns `None` if `len` is zero or nothing in the pass was alive.
    pub fn next_index<F>(&self, len: usize, mut is_alive: F) -> Option<usize>
    where
        F: FnMut(usize) -> bool,
    {
        if len == 0 {
            return None;
        }

        let start = self.cursor.fetch_add(1, Ordering::Relaxed);
        let n = len as u64;

        for offset in 0..n {
            let index = (start.wrapping_add(offset) % n) as usize;
            if is_alive(index) {
                if offset > 0 {
                    self.cursor.fetch_add(offset, Ordering::Relaxed);
                }
                return Some(index);
            }
        }

        // Count the whole pass, one position per entry checked.
        self.cursor.fetch_add(n - 1, Ordering::Relaxed);
        None
    }
}
