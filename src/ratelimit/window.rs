//! Sliding window state for a single limit key.

use std::collections::VecDeque;

/// The ordered record of admitted-request timestamps for one key.
///
/// Timestamps are epoch milliseconds, appended in non-decreasing order at the
/// tail and expired only from the head, so pruning is amortized O(1) per
/// call. After any prune, every remaining timestamp lies in the half-open
/// interval `(now - window_ms, now]`: an entry exactly `window_ms` old has
/// expired.
#[derive(Debug, Default)]
pub struct Window {
    timestamps: VecDeque<u64>,
}

impl Window {
    /// Create an empty window.
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every timestamp strictly older than `window_ms`.
    ///
    /// Pruning is monotonic: once a timestamp falls outside the window it is
    /// removed and never re-examined.
    pub fn prune(&mut self, now_ms: u64, window_ms: u64) {
        while let Some(&oldest) = self.timestamps.front() {
            if now_ms.saturating_sub(oldest) > window_ms {
                self.timestamps.pop_front();
            } else {
                break;
            }
        }
    }

    /// Record an admitted request at `now_ms`.
    pub fn record(&mut self, now_ms: u64) {
        self.timestamps.push_back(now_ms);
    }

    /// Number of admitted requests currently in the window.
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    /// Whether the window holds no timestamps.
    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    /// The oldest recorded timestamp, if any.
    pub fn oldest(&self) -> Option<u64> {
        self.timestamps.front().copied()
    }

    /// Milliseconds until the oldest entry ages out and frees one slot.
    ///
    /// Returns zero for an empty window. Callers use this to build a
    /// retry-after hint on rejection.
    pub fn retry_after_ms(&self, now_ms: u64, window_ms: u64) -> u64 {
        match self.oldest() {
            // The slot frees once the entry is strictly older than the
            // window, hence the +1.
            Some(oldest) => (oldest + window_ms + 1).saturating_sub(now_ms),
            None => 0,
        }
    }

    /// Whether every entry has aged out, i.e. the window would prune to
    /// empty. Idle windows are reclaimable by the sweep.
    pub fn is_idle(&self, now_ms: u64, window_ms: u64) -> bool {
        match self.timestamps.back() {
            Some(&newest) => now_ms.saturating_sub(newest) > window_ms,
            None => true,
        }
    }
}
