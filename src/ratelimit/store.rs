//! Per-dimension window storage.

use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::Mutex;
use tracing::{debug, trace};

use super::key::LimitKey;
use super::window::Window;

/// Shared handle to one key's window and its lock.
pub(crate) type WindowCell = Arc<Mutex<Window>>;

/// Outcome of evaluating a single dimension for one key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowDecision {
    /// Whether the request was admitted and recorded.
    pub admitted: bool,
    /// On rejection, milliseconds until the oldest entry ages out; zero on
    /// admission.
    pub retry_after_ms: u64,
}

/// Window storage for a single limiting dimension.
///
/// Holds one [`Window`] per key, created lazily on first observation. The
/// map is sharded (`DashMap`) and each window carries its own mutex, so the
/// prune + count + conditional-append sequence is atomic per key while
/// unrelated keys do not contend.
pub struct WindowStore {
    /// Length of the sliding window in milliseconds.
    window_ms: u64,
    /// Maximum admitted requests per key within the window.
    max_requests: u32,
    /// Windows indexed by limit key.
    windows: DashMap<LimitKey, WindowCell>,
}

impl WindowStore {
    /// Create an empty store for one dimension.
    ///
    /// Configuration is validated before construction
    /// (see [`LimiterConfig::validate`](crate::LimiterConfig::validate)), so
    /// evaluation has no error states: every call admits or rejects.
    pub fn new(window_ms: u64, max_requests: u32) -> Self {
        Self {
            window_ms,
            max_requests,
            windows: DashMap::new(),
        }
    }

    /// The configured window length in milliseconds.
    pub fn window_ms(&self) -> u64 {
        self.window_ms
    }

    /// The configured per-key request limit.
    pub fn max_requests(&self) -> u32 {
        self.max_requests
    }

    /// Get or lazily create the window cell for a key.
    ///
    /// The caller locks the cell itself; this is how the limiter holds
    /// several dimensions' windows across one multi-dimension check.
    pub(crate) fn checkout(&self, key: &LimitKey) -> WindowCell {
        if let Some(cell) = self.windows.get(key) {
            return cell.clone();
        }

        self.windows
            .entry(key.clone())
            .or_insert_with(|| {
                debug!(
                    key = %key,
                    limit = self.max_requests,
                    window_ms = self.window_ms,
                    "Creating window"
                );
                Arc::new(Mutex::new(Window::new()))
            })
            .clone()
    }

    /// Evaluate one request for `key` at `now_ms`.
    ///
    /// Prunes expired entries, then either records the request (count below
    /// the limit) or rejects it without mutation, so rejected traffic never
    /// counts against future windows. The whole sequence runs under the
    /// key's lock.
    pub fn evaluate(&self, key: &LimitKey, now_ms: u64) -> WindowDecision {
        trace!(key = %key, now_ms = now_ms, "Evaluating window");

        let cell = self.checkout(key);
        let mut window = cell.lock();

        window.prune(now_ms, self.window_ms);

        if window.len() >= self.max_requests as usize {
            debug!(key = %key, limit = self.max_requests, "Rate limit exceeded");
            return WindowDecision {
                admitted: false,
                retry_after_ms: window.retry_after_ms(now_ms, self.window_ms),
            };
        }

        window.record(now_ms);
        WindowDecision {
            admitted: true,
            retry_after_ms: 0,
        }
    }

    /// Remove every window whose entries have all aged out.
    ///
    /// Returns the number of windows removed. A cell that is checked out by
    /// an in-flight check (shared handle outstanding) or momentarily locked
    /// is kept; it will be revisited on the next sweep.
    pub fn remove_idle(&self, now_ms: u64) -> usize {
        let before = self.windows.len();

        self.windows.retain(|_, cell| {
            // An outstanding handle means an in-flight check; the shard lock
            // held here blocks new checkouts, so the count cannot rise
            // mid-decision.
            if Arc::strong_count(cell) > 1 {
                return true;
            }
            match cell.try_lock() {
                Some(window) => !window.is_idle(now_ms, self.window_ms),
                None => true,
            }
        });

        // New keys may arrive on other shards while retain runs.
        let removed = before.saturating_sub(self.windows.len());
        if removed > 0 {
            debug!(removed = removed, remaining = self.windows.len(), "Swept idle windows");
        }
        removed
    }

    /// Number of distinct keys with live windows.
    pub fn key_count(&self) -> usize {
        self.windows.len()
    }

    /// Current post-prune occupancy for a key, or `None` if the key has no
    /// window.
    pub fn current_count(&self, key: &LimitKey, now_ms: u64) -> Option<usize> {
        let cell = self.windows.get(key)?.clone();
        let mut window = cell.lock();
        window.prune(now_ms, self.window_ms);
        Some(window.len())
    }

    /// Drop all windows.
    ///
    /// This is primarily useful for testing.
    pub fn clear(&self) {
        self.windows.clear();
    }
}
