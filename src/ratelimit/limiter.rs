//! Core rate limiter implementation.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, trace};

use crate::config::LimiterConfig;
use crate::error::{GatelimitError, Result};

use super::key::LimitKey;
use super::store::WindowStore;

/// The identities of one inbound request: dimension name → identity value.
#[derive(Debug, Clone, Default)]
pub struct Identities {
    values: HashMap<String, String>,
}

impl Identities {
    /// Create an empty identity set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an identity for a dimension.
    pub fn with(mut self, dimension: impl Into<String>, identity: impl Into<String>) -> Self {
        self.values.insert(dimension.into(), identity.into());
        self
    }

    /// Look up the identity supplied for a dimension.
    pub fn get(&self, dimension: &str) -> Option<&str> {
        self.values.get(dimension).map(String::as_str)
    }
}

/// Details of a rate-limit rejection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// The first dimension, in declaration order, found at capacity.
    pub dimension: String,
    /// That dimension's configured request limit.
    pub limit: u32,
    /// Milliseconds until the oldest recorded request ages out and frees one
    /// slot; callers derive retry-after hints from this.
    pub retry_after_ms: u64,
}

/// The outcome of a rate-limit check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// The request may proceed; it has been recorded against every
    /// dimension's window.
    Admitted,
    /// The request exceeded a limit; no window was mutated.
    Rejected(Violation),
}

impl Decision {
    /// Whether the request was admitted.
    pub fn is_admitted(&self) -> bool {
        matches!(self, Decision::Admitted)
    }

    /// The violation behind a rejection, if any.
    pub fn violation(&self) -> Option<&Violation> {
        match self {
            Decision::Admitted => None,
            Decision::Rejected(violation) => Some(violation),
        }
    }
}

/// Point-in-time counters for one dimension, for metrics export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DimensionStats {
    /// Dimension name.
    pub dimension: String,
    /// Configured window length in milliseconds.
    pub window_ms: u64,
    /// Configured per-key request limit.
    pub max_requests: u32,
    /// Number of distinct keys with live windows.
    pub tracked_keys: usize,
}

/// One configured limiting dimension and its window storage.
struct Dimension {
    name: String,
    store: WindowStore,
}

/// The core rate limiter: one window store per configured dimension.
///
/// Dimensions are evaluated in declaration order, and a rejection always
/// names the first dimension found at capacity. The limiter owns all window
/// state; it holds no global lock, so checks for unrelated keys proceed in
/// parallel. Instances are independent — there is no process-global state —
/// and the struct is safe to share across threads behind an [`Arc`].
pub struct RateLimiter {
    dimensions: Vec<Dimension>,
}

impl RateLimiter {
    /// Build a rate limiter from a validated configuration.
    ///
    /// Returns [`GatelimitError::Config`] for a zero window, zero limit, or
    /// empty/duplicate dimension names; nothing is constructed on failure.
    pub fn new(config: LimiterConfig) -> Result<Self> {
        config.validate()?;

        let dimensions = config
            .dimensions
            .into_iter()
            .map(|dim| Dimension {
                store: WindowStore::new(dim.window_ms, dim.max_requests),
                name: dim.name,
            })
            .collect();

        Ok(Self { dimensions })
    }

    /// Check one request against every configured dimension.
    ///
    /// Returns [`GatelimitError::MissingIdentity`] if the caller supplied no
    /// identity for a configured dimension; no window is touched in that
    /// case. Otherwise the check is two-phase: every dimension's per-key
    /// window is locked and tested in declaration order, and only if all of
    /// them have room is `now_ms` recorded against each. A rejection
    /// therefore mutates nothing, and names the first dimension at capacity.
    pub fn check(&self, identities: &Identities, now_ms: u64) -> Result<Decision> {
        // Resolve every identity before touching any window.
        let mut keys = Vec::with_capacity(self.dimensions.len());
        for dim in &self.dimensions {
            let identity =
                identities
                    .get(&dim.name)
                    .ok_or_else(|| GatelimitError::MissingIdentity {
                        dimension: dim.name.clone(),
                    })?;
            keys.push(LimitKey::new(&dim.name, identity));
        }

        trace!(dimensions = self.dimensions.len(), now_ms = now_ms, "Checking rate limit");

        // Phase one: lock each dimension's window in declaration order and
        // test capacity. The acquisition order is the same for every caller,
        // so holding several locks at once cannot deadlock.
        let mut held = Vec::with_capacity(self.dimensions.len());
        for (dim, key) in self.dimensions.iter().zip(&keys) {
            let cell = dim.store.checkout(key);
            let mut window = cell.lock_arc();

            window.prune(now_ms, dim.store.window_ms());

            if window.len() >= dim.store.max_requests() as usize {
                let violation = Violation {
                    dimension: dim.name.clone(),
                    limit: dim.store.max_requests(),
                    retry_after_ms: window.retry_after_ms(now_ms, dim.store.window_ms()),
                };
                debug!(
                    key = %key,
                    limit = violation.limit,
                    retry_after_ms = violation.retry_after_ms,
                    "Rate limit exceeded"
                );
                return Ok(Decision::Rejected(violation));
            }

            held.push(window);
        }

        // Phase two: every dimension admits; record against all of them.
        for window in &mut held {
            window.record(now_ms);
        }

        Ok(Decision::Admitted)
    }

    /// Remove idle windows across all dimensions, returning the number
    /// removed. See [`WindowStore::remove_idle`].
    pub fn sweep(&self, now_ms: u64) -> usize {
        self.dimensions
            .iter()
            .map(|dim| dim.store.remove_idle(now_ms))
            .sum()
    }

    /// Run the idle sweep on a fixed cadence until the task is dropped.
    ///
    /// This is the bounded-resource policy for many-transient-key workloads:
    /// windows whose entries have all aged out are reclaimed in the
    /// background instead of accumulating for the life of the process.
    pub async fn run_sweeper(self: Arc<Self>, period: Duration) {
        let mut interval = tokio::time::interval(period);
        loop {
            interval.tick().await;
            self.sweep(now_millis());
        }
    }

    /// Per-dimension counters for metrics export.
    pub fn stats(&self) -> Vec<DimensionStats> {
        self.dimensions
            .iter()
            .map(|dim| DimensionStats {
                dimension: dim.name.clone(),
                window_ms: dim.store.window_ms(),
                max_requests: dim.store.max_requests(),
                tracked_keys: dim.store.key_count(),
            })
            .collect()
    }

    /// Current post-prune occupancy for one dimension/identity pair.
    ///
    /// Returns `None` for an unknown dimension or an identity with no window.
    pub fn current_count(&self, dimension: &str, identity: &str, now_ms: u64) -> Option<usize> {
        let dim = self.dimensions.iter().find(|d| d.name == dimension)?;
        dim.store
            .current_count(&LimitKey::new(dimension, identity), now_ms)
    }
}

/// Current wall-clock time as epoch milliseconds.
///
/// The core takes timestamps from the caller; only the background sweeper
/// reads the clock itself.
pub fn now_millis() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
