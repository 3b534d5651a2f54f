//! Gatelimit - Multi-Dimension Sliding-Window Rate Limiting
//!
//! This crate gates inbound requests by several independent identity
//! dimensions (per-user, per-source-address, ...) using a sliding-window
//! count of admitted traffic per key. The HTTP layer stays outside: the
//! caller supplies one identity per configured dimension plus a timestamp,
//! and translates the returned decision into its own protocol responses.
//!
//! ```
//! use gatelimit::{DimensionConfig, Identities, LimiterConfig, RateLimiter};
//!
//! let config = LimiterConfig::new()
//!     .with_dimension(DimensionConfig::new("user", 60_000, 100))
//!     .with_dimension(DimensionConfig::new("ip", 60_000, 200));
//! let limiter = RateLimiter::new(config).unwrap();
//!
//! let identities = Identities::new().with("user", "42").with("ip", "10.0.0.1");
//! let decision = limiter.check(&identities, 0).unwrap();
//! assert!(decision.is_admitted());
//! ```

pub mod config;
pub mod error;
pub mod ratelimit;

pub use config::{DimensionConfig, LimiterConfig};
pub use error::{GatelimitError, Result};
pub use ratelimit::{Decision, DimensionStats, Identities, RateLimiter, Violation};
