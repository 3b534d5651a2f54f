//! Rate limiting logic and state management.

mod key;
mod limiter;
mod store;
mod window;

pub use key::LimitKey;
pub use limiter::{now_millis, Decision, DimensionStats, Identities, RateLimiter, Violation};
pub use store::{WindowDecision, WindowStore};
pub use window::Window;
