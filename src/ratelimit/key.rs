//! Limit key generation and handling.

/// A key that uniquely identifies one counting bucket within a dimension.
///
/// Keys are namespaced with the dimension name (`"user:42"`,
/// `"ip:10.0.0.1"`), so keys from different dimensions are disjoint by
/// construction even before the per-dimension store split.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LimitKey(String);

impl LimitKey {
    /// Create a key from a dimension name and an identity value.
    pub fn new(dimension: &str, identity: &str) -> Self {
        Self(format!("{}:{}", dimension, identity))
    }

    /// The key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for LimitKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_format() {
        let key = LimitKey::new("user", "42");
        assert_eq!(key.as_str(), "user:42");
        assert_eq!(key.to_string(), "user:42");
    }

    #[test]
    fn test_key_equality() {
        assert_eq!(LimitKey::new("ip", "10.0.0.1"), LimitKey::new("ip", "10.0.0.1"));
        assert_ne!(LimitKey::new("user", "a"), LimitKey::new("ip", "a"));
    }
}
