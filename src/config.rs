//! Configuration for the rate limiter.
//!
//! A limiter is configured as an ordered list of dimensions. Declaration
//! order matters: it is the order in which `check` evaluates dimensions and
//! therefore determines which dimension a rejection names when several limits
//! are exceeded at once.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use tracing::info;

use crate::error::{GatelimitError, Result};

/// Configuration for one limiting dimension.
///
/// Immutable after construction; reconfiguring requires building a new
/// [`RateLimiter`](crate::RateLimiter).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DimensionConfig {
    /// Dimension name (e.g. `"user"`, `"ip"`). Also the namespace prefix for
    /// this dimension's limit keys.
    pub name: String,
    /// Length of the sliding window in milliseconds.
    pub window_ms: u64,
    /// Maximum admitted requests per key within the window.
    pub max_requests: u32,
}

impl DimensionConfig {
    /// Create a new dimension configuration.
    pub fn new(name: impl Into<String>, window_ms: u64, max_requests: u32) -> Self {
        Self {
            name: name.into(),
            window_ms,
            max_requests,
        }
    }
}

/// A complete rate limiter configuration: an ordered set of dimensions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LimiterConfig {
    /// Dimensions in evaluation order.
    #[serde(default)]
    pub dimensions: Vec<DimensionConfig>,
}

impl LimiterConfig {
    /// Create an empty configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a dimension, preserving declaration order.
    pub fn with_dimension(mut self, dimension: DimensionConfig) -> Self {
        self.dimensions.push(dimension);
        self
    }

    /// Load configuration from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!(path = %path.display(), "Loading rate limiter configuration");

        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    /// Load configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: LimiterConfig = serde_yaml::from_str(yaml).map_err(|e| {
            GatelimitError::Config(format!("Failed to parse limiter config: {}", e))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    ///
    /// Malformed input fails fast here, at configuration time, never during
    /// evaluation: a zero window or zero limit, an empty dimension name, or a
    /// duplicate dimension name is a [`GatelimitError::Config`].
    pub fn validate(&self) -> Result<()> {
        if self.dimensions.is_empty() {
            return Err(GatelimitError::Config(
                "at least one dimension is required".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for dim in &self.dimensions {
            if dim.name.is_empty() {
                return Err(GatelimitError::Config(
                    "dimension name must not be empty".to_string(),
                ));
            }
            if !seen.insert(dim.name.as_str()) {
                return Err(GatelimitError::Config(format!(
                    "duplicate dimension name '{}'",
                    dim.name
                )));
            }
            if dim.window_ms == 0 {
                return Err(GatelimitError::Config(format!(
                    "dimension '{}': window_ms must be positive",
                    dim.name
                )));
            }
            if dim.max_requests == 0 {
                return Err(GatelimitError::Config(format!(
                    "dimension '{}': max_requests must be positive",
                    dim.name
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_yaml_config() {
        let yaml = r#"
dimensions:
  - name: user
    window_ms: 60000
    max_requests: 100
  - name: ip
    window_ms: 60000
    max_requests: 200
"#;
        let config = LimiterConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.dimensions.len(), 2);
        assert_eq!(config.dimensions[0].name, "user");
        assert_eq!(config.dimensions[0].max_requests, 100);
        assert_eq!(config.dimensions[1].name, "ip");
        assert_eq!(config.dimensions[1].window_ms, 60000);
    }

    #[test]
    fn test_yaml_preserves_declaration_order() {
        let yaml = r#"
dimensions:
  - name: ip
    window_ms: 1000
    max_requests: 5
  - name: user
    window_ms: 1000
    max_requests: 5
"#;
        let config = LimiterConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.dimensions[0].name, "ip");
        assert_eq!(config.dimensions[1].name, "user");
    }

    #[test]
    fn test_zero_window_rejected() {
        let config =
            LimiterConfig::new().with_dimension(DimensionConfig::new("user", 0, 100));
        let err = config.validate().unwrap_err();
        assert!(matches!(err, GatelimitError::Config(_)));
        assert!(err.to_string().contains("window_ms"));
    }

    #[test]
    fn test_zero_limit_rejected() {
        let config =
            LimiterConfig::new().with_dimension(DimensionConfig::new("user", 60000, 0));
        let err = config.validate().unwrap_err();
        assert!(matches!(err, GatelimitError::Config(_)));
        assert!(err.to_string().contains("max_requests"));
    }

    #[test]
    fn test_empty_name_rejected() {
        let config = LimiterConfig::new().with_dimension(DimensionConfig::new("", 1000, 1));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let config = LimiterConfig::new()
            .with_dimension(DimensionConfig::new("user", 1000, 1))
            .with_dimension(DimensionConfig::new("user", 2000, 2));
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn test_empty_config_rejected() {
        assert!(LimiterConfig::new().validate().is_err());
    }

    #[test]
    fn test_invalid_yaml_is_config_error() {
        let err = LimiterConfig::from_yaml("dimensions: [{").unwrap_err();
        assert!(matches!(err, GatelimitError::Config(_)));
    }
}
