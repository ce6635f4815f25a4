//! Error types for map operations.

use thiserror::Error;

/// Errors returned by [`TimedMap`](crate::TimedMap) lookups and mutations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MapError {
    /// The map contains no mapping for the key
    #[error("no mapping for key: {key}")]
    NotFound { key: String },

    /// A TTL passed to `put_with_ttl` was negative
    #[error("invalid ttl {ttl}: ttl must be a non-negative number of seconds")]
    InvalidArgument { ttl: i64 },
}

impl MapError {
    pub(crate) fn not_found(key: &str) -> Self {
        MapError::NotFound {
            key: key.to_string(),
        }
    }

    /// Returns `true` if the key was absent.
    pub fn is_not_found(&self) -> bool {
        matches!(self, MapError::NotFound { .. })
    }

    /// Returns `true` if an argument was rejected.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, MapError::InvalidArgument { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_display() {
        let err = MapError::not_found("user:1");
        assert_eq!(err.to_string(), "no mapping for key: user:1");
        assert!(err.is_not_found());
        assert!(!err.is_invalid_argument());
    }

    #[test]
    fn test_invalid_argument_display() {
        let err = MapError::InvalidArgument { ttl: -3 };
        assert_eq!(
            err.to_string(),
            "invalid ttl -3: ttl must be a non-negative number of seconds"
        );
        assert!(err.is_invalid_argument());
    }
}
