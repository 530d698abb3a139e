//! Error types for the cache engine.
//!
//! ## Key Components
//!
//! - [`ConfigError`]: returned by [`CacheBuilder::build`](crate::builder::CacheBuilder::build)
//!   and the config `validate()` methods when a parameter is out of range.
//!   It names the offending field.
//! - [`InvariantError`]: returned by debug-only `check_invariants` methods
//!   when shard or policy bookkeeping disagrees with itself.
//!
//! Steady-state operations never fail: a miss is `None`, an overwrite is a
//! normal insert, and capacity is enforced internally.
//!
//! ## Example Usage
//!
//! ```
//! use bytes::Bytes;
//! use shardcache::builder::CacheBuilder;
//!
//! let err = CacheBuilder::new(0).build::<Bytes, Bytes>().unwrap_err();
//! assert_eq!(err.field(), "capacity");
//! assert!(err.to_string().contains("capacity"));
//! ```

use std::fmt;

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Error returned when cache configuration parameters are invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    field: &'static str,
    message: String,
}

impl ConfigError {
    /// Creates an error for `field` with a human-readable description.
    ///
    /// The description should mention the field; [`Display`](fmt::Display)
    /// prints it verbatim.
    #[inline]
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }

    /// Returns the name of the configuration field that failed validation.
    #[inline]
    pub fn field(&self) -> &'static str {
        self.field
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Checks that `value` is a finite ratio in `[0.0, 1.0]`.
    pub(crate) fn check_ratio(field: &'static str, value: f64) -> Result<(), Self> {
        if value.is_finite() && (0.0..=1.0).contains(&value) {
            Ok(())
        } else {
            Err(Self::new(
                field,
                format!("{field} must be in [0.0, 1.0], got {value}"),
            ))
        }
    }

    /// Checks that `value` lies strictly inside `(0.0, 1.0)`.
    pub(crate) fn check_open_unit(field: &'static str, value: f64) -> Result<(), Self> {
        if value.is_finite() && value > 0.0 && value < 1.0 {
            Ok(())
        } else {
            Err(Self::new(
                field,
                format!("{field} must be in (0.0, 1.0), got {value}"),
            ))
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ConfigError {}

// ---------------------------------------------------------------------------
// InvariantError
// ---------------------------------------------------------------------------

/// Error returned when internal cache invariants are violated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantError(String);

impl InvariantError {
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InvariantError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for InvariantError {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // -- ConfigError ------------------------------------------------------

    #[test]
    fn config_display_shows_message() {
        let err = ConfigError::new("capacity", "capacity must be greater than zero");
        assert_eq!(err.to_string(), "capacity must be greater than zero");
        assert_eq!(err.field(), "capacity");
        assert_eq!(err.message(), "capacity must be greater than zero");
    }

    #[test]
    fn ratio_check_bounds() {
        assert!(ConfigError::check_ratio("r", 0.0).is_ok());
        assert!(ConfigError::check_ratio("r", 1.0).is_ok());
        assert!(ConfigError::check_ratio("r", 0.5).is_ok());

        let err = ConfigError::check_ratio("small_queue_capacity_ratio", 1.5).unwrap_err();
        assert_eq!(err.field(), "small_queue_capacity_ratio");
        assert!(err.to_string().contains("small_queue_capacity_ratio"));

        assert!(ConfigError::check_ratio("r", -0.1).is_err());
        assert!(ConfigError::check_ratio("r", f64::NAN).is_err());
    }

    #[test]
    fn open_unit_check_excludes_endpoints() {
        assert!(ConfigError::check_open_unit("eps", 0.5).is_ok());
        assert!(ConfigError::check_open_unit("eps", 0.0).is_err());
        assert!(ConfigError::check_open_unit("eps", 1.0).is_err());
        assert!(ConfigError::check_open_unit("eps", f64::INFINITY).is_err());
    }

    #[test]
    fn config_clone_and_eq() {
        let a = ConfigError::new("shards", "x");
        assert_eq!(a.clone(), a);
    }

    // -- InvariantError ---------------------------------------------------

    #[test]
    fn invariant_display_shows_message() {
        let err = InvariantError::new("queue length mismatch");
        assert_eq!(err.to_string(), "queue length mismatch");
        assert_eq!(err.message(), "queue length mismatch");
    }

    #[test]
    fn errors_implement_std_error() {
        fn assert_error<T: std::error::Error>() {}
        assert_error::<ConfigError>();
        assert_error::<InvariantError>();
    }
}
