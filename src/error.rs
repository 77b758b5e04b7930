//! Construction-time configuration errors.

use thiserror::Error;

/// Rejected widget configuration.
///
/// Attach validates its configuration before spawning anything, so an
/// `Err` from attach means no sub-elements exist and no bindings were
/// made; there is nothing to tear down.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// The maximum progress value must be finite and greater than zero;
    /// every incoming value is normalized against it.
    #[error("max value must be finite and greater than zero, got {0}")]
    InvalidMaxValue(f64),

    /// A unit meter needs at least one unit.
    #[error("unit count must be greater than zero")]
    ZeroUnitCount,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            ConfigError::InvalidMaxValue(0.0).to_string(),
            "max value must be finite and greater than zero, got 0"
        );
        assert_eq!(
            ConfigError::ZeroUnitCount.to_string(),
            "unit count must be greater than zero"
        );
    }
}
