//! Error types for entity and session construction
//!
//! Only construction can fail. Rejected gestures are not errors: they resolve
//! to an `Ignored` outcome (see [`crate::sim::IgnoreReason`]).

use thiserror::Error;

use crate::tuning::TuningError;

/// An entity was built with an attribute outside its declared bounds.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EntityError {
    #[error("invalid attribute `{attribute}`: {value} is outside [{min}, {max}]")]
    OutOfRange {
        attribute: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("invalid attribute `{attribute}`: {value} is not finite")]
    NotFinite { attribute: &'static str, value: f64 },

    #[error("invalid attribute: cell ({col}, {row}) cannot be both polluted and occupied")]
    PollutedAndOccupied { col: u16, row: u16 },

    #[error("invalid attribute: bin region has no area")]
    EmptyRegion,
}

impl EntityError {
    /// Check `value` against an inclusive range
    pub fn check_range(attribute: &'static str, value: f64, min: f64, max: f64) -> Result<(), Self> {
        if !value.is_finite() {
            return Err(Self::NotFinite { attribute, value });
        }
        if value < min || value > max {
            return Err(Self::OutOfRange {
                attribute,
                value,
                min,
                max,
            });
        }
        Ok(())
    }

    /// Check that `value` is a finite number
    pub fn check_finite(attribute: &'static str, value: f64) -> Result<(), Self> {
        if value.is_finite() {
            Ok(())
        } else {
            Err(Self::NotFinite { attribute, value })
        }
    }
}

/// A session could not be built
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Tuning(#[from] TuningError),

    #[error(transparent)]
    Entity(#[from] EntityError),

    #[error("grid has {found} cells, expected {expected}")]
    GridShape { expected: usize, found: usize },

    #[error("cell #{index} is at ({col}, {row}), out of row-major order")]
    GridOrder { index: usize, col: u16, row: u16 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_accepts_bounds() {
        assert!(EntityError::check_range("speed", 20.0, 20.0, 50.0).is_ok());
        assert!(EntityError::check_range("speed", 50.0, 20.0, 50.0).is_ok());
    }

    #[test]
    fn test_range_rejects_outside() {
        let err = EntityError::check_range("speed", 51.0, 20.0, 50.0).unwrap_err();
        assert!(matches!(err, EntityError::OutOfRange { attribute: "speed", .. }));
        assert!(err.to_string().contains("speed"));
    }

    #[test]
    fn test_nan_is_not_finite() {
        let err = EntityError::check_range("exposure", f64::NAN, 10.0, 100.0).unwrap_err();
        assert!(matches!(err, EntityError::NotFinite { .. }));
    }
}
