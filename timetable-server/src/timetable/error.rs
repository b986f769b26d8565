//! Timetable engine errors.

use crate::domain::StationId;
use crate::matrix::MatrixError;
use crate::store::StoreError;

/// Errors from timetable generation.
#[derive(Debug, thiserror::Error)]
pub enum TimetableError {
    #[error("Bus station with ID {0} does not exist")]
    StationNotFound(StationId),

    /// Neither a final-stop direction nor a shared direction connects the stations
    #[error("no departures found between stations {from} and {to}")]
    NoRoute { from: StationId, to: StationId },

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("distance matrix error: {0}")]
    Matrix(#[from] MatrixError),
}

impl TimetableError {
    /// Whether the request named something that doesn't exist, as opposed to
    /// an upstream failure.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            TimetableError::StationNotFound(_) | TimetableError::NoRoute { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = TimetableError::StationNotFound(StationId(42));
        assert_eq!(err.to_string(), "Bus station with ID 42 does not exist");

        let err = TimetableError::NoRoute {
            from: StationId(1),
            to: StationId(2),
        };
        assert_eq!(err.to_string(), "no departures found between stations 1 and 2");
    }

    #[test]
    fn not_found_classification() {
        assert!(TimetableError::StationNotFound(StationId(1)).is_not_found());
        assert!(
            TimetableError::NoRoute {
                from: StationId(1),
                to: StationId(2)
            }
            .is_not_found()
        );
        assert!(!TimetableError::Matrix(MatrixError::RateLimited).is_not_found());
        assert!(!TimetableError::Store(StoreError::InvalidRow("x".into())).is_not_found());
    }
}
