//! Error types for the delivery core.

use thiserror::Error;

use super::UnitId;

/// Result type alias for delivery operations
pub type DeliveryResult<T> = Result<T, DeliveryError>;

/// Expected, user-facing rejections. None of them leaves state half-applied.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeliveryError {
    #[error("session has no registered unit")]
    NotRegistered,

    #[error("request already outstanding for unit {unit}")]
    AlreadyOutstanding { unit: UnitId },

    #[error("no outstanding request for unit {unit}")]
    NotFound { unit: UnitId },

    #[error("no delivery group designated for unit {unit}")]
    NoDeliveryTarget { unit: UnitId },

    #[error("unit identifier must not be empty")]
    InvalidUnit,
}

impl DeliveryError {
    /// Create an already-outstanding error
    pub fn already_outstanding(unit: &UnitId) -> Self {
        Self::AlreadyOutstanding { unit: unit.clone() }
    }

    /// Create a not found error
    pub fn not_found(unit: &UnitId) -> Self {
        Self::NotFound { unit: unit.clone() }
    }

    /// Create a missing delivery target error
    pub fn no_delivery_target(unit: &UnitId) -> Self {
        Self::NoDeliveryTarget { unit: unit.clone() }
    }
}
