//! Error types for FIELDCALL operations

use crate::enums::{StoreOp, TargetTier};
use thiserror::Error;

/// Input errors raised before any call reaches the store.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required field missing: {field}")]
    RequiredFieldMissing { field: String },

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: String,
        min: i64,
        max: i64,
        value: i64,
    },
}

impl ValidationError {
    pub fn missing(field: impl Into<String>) -> Self {
        Self::RequiredFieldMissing {
            field: field.into(),
        }
    }

    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Name of the field the error is about.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::RequiredFieldMissing { field }
            | ValidationError::InvalidValue { field, .. }
            | ValidationError::OutOfRange { field, .. } => field,
        }
    }
}

/// Failures reported by the external store or the transport in front of it.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("{op} request failed: {reason}")]
    Request { op: StoreOp, reason: String },

    #[error("{op} rejected by store ({status}): {message}")]
    Rejected {
        op: StoreOp,
        status: u16,
        message: String,
    },

    #[error("{op}: no record with id {id}")]
    NotFound { op: StoreOp, id: String },

    #[error("{op}: could not decode response: {reason}")]
    Decode { op: StoreOp, reason: String },

    #[error("{op}: unexpected failure: {reason}")]
    Unexpected { op: StoreOp, reason: String },
}

impl StoreError {
    pub fn op(&self) -> StoreOp {
        match self {
            StoreError::Request { op, .. }
            | StoreError::Rejected { op, .. }
            | StoreError::NotFound { op, .. }
            | StoreError::Decode { op, .. }
            | StoreError::Unexpected { op, .. } => *op,
        }
    }

    pub fn is_unexpected(&self) -> bool {
        matches!(self, StoreError::Unexpected { .. })
    }

    /// Message suitable for a toast. Unexpected failures get a generic text.
    pub fn user_message(&self) -> String {
        match self {
            StoreError::Unexpected { .. } => "An unexpected error occurred".to_string(),
            StoreError::Rejected { message, .. } => message.clone(),
            StoreError::NotFound { .. } => "Record not found".to_string(),
            StoreError::Request { reason, .. } | StoreError::Decode { reason, .. } => {
                reason.clone()
            }
        }
    }
}

/// Cadence configuration problems.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CadenceError {
    #[error("No default cadence configured for tier {tier}")]
    MissingTierDefault { tier: TargetTier },

    #[error("Default cadence for tier {tier} must be at least 1 day, got {days}")]
    InvalidTierDefault { tier: TargetTier, days: u32 },
}

/// Master error type for FIELDCALL operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FieldCallError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Cadence(#[from] CadenceError),
}

/// Result type alias for FIELDCALL operations.
pub type FieldCallResult<T> = Result<T, FieldCallError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unexpected_error_has_generic_message() {
        let err = StoreError::Unexpected {
            op: StoreOp::InsertVisit,
            reason: "socket closed mid-frame".to_string(),
        };
        assert!(err.is_unexpected());
        assert_eq!(err.user_message(), "An unexpected error occurred");
    }

    #[test]
    fn test_rejected_error_surfaces_store_message() {
        let err = StoreError::Rejected {
            op: StoreOp::UpdateCadenceSetting,
            status: 400,
            message: "violates check constraint".to_string(),
        };
        assert_eq!(err.op(), StoreOp::UpdateCadenceSetting);
        assert_eq!(err.user_message(), "violates check constraint");
    }

    #[test]
    fn test_validation_error_field() {
        let err = ValidationError::missing("location");
        assert_eq!(err.field(), "location");
        assert_eq!(err.to_string(), "Required field missing: location");
    }

    #[test]
    fn test_master_error_from_conversions() {
        let err: FieldCallError = CadenceError::MissingTierDefault {
            tier: TargetTier::Maintenance,
        }
        .into();
        assert!(matches!(err, FieldCallError::Cadence(_)));
        assert_eq!(
            err.to_string(),
            "No default cadence configured for tier Maintenance"
        );
    }
}
