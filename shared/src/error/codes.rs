//! Unified error codes for the storefront platform
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 4xxx: Order errors
//! - 5xxx: Payment errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for efficient serialization
/// and cross-language compatibility (Rust, TypeScript, etc.)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Invalid request
    InvalidRequest = 5,
    /// Required field missing
    RequiredField = 7,

    // ==================== 1xxx: Auth ====================
    /// User is not authenticated
    NotAuthenticated = 1001,
    /// Token has expired
    TokenExpired = 1003,
    /// Token is invalid
    TokenInvalid = 1004,

    // ==================== 2xxx: Permission ====================
    /// Permission denied
    PermissionDenied = 2001,

    // ==================== 4xxx: Order ====================
    /// Order not found
    OrderNotFound = 4001,
    /// Order has no line items
    OrderEmpty = 4002,
    /// Invalid line item quantity
    InvalidQuantity = 4003,
    /// Invalid order status transition
    InvalidStatusTransition = 4004,

    // ==================== 5xxx: Payment ====================
    /// Selected payment method is disabled
    PaymentMethodDisabled = 5001,
    /// Payment reference not found
    PaymentReferenceNotFound = 5002,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Storage backend error
    StorageError = 9002,
    /// Configuration error
    ConfigError = 9003,
    /// Transient network error (retryable)
    NetworkError = 9004,
    /// Operation timed out (retryable)
    TimeoutError = 9005,
    /// Upstream service error
    UpstreamError = 9006,
}

impl ErrorCode {
    /// Get the numeric code value
    pub fn code(&self) -> u16 {
        *self as u16
    }

    /// Get the default human-readable message for this error code
    pub fn message(&self) -> &'static str {
        match self {
            Self::Success => "Success",
            Self::Unknown => "Unknown error",
            Self::ValidationFailed => "Validation failed",
            Self::NotFound => "Resource not found",
            Self::InvalidRequest => "Invalid request",
            Self::RequiredField => "Required field missing",

            Self::NotAuthenticated => "Not authenticated",
            Self::TokenExpired => "Token has expired",
            Self::TokenInvalid => "Token is invalid",

            Self::PermissionDenied => "Permission denied",

            Self::OrderNotFound => "Order not found",
            Self::OrderEmpty => "Order has no line items",
            Self::InvalidQuantity => "Line item quantity must be at least 1",
            Self::InvalidStatusTransition => "Invalid order status transition",

            Self::PaymentMethodDisabled => "Payment method is disabled",
            Self::PaymentReferenceNotFound => "Payment reference not found",

            Self::InternalError => "Internal server error",
            Self::StorageError => "Storage backend error",
            Self::ConfigError => "Configuration error",
            Self::NetworkError => "Network error",
            Self::TimeoutError => "Operation timed out",
            Self::UpstreamError => "Upstream service error",
        }
    }

    /// Whether the error is transient and eligible for retry
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::NetworkError | Self::TimeoutError | Self::UpstreamError
        )
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl From<ErrorCode> for u16 {
    fn from(code: ErrorCode) -> Self {
        code as u16
    }
}

/// Error returned when converting an unknown u16 into an [`ErrorCode`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Success),
            1 => Ok(Self::Unknown),
            2 => Ok(Self::ValidationFailed),
            3 => Ok(Self::NotFound),
            5 => Ok(Self::InvalidRequest),
            7 => Ok(Self::RequiredField),
            1001 => Ok(Self::NotAuthenticated),
            1003 => Ok(Self::TokenExpired),
            1004 => Ok(Self::TokenInvalid),
            2001 => Ok(Self::PermissionDenied),
            4001 => Ok(Self::OrderNotFound),
            4002 => Ok(Self::OrderEmpty),
            4003 => Ok(Self::InvalidQuantity),
            4004 => Ok(Self::InvalidStatusTransition),
            5001 => Ok(Self::PaymentMethodDisabled),
            5002 => Ok(Self::PaymentReferenceNotFound),
            9001 => Ok(Self::InternalError),
            9002 => Ok(Self::StorageError),
            9003 => Ok(Self::ConfigError),
            9004 => Ok(Self::NetworkError),
            9005 => Ok(Self::TimeoutError),
            9006 => Ok(Self::UpstreamError),
            other => Err(InvalidErrorCode(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_values() {
        assert_eq!(ErrorCode::Success.code(), 0);
        assert_eq!(ErrorCode::NotAuthenticated.code(), 1001);
        assert_eq!(ErrorCode::OrderNotFound.code(), 4001);
        assert_eq!(ErrorCode::PaymentMethodDisabled.code(), 5001);
        assert_eq!(ErrorCode::InternalError.code(), 9001);
    }

    #[test]
    fn test_roundtrip_u16() {
        for code in [
            ErrorCode::ValidationFailed,
            ErrorCode::PermissionDenied,
            ErrorCode::OrderEmpty,
            ErrorCode::NetworkError,
        ] {
            assert_eq!(ErrorCode::try_from(code.code()), Ok(code));
        }
        assert!(ErrorCode::try_from(12345).is_err());
    }

    #[test]
    fn test_retryable() {
        assert!(ErrorCode::NetworkError.is_retryable());
        assert!(ErrorCode::TimeoutError.is_retryable());
        assert!(!ErrorCode::ValidationFailed.is_retryable());
        assert!(!ErrorCode::PermissionDenied.is_retryable());
    }
}
