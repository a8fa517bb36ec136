use thiserror::Error;

/// Result type for capability calls made across the foreign boundary.
pub type CapabilityResult<T> = Result<T, CapabilityError>;

/// Errors raised by platform capabilities (implemented by the host).
#[derive(Debug, Error, uniffi::Error)]
pub enum CapabilityError {
    /// The OS service backing the capability is missing on this device or OS version.
    #[error("capability unavailable: {0}")]
    Unavailable(String),

    /// The OS service raised an error while answering the call.
    #[error("platform error: {0}")]
    Platform(String),

    /// Unexpected `UniFFI` callback error.
    #[error("unexpected uniffi callback error: {0}")]
    UnexpectedUniFFICallbackError(String),
}

impl From<uniffi::UnexpectedUniFFICallbackError> for CapabilityError {
    fn from(error: uniffi::UnexpectedUniFFICallbackError) -> Self {
        Self::UnexpectedUniFFICallbackError(error.reason)
    }
}

impl CapabilityError {
    /// Whether the error only signals that the capability is absent.
    #[must_use]
    pub const fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}

/// Error outputs from `MDMKit`
#[derive(Debug, Error, uniffi::Error)]
pub enum MdmKitError {
    /// A lock or unlock request whose preconditions were not met.
    #[error("operation_failed: {message}")]
    OperationFailed {
        /// Human readable reason, forwarded to the host as the rejection message.
        message: String,
    },
    /// An unanticipated failure from a platform capability.
    #[error("unexpected_platform_error: {message}")]
    UnexpectedPlatformError {
        /// The underlying platform message.
        message: String,
    },
    /// The presented input is not valid for the requested operation
    #[error("invalid_input_{attribute}: {reason}")]
    InvalidInput {
        /// The attribute that is invalid
        attribute: String,
        /// The reason the input is invalid
        reason: String,
    },
}

impl MdmKitError {
    pub(crate) fn operation_failed(message: &str) -> Self {
        Self::OperationFailed {
            message: message.to_string(),
        }
    }
}

impl From<CapabilityError> for MdmKitError {
    fn from(error: CapabilityError) -> Self {
        Self::UnexpectedPlatformError {
            message: error.to_string(),
        }
    }
}
