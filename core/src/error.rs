//! Error types for the booking client and controller.
//!
//! # Design
//! `Display` on every variant is the user-facing message: the controller
//! turns any error into `FormStatus::Error(err.to_string())` at the
//! operation boundary, so the text here is what the form shows.

use thiserror::Error;

/// Errors produced while building requests or interpreting responses.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The server answered with a non-2xx status. `message` is the server's
    /// own message when it sent one, otherwise a per-endpoint fallback.
    #[error("{message}")]
    HttpError { status: u16, message: String },

    /// The round-trip itself failed (connectivity, DNS, TLS...).
    #[error("{0}")]
    Transport(String),

    /// A success response body could not be deserialized.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    SerializationError(String),
}

impl From<TransportError> for ApiError {
    fn from(err: TransportError) -> Self {
        ApiError::Transport(err.0)
    }
}

/// Reported by the host when it could not complete an HTTP round-trip.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct TransportError(pub String);

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Client-side validation failures raised by `submit` before any request is
/// issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please fill in all fields")]
    MissingFields,

    #[error("Appointment date cannot be in the past")]
    DateInPast,

    /// The chosen date and time has no instant at the current UTC offset.
    #[error("Appointment date is out of range")]
    DateOutOfRange,
}
