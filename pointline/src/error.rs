//! Error types for pointline operations.
//!
//! Every fallible operation returns [`Result`]. The error value carries an
//! [`ErrorCode`], and the [`Client`](crate::client::Client) also copies the code
//! and message into its single [`ErrorState`] slot so the last failure can be
//! inspected after the fact.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::point::TimeUnit;

/// Status code of the last operation.
///
/// Numeric values are stable and match the device firmware's status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(u8)]
pub enum ErrorCode {
    /// Operation completed successfully.
    #[default]
    NoError = 0,
    /// Network connection is down.
    NotConnected = 1,
    /// HTTP request failed or the server returned a retryable status.
    HttpError = 2,
    /// Batch buffer is full.
    BatchFull = 3,
    /// Invalid data format or value.
    InvalidData = 4,
    /// Operation timed out.
    Timeout = 5,
    /// Fixed-capacity storage exhausted.
    MemoryError = 6,
    /// Invalid configuration, or client used before `begin`.
    InvalidConfig = 7,
    /// Authentication failed.
    AuthError = 8,
}

impl ErrorCode {
    /// Returns the canonical upper-case name of the code.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NoError => "NO_ERROR",
            Self::NotConnected => "NOT_CONNECTED",
            Self::HttpError => "HTTP_ERROR",
            Self::BatchFull => "BATCH_FULL",
            Self::InvalidData => "INVALID_DATA",
            Self::Timeout => "TIMEOUT",
            Self::MemoryError => "MEMORY_ERROR",
            Self::InvalidConfig => "INVALID_CONFIG",
            Self::AuthError => "AUTH_ERROR",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The main error type for all pointline operations.
#[derive(Error, Debug)]
pub enum PointlineError {
    /// Input rejected before encoding.
    #[error("invalid data: {0}")]
    Validation(#[from] ValidationError),

    /// Tag storage error.
    #[error("tag error: {0}")]
    Tag(#[from] TagError),

    /// Batch buffer error.
    #[error("batch error: {0}")]
    Batch(#[from] BatchError),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// Error reported by the transport or derived from an HTTP response.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
}

impl PointlineError {
    /// Returns the status code this error maps to.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Validation(_) => ErrorCode::InvalidData,
            Self::Tag(e) => e.code(),
            Self::Batch(e) => e.code(),
            Self::Config(_) => ErrorCode::InvalidConfig,
            Self::Transport(e) => e.code(),
        }
    }
}

/// Errors raised by the validate step of the write path.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// A required field is empty.
    #[error("{field} must not be empty")]
    Empty {
        /// Name of the empty field.
        field: &'static str,
    },

    /// A field exceeds its length bound.
    #[error("{field} is {len} bytes (max {max})")]
    TooLong {
        /// Name of the offending field.
        field: &'static str,
        /// Actual length in bytes.
        len: usize,
        /// Allowed maximum in bytes.
        max: usize,
    },

    /// A float field value is NaN or infinite.
    #[error("field '{field}' has non-finite value {value}")]
    NonFiniteFloat {
        /// Field key.
        field: String,
        /// The rejected value.
        value: f64,
    },

    /// A multi-field write was given no fields.
    #[error("point has no fields")]
    NoFields,

    /// The encoded line exceeds `max_point_size`.
    #[error("encoded point is {size} bytes (max {max})")]
    PointTooLarge {
        /// Encoded size in bytes.
        size: usize,
        /// Configured maximum.
        max: usize,
    },

    /// The timestamp cannot be expressed in nanoseconds as a `u64`.
    #[error("timestamp {timestamp} {unit} overflows nanosecond range")]
    TimestampOverflow {
        /// The timestamp as given.
        timestamp: u64,
        /// Unit of the timestamp.
        unit: TimeUnit,
    },
}

/// Errors from the tag set.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TagError {
    /// The tag set is at capacity.
    #[error("tag set is full ({capacity} tags)")]
    Full {
        /// Maximum number of tags.
        capacity: usize,
    },
}

impl TagError {
    /// Returns the status code this error maps to.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Full { .. } => ErrorCode::MemoryError,
        }
    }
}

/// Errors from the batch buffer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BatchError {
    /// The buffer already holds the maximum number of lines.
    #[error("batch buffer is full ({capacity} points)")]
    Full {
        /// Maximum number of buffered lines.
        capacity: usize,
    },

    /// Appending would overflow the static payload buffer.
    #[error("batch payload would need {needed} bytes (static buffer is {limit})")]
    BufferExhausted {
        /// Bytes the payload would occupy.
        needed: usize,
        /// Configured static buffer size.
        limit: usize,
    },

    /// Pre-allocating the payload buffer failed.
    #[error("failed to reserve {bytes} bytes for batch payload")]
    ReserveFailed {
        /// Requested size.
        bytes: usize,
    },
}

impl BatchError {
    /// Returns the status code this error maps to.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Full { .. } => ErrorCode::BatchFull,
            Self::BufferExhausted { .. } | Self::ReserveFailed { .. } => ErrorCode::MemoryError,
        }
    }
}

/// Errors from configuration handling.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A configuration value is out of range or inconsistent.
    #[error("invalid configuration: {reason}")]
    Invalid {
        /// Description of the problem.
        reason: String,
    },

    /// A network operation was attempted before `begin`.
    #[error("client not started: call begin() first")]
    NotStarted,

    /// Failed to read a configuration file.
    #[error("failed to read config '{}': {source}", path.display())]
    Load {
        /// The config file path.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse a configuration file.
    #[error("failed to parse config '{}': {source}", path.display())]
    Parse {
        /// The config file path.
        path: PathBuf,
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },
}

/// Errors from the transport, and HTTP outcomes classified as failures.
#[derive(Error, Debug)]
pub enum TransportError {
    /// The network link is down.
    #[error("network not connected")]
    NotConnected,

    /// The request did not complete within the configured timeout.
    #[error("request timed out")]
    Timeout,

    /// The request could not be delivered.
    #[error("connection failed: {reason}")]
    Connect {
        /// Description from the underlying client.
        reason: String,
    },

    /// The server rejected the credentials.
    #[error("authentication failed (HTTP {status})")]
    Auth {
        /// The HTTP status code.
        status: u16,
    },

    /// The server rejected the request as malformed.
    #[error("request rejected (HTTP {status}): {body}")]
    Rejected {
        /// The HTTP status code.
        status: u16,
        /// The response body text.
        body: String,
    },

    /// The server returned a retryable non-2xx status.
    #[error("HTTP error {status}: {body}")]
    HttpStatus {
        /// The HTTP status code.
        status: u16,
        /// The response body text.
        body: String,
    },

    /// Failed to create the HTTP client.
    #[cfg(feature = "http")]
    #[error("failed to create HTTP client: {source}")]
    ClientCreate {
        /// The underlying reqwest error.
        #[source]
        source: reqwest::Error,
    },
}

impl TransportError {
    /// Returns the status code this error maps to.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::NotConnected => ErrorCode::NotConnected,
            Self::Timeout => ErrorCode::Timeout,
            Self::Connect { .. } | Self::HttpStatus { .. } => ErrorCode::HttpError,
            Self::Auth { .. } => ErrorCode::AuthError,
            Self::Rejected { .. } => ErrorCode::InvalidData,
            #[cfg(feature = "http")]
            Self::ClientCreate { .. } => ErrorCode::HttpError,
        }
    }

    /// Returns `true` if another attempt may succeed.
    ///
    /// Connection failures, timeouts and server-side statuses are transient.
    /// Authentication and malformed-request rejections are not.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout | Self::Connect { .. } | Self::HttpStatus { .. } => true,
            Self::NotConnected | Self::Auth { .. } | Self::Rejected { .. } => false,
            #[cfg(feature = "http")]
            Self::ClientCreate { .. } => false,
        }
    }
}

/// The last-error slot held by each client.
///
/// Purely diagnostic: overwritten by every failing operation and cleared at the
/// start of every write operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorState {
    code: ErrorCode,
    message: String,
}

impl ErrorState {
    /// Creates an empty slot (`NoError`).
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrites the slot.
    pub fn set(&mut self, code: ErrorCode, message: impl Into<String>) {
        self.code = code;
        self.message = message.into();
    }

    /// Overwrites the slot from an error value.
    pub fn record(&mut self, error: &PointlineError) {
        self.set(error.code(), error.to_string());
    }

    /// Resets the slot to `NoError` with an empty message.
    pub fn clear(&mut self) {
        self.code = ErrorCode::NoError;
        self.message.clear();
    }

    /// Returns the stored code.
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// Returns the stored message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns `true` if the slot holds an error.
    pub fn is_error(&self) -> bool {
        self.code != ErrorCode::NoError
    }
}

/// Type alias for `Result<T, PointlineError>`.
pub type Result<T> = std::result::Result<T, PointlineError>;
