//! Error types for the PLC I/O firmware.
//!
//! Every failure the controller can report to a host is one of the
//! [`ErrorCode`] variants; they travel on the wire as their upper-case
//! names.  All types here are `Copy` so they can be returned from the
//! registry and scheduler without allocation.

use core::fmt;

// ---------------------------------------------------------------------------
// Wire error codes
// ---------------------------------------------------------------------------

/// Protocol-level error taxonomy.  None of these are fatal: each one aborts
/// processing of a single message and produces exactly one error response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// Inbound line was not a JSON object (or overflowed the line buffer).
    DeserializeJsonFailed,
    /// Message carried no usable `job` field.
    NoJobId,
    /// A required argument was missing or malformed.
    InvalidKey,
    /// `command` was missing or not one of the known request names.
    InvalidCommand,
    /// Pin name does not resolve to a catalogue entry.
    InvalidPin,
    /// Pin is not currently configured as an output.
    InvalidOutputPin,
    /// Pin is not currently configured as an input.
    InvalidInputPin,
    /// Output level is not legal for the pin's signal kind.
    InvalidOutputLevel,
    /// Mode string is unknown or not allowed by the pin's capability.
    InvalidPinMode,
    /// The logging table is full.
    TooManyLoggingJobs,
    /// A logging request already exists for this pin.
    DuplicateLoggingJob,
    /// No logging request exists for this pin.
    LoggingRequestNotFound,
}

impl ErrorCode {
    /// Upper-case name carried in the `error` field of a response.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::DeserializeJsonFailed => "DESERIALIZE_JSON_FAILED",
            Self::NoJobId => "NO_JOB_ID",
            Self::InvalidKey => "INVALID_KEY",
            Self::InvalidCommand => "INVALID_COMMAND",
            Self::InvalidPin => "INVALID_PIN",
            Self::InvalidOutputPin => "INVALID_OUTPUT_PIN",
            Self::InvalidInputPin => "INVALID_INPUT_PIN",
            Self::InvalidOutputLevel => "INVALID_OUTPUT_LEVEL",
            Self::InvalidPinMode => "INVALID_PIN_MODE",
            Self::TooManyLoggingJobs => "TOO_MANY_LOGGING_JOBS",
            Self::DuplicateLoggingJob => "DUPLICATE_LOGGING_JOB",
            Self::LoggingRequestNotFound => "LOGGING_REQUEST_NOT_FOUND",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Scheduler errors
// ---------------------------------------------------------------------------

/// Admission and lookup failures from the logging scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerError {
    /// All logging slots are in use.
    CapacityExceeded,
    /// The pin already has an active request.
    DuplicatePin,
    /// No request exists for the pin.
    NotFound,
}

impl fmt::Display for SchedulerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CapacityExceeded => write!(f, "logging table full"),
            Self::DuplicatePin => write!(f, "pin already logged"),
            Self::NotFound => write!(f, "no logging request for pin"),
        }
    }
}

impl From<SchedulerError> for ErrorCode {
    fn from(e: SchedulerError) -> Self {
        match e {
            SchedulerError::CapacityExceeded => Self::TooManyLoggingJobs,
            SchedulerError::DuplicatePin => Self::DuplicateLoggingJob,
            SchedulerError::NotFound => Self::LoggingRequestNotFound,
        }
    }
}
