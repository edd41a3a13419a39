//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ Controller (domain)
//! ```
//!
//! Driven adapters (pin driver, response sink, storage) implement these
//! traits.  The [`Controller`](super::service::Controller) consumes them via
//! generics, so the domain core never touches hardware directly.
//!
//! All port errors are typed; callers must handle every variant explicitly.

use embedded_hal::digital::PinState;

use crate::pins::{Pin, PinMode};

// ───────────────────────────────────────────────────────────────
// Pin driver port (driven adapter: domain ↔ GPIO / ADC / PWM)
// ───────────────────────────────────────────────────────────────

/// Physical access to the catalogue pins.
///
/// Implementations look up the GPIO / channel through [`Pin::info`].  They
/// never reject a call: capability and mode checks happen in the dispatcher
/// before the driver is reached.
pub trait PinDriver {
    /// Apply an electrical configuration.
    fn configure(&mut self, pin: Pin, mode: PinMode);

    /// Sample a digital level.
    fn read_digital(&mut self, pin: Pin) -> PinState;

    /// Sample an analog input (raw ADC counts).
    fn read_analog(&mut self, pin: Pin) -> u16;

    /// Drive a digital level.
    fn write_digital(&mut self, pin: Pin, level: PinState);

    /// Drive an analog output (8-bit duty).
    fn write_analog(&mut self, pin: Pin, level: u8);
}

// ───────────────────────────────────────────────────────────────
// Response sink port (driven adapter: domain → transport)
// ───────────────────────────────────────────────────────────────

/// Outbound side of the line protocol.  Receives one encoded JSON object
/// per call, without the trailing newline.
pub trait ResponseSink {
    fn send(&mut self, line: &str);
}

// ───────────────────────────────────────────────────────────────
// Storage port (driven adapter: domain ↔ NVS / flash)
// ───────────────────────────────────────────────────────────────

/// Persistent key-value storage, used for the saved pin-mode table.
///
/// - Keys are namespaced to prevent collisions between subsystems.
/// - Write operations MUST be atomic: no partial writes on power loss.
///   The ESP-IDF NVS API guarantees this natively; in-memory simulation
///   achieves it trivially.
pub trait StoragePort {
    /// Read a value.  Returns the number of bytes written to `buf`.
    fn read(&self, namespace: &str, key: &str, buf: &mut [u8]) -> Result<usize, StorageError>;

    /// Write a value atomically.
    fn write(&mut self, namespace: &str, key: &str, data: &[u8]) -> Result<(), StorageError>;

    /// Delete a key.  Returns `Ok(())` even if the key didn't exist.
    fn delete(&mut self, namespace: &str, key: &str) -> Result<(), StorageError>;

    /// Check whether a key exists without reading it.
    fn exists(&self, namespace: &str, key: &str) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Sample delegate (decouples scheduler from registry and protocol)
// ───────────────────────────────────────────────────────────────

/// One emitted logging sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sample {
    /// Job id of the owning logging request.
    pub job: u32,
    /// Monotonic milliseconds at which the pin was read.
    pub time: u64,
    /// 0/1 for digital pins, raw ADC counts for analog pins.
    pub value: u16,
    /// Last sample of a request that has been asked to stop.
    pub done: bool,
}

/// Callback trait the [`LoggingScheduler`](crate::scheduler::LoggingScheduler)
/// drives on every due request.
///
/// The scheduler knows nothing about pins, drivers or the wire format; the
/// controller implements this by reading through the registry and building
/// the `RX_LOG_SIGNAL` line.
pub trait SampleDelegate {
    /// Read the current value of `pin`.
    fn read(&mut self, pin: Pin) -> u16;

    /// Deliver a sample.
    fn on_sample(&mut self, sample: &Sample);
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from configuration validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// A config field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
    /// The config could not be written to storage.
    IoError,
}

/// Errors from [`StoragePort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageError {
    /// Requested key does not exist.
    NotFound,
    /// Storage partition is full.
    Full,
    /// Generic I/O error.
    IoError,
    /// Stored blob could not be decoded.
    Corrupted,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::IoError => write!(f, "config I/O error"),
        }
    }
}

impl core::fmt::Display for StorageError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "key not found"),
            Self::Full => write!(f, "storage full"),
            Self::IoError => write!(f, "I/O error"),
            Self::Corrupted => write!(f, "stored data corrupted"),
        }
    }
}
