//! Controller configuration parameters
//!
//! Tunables for the serial link and the control loop.  The fixed-capacity
//! limits live here as constants because they size static buffers.

use serde::{Deserialize, Serialize};

use log::{info, warn};

use crate::app::ports::{ConfigError, StorageError, StoragePort};

/// Maximum concurrent logging requests.
pub const MAX_LOGGING_JOBS: usize = 8;

/// Job id used for unsolicited READY notifications.
pub const READY_JOB: u32 = 0;

/// Size of the inbound line buffer in bytes.
pub const LINE_CAPACITY: usize = 200;

/// NVS namespace and key for the persisted pin-mode table.
pub const STORAGE_NAMESPACE: &str = "plcio";
pub const PIN_MODES_KEY: &str = "pin_modes";

/// NVS key for the persisted [`ControllerConfig`].
pub const CONFIG_KEY: &str = "config";

const CONFIG_BLOB_MAX: usize = 64;

/// Core controller configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControllerConfig {
    // --- Serial link ---
    /// UART baud rate (8N1)
    pub baud_rate: u32,
    /// Longest accepted inbound line, excluding the newline
    pub max_line_len: usize,

    // --- I/O ---
    /// High time of TRIGGER_PULSE (milliseconds)
    pub pulse_width_ms: u32,

    // --- Timing ---
    /// Idle delay between control loop iterations (milliseconds)
    pub loop_interval_ms: u32,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            baud_rate: 19_200,
            max_line_len: LINE_CAPACITY,
            pulse_width_ms: 100,
            loop_interval_ms: 1,
        }
    }
}

impl ControllerConfig {
    /// Range-check every field.  Invalid values are rejected, not clamped.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1_200..=921_600).contains(&self.baud_rate) {
            return Err(ConfigError::ValidationFailed(
                "baud_rate must be 1200–921600",
            ));
        }
        if !(16..=LINE_CAPACITY).contains(&self.max_line_len) {
            return Err(ConfigError::ValidationFailed(
                "max_line_len must be 16–200",
            ));
        }
        if !(1..=10_000).contains(&self.pulse_width_ms) {
            return Err(ConfigError::ValidationFailed(
                "pulse_width_ms must be 1–10000",
            ));
        }
        if !(1..=1_000).contains(&self.loop_interval_ms) {
            return Err(ConfigError::ValidationFailed(
                "loop_interval_ms must be 1–1000",
            ));
        }
        Ok(())
    }

    /// Load the stored configuration, falling back to defaults when the
    /// blob is absent, undecodable or out of range.
    pub fn load(store: &impl StoragePort) -> Self {
        let mut buf = [0u8; CONFIG_BLOB_MAX];
        let len = match store.read(STORAGE_NAMESPACE, CONFIG_KEY, &mut buf) {
            Ok(len) => len,
            Err(StorageError::NotFound) => {
                info!("Config: none stored, using defaults");
                return Self::default();
            }
            Err(e) => {
                warn!("Config: read failed ({}), using defaults", e);
                return Self::default();
            }
        };
        let cfg: Self = match postcard::from_bytes(&buf[..len]) {
            Ok(cfg) => cfg,
            Err(_) => {
                warn!("Config: stored blob corrupted, using defaults");
                return Self::default();
            }
        };
        match cfg.validate() {
            Ok(()) => {
                info!("Config: loaded ({} bytes)", len);
                cfg
            }
            Err(e) => {
                warn!("Config: stored values rejected ({}), using defaults", e);
                Self::default()
            }
        }
    }

    /// Validate and persist.
    pub fn save(&self, store: &mut impl StoragePort) -> Result<(), ConfigError> {
        self.validate()?;
        let bytes = postcard::to_allocvec(self).map_err(|_| ConfigError::IoError)?;
        store
            .write(STORAGE_NAMESPACE, CONFIG_KEY, &bytes)
            .map_err(|_| ConfigError::IoError)
    }
}
