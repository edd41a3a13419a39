//! Pin registry: per-pin mode state plus typed access to the pin driver.
//!
//! The registry is the only owner of the current mode of every catalogue
//! pin.  It does not enforce capability rules on [`PinRegistry::set_mode`];
//! the dispatcher validates requests before calling in, while the bulk
//! operations (`load_defaults`, `reset_all`) only ever apply modes the
//! capability allows.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::PinState;
use log::{info, warn};

use crate::app::ports::{PinDriver, StorageError, StoragePort};
use crate::config::{PIN_MODES_KEY, STORAGE_NAMESPACE};
use crate::pins::{Capability, PIN_COUNT, Pin, PinMode, SignalKind};

/// Upper bound on the encoded mode table (one byte per mode plus length).
const MODE_BLOB_MAX: usize = 64;

/// A sampled pin value, tagged by signal kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinReading {
    Digital(PinState),
    Analog(u16),
}

impl PinReading {
    /// Numeric form used in logging samples: 0/1 or raw counts.
    pub fn value(self) -> u16 {
        match self {
            Self::Digital(PinState::High) => 1,
            Self::Digital(PinState::Low) => 0,
            Self::Analog(raw) => raw,
        }
    }
}

pub struct PinRegistry {
    modes: [PinMode; PIN_COUNT],
}

impl Default for PinRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl PinRegistry {
    /// Every pin starts `Undefined` until [`load_defaults`](Self::load_defaults) runs.
    pub fn new() -> Self {
        Self {
            modes: [PinMode::Undefined; PIN_COUNT],
        }
    }

    // ── Static lookups ────────────────────────────────────────

    pub fn capability(&self, pin: Pin) -> Capability {
        pin.capability()
    }

    pub fn signal_kind(&self, pin: Pin) -> SignalKind {
        pin.kind()
    }

    // ── Mode state ────────────────────────────────────────────

    pub fn mode(&self, pin: Pin) -> PinMode {
        self.modes[pin.index()]
    }

    /// Snapshot of every mode in catalogue order.
    pub fn modes(&self) -> &[PinMode; PIN_COUNT] {
        &self.modes
    }

    /// Store `mode` and apply it to the hardware.  No capability check.
    pub fn set_mode(&mut self, pin: Pin, mode: PinMode, hw: &mut impl PinDriver) {
        self.modes[pin.index()] = mode;
        hw.configure(pin, mode);
    }

    // ── Signal access ─────────────────────────────────────────

    pub fn read_digital(&self, pin: Pin, hw: &mut impl PinDriver) -> PinState {
        hw.read_digital(pin)
    }

    pub fn read_analog(&self, pin: Pin, hw: &mut impl PinDriver) -> u16 {
        hw.read_analog(pin)
    }

    /// Read `pin` according to its signal kind.
    pub fn read(&self, pin: Pin, hw: &mut impl PinDriver) -> PinReading {
        match pin.kind() {
            SignalKind::Digital => PinReading::Digital(self.read_digital(pin, hw)),
            SignalKind::Analog => PinReading::Analog(self.read_analog(pin, hw)),
        }
    }

    pub fn write_digital(&self, pin: Pin, level: PinState, hw: &mut impl PinDriver) {
        hw.write_digital(pin, level);
    }

    pub fn write_analog(&self, pin: Pin, level: u8, hw: &mut impl PinDriver) {
        hw.write_analog(pin, level);
    }

    /// Drive `pin` high, hold for `width_ms`, then drive it low.
    ///
    /// Blocks the caller for the whole hold time: no messages are read and
    /// no logging samples are taken while the pulse is high.
    pub fn trigger_pulse(&self, pin: Pin, width_ms: u32, hw: &mut (impl PinDriver + DelayNs)) {
        hw.write_digital(pin, PinState::High);
        hw.delay_ms(width_ms);
        hw.write_digital(pin, PinState::Low);
    }

    // ── Bulk operations ───────────────────────────────────────

    /// Apply the persisted mode table, falling back to factory modes for
    /// any pin whose stored mode is missing or not allowed.
    pub fn load_defaults(&mut self, store: &impl StoragePort, hw: &mut impl PinDriver) {
        let stored = match Self::read_stored(store) {
            Ok(modes) => {
                info!("PinRegistry: loaded {} stored pin modes", modes.len());
                modes
            }
            Err(StorageError::NotFound) => {
                info!("PinRegistry: no stored pin modes, using factory defaults");
                heapless::Vec::new()
            }
            Err(e) => {
                warn!("PinRegistry: stored pin modes unusable ({}), using factory defaults", e);
                heapless::Vec::new()
            }
        };

        for pin in Pin::ALL {
            let capability = pin.capability();
            let mode = stored
                .get(pin.index())
                .copied()
                .filter(|m| capability.allows(*m))
                .unwrap_or_else(|| capability.default_mode());
            self.set_mode(pin, mode, hw);
        }
    }

    /// Persist the current mode table.
    pub fn save_modes(&self, store: &mut impl StoragePort) -> Result<(), StorageError> {
        let bytes = postcard::to_allocvec(&self.modes[..]).map_err(|_| StorageError::IoError)?;
        store.write(STORAGE_NAMESPACE, PIN_MODES_KEY, &bytes)?;
        info!("PinRegistry: saved pin modes ({} bytes)", bytes.len());
        Ok(())
    }

    /// Force every pin back to its factory direction.  Does not touch storage.
    /// Output-only pins (DAC0, DAC1) keep `OUTPUT`; everything else becomes `INPUT`.
    pub fn reset_all(&mut self, hw: &mut impl PinDriver) {
        for pin in Pin::ALL {
            self.set_mode(pin, pin.capability().default_mode(), hw);
        }
        info!("PinRegistry: all pins reset");
    }

    fn read_stored(
        store: &impl StoragePort,
    ) -> Result<heapless::Vec<PinMode, PIN_COUNT>, StorageError> {
        let mut buf = [0u8; MODE_BLOB_MAX];
        let len = store.read(STORAGE_NAMESPACE, PIN_MODES_KEY, &mut buf)?;
        postcard::from_bytes(&buf[..len]).map_err(|_| StorageError::Corrupted)
    }
}
