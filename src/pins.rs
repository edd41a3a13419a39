//! Pin catalogue for the PLC I/O main board.
//!
//! Single source of truth for every controllable terminal: its wire name,
//! the ESP32-S3 GPIO it is routed to, its signal kind and what it can be
//! configured as.  The table is indexed by [`Pin`] discriminant, so every
//! lookup is a bounds-free array access.
//!
//! ```text
//!  Terminal   GPIO        Kind     Capability
//!  ─────────  ──────────  ───────  ───────────────
//!  D30–D41    7–18        digital  input / output
//!  D42        21          digital  input / output
//!  D43–D47    38–42       digital  input / output
//!  D48–D49    47–48       digital  input / output
//!  A0–A3      1–4         analog   input only  (ADC1 CH0–CH3)
//!  DAC0–DAC1  5–6         analog   output only (LEDC CH0–CH1, 8-bit)
//! ```

use serde::{Deserialize, Serialize};

/// Number of pins in the catalogue.
pub const PIN_COUNT: usize = 26;

// ---------------------------------------------------------------------------
// Pin identity
// ---------------------------------------------------------------------------

/// Closed set of controllable terminals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum Pin {
    D30 = 0,
    D31,
    D32,
    D33,
    D34,
    D35,
    D36,
    D37,
    D38,
    D39,
    D40,
    D41,
    D42,
    D43,
    D44,
    D45,
    D46,
    D47,
    D48,
    D49,
    A0,
    A1,
    A2,
    A3,
    Dac0,
    Dac1,
}

/// Whether a pin carries a binary level or a sampled/PWM value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalKind {
    Digital,
    Analog,
}

/// Which directions a pin may ever be configured for.  Fixed per pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    InputOnly,
    OutputOnly,
    InputOutput,
}

impl Capability {
    /// Whether `mode` is a legal configuration for a pin of this class.
    pub const fn allows(self, mode: PinMode) -> bool {
        match mode {
            PinMode::Input | PinMode::InputPullup => {
                matches!(self, Self::InputOnly | Self::InputOutput)
            }
            PinMode::Output => matches!(self, Self::OutputOnly | Self::InputOutput),
            PinMode::Undefined => false,
        }
    }

    /// Factory mode: input wherever the hardware can read, else output.
    pub const fn default_mode(self) -> PinMode {
        match self {
            Self::OutputOnly => PinMode::Output,
            Self::InputOnly | Self::InputOutput => PinMode::Input,
        }
    }
}

// ---------------------------------------------------------------------------
// Pin modes
// ---------------------------------------------------------------------------

/// Electrical configuration of a pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PinMode {
    Input,
    Output,
    InputPullup,
    /// Not yet configured (before the first mode load).
    #[default]
    Undefined,
}

impl PinMode {
    /// Wire label.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Input => "INPUT",
            Self::Output => "OUTPUT",
            Self::InputPullup => "INPUT_PULLUP",
            Self::Undefined => "UNDEFINED",
        }
    }

    /// Parse a mode a host may request.  `UNDEFINED` is report-only.
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "INPUT" => Some(Self::Input),
            "OUTPUT" => Some(Self::Output),
            "INPUT_PULLUP" => Some(Self::InputPullup),
            _ => None,
        }
    }

    /// Input and input-with-pullup both sample the pin.
    pub const fn is_input(self) -> bool {
        matches!(self, Self::Input | Self::InputPullup)
    }

    pub const fn is_output(self) -> bool {
        matches!(self, Self::Output)
    }
}

// ---------------------------------------------------------------------------
// Static pin table
// ---------------------------------------------------------------------------

/// Static attributes of one terminal.
#[derive(Debug, Clone, Copy)]
pub struct PinInfo {
    pub name: &'static str,
    /// ESP32-S3 GPIO number.
    pub gpio: i32,
    /// ADC1 channel for analog inputs, LEDC channel for analog outputs.
    pub channel: u32,
    pub kind: SignalKind,
    pub capability: Capability,
}

const fn digital(name: &'static str, gpio: i32) -> PinInfo {
    PinInfo {
        name,
        gpio,
        channel: 0,
        kind: SignalKind::Digital,
        capability: Capability::InputOutput,
    }
}

const fn analog_in(name: &'static str, gpio: i32, channel: u32) -> PinInfo {
    PinInfo {
        name,
        gpio,
        channel,
        kind: SignalKind::Analog,
        capability: Capability::InputOnly,
    }
}

const fn analog_out(name: &'static str, gpio: i32, channel: u32) -> PinInfo {
    PinInfo {
        name,
        gpio,
        channel,
        kind: SignalKind::Analog,
        capability: Capability::OutputOnly,
    }
}

static PIN_TABLE: [PinInfo; PIN_COUNT] = [
    digital("D30", 7),
    digital("D31", 8),
    digital("D32", 9),
    digital("D33", 10),
    digital("D34", 11),
    digital("D35", 12),
    digital("D36", 13),
    digital("D37", 14),
    digital("D38", 15),
    digital("D39", 16),
    digital("D40", 17),
    digital("D41", 18),
    digital("D42", 21),
    digital("D43", 38),
    digital("D44", 39),
    digital("D45", 40),
    digital("D46", 41),
    digital("D47", 42),
    digital("D48", 47),
    digital("D49", 48),
    analog_in("A0", 1, 0),
    analog_in("A1", 2, 1),
    analog_in("A2", 3, 2),
    analog_in("A3", 4, 3),
    analog_out("DAC0", 5, 0),
    analog_out("DAC1", 6, 1),
];

impl Pin {
    /// Every pin, in table order.
    pub const ALL: [Pin; PIN_COUNT] = [
        Pin::D30,
        Pin::D31,
        Pin::D32,
        Pin::D33,
        Pin::D34,
        Pin::D35,
        Pin::D36,
        Pin::D37,
        Pin::D38,
        Pin::D39,
        Pin::D40,
        Pin::D41,
        Pin::D42,
        Pin::D43,
        Pin::D44,
        Pin::D45,
        Pin::D46,
        Pin::D47,
        Pin::D48,
        Pin::D49,
        Pin::A0,
        Pin::A1,
        Pin::A2,
        Pin::A3,
        Pin::Dac0,
        Pin::Dac1,
    ];

    /// Dense table index.
    pub const fn index(self) -> usize {
        self as usize
    }

    pub fn info(self) -> &'static PinInfo {
        &PIN_TABLE[self.index()]
    }

    /// Wire name, e.g. `"D30"` or `"DAC0"`.
    pub fn name(self) -> &'static str {
        self.info().name
    }

    pub fn kind(self) -> SignalKind {
        self.info().kind
    }

    pub fn capability(self) -> Capability {
        self.info().capability
    }

    /// Resolve a wire name.  Case-sensitive.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|p| p.name() == name)
    }
}

impl core::fmt::Display for Pin {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}
