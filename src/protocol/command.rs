//! Closed command set and its wire names.

/// Every command the protocol knows.  `Ready` and `Error` are only ever
/// sent by the controller; `Invalid` stands for any unrecognised name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    GetInput,
    SetOutput,
    LogSignal,
    EndLogSignal,
    GetPinMode,
    SetPinMode,
    LoadPinModes,
    SavePinModes,
    ResetPinModes,
    TriggerPulse,
    Ready,
    Error,
    Invalid,
}

const NAMES: [(Command, &str); 12] = [
    (Command::GetInput, "GET_INPUT"),
    (Command::SetOutput, "SET_OUTPUT"),
    (Command::LogSignal, "LOG_SIGNAL"),
    (Command::EndLogSignal, "END_LOG_SIGNAL"),
    (Command::GetPinMode, "GET_PIN_MODE"),
    (Command::SetPinMode, "SET_PIN_MODE"),
    (Command::LoadPinModes, "LOAD_PIN_MODES"),
    (Command::SavePinModes, "SAVE_PIN_MODES"),
    (Command::ResetPinModes, "RESET_PIN_MODES"),
    (Command::TriggerPulse, "TRIGGER_PULSE"),
    (Command::Ready, "READY"),
    (Command::Error, "ERROR"),
];

impl Command {
    /// Resolve a wire name.  Unknown names map to [`Command::Invalid`].
    pub fn from_name(name: &str) -> Self {
        NAMES
            .iter()
            .find(|(_, n)| *n == name)
            .map_or(Self::Invalid, |(c, _)| *c)
    }

    /// Bare wire name.  `Invalid` reports as `ERROR`.
    pub fn as_str(self) -> &'static str {
        NAMES
            .iter()
            .find(|(c, _)| *c == self)
            .map_or("ERROR", |(_, n)| *n)
    }

    /// Whether a host may send this command.
    pub fn is_request(self) -> bool {
        !matches!(self, Self::Ready | Self::Error | Self::Invalid)
    }

    /// `command` field of a success response, e.g. `RX_GET_INPUT`.
    pub fn reply_name(self) -> String {
        format!("RX_{}", self.as_str())
    }

    /// `command` field of an error response, e.g. `ERR_GET_INPUT`.
    /// Protocol-level errors are reported as plain `ERROR`.
    pub fn error_name(self) -> String {
        if self.is_request() {
            format!("ERR_{}", self.as_str())
        } else {
            String::from("ERROR")
        }
    }
}
