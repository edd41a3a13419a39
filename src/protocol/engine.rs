//! Command dispatcher: turns one inbound line into at most one response.
//!
//! Every message passes through the same pipeline:
//!
//! 1. **Decode**: the line must be a JSON object
//!    (`ERROR` / `DESERIALIZE_JSON_FAILED`).
//! 2. **Job id**: a non-negative integer is required
//!    (`ERROR` / `NO_JOB_ID`, no job echoed).
//! 3. **Command**: must name a request (`ERROR` / `INVALID_COMMAND`).
//! 4. **Arguments**: required keys present (`ERR_<CMD>` / `INVALID_KEY`).
//! 5. **Execute**: per-command validation and side effect.
//!
//! Handlers return `Result<Option<Response>, Rejection>`; the rejection is
//! turned into the `ERR_<CMD>` response in one place.  A handler returning
//! `Ok(None)` answers later (LOG_SIGNAL is acknowledged by its first sample).

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::PinState;
use log::{debug, warn};

use crate::app::ports::{PinDriver, StoragePort};
use crate::config::ControllerConfig;
use crate::error::ErrorCode;
use crate::pins::{Pin, PinMode, SignalKind};
use crate::registry::{PinReading, PinRegistry};
use crate::scheduler::LoggingScheduler;

use super::command::Command;
use super::message::{Message, parse_unsigned};
use super::response::{Response, Value};

/// A validation failure for a resolved command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub code: ErrorCode,
    pub msg: String,
}

impl Rejection {
    pub fn new(code: ErrorCode, msg: impl Into<String>) -> Self {
        Self {
            code,
            msg: msg.into(),
        }
    }
}

type Outcome = Result<Option<Response>, Rejection>;

/// Borrowed view of the controller state for the duration of one message.
pub struct Dispatcher<'a, H, S> {
    pub registry: &'a mut PinRegistry,
    pub scheduler: &'a mut LoggingScheduler,
    pub config: &'a ControllerConfig,
    pub hw: &'a mut H,
    pub store: &'a mut S,
}

impl<H, S> Dispatcher<'_, H, S>
where
    H: PinDriver + DelayNs,
    S: StoragePort,
{
    /// Process one line.  Blank lines are ignored and produce no response.
    pub fn dispatch(&mut self, line: &str) -> Option<Response> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        debug!("Dispatcher: <- {}", line);

        let message = match Message::parse(line) {
            Ok(m) => m,
            Err(detail) => {
                return Some(Response::protocol_error(
                    None,
                    ErrorCode::DeserializeJsonFailed,
                    detail,
                ));
            }
        };

        let Some(job) = message.job() else {
            return Some(Response::protocol_error(
                None,
                ErrorCode::NoJobId,
                "received command without job id",
            ));
        };

        let Some(name) = message.field("command") else {
            return Some(Response::protocol_error(
                Some(job),
                ErrorCode::InvalidCommand,
                "Key 'command' is missing",
            ));
        };
        let command = Command::from_name(&name);
        if !command.is_request() {
            return Some(Response::protocol_error(
                Some(job),
                ErrorCode::InvalidCommand,
                format!("Command '{}' is not valid", name),
            ));
        }

        match self.execute(command, job, &message) {
            Ok(response) => response,
            Err(rejection) => Some(Response::error(
                command,
                job,
                rejection.code,
                rejection.msg,
            )),
        }
    }

    fn execute(&mut self, command: Command, job: u32, msg: &Message) -> Outcome {
        match command {
            Command::GetInput => self.get_input(job, msg),
            Command::SetOutput => self.set_output(job, msg),
            Command::LogSignal => self.log_signal(job, msg),
            Command::EndLogSignal => self.end_log_signal(job, msg),
            Command::GetPinMode => self.get_pin_mode(job, msg),
            Command::SetPinMode => self.set_pin_mode(job, msg),
            Command::LoadPinModes => {
                self.registry.load_defaults(&*self.store, self.hw);
                Ok(Some(Response::reply(command, job)))
            }
            Command::SavePinModes => {
                if let Err(e) = self.registry.save_modes(self.store) {
                    warn!("Dispatcher: saving pin modes failed: {}", e);
                }
                Ok(Some(Response::reply(command, job)))
            }
            Command::ResetPinModes => {
                self.registry.reset_all(self.hw);
                Ok(Some(Response::reply(command, job)))
            }
            Command::TriggerPulse => self.trigger_pulse(job, msg),
            Command::Ready | Command::Error | Command::Invalid => Err(Rejection::new(
                ErrorCode::InvalidCommand,
                format!("Command '{}' is not valid", command.as_str()),
            )),
        }
    }

    // ── Handlers ──────────────────────────────────────────────

    fn get_input(&mut self, job: u32, msg: &Message) -> Outcome {
        let name = require(msg, "pin")?;
        let pin = resolve_pin(&name)?;

        let level = match self.registry.read(pin, self.hw) {
            PinReading::Digital(state) => Value::from(level_label(state)),
            PinReading::Analog(raw) => raw.into(),
        };
        Ok(Some(
            Response::reply(Command::GetInput, job)
                .with("pin", name)
                .with("level", level),
        ))
    }

    fn set_output(&mut self, job: u32, msg: &Message) -> Outcome {
        let name = require(msg, "pin")?;
        let level = require(msg, "level")?;
        let pin = resolve_pin(&name)?;
        if !self.registry.mode(pin).is_output() {
            return Err(not_an_output(&name));
        }

        let reply = Response::reply(Command::SetOutput, job).with("pin", name);
        match pin.kind() {
            SignalKind::Digital => {
                let state = parse_level(&level).ok_or_else(|| invalid_level(&level))?;
                self.registry.write_digital(pin, state, self.hw);
                Ok(Some(reply.with("level", level)))
            }
            SignalKind::Analog => {
                let duty: u8 = parse_unsigned(&level).ok_or_else(|| invalid_level(&level))?;
                self.registry.write_analog(pin, duty, self.hw);
                Ok(Some(reply.with("level", duty)))
            }
        }
    }

    fn log_signal(&mut self, job: u32, msg: &Message) -> Outcome {
        let name = require(msg, "pin")?;
        let period = require(msg, "period")?;
        let pin = resolve_pin(&name)?;
        let period_ms: u64 = parse_unsigned(&period).ok_or_else(|| {
            Rejection::new(
                ErrorCode::InvalidKey,
                format!("Key 'period' is not a valid period: '{}'", period),
            )
        })?;
        if self.registry.mode(pin) != PinMode::Input {
            return Err(Rejection::new(
                ErrorCode::InvalidInputPin,
                format!("Pin '{}' is not an input", name),
            ));
        }

        self.scheduler
            .start(job, pin, period_ms)
            .map_err(|e| Rejection::new(e.into(), ""))?;
        // Acknowledged by the first sample on the next tick.
        Ok(None)
    }

    fn end_log_signal(&mut self, job: u32, msg: &Message) -> Outcome {
        let name = require(msg, "pin")?;
        let not_found = || Rejection::new(ErrorCode::LoggingRequestNotFound, "");
        let pin = Pin::from_name(&name).ok_or_else(not_found)?;
        self.scheduler.stop(pin).map_err(|_| not_found())?;
        Ok(Some(Response::reply(Command::EndLogSignal, job)))
    }

    fn get_pin_mode(&mut self, job: u32, msg: &Message) -> Outcome {
        let name = require(msg, "pin")?;
        let pin = resolve_pin(&name)?;
        Ok(Some(
            Response::reply(Command::GetPinMode, job)
                .with("pin", name)
                .with("mode", self.registry.mode(pin).as_str()),
        ))
    }

    fn set_pin_mode(&mut self, job: u32, msg: &Message) -> Outcome {
        let name = require(msg, "pin")?;
        let label = require(msg, "mode")?;
        let pin = resolve_pin(&name)?;
        let mode = PinMode::from_label(&label).ok_or_else(|| {
            Rejection::new(
                ErrorCode::InvalidPinMode,
                format!("Mode '{}' is not valid", label),
            )
        })?;

        if !self.registry.capability(pin).allows(mode) {
            let only = if mode.is_input() { "output" } else { "input" };
            return Err(Rejection::new(
                ErrorCode::InvalidPinMode,
                format!("Pin '{}' is {} only", name, only),
            ));
        }

        self.registry.set_mode(pin, mode, self.hw);
        Ok(Some(
            Response::reply(Command::SetPinMode, job)
                .with("pin", name)
                .with("mode", mode.as_str()),
        ))
    }

    fn trigger_pulse(&mut self, job: u32, msg: &Message) -> Outcome {
        let name = require(msg, "pin")?;
        let pin = resolve_pin(&name)?;
        if !self.registry.mode(pin).is_output() {
            return Err(not_an_output(&name));
        }

        self.registry
            .trigger_pulse(pin, self.config.pulse_width_ms, self.hw);
        Ok(Some(
            Response::reply(Command::TriggerPulse, job).with("pin", name),
        ))
    }
}

// ── Argument helpers ──────────────────────────────────────────

fn require(msg: &Message, key: &str) -> Result<String, Rejection> {
    msg.field(key).ok_or_else(|| {
        Rejection::new(ErrorCode::InvalidKey, format!("Key '{}' is missing", key))
    })
}

fn resolve_pin(name: &str) -> Result<Pin, Rejection> {
    Pin::from_name(name).ok_or_else(|| {
        Rejection::new(ErrorCode::InvalidPin, format!("Pin '{}' is not valid", name))
    })
}

fn parse_level(text: &str) -> Option<PinState> {
    match text {
        "HIGH" => Some(PinState::High),
        "LOW" => Some(PinState::Low),
        _ => None,
    }
}

fn level_label(state: PinState) -> &'static str {
    match state {
        PinState::High => "HIGH",
        PinState::Low => "LOW",
    }
}

fn not_an_output(name: &str) -> Rejection {
    Rejection::new(
        ErrorCode::InvalidOutputPin,
        format!("Pin '{}' is not an output", name),
    )
}

fn invalid_level(level: &str) -> Rejection {
    Rejection::new(
        ErrorCode::InvalidOutputLevel,
        format!("Level '{}' is not valid", level),
    )
}
