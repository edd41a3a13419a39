//! Outbound response builder.
//!
//! A [`Response`] is an ordered list of `(key, value)` pairs that serialises
//! to a single JSON object in insertion order.  It is the only place that
//! produces protocol text.

use log::warn;
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::app::ports::{ResponseSink, Sample};
use crate::config::READY_JOB;
use crate::error::ErrorCode;

use super::command::Command;

/// A response field value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Text(String),
    UInt(u64),
    Bool(bool),
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(String::from(s))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Self::UInt(v)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Self::UInt(v as u64)
    }
}

impl From<u16> for Value {
    fn from(v: u16) -> Self {
        Self::UInt(v as u64)
    }
}

impl From<u8> for Value {
    fn from(v: u8) -> Self {
        Self::UInt(v as u64)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Text(s) => serializer.serialize_str(s),
            Self::UInt(v) => serializer.serialize_u64(*v),
            Self::Bool(b) => serializer.serialize_bool(*b),
        }
    }
}

/// An outbound JSON object with preserved key order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    fields: Vec<(&'static str, Value)>,
}

impl Response {
    /// Success reply: `{"command":"RX_<CMD>","job":J}`.
    pub fn reply(command: Command, job: u32) -> Self {
        Self::new(command.reply_name()).with("job", job)
    }

    /// Per-command error: `{"command":"ERR_<CMD>","job":J,"error":E,"msg":M}`.
    pub fn error(command: Command, job: u32, code: ErrorCode, msg: impl Into<String>) -> Self {
        Self::new(command.error_name())
            .with("job", job)
            .with("error", code.as_str())
            .with("msg", msg.into())
    }

    /// Protocol-level error: `{"command":"ERROR",["job":J,]"error":E,"msg":M}`.
    pub fn protocol_error(job: Option<u32>, code: ErrorCode, msg: impl Into<String>) -> Self {
        let mut response = Self::new(Command::Error.as_str());
        if let Some(job) = job {
            response = response.with("job", job);
        }
        response.with("error", code.as_str()).with("msg", msg.into())
    }

    /// Startup notification, always job 0.
    pub fn ready() -> Self {
        Self::reply(Command::Ready, READY_JOB)
    }

    /// One logging sample.
    pub fn sample(sample: &Sample) -> Self {
        Self::reply(Command::LogSignal, sample.job)
            .with("time", sample.time)
            .with("value", sample.value)
            .with("done", sample.done)
    }

    fn new(command: impl Into<Value>) -> Self {
        Self {
            fields: vec![("command", command.into())],
        }
    }

    /// Append a field.
    pub fn with(mut self, key: &'static str, value: impl Into<Value>) -> Self {
        self.fields.push((key, value.into()));
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.iter().find(|(k, _)| *k == key).map(|(_, v)| v)
    }

    pub fn command(&self) -> &str {
        match self.get("command") {
            Some(Value::Text(s)) => s,
            _ => "",
        }
    }

    pub fn is_error(&self) -> bool {
        self.get("error").is_some()
    }

    /// Encode as a single-line JSON object.
    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl Serialize for Response {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (key, value) in &self.fields {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// Encode `response` and hand it to `sink`.
pub fn send(sink: &mut impl ResponseSink, response: &Response) {
    match response.encode() {
        Ok(line) => {
            if response.is_error() {
                warn!("Dispatcher: -> {}", line);
            }
            sink.send(&line);
        }
        Err(e) => warn!("Dispatcher: failed to encode {}: {}", response.command(), e),
    }
}
