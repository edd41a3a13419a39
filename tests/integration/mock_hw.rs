//! Mock adapters for integration tests.
//!
//! `MockBoard` records every driver call so tests can assert on the full
//! hardware history without touching real GPIO/ADC/LEDC registers.  A pin
//! reads back whatever was last written to it, like an ESP32 GPIO in
//! input-output mode.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::PinState;
use plcio::app::ports::{PinDriver, ResponseSink, StorageError, StoragePort};
use plcio::app::service::Controller;
use plcio::config::ControllerConfig;
use plcio::pins::{PIN_COUNT, Pin, PinMode};
use std::collections::HashMap;

// ── Driver call record ────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum HwCall {
    Configure(Pin, PinMode),
    WriteDigital(Pin, PinState),
    WriteAnalog(Pin, u8),
    DelayMs(u32),
}

// ── MockBoard ─────────────────────────────────────────────────

pub struct MockBoard {
    pub calls: Vec<HwCall>,
    levels: [PinState; PIN_COUNT],
    analog: [u16; PIN_COUNT],
}

#[allow(dead_code)]
impl MockBoard {
    pub fn new() -> Self {
        Self {
            calls: Vec::new(),
            levels: [PinState::Low; PIN_COUNT],
            analog: [0; PIN_COUNT],
        }
    }

    pub fn set_level(&mut self, pin: Pin, level: PinState) {
        self.levels[pin.index()] = level;
    }

    pub fn set_analog(&mut self, pin: Pin, raw: u16) {
        self.analog[pin.index()] = raw;
    }

    /// Calls that drove an output, in order.
    pub fn writes(&self) -> Vec<HwCall> {
        self.calls
            .iter()
            .filter(|c| matches!(c, HwCall::WriteDigital(..) | HwCall::WriteAnalog(..)))
            .cloned()
            .collect()
    }

    pub fn last_configured(&self, pin: Pin) -> Option<PinMode> {
        self.calls.iter().rev().find_map(|c| match c {
            HwCall::Configure(p, mode) if *p == pin => Some(*mode),
            _ => None,
        })
    }

    pub fn clear(&mut self) {
        self.calls.clear();
    }
}

impl Default for MockBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl PinDriver for MockBoard {
    fn configure(&mut self, pin: Pin, mode: PinMode) {
        self.calls.push(HwCall::Configure(pin, mode));
    }

    fn read_digital(&mut self, pin: Pin) -> PinState {
        self.levels[pin.index()]
    }

    fn read_analog(&mut self, pin: Pin) -> u16 {
        self.analog[pin.index()]
    }

    fn write_digital(&mut self, pin: Pin, level: PinState) {
        self.levels[pin.index()] = level;
        self.calls.push(HwCall::WriteDigital(pin, level));
    }

    fn write_analog(&mut self, pin: Pin, level: u8) {
        self.analog[pin.index()] = u16::from(level);
        self.calls.push(HwCall::WriteAnalog(pin, level));
    }
}

impl DelayNs for MockBoard {
    fn delay_ns(&mut self, ns: u32) {
        self.calls.push(HwCall::DelayMs(ns / 1_000_000));
    }

    fn delay_ms(&mut self, ms: u32) {
        self.calls.push(HwCall::DelayMs(ms));
    }
}

// ── MemStore ──────────────────────────────────────────────────

/// In-memory `StoragePort` that can be told to fail writes.
#[derive(Default)]
pub struct MemStore {
    data: HashMap<String, Vec<u8>>,
    pub fail_writes: bool,
}

#[allow(dead_code)]
impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raw(&self, namespace: &str, key: &str) -> Option<&[u8]> {
        self.data
            .get(&format!("{}::{}", namespace, key))
            .map(Vec::as_slice)
    }

    pub fn put_raw(&mut self, namespace: &str, key: &str, data: &[u8]) {
        self.data
            .insert(format!("{}::{}", namespace, key), data.to_vec());
    }
}

impl StoragePort for MemStore {
    fn read(&self, namespace: &str, key: &str, buf: &mut [u8]) -> Result<usize, StorageError> {
        let data = self.raw(namespace, key).ok_or(StorageError::NotFound)?;
        if data.len() > buf.len() {
            return Err(StorageError::Corrupted);
        }
        buf[..data.len()].copy_from_slice(data);
        Ok(data.len())
    }

    fn write(&mut self, namespace: &str, key: &str, data: &[u8]) -> Result<(), StorageError> {
        if self.fail_writes {
            return Err(StorageError::Full);
        }
        self.put_raw(namespace, key, data);
        Ok(())
    }

    fn delete(&mut self, namespace: &str, key: &str) -> Result<(), StorageError> {
        self.data.remove(&format!("{}::{}", namespace, key));
        Ok(())
    }

    fn exists(&self, namespace: &str, key: &str) -> bool {
        self.raw(namespace, key).is_some()
    }
}

// ── LineSink ──────────────────────────────────────────────────

/// Captures every response line.
#[derive(Default)]
pub struct LineSink {
    pub lines: Vec<String>,
}

#[allow(dead_code)]
impl LineSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drain captured lines.
    pub fn take(&mut self) -> Vec<String> {
        std::mem::take(&mut self.lines)
    }

    /// Captured lines parsed as JSON, drained.
    pub fn take_json(&mut self) -> Vec<serde_json::Value> {
        self.take()
            .iter()
            .map(|l| serde_json::from_str(l).expect("response is JSON"))
            .collect()
    }
}

impl ResponseSink for LineSink {
    fn send(&mut self, line: &str) {
        self.lines.push(line.to_string());
    }
}

// ── Bench ─────────────────────────────────────────────────────

/// A started controller wired to the mocks.
pub struct Bench {
    pub controller: Controller,
    pub hw: MockBoard,
    pub store: MemStore,
    pub sink: LineSink,
}

#[allow(dead_code)]
impl Bench {
    /// Start with an empty store; the READY line is consumed.
    pub fn new() -> Self {
        Self::with_store(MemStore::new())
    }

    pub fn with_store(store: MemStore) -> Self {
        let mut bench = Self {
            controller: Controller::new(ControllerConfig::default()),
            hw: MockBoard::new(),
            store,
            sink: LineSink::new(),
        };
        bench.restart();
        bench.sink.take();
        bench
    }

    /// Re-run startup against the same store.
    pub fn restart(&mut self) {
        self.controller
            .start(&mut self.hw, &self.store, &mut self.sink);
    }

    /// Send one line and return every response it produced.
    pub fn send(&mut self, line: &str) -> Vec<String> {
        self.controller
            .handle_message(line, &mut self.hw, &mut self.store, &mut self.sink);
        self.sink.take()
    }

    /// Send one line that must produce exactly one response.
    pub fn request(&mut self, line: &str) -> String {
        let mut out = self.send(line);
        assert_eq!(out.len(), 1, "expected one response to {line}, got {out:?}");
        out.remove(0)
    }

    /// Run the scheduler once and return the emitted samples.
    pub fn tick(&mut self, now_ms: u64) -> Vec<serde_json::Value> {
        self.controller
            .tick(now_ms, &mut self.hw, &mut self.sink);
        self.sink.take_json()
    }
}
