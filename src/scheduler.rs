//! Logging scheduler: periodic sampling of input pins.
//!
//! Holds a fixed-capacity table of [`LoggingRequest`]s, at most one per pin.
//! The control loop calls [`LoggingScheduler::tick`] once per iteration; due
//! requests are read and reported through a [`SampleDelegate`], so the
//! scheduler itself knows nothing about drivers or the wire format.
//!
//! ```text
//!   start()             stop()                 tick()            tick() sweep
//!  ────────▶ Active ─────────────▶ Closing ──────────────▶ Done ──────────────▶ removed
//!              │  tick(): sample         one last sample,
//!              └──────┘  done=false      done=true
//! ```

use heapless::Vec;
use log::info;

use crate::app::ports::{Sample, SampleDelegate};
use crate::config::MAX_LOGGING_JOBS;
use crate::error::SchedulerError;
use crate::pins::Pin;

// ═══════════════════════════════════════════════════════════════
//  Request
// ═══════════════════════════════════════════════════════════════

/// One active periodic sample.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingRequest {
    pub job: u32,
    pub pin: Pin,
    /// Minimum spacing between samples, in milliseconds.
    pub period_ms: u64,
    last_sample_ms: u64,
    first: bool,
    closing: bool,
    done: bool,
}

impl LoggingRequest {
    fn new(job: u32, pin: Pin, period_ms: u64) -> Self {
        Self {
            job,
            pin,
            period_ms,
            last_sample_ms: 0,
            first: true,
            closing: false,
            done: false,
        }
    }

    /// First sample is always due; afterwards one per elapsed period.
    fn ready(&self, now_ms: u64) -> bool {
        self.first || now_ms >= self.last_sample_ms.saturating_add(self.period_ms)
    }

    pub fn is_closing(&self) -> bool {
        self.closing
    }

    pub fn is_done(&self) -> bool {
        self.done
    }
}

// ═══════════════════════════════════════════════════════════════
//  Scheduler engine
// ═══════════════════════════════════════════════════════════════

pub struct LoggingScheduler {
    requests: Vec<LoggingRequest, MAX_LOGGING_JOBS>,
}

impl Default for LoggingScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl LoggingScheduler {
    pub const fn new() -> Self {
        Self {
            requests: Vec::new(),
        }
    }

    /// Admit a new request.  Capacity is checked before uniqueness.
    pub fn start(&mut self, job: u32, pin: Pin, period_ms: u64) -> Result<(), SchedulerError> {
        if self.requests.is_full() {
            return Err(SchedulerError::CapacityExceeded);
        }
        if self.contains(pin) {
            return Err(SchedulerError::DuplicatePin);
        }
        self.requests
            .push(LoggingRequest::new(job, pin, period_ms))
            .map_err(|_| SchedulerError::CapacityExceeded)?;
        info!("Scheduler: job {} logging {} every {} ms", job, pin, period_ms);
        Ok(())
    }

    /// Ask the request on `pin` to finish after its next sample.
    pub fn stop(&mut self, pin: Pin) -> Result<(), SchedulerError> {
        let request = self
            .requests
            .iter_mut()
            .find(|r| r.pin == pin)
            .ok_or(SchedulerError::NotFound)?;
        request.closing = true;
        info!("Scheduler: job {} on {} closing", request.job, pin);
        Ok(())
    }

    /// Service every due request, then purge the finished ones.
    ///
    /// A request that is late by several periods produces a single sample;
    /// missed periods are not replayed.
    pub fn tick(&mut self, now_ms: u64, delegate: &mut impl SampleDelegate) {
        for request in &mut self.requests {
            if !request.ready(now_ms) {
                continue;
            }
            let value = delegate.read(request.pin);
            request.last_sample_ms = now_ms;
            request.first = false;
            if request.closing {
                request.done = true;
            }
            delegate.on_sample(&Sample {
                job: request.job,
                time: now_ms,
                value,
                done: request.done,
            });
        }

        let before = self.requests.len();
        self.requests.retain(|r| !r.done);
        if self.requests.len() != before {
            info!(
                "Scheduler: {} request(s) finished, {} active",
                before - self.requests.len(),
                self.requests.len()
            );
        }
    }

    /// Drop every request without emitting final samples.
    pub fn clear(&mut self) {
        self.requests.clear();
    }

    pub fn contains(&self, pin: Pin) -> bool {
        self.requests.iter().any(|r| r.pin == pin)
    }

    pub fn get(&self, pin: Pin) -> Option<&LoggingRequest> {
        self.requests.iter().find(|r| r.pin == pin)
    }

    pub fn iter(&self) -> impl Iterator<Item = &LoggingRequest> {
        self.requests.iter()
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.requests.is_full()
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════
