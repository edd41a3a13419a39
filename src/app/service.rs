//! Application service: the hexagonal core.
//!
//! [`Controller`] owns the pin registry, the logging scheduler and the
//! configuration.  It exposes a hardware-agnostic API; all I/O flows
//! through port traits injected at call sites, making the whole controller
//! testable with mock adapters.
//!
//! ```text
//!      PinDriver ◀──▶ ┌──────────────────────────┐ ──▶ ResponseSink
//!                     │        Controller        │
//!    StoragePort ◀──▶ │ Registry · Scheduler     │
//!                     └──────────────────────────┘
//! ```

use embedded_hal::delay::DelayNs;
use log::info;

use crate::config::ControllerConfig;
use crate::error::ErrorCode;
use crate::pins::Pin;
use crate::protocol::engine::Dispatcher;
use crate::protocol::link::Inbound;
use crate::protocol::response::{self, Response};
use crate::registry::PinRegistry;
use crate::scheduler::LoggingScheduler;

use super::ports::{PinDriver, ResponseSink, Sample, SampleDelegate, StoragePort};

// ───────────────────────────────────────────────────────────────
// Controller
// ───────────────────────────────────────────────────────────────

/// Process-wide controller state.
pub struct Controller {
    registry: PinRegistry,
    scheduler: LoggingScheduler,
    config: ControllerConfig,
}

impl Controller {
    /// Construct the controller.  Pins stay `Undefined` until [`start`](Self::start).
    pub fn new(config: ControllerConfig) -> Self {
        Self {
            registry: PinRegistry::new(),
            scheduler: LoggingScheduler::new(),
            config,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Apply the stored pin modes and announce READY (job 0).
    ///
    /// Calling it again acts as a soft restart: active logging requests
    /// are dropped and modes are reloaded.
    pub fn start(
        &mut self,
        hw: &mut impl PinDriver,
        store: &impl StoragePort,
        sink: &mut impl ResponseSink,
    ) {
        self.scheduler.clear();
        self.registry.load_defaults(store, hw);
        response::send(sink, &Response::ready());
        info!("Controller started");
    }

    // ── Message handling ──────────────────────────────────────

    /// Process one inbound line and emit its response, if any.
    pub fn handle_message(
        &mut self,
        line: &str,
        hw: &mut (impl PinDriver + DelayNs),
        store: &mut impl StoragePort,
        sink: &mut impl ResponseSink,
    ) {
        let reply = Dispatcher {
            registry: &mut self.registry,
            scheduler: &mut self.scheduler,
            config: &self.config,
            hw,
            store,
        }
        .dispatch(line);

        if let Some(reply) = reply {
            response::send(sink, &reply);
        }
    }

    /// Process one item taken from the link mailbox.
    pub fn handle_inbound(
        &mut self,
        inbound: &Inbound,
        hw: &mut (impl PinDriver + DelayNs),
        store: &mut impl StoragePort,
        sink: &mut impl ResponseSink,
    ) {
        match inbound {
            Inbound::Line(line) => self.handle_message(line, hw, store, sink),
            Inbound::Discarded(reason) => response::send(
                sink,
                &Response::protocol_error(None, ErrorCode::DeserializeJsonFailed, *reason),
            ),
        }
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Service due logging requests.  Call once per loop iteration.
    pub fn tick(&mut self, now_ms: u64, hw: &mut impl PinDriver, sink: &mut impl ResponseSink) {
        let mut emitter = SampleEmitter {
            registry: &self.registry,
            hw,
            sink,
        };
        self.scheduler.tick(now_ms, &mut emitter);
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn registry(&self) -> &PinRegistry {
        &self.registry
    }

    pub fn scheduler(&self) -> &LoggingScheduler {
        &self.scheduler
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }
}

// ── Sample delegate ───────────────────────────────────────────
//
// Bridges the scheduler (which knows nothing about pins or the wire
// format) to the registry for reads and to the sink for output.

struct SampleEmitter<'a, H, K> {
    registry: &'a PinRegistry,
    hw: &'a mut H,
    sink: &'a mut K,
}

impl<H: PinDriver, K: ResponseSink> SampleDelegate for SampleEmitter<'_, H, K> {
    fn read(&mut self, pin: Pin) -> u16 {
        self.registry.read(pin, self.hw).value()
    }

    fn on_sample(&mut self, sample: &Sample) {
        response::send(self.sink, &Response::sample(sample));
    }
}
