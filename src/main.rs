//! PLC I/O Controller: Main Entry Point
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                    Adapters (outer ring)                     │
//! │                                                              │
//! │  BoardDriver        NvsStore       MonotonicClock            │
//! │  (PinDriver+Delay)  (StoragePort)  (uptime)                  │
//! │  UartTransport ──▶ SerialLink (framing, mailbox, sink)       │
//! │                                                              │
//! │  ──────────────── Port Trait Boundary ─────────────────      │
//! │                                                              │
//! │  ┌────────────────────────────────────────────────────┐      │
//! │  │             Controller (pure logic)                │      │
//! │  │  Pin Registry · Logging Scheduler · Dispatcher     │      │
//! │  └────────────────────────────────────────────────────┘      │
//! └──────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::Result;
use log::info;

use esp_idf_svc::hal::delay::FreeRtos;
use esp_idf_svc::hal::gpio::AnyIOPin;
use esp_idf_svc::hal::peripherals::Peripherals;
use esp_idf_svc::hal::uart::{UartConfig, UartDriver};
use esp_idf_svc::hal::units::Hertz;

use plcio::adapters::hardware::BoardDriver;
use plcio::adapters::nvs::NvsStore;
use plcio::adapters::time::MonotonicClock;
use plcio::adapters::uart::UartTransport;
use plcio::app::service::Controller;
use plcio::config::ControllerConfig;
use plcio::protocol::SerialLink;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  PLC I/O controller v{}           ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Persistent store + config ──────────────────────────
    let mut nvs = NvsStore::new().map_err(|e| anyhow::anyhow!("NVS init failed: {}", e))?;
    let config = ControllerConfig::load(&nvs);

    // ── 3. Peripherals ────────────────────────────────────────
    let mut hw = BoardDriver::init()?;

    let peripherals = Peripherals::take()?;
    let uart_config = UartConfig::new().baudrate(Hertz(config.baud_rate));
    let uart = UartDriver::new(
        peripherals.uart0,
        peripherals.pins.gpio43,
        peripherals.pins.gpio44,
        Option::<AnyIOPin>::None,
        Option::<AnyIOPin>::None,
        &uart_config,
    )?;
    let mut link = SerialLink::new(UartTransport::new(uart), config.max_line_len);
    info!("Serial link ready on UART0 ({} baud, 8N1)", config.baud_rate);

    // ── 4. Controller ─────────────────────────────────────────
    let clock = MonotonicClock::new();
    let loop_interval_ms = config.loop_interval_ms;
    let mut controller = Controller::new(config);
    controller.start(&mut hw, &nvs, &mut link);

    // ── 5. Control loop ───────────────────────────────────────
    loop {
        link.poll();
        if let Some(inbound) = link.take() {
            controller.handle_inbound(&inbound, &mut hw, &mut nvs, &mut link);
        }

        controller.tick(clock.uptime_ms(), &mut hw, &mut link);

        FreeRtos::delay_ms(loop_interval_ms);
    }
}
