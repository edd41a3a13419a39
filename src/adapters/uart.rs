//! UART transport: the console serial port carrying the line protocol.
//!
//! Reads never block: the control loop polls the link once per iteration
//! and must keep servicing logging requests while the host is silent.
//! Writes block until the driver's TX ring has accepted the bytes.

use esp_idf_svc::hal::delay::{BLOCK, NON_BLOCK};
use esp_idf_svc::hal::uart::UartDriver;
use esp_idf_svc::sys::EspError;

use crate::protocol::transport::Transport;

pub struct UartTransport<'d> {
    uart: UartDriver<'d>,
}

impl<'d> UartTransport<'d> {
    pub fn new(uart: UartDriver<'d>) -> Self {
        Self { uart }
    }
}

impl Transport for UartTransport<'_> {
    type Error = EspError;

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        self.uart.read(buf, NON_BLOCK)
    }

    fn write(&mut self, data: &[u8]) -> Result<usize, Self::Error> {
        self.uart.write(data)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        self.uart.wait_tx_done(BLOCK)
    }

    fn available(&self) -> bool {
        self.uart.remaining_read().map(|n| n > 0).unwrap_or(false)
    }
}
