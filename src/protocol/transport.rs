//! Transport abstraction: any byte-oriented channel.
//!
//! Concrete implementations:
//! - UART serial ([`UartTransport`](crate::adapters::uart::UartTransport), ESP-IDF only)
//! - [`BufferTransport`]: in-memory, for host tests and fuzzing
//!
//! The line link is generic over `Transport`, so adding a new transport
//! requires zero changes to the protocol logic.

use std::collections::VecDeque;

/// Byte-oriented transport channel.
pub trait Transport {
    /// Error type for this transport.
    type Error: core::fmt::Debug;

    /// Read up to `buf.len()` bytes into `buf`.
    /// Returns the number of bytes actually read.
    /// Returns 0 if no data is available (non-blocking).
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error>;

    /// Write `data` to the transport.
    /// Returns the number of bytes actually written.
    fn write(&mut self, data: &[u8]) -> Result<usize, Self::Error>;

    /// Flush any buffered output.
    fn flush(&mut self) -> Result<(), Self::Error>;

    /// Check if data is available for reading.
    fn available(&self) -> bool;
}

/// In-memory transport: bytes pushed with [`feed`](Self::feed) are read
/// back, writes are captured in [`written`](Self::written).
#[derive(Debug, Default)]
pub struct BufferTransport {
    rx: VecDeque<u8>,
    tx: Vec<u8>,
    /// Cap on bytes returned per `read` call, to exercise partial reads.
    chunk: Option<usize>,
}

impl BufferTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return at most `chunk` bytes per read.
    pub fn with_chunk(chunk: usize) -> Self {
        Self {
            chunk: Some(chunk.max(1)),
            ..Self::default()
        }
    }

    /// Queue inbound bytes.
    pub fn feed(&mut self, data: &[u8]) {
        self.rx.extend(data);
    }

    /// Everything written so far.
    pub fn written(&self) -> &[u8] {
        &self.tx
    }

    /// Drain the captured output as newline-separated lines.
    pub fn take_lines(&mut self) -> Vec<String> {
        let text = String::from_utf8_lossy(&self.tx).into_owned();
        self.tx.clear();
        text.lines().map(String::from).collect()
    }

    pub fn pending(&self) -> usize {
        self.rx.len()
    }
}

impl Transport for BufferTransport {
    type Error = core::convert::Infallible;

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        let limit = self.chunk.unwrap_or(usize::MAX).min(buf.len());
        let mut n = 0;
        while n < limit {
            match self.rx.pop_front() {
                Some(b) => {
                    buf[n] = b;
                    n += 1;
                }
                None => break,
            }
        }
        Ok(n)
    }

    fn write(&mut self, data: &[u8]) -> Result<usize, Self::Error> {
        self.tx.extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn available(&self) -> bool {
        !self.rx.is_empty()
    }
}
