//! Line link: frames newline-delimited messages over a [`Transport`].
//!
//! ```text
//!  Transport ──bytes──▶ line buffer ──▶ mailbox (one slot) ──▶ Controller
//!      ▲                                                            │
//!      └─────────────── "<json>\n" ◀── ResponseSink ◀───────────────┘
//! ```
//!
//! The mailbox holds at most one complete message.  While it is full the
//! link does not pull bytes from the transport, so a line is never
//! overwritten before the control loop has drained it; the transport's own
//! receive FIFO absorbs anything that arrives in the meantime.

use embassy_sync::blocking_mutex::raw::NoopRawMutex;
use embassy_sync::signal::Signal;
use log::warn;

use crate::app::ports::ResponseSink;
use crate::config::LINE_CAPACITY;

use super::transport::Transport;

const READ_CHUNK: usize = 64;

/// One item delivered by the link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    /// A complete line, without the terminator or surrounding whitespace.
    Line(heapless::String<LINE_CAPACITY>),
    /// A line that was dropped; the reason is reported back to the host.
    Discarded(&'static str),
}

pub struct SerialLink<T: Transport> {
    transport: T,
    line: heapless::Vec<u8, LINE_CAPACITY>,
    overflowed: bool,
    max_len: usize,
    rx: [u8; READ_CHUNK],
    rx_pos: usize,
    rx_len: usize,
    mailbox: Signal<NoopRawMutex, Inbound>,
}

impl<T: Transport> SerialLink<T> {
    /// `max_len` is clamped to the compile-time line buffer.
    pub fn new(transport: T, max_len: usize) -> Self {
        Self {
            transport,
            line: heapless::Vec::new(),
            overflowed: false,
            max_len: max_len.min(LINE_CAPACITY),
            rx: [0; READ_CHUNK],
            rx_pos: 0,
            rx_len: 0,
            mailbox: Signal::new(),
        }
    }

    /// Pull bytes until a message is ready or the transport runs dry.
    pub fn poll(&mut self) {
        while !self.mailbox.signaled() {
            if self.rx_pos == self.rx_len {
                if !self.transport.available() {
                    return;
                }
                match self.transport.read(&mut self.rx) {
                    Ok(0) => return,
                    Ok(n) => {
                        self.rx_pos = 0;
                        self.rx_len = n;
                    }
                    Err(e) => {
                        warn!("SerialLink: read failed: {:?}", e);
                        return;
                    }
                }
            }
            let byte = self.rx[self.rx_pos];
            self.rx_pos += 1;
            self.push_byte(byte);
        }
    }

    /// Take the pending message, if any, freeing the mailbox.
    pub fn take(&mut self) -> Option<Inbound> {
        self.mailbox.try_take()
    }

    /// Whether a message is waiting to be taken.
    pub fn has_message(&self) -> bool {
        self.mailbox.signaled()
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    fn push_byte(&mut self, byte: u8) {
        if byte != b'\n' {
            if self.overflowed {
                return;
            }
            if self.line.len() >= self.max_len || self.line.push(byte).is_err() {
                self.overflowed = true;
            }
            return;
        }

        let overflowed = core::mem::replace(&mut self.overflowed, false);
        let inbound = if overflowed {
            Some(Inbound::Discarded("message exceeds line buffer"))
        } else {
            Self::decode_line(&self.line)
        };
        self.line.clear();
        if let Some(inbound) = inbound {
            self.mailbox.signal(inbound);
        }
    }

    fn decode_line(bytes: &[u8]) -> Option<Inbound> {
        let Ok(text) = core::str::from_utf8(bytes) else {
            return Some(Inbound::Discarded("message is not valid UTF-8"));
        };
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        let mut line = heapless::String::new();
        // Cannot fail: the trimmed text is no longer than the buffer.
        let _ = line.push_str(text);
        Some(Inbound::Line(line))
    }
}

impl<T: Transport> ResponseSink for SerialLink<T> {
    fn send(&mut self, line: &str) {
        for chunk in [line.as_bytes(), b"\n".as_slice()] {
            let mut written = 0;
            while written < chunk.len() {
                match self.transport.write(&chunk[written..]) {
                    Ok(0) => {
                        warn!("SerialLink: transport accepted no bytes, dropping response");
                        return;
                    }
                    Ok(n) => written += n,
                    Err(e) => {
                        warn!("SerialLink: write failed: {:?}", e);
                        return;
                    }
                }
            }
        }
        if let Err(e) = self.transport.flush() {
            warn!("SerialLink: flush failed: {:?}", e);
        }
    }
}
