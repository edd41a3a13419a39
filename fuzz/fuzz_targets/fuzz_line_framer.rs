//! Fuzz target: `SerialLink::poll`
//!
//! Streams arbitrary bytes through the line framer and checks that every
//! delivered line fits the buffer and carries no terminator.
//!
//! cargo fuzz run fuzz_line_framer

#![no_main]

use libfuzzer_sys::fuzz_target;
use plcio::config::LINE_CAPACITY;
use plcio::protocol::{BufferTransport, Inbound, SerialLink};

fuzz_target!(|data: &[u8]| {
    let chunk = data.first().map_or(1, |b| usize::from(*b % 16) + 1);
    let mut link = SerialLink::new(BufferTransport::with_chunk(chunk), LINE_CAPACITY);
    link.transport_mut().feed(data);

    // Each poll delivers at most one item; the rest stays in the transport.
    for _ in 0..=data.len() {
        link.poll();
        match link.take() {
            Some(Inbound::Line(line)) => {
                assert!(line.len() <= LINE_CAPACITY);
                assert!(!line.contains('\n'));
                assert!(!line.trim().is_empty());
            }
            Some(Inbound::Discarded(_)) => {}
            None => break,
        }
    }
});
