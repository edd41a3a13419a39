//! Fuzz target: `Controller::handle_message`
//!
//! Feeds arbitrary text to the dispatcher of a started controller and
//! asserts that it never panics, answers with at most one line, and that
//! every answer is a JSON object.
//!
//! cargo fuzz run fuzz_message_dispatch

#![no_main]

use libfuzzer_sys::fuzz_target;
use plcio::adapters::hardware::BoardDriver;
use plcio::adapters::nvs::NvsStore;
use plcio::app::ports::ResponseSink;
use plcio::app::service::Controller;
use plcio::config::ControllerConfig;

struct Lines(Vec<String>);

impl ResponseSink for Lines {
    fn send(&mut self, line: &str) {
        self.0.push(line.to_string());
    }
}

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    let mut ctl = Controller::new(ControllerConfig::default());
    let mut hw = BoardDriver::new();
    let mut store = NvsStore::new().expect("simulation store");
    let mut sink = Lines(Vec::new());
    ctl.start(&mut hw, &store, &mut sink);
    sink.0.clear();

    ctl.handle_message(text, &mut hw, &mut store, &mut sink);
    assert!(sink.0.len() <= 1, "more than one response");
    for line in &sink.0 {
        let v: serde_json::Value = serde_json::from_str(line).expect("response is JSON");
        assert!(v.is_object());
    }
});
