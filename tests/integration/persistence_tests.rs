//! Integration tests for SAVE / LOAD of the pin-mode table.

use plcio::config::{PIN_MODES_KEY, STORAGE_NAMESPACE};
use plcio::pins::{Pin, PinMode};

use crate::mock_hw::{Bench, HwCall, MemStore};

#[test]
fn saved_modes_survive_restart() {
    let mut bench = Bench::new();
    bench.request(r#"{"command":"SET_PIN_MODE","job":1,"pin":"D30","mode":"OUTPUT"}"#);
    bench.request(r#"{"command":"SET_PIN_MODE","job":2,"pin":"D49","mode":"INPUT_PULLUP"}"#);
    assert_eq!(
        bench.request(r#"{"command":"SAVE_PIN_MODES","job":3}"#),
        r#"{"command":"RX_SAVE_PIN_MODES","job":3}"#
    );
    assert!(bench.store.raw(STORAGE_NAMESPACE, PIN_MODES_KEY).is_some());

    bench.request(r#"{"command":"RESET_PIN_MODES","job":4}"#);
    assert_eq!(bench.controller.registry().mode(Pin::D30), PinMode::Input);

    bench.restart();
    assert_eq!(
        bench.sink.take(),
        vec![r#"{"command":"RX_READY","job":0}"#]
    );
    let registry = bench.controller.registry();
    assert_eq!(registry.mode(Pin::D30), PinMode::Output);
    assert_eq!(registry.mode(Pin::D49), PinMode::InputPullup);
    assert_eq!(registry.mode(Pin::A0), PinMode::Input);
}

#[test]
fn load_pin_modes_reapplies_stored_table() {
    let mut bench = Bench::new();
    bench.request(r#"{"command":"SET_PIN_MODE","job":1,"pin":"D42","mode":"OUTPUT"}"#);
    bench.request(r#"{"command":"SAVE_PIN_MODES","job":2}"#);
    bench.request(r#"{"command":"SET_PIN_MODE","job":3,"pin":"D42","mode":"INPUT"}"#);
    bench.hw.clear();

    assert_eq!(
        bench.request(r#"{"command":"LOAD_PIN_MODES","job":4}"#),
        r#"{"command":"RX_LOAD_PIN_MODES","job":4}"#
    );
    assert_eq!(bench.controller.registry().mode(Pin::D42), PinMode::Output);
    assert_eq!(bench.hw.last_configured(Pin::D42), Some(PinMode::Output));
    // Every pin is reapplied to the driver.
    let configured = bench
        .hw
        .calls
        .iter()
        .filter(|c| matches!(c, HwCall::Configure(..)))
        .count();
    assert_eq!(configured, Pin::ALL.len());
}

#[test]
fn corrupt_blob_falls_back_to_factory_modes() {
    let mut store = MemStore::new();
    store.put_raw(STORAGE_NAMESPACE, PIN_MODES_KEY, &[0xFF, 0xFF, 0xFF]);
    let bench = Bench::with_store(store);

    let registry = bench.controller.registry();
    for pin in Pin::ALL {
        assert_eq!(registry.mode(pin), pin.capability().default_mode(), "{pin}");
    }
}

#[test]
fn stored_mode_not_allowed_by_capability_is_replaced() {
    // Every pin stored as INPUT, including the output-only DAC pins.
    let table = [PinMode::Input; 26];
    let bytes = postcard::to_allocvec(&table[..]).unwrap();
    let mut store = MemStore::new();
    store.put_raw(STORAGE_NAMESPACE, PIN_MODES_KEY, &bytes);
    let bench = Bench::with_store(store);

    let registry = bench.controller.registry();
    assert_eq!(registry.mode(Pin::D30), PinMode::Input);
    assert_eq!(registry.mode(Pin::Dac0), PinMode::Output);
    assert_eq!(registry.mode(Pin::Dac1), PinMode::Output);
}

#[test]
fn save_failure_still_replies() {
    let mut bench = Bench::new();
    bench.store.fail_writes = true;
    assert_eq!(
        bench.request(r#"{"command":"SAVE_PIN_MODES","job":8}"#),
        r#"{"command":"RX_SAVE_PIN_MODES","job":8}"#
    );
    assert!(bench.store.raw(STORAGE_NAMESPACE, PIN_MODES_KEY).is_none());
}

#[test]
fn restart_drops_active_logging() {
    let mut bench = Bench::new();
    assert!(
        bench
            .send(r#"{"command":"LOG_SIGNAL","job":1,"pin":"D30","period":10}"#)
            .is_empty()
    );
    bench.restart();
    assert!(bench.controller.scheduler().is_empty());
    bench.sink.take();
    assert!(bench.tick(100).is_empty());
}
