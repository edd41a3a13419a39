//! Integration tests for the line → dispatcher → driver pipeline.
//!
//! Every test drives a started `Controller` with raw protocol lines and
//! checks both the response text and the hardware calls it caused.

use embedded_hal::digital::PinState;
use plcio::pins::{Pin, PinMode};

use crate::mock_hw::{Bench, HwCall};

// ── Documented exchanges ──────────────────────────────────────

#[test]
fn set_mode_then_set_output_exchange() {
    let mut bench = Bench::new();

    assert_eq!(
        bench.request(r#"{"command":"SET_PIN_MODE","job":"1","pin":"D30","mode":"OUTPUT"}"#),
        r#"{"command":"RX_SET_PIN_MODE","job":1,"pin":"D30","mode":"OUTPUT"}"#
    );
    assert_eq!(
        bench.request(r#"{"command":"SET_OUTPUT","job":"2","pin":"D30","level":"HIGH"}"#),
        r#"{"command":"RX_SET_OUTPUT","job":2,"pin":"D30","level":"HIGH"}"#
    );
    assert_eq!(
        bench.hw.writes(),
        vec![HwCall::WriteDigital(Pin::D30, PinState::High)]
    );
}

#[test]
fn get_input_on_unknown_pin() {
    let mut bench = Bench::new();
    assert_eq!(
        bench.request(r#"{"command":"GET_INPUT","job":"3","pin":"Z99"}"#),
        r#"{"command":"ERR_GET_INPUT","job":3,"error":"INVALID_PIN","msg":"Pin 'Z99' is not valid"}"#
    );
}

// ── Protocol-level errors ─────────────────────────────────────

#[test]
fn malformed_json_reports_deserialize_failure_without_job() {
    let mut bench = Bench::new();
    let reply: serde_json::Value =
        serde_json::from_str(&bench.request(r#"{"command":"GET_INPUT","job":1"#)).unwrap();
    assert_eq!(reply["command"], "ERROR");
    assert_eq!(reply["error"], "DESERIALIZE_JSON_FAILED");
    assert!(reply.get("job").is_none());
    assert!(!reply["msg"].as_str().unwrap().is_empty());
}

#[test]
fn non_object_json_is_rejected() {
    let mut bench = Bench::new();
    assert_eq!(
        bench.request("[1,2,3]"),
        r#"{"command":"ERROR","error":"DESERIALIZE_JSON_FAILED","msg":"expected a JSON object"}"#
    );
}

#[test]
fn missing_or_invalid_job_id() {
    let mut bench = Bench::new();
    let expected = r#"{"command":"ERROR","error":"NO_JOB_ID","msg":"received command without job id"}"#;
    assert_eq!(bench.request(r#"{"command":"GET_INPUT","pin":"D30"}"#), expected);
    assert_eq!(
        bench.request(r#"{"command":"GET_INPUT","job":"-1","pin":"D30"}"#),
        expected
    );
    assert_eq!(
        bench.request(r#"{"command":"GET_INPUT","job":"abc","pin":"D30"}"#),
        expected
    );
}

#[test]
fn unknown_command_echoes_job() {
    let mut bench = Bench::new();
    assert_eq!(
        bench.request(r#"{"command":"FORMAT_DISK","job":7}"#),
        r#"{"command":"ERROR","job":7,"error":"INVALID_COMMAND","msg":"Command 'FORMAT_DISK' is not valid"}"#
    );
}

#[test]
fn blank_line_produces_nothing() {
    let mut bench = Bench::new();
    assert!(bench.send("").is_empty());
    assert!(bench.send("  \t ").is_empty());
}

// ── Output ────────────────────────────────────────────────────

#[test]
fn set_output_on_input_pin_is_rejected() {
    let mut bench = Bench::new();
    assert_eq!(
        bench.request(r#"{"command":"SET_OUTPUT","job":4,"pin":"D31","level":"HIGH"}"#),
        r#"{"command":"ERR_SET_OUTPUT","job":4,"error":"INVALID_OUTPUT_PIN","msg":"Pin 'D31' is not an output"}"#
    );
    assert!(bench.hw.writes().is_empty());
}

#[test]
fn set_output_rejects_unknown_level() {
    let mut bench = Bench::new();
    bench.request(r#"{"command":"SET_PIN_MODE","job":1,"pin":"D40","mode":"OUTPUT"}"#);
    assert_eq!(
        bench.request(r#"{"command":"SET_OUTPUT","job":2,"pin":"D40","level":"high"}"#),
        r#"{"command":"ERR_SET_OUTPUT","job":2,"error":"INVALID_OUTPUT_LEVEL","msg":"Level 'high' is not valid"}"#
    );
    assert!(bench.hw.writes().is_empty());
}

#[test]
fn digital_output_round_trips_through_get_input() {
    let mut bench = Bench::new();
    bench.request(r#"{"command":"SET_PIN_MODE","job":1,"pin":"D44","mode":"OUTPUT"}"#);
    bench.request(r#"{"command":"SET_OUTPUT","job":2,"pin":"D44","level":"HIGH"}"#);
    assert_eq!(
        bench.request(r#"{"command":"GET_INPUT","job":3,"pin":"D44"}"#),
        r#"{"command":"RX_GET_INPUT","job":3,"pin":"D44","level":"HIGH"}"#
    );
    bench.request(r#"{"command":"SET_OUTPUT","job":4,"pin":"D44","level":"LOW"}"#);
    assert_eq!(
        bench.request(r#"{"command":"GET_INPUT","job":5,"pin":"D44"}"#),
        r#"{"command":"RX_GET_INPUT","job":5,"pin":"D44","level":"LOW"}"#
    );
}

#[test]
fn analog_output_accepts_byte_range_only() {
    let mut bench = Bench::new();
    assert_eq!(
        bench.request(r#"{"command":"SET_OUTPUT","job":1,"pin":"DAC1","level":"0"}"#),
        r#"{"command":"RX_SET_OUTPUT","job":1,"pin":"DAC1","level":0}"#
    );
    assert_eq!(
        bench.request(r#"{"command":"SET_OUTPUT","job":2,"pin":"DAC1","level":128}"#),
        r#"{"command":"RX_SET_OUTPUT","job":2,"pin":"DAC1","level":128}"#
    );
    assert_eq!(
        bench.request(r#"{"command":"SET_OUTPUT","job":3,"pin":"DAC1","level":"256"}"#),
        r#"{"command":"ERR_SET_OUTPUT","job":3,"error":"INVALID_OUTPUT_LEVEL","msg":"Level '256' is not valid"}"#
    );
    assert_eq!(
        bench.request(r#"{"command":"SET_OUTPUT","job":4,"pin":"DAC1","level":"HIGH"}"#),
        r#"{"command":"ERR_SET_OUTPUT","job":4,"error":"INVALID_OUTPUT_LEVEL","msg":"Level 'HIGH' is not valid"}"#
    );
    assert_eq!(
        bench.hw.writes(),
        vec![
            HwCall::WriteAnalog(Pin::Dac1, 0),
            HwCall::WriteAnalog(Pin::Dac1, 128)
        ]
    );
}

// ── Input ─────────────────────────────────────────────────────

#[test]
fn analog_input_reports_raw_counts() {
    let mut bench = Bench::new();
    bench.hw.set_analog(Pin::A2, 1234);
    assert_eq!(
        bench.request(r#"{"command":"GET_INPUT","job":9,"pin":"A2"}"#),
        r#"{"command":"RX_GET_INPUT","job":9,"pin":"A2","level":1234}"#
    );
}

#[test]
fn digital_input_reports_level_label() {
    let mut bench = Bench::new();
    bench.hw.set_level(Pin::D35, PinState::High);
    assert_eq!(
        bench.request(r#"{"command":"GET_INPUT","job":10,"pin":"D35"}"#),
        r#"{"command":"RX_GET_INPUT","job":10,"pin":"D35","level":"HIGH"}"#
    );
}

#[test]
fn get_input_without_pin_key() {
    let mut bench = Bench::new();
    assert_eq!(
        bench.request(r#"{"command":"GET_INPUT","job":11}"#),
        r#"{"command":"ERR_GET_INPUT","job":11,"error":"INVALID_KEY","msg":"Key 'pin' is missing"}"#
    );
}

// ── Pin modes ─────────────────────────────────────────────────

#[test]
fn factory_modes_after_start() {
    let mut bench = Bench::new();
    assert_eq!(
        bench.request(r#"{"command":"GET_PIN_MODE","job":1,"pin":"D45"}"#),
        r#"{"command":"RX_GET_PIN_MODE","job":1,"pin":"D45","mode":"INPUT"}"#
    );
    assert_eq!(
        bench.request(r#"{"command":"GET_PIN_MODE","job":2,"pin":"DAC0"}"#),
        r#"{"command":"RX_GET_PIN_MODE","job":2,"pin":"DAC0","mode":"OUTPUT"}"#
    );
}

#[test]
fn set_pin_mode_configures_driver() {
    let mut bench = Bench::new();
    bench.hw.clear();
    assert_eq!(
        bench.request(r#"{"command":"SET_PIN_MODE","job":5,"pin":"D33","mode":"INPUT_PULLUP"}"#),
        r#"{"command":"RX_SET_PIN_MODE","job":5,"pin":"D33","mode":"INPUT_PULLUP"}"#
    );
    assert_eq!(bench.hw.calls, vec![HwCall::Configure(Pin::D33, PinMode::InputPullup)]);
    assert_eq!(
        bench.controller.registry().mode(Pin::D33),
        PinMode::InputPullup
    );
}

#[test]
fn capability_mismatch_leaves_mode_unchanged() {
    let mut bench = Bench::new();
    assert_eq!(
        bench.request(r#"{"command":"SET_PIN_MODE","job":1,"pin":"DAC0","mode":"INPUT"}"#),
        r#"{"command":"ERR_SET_PIN_MODE","job":1,"error":"INVALID_PIN_MODE","msg":"Pin 'DAC0' is output only"}"#
    );
    assert_eq!(
        bench.request(r#"{"command":"SET_PIN_MODE","job":2,"pin":"A3","mode":"OUTPUT"}"#),
        r#"{"command":"ERR_SET_PIN_MODE","job":2,"error":"INVALID_PIN_MODE","msg":"Pin 'A3' is input only"}"#
    );
    assert_eq!(bench.controller.registry().mode(Pin::Dac0), PinMode::Output);
    assert_eq!(bench.controller.registry().mode(Pin::A3), PinMode::Input);
}

#[test]
fn undefined_is_not_a_settable_mode() {
    let mut bench = Bench::new();
    assert_eq!(
        bench.request(r#"{"command":"SET_PIN_MODE","job":1,"pin":"D30","mode":"UNDEFINED"}"#),
        r#"{"command":"ERR_SET_PIN_MODE","job":1,"error":"INVALID_PIN_MODE","msg":"Mode 'UNDEFINED' is not valid"}"#
    );
}

#[test]
fn reset_pin_modes_forces_inputs() {
    let mut bench = Bench::new();
    bench.request(r#"{"command":"SET_PIN_MODE","job":1,"pin":"D30","mode":"OUTPUT"}"#);
    bench.request(r#"{"command":"SET_PIN_MODE","job":2,"pin":"D31","mode":"INPUT_PULLUP"}"#);
    assert_eq!(
        bench.request(r#"{"command":"RESET_PIN_MODES","job":3}"#),
        r#"{"command":"RX_RESET_PIN_MODES","job":3}"#
    );
    let registry = bench.controller.registry();
    assert_eq!(registry.mode(Pin::D30), PinMode::Input);
    assert_eq!(registry.mode(Pin::D31), PinMode::Input);
    assert_eq!(registry.mode(Pin::Dac1), PinMode::Output);
}

// ── Pulse ─────────────────────────────────────────────────────

#[test]
fn trigger_pulse_drives_high_holds_then_low() {
    let mut bench = Bench::new();
    bench.request(r#"{"command":"SET_PIN_MODE","job":1,"pin":"D31","mode":"OUTPUT"}"#);
    bench.hw.clear();

    assert_eq!(
        bench.request(r#"{"command":"TRIGGER_PULSE","job":4,"pin":"D31"}"#),
        r#"{"command":"RX_TRIGGER_PULSE","job":4,"pin":"D31"}"#
    );
    assert_eq!(
        bench.hw.calls,
        vec![
            HwCall::WriteDigital(Pin::D31, PinState::High),
            HwCall::DelayMs(100),
            HwCall::WriteDigital(Pin::D31, PinState::Low),
        ]
    );
}

#[test]
fn trigger_pulse_on_input_is_rejected() {
    let mut bench = Bench::new();
    bench.hw.clear();
    assert_eq!(
        bench.request(r#"{"command":"TRIGGER_PULSE","job":4,"pin":"D31"}"#),
        r#"{"command":"ERR_TRIGGER_PULSE","job":4,"error":"INVALID_OUTPUT_PIN","msg":"Pin 'D31' is not an output"}"#
    );
    assert!(bench.hw.calls.is_empty());
}

// ── Isolation ─────────────────────────────────────────────────

#[test]
fn bad_message_does_not_disturb_later_ones() {
    let mut bench = Bench::new();
    assert!(bench.send(r#"{"command":"LOG_SIGNAL","job":1,"pin":"D30","period":50}"#).is_empty());
    bench.request("not json at all");
    bench.request(r#"{"command":"LOG_SIGNAL","job":2,"pin":"D30","period":"x"}"#);
    assert_eq!(bench.controller.scheduler().len(), 1);
    assert_eq!(
        bench.request(r#"{"command":"GET_PIN_MODE","job":3,"pin":"D30"}"#),
        r#"{"command":"RX_GET_PIN_MODE","job":3,"pin":"D30","mode":"INPUT"}"#
    );
}
