//! Hardware adapter: bridges the board's terminals to [`PinDriver`].
//!
//! - **`target_os = "espidf"`**: raw ESP-IDF calls: `gpio_config` for the
//!   digital terminals, ADC1 oneshot for A0–A3 and LEDC (8-bit) for
//!   DAC0/DAC1.  Blocking holds go through FreeRTOS.
//! - **`not(target_os = "espidf")`**: an in-memory board.  Output levels
//!   are latched, inputs can be injected, and an output can be wired to an
//!   input so writes are observed on reads (bench loopback).

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::PinState;

use crate::app::ports::PinDriver;
use crate::pins::{Capability, Pin, PinMode, SignalKind};

#[cfg(not(target_os = "espidf"))]
use crate::pins::PIN_COUNT;
#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;
#[cfg(target_os = "espidf")]
use log::info;

/// Full-scale reading of the 12-bit ADC.
const ADC_FULL_SCALE: u16 = 4_095;

/// ADC counts an 8-bit duty would read back as.
fn duty_to_counts(duty: u8) -> u16 {
    (u32::from(duty) * u32::from(ADC_FULL_SCALE) / 255) as u16
}

// ═══════════════════════════════════════════════════════════════
//  ESP-IDF backend
// ═══════════════════════════════════════════════════════════════

/// Errors during one-shot peripheral initialisation.
#[cfg(target_os = "espidf")]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwInitError {
    AdcInitFailed(i32),
    LedcInitFailed(i32),
}

#[cfg(target_os = "espidf")]
impl core::fmt::Display for HwInitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::AdcInitFailed(rc) => write!(f, "ADC1 init failed (rc={})", rc),
            Self::LedcInitFailed(rc) => write!(f, "LEDC timer/channel config failed (rc={})", rc),
        }
    }
}

#[cfg(target_os = "espidf")]
impl std::error::Error for HwInitError {}

/// LEDC base frequency for the analog outputs.
#[cfg(target_os = "espidf")]
const DAC_PWM_FREQ_HZ: u32 = 5_000;

#[cfg(target_os = "espidf")]
pub struct BoardDriver {
    adc1: adc_oneshot_unit_handle_t,
}

#[cfg(target_os = "espidf")]
impl BoardDriver {
    /// Configure ADC1 and LEDC.  Digital terminals are configured lazily
    /// by [`PinDriver::configure`] when modes are loaded.
    pub fn init() -> Result<Self, HwInitError> {
        let mut adc1: adc_oneshot_unit_handle_t = core::ptr::null_mut();
        let init_cfg = adc_oneshot_unit_init_cfg_t {
            unit_id: adc_unit_t_ADC_UNIT_1,
            ulp_mode: adc_ulp_mode_t_ADC_ULP_MODE_DISABLE,
            ..Default::default()
        };
        // SAFETY: called once from main() before the control loop starts.
        let ret = unsafe { adc_oneshot_new_unit(&init_cfg, &mut adc1) };
        if ret != ESP_OK as i32 {
            return Err(HwInitError::AdcInitFailed(ret));
        }

        let chan_cfg = adc_oneshot_chan_cfg_t {
            atten: adc_atten_t_ADC_ATTEN_DB_12,
            bitwidth: adc_bitwidth_t_ADC_BITWIDTH_12,
        };
        for pin in Pin::ALL {
            let info = pin.info();
            if info.kind == SignalKind::Analog && info.capability == Capability::InputOnly {
                // SAFETY: `adc1` was created above and is only used from this task.
                let ret = unsafe { adc_oneshot_config_channel(adc1, info.channel, &chan_cfg) };
                if ret != ESP_OK as i32 {
                    return Err(HwInitError::AdcInitFailed(ret));
                }
            }
        }

        let timer = ledc_timer_config_t {
            speed_mode: ledc_mode_t_LEDC_LOW_SPEED_MODE,
            timer_num: ledc_timer_t_LEDC_TIMER_0,
            duty_resolution: ledc_timer_bit_t_LEDC_TIMER_8_BIT,
            freq_hz: DAC_PWM_FREQ_HZ,
            clk_cfg: soc_periph_ledc_clk_src_legacy_t_LEDC_AUTO_CLK,
            ..Default::default()
        };
        // SAFETY: single main-task context.
        let ret = unsafe { ledc_timer_config(&timer) };
        if ret != ESP_OK as i32 {
            return Err(HwInitError::LedcInitFailed(ret));
        }
        for pin in Pin::ALL {
            let info = pin.info();
            if info.capability != Capability::OutputOnly {
                continue;
            }
            // SAFETY: timer 0 configured above; single main-task context.
            let ret = unsafe {
                ledc_channel_config(&ledc_channel_config_t {
                    speed_mode: ledc_mode_t_LEDC_LOW_SPEED_MODE,
                    channel: info.channel,
                    timer_sel: ledc_timer_t_LEDC_TIMER_0,
                    gpio_num: info.gpio,
                    duty: 0,
                    hpoint: 0,
                    ..Default::default()
                })
            };
            if ret != ESP_OK as i32 {
                return Err(HwInitError::LedcInitFailed(ret));
            }
        }

        info!("BoardDriver: ADC1 (A0–A3) and LEDC (DAC0/DAC1) configured");
        Ok(Self { adc1 })
    }

    fn ledc_set(channel: u32, duty: u8) {
        // SAFETY: LEDC channels were configured in init(); duty register
        // writes are race-free since only the main loop calls this.
        unsafe {
            ledc_set_duty(ledc_mode_t_LEDC_LOW_SPEED_MODE, channel, duty as u32);
            ledc_update_duty(ledc_mode_t_LEDC_LOW_SPEED_MODE, channel);
        }
    }
}

#[cfg(target_os = "espidf")]
impl PinDriver for BoardDriver {
    fn configure(&mut self, pin: Pin, mode: PinMode) {
        let info = pin.info();
        if info.kind != SignalKind::Digital {
            // Analog terminals are fixed-function (ADC / LEDC).
            return;
        }
        let (gpio_mode, pull_up) = match mode {
            PinMode::Output => (gpio_mode_t_GPIO_MODE_INPUT_OUTPUT, false),
            PinMode::InputPullup => (gpio_mode_t_GPIO_MODE_INPUT, true),
            PinMode::Input | PinMode::Undefined => (gpio_mode_t_GPIO_MODE_INPUT, false),
        };
        let cfg = gpio_config_t {
            pin_bit_mask: 1u64 << info.gpio,
            mode: gpio_mode,
            pull_up_en: if pull_up {
                gpio_pullup_t_GPIO_PULLUP_ENABLE
            } else {
                gpio_pullup_t_GPIO_PULLUP_DISABLE
            },
            pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
            intr_type: gpio_int_type_t_GPIO_INTR_DISABLE,
        };
        // SAFETY: pin numbers come from the static pin table; main-loop only.
        let ret = unsafe { gpio_config(&cfg) };
        if ret != ESP_OK as i32 {
            log::warn!("BoardDriver: gpio_config({}) failed (rc={})", info.gpio, ret);
        }
    }

    fn read_digital(&mut self, pin: Pin) -> PinState {
        // SAFETY: read-only register access on a configured pin.
        let level = unsafe { gpio_get_level(pin.info().gpio) };
        PinState::from(level != 0)
    }

    fn read_analog(&mut self, pin: Pin) -> u16 {
        let info = pin.info();
        if info.capability == Capability::OutputOnly {
            // DAC terminals carry an LEDC channel, not an ADC one: report
            // the duty currently driven.
            // SAFETY: LEDC channel configured in init(); register read only.
            let duty = unsafe { ledc_get_duty(ledc_mode_t_LEDC_LOW_SPEED_MODE, info.channel) };
            return duty_to_counts(duty.min(u32::from(u8::MAX)) as u8);
        }
        let mut raw: i32 = 0;
        // SAFETY: `adc1` is created in init() and only used from the main loop.
        let ret = unsafe { adc_oneshot_read(self.adc1, info.channel, &mut raw) };
        if ret != ESP_OK as i32 {
            return 0;
        }
        raw.max(0) as u16
    }

    fn write_digital(&mut self, pin: Pin, level: PinState) {
        let info = pin.info();
        let high = level == PinState::High;
        if info.kind == SignalKind::Analog {
            Self::ledc_set(info.channel, if high { u8::MAX } else { 0 });
            return;
        }
        // SAFETY: writes to a pin configured as output by configure().
        unsafe {
            gpio_set_level(info.gpio, u32::from(high));
        }
    }

    fn write_analog(&mut self, pin: Pin, level: u8) {
        Self::ledc_set(pin.info().channel, level);
    }
}

#[cfg(target_os = "espidf")]
impl DelayNs for BoardDriver {
    fn delay_ns(&mut self, ns: u32) {
        esp_idf_svc::hal::delay::FreeRtos::delay_us(ns.div_ceil(1_000));
    }

    fn delay_ms(&mut self, ms: u32) {
        esp_idf_svc::hal::delay::FreeRtos::delay_ms(ms);
    }
}

// ═══════════════════════════════════════════════════════════════
//  Simulation backend
// ═══════════════════════════════════════════════════════════════

#[cfg(not(target_os = "espidf"))]
pub struct BoardDriver {
    modes: [PinMode; PIN_COUNT],
    outputs: [PinState; PIN_COUNT],
    duties: [u8; PIN_COUNT],
    inputs: [PinState; PIN_COUNT],
    analog_inputs: [u16; PIN_COUNT],
    /// `wires[to] = Some(from)`: reading `to` observes what `from` drives.
    wires: [Option<Pin>; PIN_COUNT],
    delayed_ns: u64,
}

#[cfg(not(target_os = "espidf"))]
impl Default for BoardDriver {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(not(target_os = "espidf"))]
impl BoardDriver {
    pub fn new() -> Self {
        log::info!("BoardDriver(sim): in-memory board");
        Self {
            modes: [PinMode::Undefined; PIN_COUNT],
            outputs: [PinState::Low; PIN_COUNT],
            duties: [0; PIN_COUNT],
            inputs: [PinState::Low; PIN_COUNT],
            analog_inputs: [0; PIN_COUNT],
            wires: [None; PIN_COUNT],
            delayed_ns: 0,
        }
    }

    /// Wire output `from` to input `to`.
    pub fn connect(&mut self, from: Pin, to: Pin) {
        self.wires[to.index()] = Some(from);
    }

    /// Drive an unwired digital input from outside.
    pub fn set_input(&mut self, pin: Pin, level: PinState) {
        self.inputs[pin.index()] = level;
    }

    /// Drive an unwired analog input from outside.
    pub fn set_analog_input(&mut self, pin: Pin, raw: u16) {
        self.analog_inputs[pin.index()] = raw;
    }

    /// Last duty written to `pin`.
    pub fn analog_output(&self, pin: Pin) -> u8 {
        self.duties[pin.index()]
    }

    /// Total time spent in blocking delays, in milliseconds.
    pub fn delayed_ms(&self) -> u64 {
        self.delayed_ns / 1_000_000
    }

    /// Digital level `from` currently drives.
    fn driven_level(&self, from: Pin) -> PinState {
        let i = from.index();
        PinState::from(self.outputs[i] == PinState::High || self.duties[i] >= 128)
    }

    /// ADC counts `from` currently drives.
    fn driven_counts(&self, from: Pin) -> u16 {
        match from.kind() {
            SignalKind::Analog => duty_to_counts(self.duties[from.index()]),
            SignalKind::Digital => match self.outputs[from.index()] {
                PinState::High => ADC_FULL_SCALE,
                PinState::Low => 0,
            },
        }
    }

    /// Pin whose output `pin` observes: its wire source, or itself when it
    /// is an output or has no input stage.
    fn source(&self, pin: Pin) -> Option<Pin> {
        let i = pin.index();
        self.wires[i].or_else(|| {
            (self.modes[i] == PinMode::Output || pin.capability() == Capability::OutputOnly)
                .then_some(pin)
        })
    }
}

#[cfg(not(target_os = "espidf"))]
impl PinDriver for BoardDriver {
    fn configure(&mut self, pin: Pin, mode: PinMode) {
        self.modes[pin.index()] = mode;
    }

    fn read_digital(&mut self, pin: Pin) -> PinState {
        match self.source(pin) {
            Some(from) => self.driven_level(from),
            None if self.modes[pin.index()] == PinMode::InputPullup => PinState::High,
            None => self.inputs[pin.index()],
        }
    }

    fn read_analog(&mut self, pin: Pin) -> u16 {
        match self.source(pin) {
            Some(from) => self.driven_counts(from),
            None => self.analog_inputs[pin.index()],
        }
    }

    fn write_digital(&mut self, pin: Pin, level: PinState) {
        self.outputs[pin.index()] = level;
        if pin.kind() == SignalKind::Analog {
            self.duties[pin.index()] = if level == PinState::High { u8::MAX } else { 0 };
        }
    }

    fn write_analog(&mut self, pin: Pin, level: u8) {
        self.duties[pin.index()] = level;
    }
}

#[cfg(not(target_os = "espidf"))]
impl DelayNs for BoardDriver {
    fn delay_ns(&mut self, ns: u32) {
        self.delayed_ns += u64::from(ns);
    }
}
