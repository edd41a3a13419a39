//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements          | Connects to                   |
//! |------------|---------------------|-------------------------------|
//! | `hardware` | PinDriver, DelayNs  | ESP32 GPIO, ADC1, LEDC        |
//! | `nvs`      | StoragePort         | NVS / in-memory store         |
//! | `time`     | n/a                 | ESP32 high-resolution timer   |
//! | `uart`     | Transport           | Console UART (ESP-IDF only)   |

pub mod hardware;
pub mod nvs;
pub mod time;
#[cfg(target_os = "espidf")]
pub mod uart;
