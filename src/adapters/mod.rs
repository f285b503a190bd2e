//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter      | Implements     | Connects to               |
//! |--------------|----------------|---------------------------|
//! | `hardware`   | SensorPort     | ESP32 ADC1, fault GPIOs   |
//! |              | ActuatorPort   | Enable/LED GPIOs, latch   |
//! | `log_sink`   | EventSink      | Serial log output         |
//! | `nvs`        | ConfigPort     | NVS / in-memory store     |
//! | `time`       | Clock          | ESP32 system timer        |
//! | `usb_serial` | Transport      | USB-Serial-JTAG host link |

pub mod hardware;
pub mod log_sink;
pub mod nvs;
pub mod time;
pub mod usb_serial;
