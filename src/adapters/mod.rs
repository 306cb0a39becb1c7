//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements          | Connects to                   |
//! |------------|---------------------|-------------------------------|
//! | `hardware` | SensorPort          | ESP32 GPIO + any-edge ISR     |
//! |            | LightPort           | ESP32 LEDC PWM                |
//! |            | ClockPort           | via `time`                    |
//! | `hal_pins` | Sensor/Light/Clock  | any `embedded-hal` pins       |
//! | `log_sink` | EventSink           | Serial log output             |
//! | `time`     | ClockPort           | ESP32 system timer            |

pub mod hal_pins;
pub mod hardware;
pub mod log_sink;
pub mod time;
