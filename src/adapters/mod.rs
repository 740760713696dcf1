//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements                                   | Connects to                 |
//! |------------|----------------------------------------------|-----------------------------|
//! | `hardware` | ClockPort, TagReaderPort, DisplayPort,       | DS3231, MFRC522, LCD1602,   |
//! |            | BuzzerPort, ButtonPort, DelayNs              | buzzer and button GPIOs     |
//! | `log_sink` | EventSink                                    | Serial log output           |
//! | `time`     | MonotonicPort                                | ESP32 system timer          |
//! | `entropy`  | RandomPort                                   | ESP32 hardware RNG          |

pub mod entropy;
pub mod hardware;
pub mod log_sink;
pub mod time;
