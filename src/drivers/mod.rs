//! Peripheral drivers and buzzer pattern tables.

pub mod beep_patterns;
pub mod button;
pub mod buzzer;
pub mod lcd;
pub mod rfid;
pub mod rtc;
