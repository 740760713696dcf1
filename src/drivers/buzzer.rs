//! Active piezo buzzer on a GPIO (active HIGH).
//!
//! Level-only: patterns are timed by the caller. The driver remembers the
//! last commanded level so repeated calls with the same level skip the pin
//! write.

use embedded_hal::digital::OutputPin;
use log::warn;

pub struct Buzzer<P> {
    pin: P,
    on: bool,
}

impl<P: OutputPin> Buzzer<P> {
    /// Takes the pin and drives it low.
    pub fn new(pin: P) -> Self {
        let mut buzzer = Self { pin, on: true };
        buzzer.set(false);
        buzzer
    }

    pub fn set(&mut self, on: bool) {
        if on == self.on {
            return;
        }
        let result = if on {
            self.pin.set_high()
        } else {
            self.pin.set_low()
        };
        match result {
            Ok(()) => self.on = on,
            Err(_) => warn!("Buzzer: pin write failed"),
        }
    }

    pub fn is_on(&self) -> bool {
        self.on
    }
}
