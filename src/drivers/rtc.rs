//! DS3231 battery-backed real-time clock over I2C.
//!
//! ## Register map (subset)
//!
//! | Addr | Content                         |
//! |------|---------------------------------|
//! | 0x00 | seconds (BCD)                   |
//! | 0x01 | minutes (BCD)                   |
//! | 0x02 | hours (BCD, bit 6 = 12h mode)   |
//! | 0x03 | weekday 1–7 (1 = Sunday)        |
//! | 0x04 | date (BCD)                      |
//! | 0x05 | month (BCD, bit 7 = century)    |
//! | 0x06 | year 00–99 (BCD)                |
//! | 0x0F | status (bit 7 = OSF)            |
//!
//! OSF is set whenever the oscillator stopped, which is how a flat or
//! missing coin cell shows up.  The driver only reports it; the time is
//! never written from here.

use embedded_hal::i2c::I2c;
use log::debug;

use crate::clock::DateTime;
use crate::error::ClockError;

/// Fixed 7-bit bus address.
pub const DS3231_ADDR: u8 = 0x68;

mod reg {
    pub const SECONDS: u8 = 0x00;
    pub const STATUS: u8 = 0x0F;
}

/// Oscillator-stop flag in the status register.
const STATUS_OSF: u8 = 0x80;
const HOUR_12H: u8 = 0x40;
const HOUR_PM: u8 = 0x20;
const MONTH_CENTURY: u8 = 0x80;

pub struct Ds3231<I2C> {
    i2c: I2C,
}

impl<I2C: I2c> Ds3231<I2C> {
    pub fn new(i2c: I2C) -> Self {
        Self { i2c }
    }

    /// `Ok` if the chip acknowledges its address.
    pub fn probe(&mut self) -> Result<(), ClockError> {
        self.read_status().map(|_| ())
    }

    /// `true` if the oscillator stopped since the time was last set.
    pub fn lost_power(&mut self) -> Result<bool, ClockError> {
        Ok(self.read_status()? & STATUS_OSF != 0)
    }

    pub fn datetime(&mut self) -> Result<DateTime, ClockError> {
        let mut raw = [0u8; 7];
        self.i2c
            .write_read(DS3231_ADDR, &[reg::SECONDS], &mut raw)
            .map_err(|_| ClockError::NotFound)?;
        let dt = decode(&raw);
        if !dt.is_plausible() {
            debug!("DS3231: implausible registers {:02X?}", raw);
            return Err(ClockError::InvalidTime);
        }
        Ok(dt)
    }

    fn read_status(&mut self) -> Result<u8, ClockError> {
        let mut status = [0u8; 1];
        self.i2c
            .write_read(DS3231_ADDR, &[reg::STATUS], &mut status)
            .map_err(|_| ClockError::NotFound)?;
        Ok(status[0])
    }
}

fn bcd_to_bin(v: u8) -> u8 {
    (v >> 4) * 10 + (v & 0x0F)
}

fn decode(raw: &[u8; 7]) -> DateTime {
    let hour = if raw[2] & HOUR_12H != 0 {
        let h12 = bcd_to_bin(raw[2] & 0x1F) % 12;
        if raw[2] & HOUR_PM != 0 { h12 + 12 } else { h12 }
    } else {
        bcd_to_bin(raw[2] & 0x3F)
    };
    let century = if raw[5] & MONTH_CENTURY != 0 { 100 } else { 0 };
    DateTime {
        second: bcd_to_bin(raw[0] & 0x7F),
        minute: bcd_to_bin(raw[1] & 0x7F),
        hour,
        weekday: (raw[3] & 0x07).saturating_sub(1),
        day: bcd_to_bin(raw[4] & 0x3F),
        month: bcd_to_bin(raw[5] & 0x1F),
        year: 2000 + century + u16::from(bcd_to_bin(raw[6])),
    }
}
