//! Hardware adapter: bridges real peripherals to domain port traits.
//!
//! Owns the RTC, reader, LCD, buzzer and button drivers and exposes them
//! through the individual ports, which together make up
//! [`BoardPort`](crate::app::ports::BoardPort).  This is the only module
//! in the system that touches actual hardware.
//!
//! Driver failures stop here: display, reader and buzzer errors are
//! logged and swallowed so the main loop keeps running.  The clock is
//! the one exception and reports its errors up to the service.
//!
//! Generic over the embedded-hal traits, so the same adapter runs on
//! ESP-IDF peripherals and on any host-side fakes.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};
use embedded_hal::i2c::I2c;
use embedded_hal::spi::SpiDevice;
use heapless::Vec;
use log::{debug, warn};

use crate::adapters::entropy::HardwareRng;
use crate::adapters::time::UptimeClock;
use crate::app::ports::{
    BuzzerPort, ButtonPort, ClockPort, DisplayPort, MonotonicPort, RandomPort, TagReaderPort,
};
use crate::clock::DateTime;
use crate::drivers::button::ButtonId;
use crate::drivers::buzzer::Buzzer;
use crate::drivers::lcd::Lcd1602;
use crate::drivers::rfid::Mfrc522;
use crate::drivers::rtc::Ds3231;
use crate::error::{self, ClockError, Error, ReaderError};
use crate::registry::Token;

/// Concrete adapter that combines all hardware behind port traits.
///
/// `LI2C`/`RI2C` are the LCD and RTC handles on the shared bus, `LD` is
/// the LCD's short busy-wait delay and `D` the loop's sleeping delay.
pub struct HardwareAdapter<LI2C, RI2C, SPI, BZ, BTN, LD, D> {
    lcd: Lcd1602<LI2C, LD>,
    /// `None` if the RTC did not answer at start-up.
    rtc: Option<Ds3231<RI2C>>,
    /// `None` if the reader failed to initialise.
    reader: Option<Mfrc522<SPI>>,
    buzzer: Buzzer<BZ>,
    buttons: [BTN; ButtonId::COUNT],
    delay: D,
    uptime: UptimeClock,
    rng: HardwareRng,
    /// Suppresses repeated display warnings until a write succeeds.
    display_faulted: bool,
    /// What failed during bring-up, in bring-up order.
    faults: Vec<Error, 3>,
}

impl<LI2C, RI2C, SPI, BZ, BTN, LD, D> HardwareAdapter<LI2C, RI2C, SPI, BZ, BTN, LD, D>
where
    LI2C: I2c,
    RI2C: I2c,
    SPI: SpiDevice,
    BZ: OutputPin,
    BTN: InputPin,
    LD: DelayNs,
    D: DelayNs,
{
    /// Bring up every peripheral.  Failures are logged and leave the
    /// affected device absent; nothing here is fatal.
    pub fn new(
        mut lcd: Lcd1602<LI2C, LD>,
        mut rtc: Ds3231<RI2C>,
        mut reader: Mfrc522<SPI>,
        buzzer: Buzzer<BZ>,
        buttons: [BTN; ButtonId::COUNT],
        mut delay: D,
    ) -> Self {
        let mut faults = Vec::new();

        let display_faulted =
            bring_up(&mut faults, "LCD", lcd.init().map_err(Error::from)).is_none();

        let rtc = bring_up(&mut faults, "DS3231", rtc.probe().map_err(Error::from)).map(|()| rtc);

        let reader = bring_up(
            &mut faults,
            "MFRC522",
            reader.init(&mut delay).map_err(Error::from),
        )
        .map(|version| {
            debug!("MFRC522 version 0x{:02X}", version);
            reader
        });

        Self {
            lcd,
            rtc,
            reader,
            buzzer,
            buttons,
            delay,
            uptime: UptimeClock::new(),
            rng: HardwareRng::new(),
            display_faulted,
            faults,
        }
    }

    /// Peripherals that failed to come up.
    pub fn faults(&self) -> &[Error] {
        &self.faults
    }

    pub fn has_rtc(&self) -> bool {
        self.rtc.is_some()
    }

    pub fn has_reader(&self) -> bool {
        self.reader.is_some()
    }

    fn display_result(&mut self, result: Result<(), crate::error::DisplayError>) {
        match result {
            Ok(()) => self.display_faulted = false,
            Err(e) if !self.display_faulted => {
                warn!("LCD write failed: {}", e);
                self.display_faulted = true;
            }
            Err(_) => {}
        }
    }
}

/// Log a failed bring-up step and remember it.
fn bring_up<T>(faults: &mut Vec<Error, 3>, what: &str, result: error::Result<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("{} bring-up failed: {}", what, e);
            let _ = faults.push(e);
            None
        }
    }
}

// ── ClockPort ─────────────────────────────────────────────────

impl<LI2C, RI2C, SPI, BZ, BTN, LD, D> ClockPort for HardwareAdapter<LI2C, RI2C, SPI, BZ, BTN, LD, D>
where
    RI2C: I2c,
{
    fn now(&mut self) -> Result<DateTime, ClockError> {
        match self.rtc.as_mut() {
            Some(rtc) => rtc.datetime(),
            None => Err(ClockError::NotFound),
        }
    }

    fn has_valid_time(&mut self) -> Result<bool, ClockError> {
        match self.rtc.as_mut() {
            Some(rtc) => rtc.lost_power().map(|lost| !lost),
            None => Err(ClockError::NotFound),
        }
    }
}

// ── TagReaderPort ─────────────────────────────────────────────

impl<LI2C, RI2C, SPI, BZ, BTN, LD, D> TagReaderPort
    for HardwareAdapter<LI2C, RI2C, SPI, BZ, BTN, LD, D>
where
    SPI: SpiDevice,
{
    fn try_read_token(&mut self) -> Option<Token> {
        let reader = self.reader.as_mut()?;
        match reader.read_uid() {
            Ok(uid) => Some(uid),
            // Empty field.
            Err(ReaderError::Timeout) => None,
            Err(e) => {
                debug!("MFRC522 read: {}", e);
                None
            }
        }
    }

    fn end_session(&mut self) {
        if let Some(reader) = self.reader.as_mut() {
            if let Err(e) = reader.halt() {
                warn!("MFRC522 halt failed: {}", e);
            }
        }
    }
}

// ── DisplayPort ───────────────────────────────────────────────

impl<LI2C, RI2C, SPI, BZ, BTN, LD, D> DisplayPort
    for HardwareAdapter<LI2C, RI2C, SPI, BZ, BTN, LD, D>
where
    LI2C: I2c,
    RI2C: I2c,
    SPI: SpiDevice,
    BZ: OutputPin,
    BTN: InputPin,
    LD: DelayNs,
    D: DelayNs,
{
    fn clear(&mut self) {
        let result = self.lcd.clear();
        self.display_result(result);
    }

    fn write_at(&mut self, col: u8, row: u8, text: &str) {
        let result = self.lcd.write_str_at(col, row, text);
        self.display_result(result);
    }
}

// ── BuzzerPort ────────────────────────────────────────────────

impl<LI2C, RI2C, SPI, BZ, BTN, LD, D> BuzzerPort for HardwareAdapter<LI2C, RI2C, SPI, BZ, BTN, LD, D>
where
    BZ: OutputPin,
{
    fn set_tone(&mut self, on: bool) {
        self.buzzer.set(on);
    }
}

// ── ButtonPort ────────────────────────────────────────────────

impl<LI2C, RI2C, SPI, BZ, BTN, LD, D> ButtonPort for HardwareAdapter<LI2C, RI2C, SPI, BZ, BTN, LD, D>
where
    BTN: InputPin,
{
    fn is_asserted(&mut self, id: ButtonId) -> bool {
        // Active-low with pull-up; a read error counts as released.
        self.buttons[id.index()].is_low().unwrap_or(false)
    }
}

// ── MonotonicPort / RandomPort ────────────────────────────────

impl<LI2C, RI2C, SPI, BZ, BTN, LD, D> MonotonicPort
    for HardwareAdapter<LI2C, RI2C, SPI, BZ, BTN, LD, D>
{
    fn now_ms(&self) -> u64 {
        self.uptime.now_ms()
    }
}

impl<LI2C, RI2C, SPI, BZ, BTN, LD, D> RandomPort for HardwareAdapter<LI2C, RI2C, SPI, BZ, BTN, LD, D> {
    fn next_u32(&mut self) -> u32 {
        self.rng.next_u32()
    }
}

// ── DelayNs ───────────────────────────────────────────────────

impl<LI2C, RI2C, SPI, BZ, BTN, LD, D> DelayNs for HardwareAdapter<LI2C, RI2C, SPI, BZ, BTN, LD, D>
where
    D: DelayNs,
{
    fn delay_ns(&mut self, ns: u32) {
        self.delay.delay_ns(ns);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.delay.delay_ms(ms);
    }
}
