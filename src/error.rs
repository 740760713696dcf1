//! Unified error types for the CarePal firmware.
//!
//! A single `Error` enum that every subsystem can convert into. All
//! variants are `Copy` so they pass through the service without allocation.
//!
//! Only the clock errors reach the domain logic; display, buzzer and
//! reader failures are logged by the hardware adapter and swallowed.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible driver operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The real-time clock is missing or reported a fault.
    Clock(ClockError),
    /// The character display could not be written.
    Display(DisplayError),
    /// The RFID reader failed a transaction.
    Reader(ReaderError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Clock(e) => write!(f, "clock: {e}"),
            Self::Display(e) => write!(f, "display: {e}"),
            Self::Reader(e) => write!(f, "reader: {e}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Clock errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockError {
    /// The RTC did not acknowledge on the bus.
    NotFound,
    /// The oscillator stopped at some point (battery flat / removed).
    LostPower,
    /// Registers held values outside the calendar range.
    InvalidTime,
}

impl fmt::Display for ClockError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "RTC not found"),
            Self::LostPower => write!(f, "RTC lost power"),
            Self::InvalidTime => write!(f, "RTC time invalid"),
        }
    }
}

impl From<ClockError> for Error {
    fn from(e: ClockError) -> Self {
        Self::Clock(e)
    }
}

// ---------------------------------------------------------------------------
// Display errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayError {
    /// I2C write to the backpack failed.
    BusWriteFailed,
    /// Cursor position outside the 16×2 grid.
    OutOfBounds,
}

impl fmt::Display for DisplayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BusWriteFailed => write!(f, "bus write failed"),
            Self::OutOfBounds => write!(f, "position out of bounds"),
        }
    }
}

impl From<DisplayError> for Error {
    fn from(e: DisplayError) -> Self {
        Self::Display(e)
    }
}

// ---------------------------------------------------------------------------
// Reader errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReaderError {
    /// SPI transfer failed.
    Bus,
    /// No card answered within the reader timer.
    Timeout,
    /// Collision, parity or protocol error reported by the chip.
    Protocol,
    /// UID check byte (BCC) did not match.
    Checksum,
    /// CRC_A of the select acknowledge did not match.
    Crc,
}

impl fmt::Display for ReaderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bus => write!(f, "SPI transfer failed"),
            Self::Timeout => write!(f, "no card response"),
            Self::Protocol => write!(f, "protocol error"),
            Self::Checksum => write!(f, "UID checksum mismatch"),
            Self::Crc => write!(f, "CRC mismatch"),
        }
    }
}

impl From<ReaderError> for Error {
    fn from(e: ReaderError) -> Self {
        Self::Reader(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
