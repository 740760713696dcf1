//! HD44780 16×2 character LCD behind a PCF8574 I2C backpack.
//!
//! The expander drives the controller in 4-bit mode:
//!
//! | PCF8574 bit | LCD line           |
//! |-------------|--------------------|
//! | P0          | RS                 |
//! | P1          | RW (tied)          |
//! | P2          | EN                 |
//! | P3          | backlight, held on |
//! | P4–P7       | D4–D7              |
//!
//! Every byte goes out as two nibbles, each latched by an EN pulse.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;

use crate::error::DisplayError;

/// Common backpack address (A0–A2 high).
pub const LCD_ADDR: u8 = 0x27;
pub const LCD_COLS: u8 = 16;
pub const LCD_ROWS: u8 = 2;

const RS: u8 = 0x01;
const EN: u8 = 0x04;
const BACKLIGHT: u8 = 0x08;

mod cmd {
    pub const CLEAR: u8 = 0x01;
    pub const ENTRY_MODE_INC: u8 = 0x06;
    pub const DISPLAY_ON: u8 = 0x0C;
    pub const FUNCTION_4BIT_2LINE: u8 = 0x28;
    pub const SET_DDRAM: u8 = 0x80;
}

/// DDRAM start address of each row.
const ROW_OFFSETS: [u8; LCD_ROWS as usize] = [0x00, 0x40];

pub struct Lcd1602<I2C, D> {
    i2c: I2C,
    delay: D,
    address: u8,
}

impl<I2C: I2c, D: DelayNs> Lcd1602<I2C, D> {
    pub fn new(i2c: I2C, delay: D, address: u8) -> Self {
        Self {
            i2c,
            delay,
            address,
        }
    }

    /// Power-on sequence: force 8-bit mode three times, drop to 4-bit,
    /// then configure two lines, display on, left-to-right entry.
    pub fn init(&mut self) -> Result<(), DisplayError> {
        self.delay.delay_ms(50);
        self.write_nibble(0x30, 0)?;
        self.delay.delay_us(4_500);
        self.write_nibble(0x30, 0)?;
        self.delay.delay_us(4_500);
        self.write_nibble(0x30, 0)?;
        self.delay.delay_us(150);
        self.write_nibble(0x20, 0)?;

        self.command(cmd::FUNCTION_4BIT_2LINE)?;
        self.command(cmd::DISPLAY_ON)?;
        self.clear()?;
        self.command(cmd::ENTRY_MODE_INC)
    }

    pub fn clear(&mut self) -> Result<(), DisplayError> {
        self.command(cmd::CLEAR)?;
        self.delay.delay_ms(2);
        Ok(())
    }

    pub fn set_cursor(&mut self, col: u8, row: u8) -> Result<(), DisplayError> {
        if col >= LCD_COLS || row >= LCD_ROWS {
            return Err(DisplayError::OutOfBounds);
        }
        self.command(cmd::SET_DDRAM | (ROW_OFFSETS[usize::from(row)] + col))
    }

    /// Write text at the cursor, clipped at the end of the row.
    /// Characters outside the controller's ROM are shown as `?`.
    pub fn write_str_at(&mut self, col: u8, row: u8, text: &str) -> Result<(), DisplayError> {
        self.set_cursor(col, row)?;
        let room = usize::from(LCD_COLS - col);
        for c in text.chars().take(room) {
            let byte = if c.is_ascii() && !c.is_ascii_control() { c as u8 } else { b'?' };
            self.send(byte, RS)?;
        }
        Ok(())
    }

    fn command(&mut self, value: u8) -> Result<(), DisplayError> {
        self.send(value, 0)
    }

    fn send(&mut self, value: u8, mode: u8) -> Result<(), DisplayError> {
        self.write_nibble(value & 0xF0, mode)?;
        self.write_nibble((value << 4) & 0xF0, mode)
    }

    fn write_nibble(&mut self, high: u8, mode: u8) -> Result<(), DisplayError> {
        self.expander_write(high | mode)?;
        self.expander_write(high | mode | EN)?;
        self.delay.delay_us(1);
        self.expander_write(high | mode)?;
        self.delay.delay_us(50);
        Ok(())
    }

    fn expander_write(&mut self, bits: u8) -> Result<(), DisplayError> {
        self.i2c
            .write(self.address, &[bits | BACKLIGHT])
            .map_err(|_| DisplayError::BusWriteFailed)
    }
}
