//! MFRC522 13.56 MHz reader over SPI, ISO 14443-A only.
//!
//! Enough of the protocol to read a UID and close the card session:
//!
//! ```text
//!  WUPA ──▶ ATQA
//!  ANTICOLL CLn ──▶ UID part + BCC      (n = 1, 2, 3)
//!  SELECT  CLn ──▶ SAK (+CRC_A)         cascade bit set → next level
//!  HLTA ──────────▶ (no answer expected)
//! ```
//!
//! WUPA is used instead of REQA so a card halted after the previous read
//! still answers; that is what lets the presence loop keep re-reading a
//! tag that stays in the field.
//!
//! CRC_A is computed in software rather than on the chip's coprocessor.

use embedded_hal::delay::DelayNs;
use embedded_hal::spi::SpiDevice;
use heapless::Vec;
use log::debug;

use crate::error::ReaderError;
use crate::registry::Token;

mod reg {
    pub const COMMAND: u8 = 0x01;
    pub const COM_IRQ: u8 = 0x04;
    pub const ERROR: u8 = 0x06;
    pub const STATUS2: u8 = 0x08;
    pub const FIFO_DATA: u8 = 0x09;
    pub const FIFO_LEVEL: u8 = 0x0A;
    pub const CONTROL: u8 = 0x0C;
    pub const BIT_FRAMING: u8 = 0x0D;
    pub const COLL: u8 = 0x0E;
    pub const MODE: u8 = 0x11;
    pub const TX_MODE: u8 = 0x12;
    pub const RX_MODE: u8 = 0x13;
    pub const TX_CONTROL: u8 = 0x14;
    pub const TX_ASK: u8 = 0x15;
    pub const MOD_WIDTH: u8 = 0x24;
    pub const T_MODE: u8 = 0x2A;
    pub const T_PRESCALER: u8 = 0x2B;
    pub const T_RELOAD_H: u8 = 0x2C;
    pub const T_RELOAD_L: u8 = 0x2D;
    pub const VERSION: u8 = 0x37;
}

mod pcd {
    pub const IDLE: u8 = 0x00;
    pub const TRANSCEIVE: u8 = 0x0C;
    pub const SOFT_RESET: u8 = 0x0F;
}

mod picc {
    pub const WUPA: u8 = 0x52;
    pub const HLTA: u8 = 0x50;
    pub const CASCADE_TAG: u8 = 0x88;
    pub const SEL_CL: [u8; 3] = [0x93, 0x95, 0x97];
    pub const NVB_ANTICOLL: u8 = 0x20;
    pub const NVB_SELECT: u8 = 0x70;
}

// ComIrqReg
const IRQ_TIMER: u8 = 0x01;
const IRQ_IDLE: u8 = 0x10;
const IRQ_RX: u8 = 0x20;
// ErrorReg
const ERR_PROTOCOL: u8 = 0x01;
const ERR_PARITY: u8 = 0x02;
const ERR_COLLISION: u8 = 0x08;
const ERR_BUFFER_OVFL: u8 = 0x10;
// Status2Reg
const MF_CRYPTO1_ON: u8 = 0x08;
// BitFramingReg
const START_SEND: u8 = 0x80;
// CollReg
const VALUES_AFTER_COLL: u8 = 0x80;
// SAK
const SAK_CASCADE: u8 = 0x04;

/// Upper bound on ComIrq polls per transceive; the chip's own timer
/// (25 ms) normally ends the wait first.
const MAX_IRQ_POLLS: u16 = 2_000;

/// ISO 14443-A CRC (preset 0x6363, reflected CCITT polynomial).
pub fn crc_a(data: &[u8]) -> [u8; 2] {
    let mut crc: u16 = 0x6363;
    for &byte in data {
        let mut b = byte ^ (crc as u8);
        b ^= b << 4;
        let b16 = u16::from(b);
        crc = (crc >> 8) ^ (b16 << 8) ^ (b16 << 3) ^ (b16 >> 4);
    }
    crc.to_le_bytes()
}

pub struct Mfrc522<SPI> {
    spi: SPI,
}

impl<SPI: SpiDevice> Mfrc522<SPI> {
    pub fn new(spi: SPI) -> Self {
        Self { spi }
    }

    /// Soft reset, 25 ms receive timeout, 100 % ASK, antenna on.
    /// Returns the chip version byte (0x91/0x92 for genuine parts).
    pub fn init(&mut self, delay: &mut impl DelayNs) -> Result<u8, ReaderError> {
        self.write(reg::COMMAND, pcd::SOFT_RESET)?;
        delay.delay_ms(50);

        self.write(reg::TX_MODE, 0x00)?;
        self.write(reg::RX_MODE, 0x00)?;
        self.write(reg::MOD_WIDTH, 0x26)?;
        // TAuto, prescaler 0x0A9 → 40 kHz tick; reload 1000 → 25 ms.
        self.write(reg::T_MODE, 0x80)?;
        self.write(reg::T_PRESCALER, 0xA9)?;
        self.write(reg::T_RELOAD_H, 0x03)?;
        self.write(reg::T_RELOAD_L, 0xE8)?;
        self.write(reg::TX_ASK, 0x40)?;
        self.write(reg::MODE, 0x3D)?;

        let tx = self.read(reg::TX_CONTROL)?;
        if tx & 0x03 != 0x03 {
            self.write(reg::TX_CONTROL, tx | 0x03)?;
        }

        self.read(reg::VERSION)
    }

    /// Wake any card in the field (including halted ones) and read its UID.
    pub fn read_uid(&mut self) -> Result<Token, ReaderError> {
        self.wake()?;
        self.select()
    }

    /// HLTA followed by dropping Crypto1.  Always safe to call.
    pub fn halt(&mut self) -> Result<(), ReaderError> {
        let mut frame = [picc::HLTA, 0x00, 0x00, 0x00];
        let crc = crc_a(&frame[..2]);
        frame[2..].copy_from_slice(&crc);
        let mut sink = [0u8; 1];
        // A halted card stays silent; a timeout here is success.
        match self.transceive(&frame, 0, &mut sink) {
            Ok(_) | Err(ReaderError::Timeout) => {}
            Err(e) => return Err(e),
        }
        self.stop_crypto()
    }

    pub fn stop_crypto(&mut self) -> Result<(), ReaderError> {
        let status = self.read(reg::STATUS2)?;
        self.write(reg::STATUS2, status & !MF_CRYPTO1_ON)
    }

    // ── Protocol ──────────────────────────────────────────────

    fn wake(&mut self) -> Result<(), ReaderError> {
        self.clear_bits(reg::COLL, VALUES_AFTER_COLL)?;
        let mut atqa = [0u8; 2];
        // Short frame: 7 bits.
        let (len, _) = self.transceive(&[picc::WUPA], 7, &mut atqa)?;
        if len != 2 {
            return Err(ReaderError::Protocol);
        }
        Ok(())
    }

    fn select(&mut self) -> Result<Token, ReaderError> {
        let mut uid: Token = Vec::new();
        for &sel in picc::SEL_CL.iter() {
            let mut part = [0u8; 5];
            let (len, _) = self.transceive(&[sel, picc::NVB_ANTICOLL], 0, &mut part)?;
            if len != 5 {
                return Err(ReaderError::Protocol);
            }
            if part[0] ^ part[1] ^ part[2] ^ part[3] != part[4] {
                return Err(ReaderError::Checksum);
            }

            let mut frame = [0u8; 9];
            frame[0] = sel;
            frame[1] = picc::NVB_SELECT;
            frame[2..7].copy_from_slice(&part);
            let crc = crc_a(&frame[..7]);
            frame[7..].copy_from_slice(&crc);

            let mut sak = [0u8; 3];
            let (len, _) = self.transceive(&frame, 0, &mut sak)?;
            if len != 3 {
                return Err(ReaderError::Protocol);
            }
            if crc_a(&sak[..1]) != [sak[1], sak[2]] {
                return Err(ReaderError::Crc);
            }

            let bytes = if part[0] == picc::CASCADE_TAG {
                &part[1..4]
            } else {
                &part[..4]
            };
            uid.extend_from_slice(bytes)
                .map_err(|_| ReaderError::Protocol)?;

            if sak[0] & SAK_CASCADE == 0 {
                debug!("MFRC522: UID {:02X?} (SAK {:02X})", uid.as_slice(), sak[0]);
                return Ok(uid);
            }
        }
        // Three cascade levels exhausted with the cascade bit still set.
        Err(ReaderError::Protocol)
    }

    /// Send `data` and collect the answer.  Returns the byte count and
    /// the number of valid bits in the last byte (0 = all 8).
    fn transceive(
        &mut self,
        data: &[u8],
        tx_last_bits: u8,
        answer: &mut [u8],
    ) -> Result<(usize, u8), ReaderError> {
        self.write(reg::COMMAND, pcd::IDLE)?;
        self.write(reg::COM_IRQ, 0x7F)?;
        self.write(reg::FIFO_LEVEL, 0x80)?;
        for &b in data {
            self.write(reg::FIFO_DATA, b)?;
        }
        self.write(reg::BIT_FRAMING, tx_last_bits & 0x07)?;
        self.write(reg::COMMAND, pcd::TRANSCEIVE)?;
        self.set_bits(reg::BIT_FRAMING, START_SEND)?;

        let mut done = false;
        for _ in 0..MAX_IRQ_POLLS {
            let irq = self.read(reg::COM_IRQ)?;
            if irq & (IRQ_RX | IRQ_IDLE) != 0 {
                done = true;
                break;
            }
            if irq & IRQ_TIMER != 0 {
                break;
            }
        }
        self.clear_bits(reg::BIT_FRAMING, START_SEND)?;
        if !done {
            return Err(ReaderError::Timeout);
        }

        let err = self.read(reg::ERROR)?;
        if err & (ERR_BUFFER_OVFL | ERR_PARITY | ERR_PROTOCOL | ERR_COLLISION) != 0 {
            return Err(ReaderError::Protocol);
        }

        let level = usize::from(self.read(reg::FIFO_LEVEL)?);
        let n = level.min(answer.len());
        for slot in answer.iter_mut().take(n) {
            *slot = self.read(reg::FIFO_DATA)?;
        }
        let valid_bits = self.read(reg::CONTROL)? & 0x07;
        Ok((n, valid_bits))
    }

    // ── Register access ───────────────────────────────────────

    fn read(&mut self, register: u8) -> Result<u8, ReaderError> {
        let mut buf = [0x80 | ((register << 1) & 0x7E), 0x00];
        self.spi
            .transfer_in_place(&mut buf)
            .map_err(|_| ReaderError::Bus)?;
        Ok(buf[1])
    }

    fn write(&mut self, register: u8, value: u8) -> Result<(), ReaderError> {
        self.spi
            .write(&[(register << 1) & 0x7E, value])
            .map_err(|_| ReaderError::Bus)
    }

    fn set_bits(&mut self, register: u8, mask: u8) -> Result<(), ReaderError> {
        let v = self.read(register)?;
        self.write(register, v | mask)
    }

    fn clear_bits(&mut self, register: u8, mask: u8) -> Result<(), ReaderError> {
        let v = self.read(register)?;
        self.write(register, v & !mask)
    }
}
