//! Fuzz target: `Mfrc522::read_uid` / `Mfrc522::halt`
//!
//! Answers every register read with the next fuzz byte, so the IRQ,
//! error, FIFO level and FIFO data registers all take arbitrary values.
//! The wake/anticollision/select path must never panic, must terminate,
//! and must only return UIDs that fit a token.
//!
//! cargo fuzz run fuzz_reader_select

#![no_main]

use carepal::drivers::rfid::Mfrc522;
use carepal::registry::MAX_TOKEN_LEN;
use embedded_hal::spi::{ErrorKind, ErrorType, Operation, SpiDevice};
use libfuzzer_sys::fuzz_target;

struct ScriptedChip<'a> {
    data: &'a [u8],
    pos: usize,
}

impl ErrorType for ScriptedChip<'_> {
    type Error = ErrorKind;
}

impl SpiDevice for ScriptedChip<'_> {
    fn transaction(&mut self, operations: &mut [Operation<'_, u8>]) -> Result<(), Self::Error> {
        for op in operations {
            if let Operation::TransferInPlace(buf) = op {
                // Exhausted input reads as an idle chip.
                let value = self.data.get(self.pos).copied().unwrap_or(0);
                self.pos += 1;
                if let Some(slot) = buf.get_mut(1) {
                    *slot = value;
                }
            }
        }
        Ok(())
    }
}

fuzz_target!(|data: &[u8]| {
    let mut reader = Mfrc522::new(ScriptedChip { data, pos: 0 });

    if let Ok(uid) = reader.read_uid() {
        assert!(!uid.is_empty());
        assert!(uid.len() <= MAX_TOKEN_LEN);
    }
    let _ = reader.halt();
});
