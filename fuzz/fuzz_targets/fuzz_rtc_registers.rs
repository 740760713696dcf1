//! Fuzz target: `Ds3231::datetime` / `Ds3231::lost_power`
//!
//! Serves arbitrary bytes as the RTC's register contents and asserts
//! that decoding never panics and never yields an out-of-range time.
//!
//! cargo fuzz run fuzz_rtc_registers

#![no_main]

use carepal::drivers::rtc::Ds3231;
use embedded_hal::i2c::{ErrorKind, ErrorType, I2c, Operation};
use libfuzzer_sys::fuzz_target;

/// Every read streams the next fuzz bytes; writes are accepted and ignored.
struct ByteSource<'a> {
    data: &'a [u8],
    pos: usize,
}

impl ErrorType for ByteSource<'_> {
    type Error = ErrorKind;
}

impl I2c for ByteSource<'_> {
    fn transaction(
        &mut self,
        _address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        for op in operations {
            if let Operation::Read(buf) = op {
                for b in buf.iter_mut() {
                    *b = self.data.get(self.pos).copied().ok_or(ErrorKind::Other)?;
                    self.pos += 1;
                }
            }
        }
        Ok(())
    }
}

fuzz_target!(|data: &[u8]| {
    let mut rtc = Ds3231::new(ByteSource { data, pos: 0 });

    if let Ok(now) = rtc.datetime() {
        assert!(now.is_plausible(), "decoder accepted {:?}", now);
        assert!(now.stamp().len() <= 16);
    }
    let _ = rtc.lost_power();
});
