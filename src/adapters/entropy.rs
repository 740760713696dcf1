//! Random numbers for non-security uses (affirmation choice).
//!
//! ESP-IDF: the hardware RNG via `esp_random`.  Host: `RandomState`
//! hashing, which is seeded per process and good enough for a shuffle.

use crate::app::ports::RandomPort;

#[derive(Default)]
pub struct HardwareRng;

impl HardwareRng {
    pub fn new() -> Self {
        Self
    }
}

#[cfg(target_os = "espidf")]
impl RandomPort for HardwareRng {
    fn next_u32(&mut self) -> u32 {
        // SAFETY: stateless read of the RNG register.
        unsafe { esp_idf_sys::esp_random() }
    }
}

#[cfg(not(target_os = "espidf"))]
impl RandomPort for HardwareRng {
    fn next_u32(&mut self) -> u32 {
        use std::collections::hash_map::RandomState;
        use std::hash::{BuildHasher, Hasher};

        let mut h = RandomState::new().build_hasher();
        h.write_u64(
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_nanos() as u64)
                .unwrap_or(0),
        );
        h.finish() as u32
    }
}
