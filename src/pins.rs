//! GPIO / peripheral pin assignments for the CarePal board (ESP32-S3).
//!
//! Single source of truth: `main` builds every peripheral from these
//! numbers rather than hard-coding pins.

// ---------------------------------------------------------------------------
// Buttons (active-low, internal pull-ups)
// ---------------------------------------------------------------------------

pub const BUTTON_MEMORY_GPIO: i32 = 4;
pub const BUTTON_MEDICINE_GPIO: i32 = 5;
pub const BUTTON_EXERCISE_GPIO: i32 = 6;
pub const BUTTON_SOS_GPIO: i32 = 7;

/// Indexed by [`ButtonId`](crate::drivers::button::ButtonId).
pub const BUTTON_GPIOS: [i32; 4] = [
    BUTTON_MEMORY_GPIO,
    BUTTON_MEDICINE_GPIO,
    BUTTON_EXERCISE_GPIO,
    BUTTON_SOS_GPIO,
];

// ---------------------------------------------------------------------------
// Buzzer (active piezo, HIGH = on)
// ---------------------------------------------------------------------------

pub const BUZZER_GPIO: i32 = 15;

// ---------------------------------------------------------------------------
// I²C bus, shared by the LCD backpack (0x27) and the DS3231 (0x68)
// ---------------------------------------------------------------------------

pub const I2C_SDA_GPIO: i32 = 8;
pub const I2C_SCL_GPIO: i32 = 9;
pub const I2C_FREQ_HZ: u32 = 100_000;

// ---------------------------------------------------------------------------
// SPI: MFRC522 reader
// ---------------------------------------------------------------------------

pub const SPI_SCLK_GPIO: i32 = 12;
pub const SPI_MOSI_GPIO: i32 = 11;
pub const SPI_MISO_GPIO: i32 = 13;
pub const RFID_CS_GPIO: i32 = 10;
/// Reader hard-reset line; held HIGH to keep the chip running.
pub const RFID_RST_GPIO: i32 = 14;
pub const SPI_FREQ_HZ: u32 = 4_000_000;
