//! CarePal firmware entry point.
//!
//! Hexagonal architecture with a single cooperative polling loop.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter                        LogEventSink           │
//! │  (Clock · Reader · Display · Buzzer ·   (EventSink)            │
//! │   Buttons · Uptime · RNG · Delay)                              │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              AppService (pure logic)                   │    │
//! │  │  Session FSM · Reminders · Sampler · Registry          │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use core::cell::RefCell;

use anyhow::Result;
use embedded_hal::delay::DelayNs;
use embedded_hal_bus::i2c::RefCellDevice;
use esp_idf_hal::delay::{Ets, FreeRtos};
use esp_idf_hal::gpio::{AnyIOPin, AnyOutputPin, Input, PinDriver, Pull};
use esp_idf_hal::i2c::{I2cConfig, I2cDriver};
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_hal::spi::{config::Config as SpiConfig, SpiDeviceDriver, SpiDriver, SpiDriverConfig};
use esp_idf_hal::units::Hertz;
use log::{info, warn};

use carepal::adapters::hardware::HardwareAdapter;
use carepal::adapters::log_sink::LogEventSink;
use carepal::app::service::AppService;
use carepal::config::SystemConfig;
use carepal::drivers::buzzer::Buzzer;
use carepal::drivers::lcd::{Lcd1602, LCD_ADDR};
use carepal::drivers::rfid::Mfrc522;
use carepal::drivers::rtc::Ds3231;
use carepal::pins;

/// Button line with the internal pull-up enabled.
fn button_input(gpio: i32) -> Result<PinDriver<'static, AnyIOPin, Input>> {
    // SAFETY: each GPIO in `pins` is claimed exactly once, here or below.
    let mut pin = PinDriver::input(unsafe { AnyIOPin::new(gpio) })?;
    pin.set_pull(Pull::Up)?;
    Ok(pin)
}

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  CarePal v{}                       ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Configuration ──────────────────────────────────────
    let config = SystemConfig::default();
    if let Err(e) = config.validate() {
        warn!("Config: {}", e);
    }
    match serde_json::to_string(&config) {
        Ok(json) => info!("Config: {}", json),
        Err(e) => warn!("Config not serialisable: {}", e),
    }

    // ── 3. Peripherals ────────────────────────────────────────
    let p = Peripherals::take()?;

    // SAFETY (all `Any*Pin::new` below): pin numbers come from `pins`,
    // none is claimed twice and nothing else in the firmware uses them.
    let i2c = I2cDriver::new(
        p.i2c0,
        unsafe { AnyIOPin::new(pins::I2C_SDA_GPIO) },
        unsafe { AnyIOPin::new(pins::I2C_SCL_GPIO) },
        &I2cConfig::new().baudrate(Hertz(pins::I2C_FREQ_HZ)),
    )?;
    let i2c_bus = RefCell::new(i2c);

    let spi = SpiDriver::new(
        p.spi2,
        unsafe { AnyIOPin::new(pins::SPI_SCLK_GPIO) },
        unsafe { AnyIOPin::new(pins::SPI_MOSI_GPIO) },
        Some(unsafe { AnyIOPin::new(pins::SPI_MISO_GPIO) }),
        &SpiDriverConfig::new(),
    )?;
    let spi_dev = SpiDeviceDriver::new(
        spi,
        Some(unsafe { AnyOutputPin::new(pins::RFID_CS_GPIO) }),
        &SpiConfig::new().baudrate(Hertz(pins::SPI_FREQ_HZ)),
    )?;

    // Held high for the lifetime of `main`; dropping it would reset the pin.
    let mut rfid_rst = PinDriver::output(unsafe { AnyOutputPin::new(pins::RFID_RST_GPIO) })?;
    rfid_rst.set_high()?;

    let buzzer_pin = PinDriver::output(unsafe { AnyOutputPin::new(pins::BUZZER_GPIO) })?;

    let buttons = [
        button_input(pins::BUTTON_GPIOS[0])?,
        button_input(pins::BUTTON_GPIOS[1])?,
        button_input(pins::BUTTON_GPIOS[2])?,
        button_input(pins::BUTTON_GPIOS[3])?,
    ];

    // ── 4. Adapters ───────────────────────────────────────────
    let mut hw = HardwareAdapter::new(
        Lcd1602::new(RefCellDevice::new(&i2c_bus), Ets, LCD_ADDR),
        Ds3231::new(RefCellDevice::new(&i2c_bus)),
        Mfrc522::new(spi_dev),
        Buzzer::new(buzzer_pin),
        buttons,
        FreeRtos,
    );
    for fault in hw.faults() {
        warn!("Degraded start: {}", fault);
    }
    if !hw.has_rtc() {
        warn!("Running without RTC: reminders are disabled");
    }
    let mut sink = LogEventSink::new();

    // ── 5. App service ────────────────────────────────────────
    let tick_ms = config.tick_interval_ms;
    let mut app = AppService::new(config);
    app.boot(&mut hw, &mut sink);

    info!("System ready. Entering main loop.");

    // ── 6. Main loop ──────────────────────────────────────────
    loop {
        app.tick(&mut hw, &mut sink);
        hw.delay_ms(tick_ms);
    }
}
