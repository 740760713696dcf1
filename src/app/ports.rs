//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ AppService (domain)
//! ```
//!
//! Driven adapters (RTC, RFID reader, LCD, buzzer, buttons) implement
//! these traits.  The [`AppService`](super::service::AppService) consumes
//! them via generics, so the domain core never touches hardware directly.
//!
//! Apart from the clock, ports are infallible from the domain's point of
//! view: adapters log bus errors and carry on.

use embedded_hal::delay::DelayNs;

use crate::clock::DateTime;
use crate::drivers::button::ButtonId;
use crate::error::ClockError;
use crate::registry::Token;

// ───────────────────────────────────────────────────────────────
// Clock port (RTC → domain)
// ───────────────────────────────────────────────────────────────

/// Battery-backed wall clock, read-only.
pub trait ClockPort {
    /// Current date and time.
    fn now(&mut self) -> Result<DateTime, ClockError>;

    /// `Ok(false)` if the oscillator stopped since the time was last set.
    fn has_valid_time(&mut self) -> Result<bool, ClockError>;
}

// ───────────────────────────────────────────────────────────────
// Tag reader port (RFID → domain)
// ───────────────────────────────────────────────────────────────

/// Proximity token reader with session semantics.
pub trait TagReaderPort {
    /// Non-blocking attempt to read a token in the field.
    fn try_read_token(&mut self) -> Option<Token>;

    /// Close the card session (halt + stop crypto). Must follow every
    /// successful read before the next attempt.
    fn end_session(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Output ports (domain → LCD / buzzer)
// ───────────────────────────────────────────────────────────────

/// 16×2 character display.
pub trait DisplayPort {
    fn clear(&mut self);

    /// Write `text` starting at (`col`, `row`); clipped at the row end.
    fn write_at(&mut self, col: u8, row: u8, text: &str);
}

/// Level-triggered buzzer; pulses are composed by the caller.
pub trait BuzzerPort {
    fn set_tone(&mut self, on: bool);
}

// ───────────────────────────────────────────────────────────────
// Input ports
// ───────────────────────────────────────────────────────────────

/// Raw button lines. `true` = asserted (line pulled low).
pub trait ButtonPort {
    fn is_asserted(&mut self, id: ButtonId) -> bool;
}

/// Monotonic milliseconds since boot.
pub trait MonotonicPort {
    fn now_ms(&self) -> u64;
}

/// Non-cryptographic randomness (affirmation choice).
pub trait RandomPort {
    fn next_u32(&mut self) -> u32;
}

/// Everything the flow controller drives.
///
/// Blanket-implemented; adapters only implement the individual ports.
pub trait BoardPort:
    ClockPort + TagReaderPort + DisplayPort + BuzzerPort + ButtonPort + MonotonicPort + RandomPort + DelayNs
{
}

impl<T> BoardPort for T where
    T: ClockPort
        + TagReaderPort
        + DisplayPort
        + BuzzerPort
        + ButtonPort
        + MonotonicPort
        + RandomPort
        + DelayNs
{
}

// ───────────────────────────────────────────────────────────────
// Event sink port (domain → logging)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Reminder delegate (decouples the reminder engine from rendering)
// ───────────────────────────────────────────────────────────────

/// Callback trait the [`ReminderEngine`](crate::scheduler::ReminderEngine)
/// invokes during a check.
pub trait ReminderDelegate {
    fn on_reminder(&mut self, reminder: Reminder);
}

/// Discriminant passed to [`ReminderDelegate::on_reminder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reminder {
    /// Top of the hour; drink some water.
    Hydration { hour: u8 },
    /// A dose just became pending.
    MedicationArmed { index: usize, name: &'static str },
    /// The first pending dose; shown every check while pending.
    MedicationDue { index: usize, name: &'static str },
}
