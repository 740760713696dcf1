//! 16×2 screen composition.
//!
//! Every screen the device shows is built here as two fixed-capacity rows,
//! clipped to the panel width. Keeping this pure lets tests assert on exact
//! text without a display.

use core::fmt::Write;

use heapless::String;

use crate::clock::{format_hhmm, DateTime};
use crate::registry::KnownItem;

/// Characters per row.
pub const COLS: usize = 16;

pub type Row = String<COLS>;

/// Top-row label when the token needs both rows.
const UNKNOWN_SHORT: &str = "Unknown ";

/// Two rows of text.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Screen {
    pub top: Row,
    pub bottom: Row,
}

/// Format, then clip to one row.
fn fit_fmt(args: core::fmt::Arguments<'_>) -> Row {
    let mut wide: String<64> = String::new();
    let _ = wide.write_fmt(args);
    fit(&wide)
}

/// Clip `text` to one row.
pub fn fit(text: &str) -> Row {
    let mut row = Row::new();
    for c in text.chars() {
        if row.push(c).is_err() {
            break;
        }
    }
    row
}

impl Screen {
    pub fn new(top: &str, bottom: &str) -> Self {
        Self {
            top: fit(top),
            bottom: fit(bottom),
        }
    }

    fn with_top(top: Row, bottom: &str) -> Self {
        Self {
            top,
            bottom: fit(bottom),
        }
    }

    // ── Boot / menu ───────────────────────────────────────────

    pub fn splash() -> Self {
        Self::new("CarePal", "Starting...")
    }

    pub fn rtc_not_found() -> Self {
        Self::new("RTC not found", "Time unreliable")
    }

    pub fn rtc_lost_power() -> Self {
        Self::new("RTC lost power", "Please set time")
    }

    /// Button legend plus the clock, or dashes if the time is unknown.
    pub fn menu(now: Option<&DateTime>) -> Self {
        match now {
            Some(t) => Self::new("1Mem 2Med 3Ex 4!", &t.stamp()),
            None => Self::new("1Mem 2Med 3Ex 4!", "--:-- --/--"),
        }
    }

    // ── Tag session ───────────────────────────────────────────

    pub fn item_found(name: &str, stamp: &str) -> Self {
        Self::with_top(fit_fmt(format_args!("Found: {}", name)), stamp)
    }

    /// The full token is always shown. A hex string wider than one row
    /// takes the tail of the top row and all of the bottom one.
    pub fn unknown_tag(hex: &str) -> Self {
        if hex.len() <= COLS {
            return Self::new("Unknown tag", hex);
        }
        let (head, tail) = hex.split_at(COLS - UNKNOWN_SHORT.len());
        Self::with_top(fit_fmt(format_args!("{}{}", UNKNOWN_SHORT, head)), tail)
    }

    // ── Reminders ─────────────────────────────────────────────

    pub fn hydration() -> Self {
        Self::new("Drink water!", "Stay hydrated")
    }

    pub fn medication_due(name: &str) -> Self {
        Self::new("MED DUE", name)
    }

    pub fn medication_taken(affirmation: &str, name: &str) -> Self {
        Self::new(affirmation, name)
    }

    pub fn next_medication(name: &str, hour: u8, minute: u8) -> Self {
        Self {
            top: fit("Next Med:"),
            bottom: fit_fmt(format_args!("{} @{}", name, format_hhmm(hour, minute))),
        }
    }

    pub fn no_medication() -> Self {
        Self::new("No meds", "scheduled")
    }

    // ── Memory ────────────────────────────────────────────────

    pub fn memory_prompt() -> Self {
        Self::new("Memory helper", "Show me an item")
    }

    pub fn memory_recall(item: Option<&KnownItem>) -> Self {
        match item {
            Some(item) => {
                Self::with_top(fit_fmt(format_args!("Last: {}", item.name)), &item.last_seen)
            }
            None => Self::new("Nothing seen", "yet"),
        }
    }

    // ── Breathing ─────────────────────────────────────────────

    pub fn inhale(cycle: u8, cycles: u8) -> Self {
        Self::with_top(fit("Breathe in..."), &cycle_label(cycle, cycles))
    }

    pub fn hold(cycle: u8, cycles: u8) -> Self {
        Self::with_top(fit("Hold..."), &cycle_label(cycle, cycles))
    }

    pub fn exhale(cycle: u8, cycles: u8) -> Self {
        Self::with_top(fit("Breathe out..."), &cycle_label(cycle, cycles))
    }

    pub fn exercise_done() -> Self {
        Self::new("Well done!", "Feel calmer now")
    }

    // ── SOS ───────────────────────────────────────────────────

    pub fn sos_alert() -> Self {
        Self::new("!!! SOS !!!", "Sending signal")
    }

    pub fn sos_done() -> Self {
        Self::new("Help is coming", "Stay calm")
    }
}

fn cycle_label(cycle: u8, cycles: u8) -> Row {
    fit_fmt(format_args!("Round {}/{}", cycle, cycles))
}
