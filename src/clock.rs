//! Calendar time as read from the RTC.
//!
//! The reminder engine only ever compares hour:minute and a packed
//! `YYYYMMDD` day code, so [`DateTime`] stays a plain value type with no
//! time-zone or leap-second handling.

use core::fmt::Write;

use heapless::String;

/// Wall-clock reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DateTime {
    pub year: u16,
    /// 1–12
    pub month: u8,
    /// 1–31
    pub day: u8,
    /// 0–23
    pub hour: u8,
    /// 0–59
    pub minute: u8,
    /// 0–59
    pub second: u8,
    /// 0 = Sunday … 6 = Saturday
    pub weekday: u8,
}

impl DateTime {
    pub const fn new(year: u16, month: u8, day: u8, hour: u8, minute: u8, second: u8) -> Self {
        Self {
            year,
            month,
            day,
            hour,
            minute,
            second,
            weekday: 0,
        }
    }

    /// Calendar day packed as `YYYYMMDD`.
    pub fn day_code(&self) -> u32 {
        u32::from(self.year) * 10_000 + u32::from(self.month) * 100 + u32::from(self.day)
    }

    /// Minutes since midnight.
    pub fn minute_of_day(&self) -> u16 {
        u16::from(self.hour) * 60 + u16::from(self.minute)
    }

    /// True if every field is inside its calendar range.
    pub fn is_plausible(&self) -> bool {
        (1..=12).contains(&self.month)
            && (1..=31).contains(&self.day)
            && self.hour < 24
            && self.minute < 60
            && self.second < 60
            && self.weekday < 7
    }

    /// `HH:MM DD/MM`, used for item last-seen stamps and the menu clock.
    pub fn stamp(&self) -> String<16> {
        let mut s = String::new();
        // Capacity covers the fixed-width format.
        let _ = write!(
            s,
            "{:02}:{:02} {:02}/{:02}",
            self.hour, self.minute, self.day, self.month
        );
        s
    }
}

/// `HH:MM` for an arbitrary hour/minute pair.
pub fn format_hhmm(hour: u8, minute: u8) -> String<5> {
    let mut s = String::new();
    let _ = write!(s, "{:02}:{:02}", hour, minute);
    s
}
