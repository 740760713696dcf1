//! Reminder engine.
//!
//! Runs on its own cadence (every few seconds) inside the main loop and
//! notifies a [`ReminderDelegate`] when something should be shown. The
//! service implements the delegate to drive the display and buzzer.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  tick(now_ms, wall-clock)                                    │
//! │     │  (skipped unless the check interval has elapsed)       │
//! │     ▼                                                        │
//! │  1. Hydration ── minute == 0 && marker != hour ──▶ Hydration │
//! │  2. Due-check ── hh:mm match && not acked today ─▶ Armed     │
//! │  3. Render ───── first pending entry ────────────▶ Due       │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! A pending entry is only cleared by [`ReminderEngine::acknowledge`]. The
//! acknowledgment date stamp is what stops the same minute from re-arming
//! an entry later that day.

use heapless::Vec;
use log::{info, warn};

use crate::app::ports::{Reminder, ReminderDelegate};
use crate::clock::DateTime;

// ═══════════════════════════════════════════════════════════════
//  Medication entries
// ═══════════════════════════════════════════════════════════════

/// Maximum number of medication entries (stack-allocated).
pub const MAX_MEDICATIONS: usize = 10;

/// A single scheduled dose.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MedicationEntry {
    pub name: &'static str,
    /// 0-23
    pub hour: u8,
    /// 0-59
    pub minute: u8,
    /// Due and not yet acknowledged.
    pub pending: bool,
    /// `YYYYMMDD` of the last acknowledgment; 0 = never.
    pub last_ack_date: u32,
}

impl MedicationEntry {
    fn minute_of_day(&self) -> u16 {
        u16::from(self.hour) * 60 + u16::from(self.minute)
    }

    fn is_due_at(&self, now: &DateTime) -> bool {
        self.hour == now.hour && self.minute == now.minute
    }
}

/// Result of pressing the medicine button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Acknowledgment {
    /// The first pending dose was cleared.
    Taken { index: usize, name: &'static str },
    /// Nothing pending; this is the next dose (today, or the first one
    /// tomorrow when the day's list is exhausted).
    NextDue {
        index: usize,
        name: &'static str,
        hour: u8,
        minute: u8,
    },
    /// The table is empty.
    NoneScheduled,
}

// ═══════════════════════════════════════════════════════════════
//  Reminder engine
// ═══════════════════════════════════════════════════════════════

/// Hydration marker, medication table and check throttle.
pub struct ReminderEngine {
    medications: Vec<MedicationEntry, MAX_MEDICATIONS>,
    /// Last hour whose hydration nudge fired.
    hydration_hour: Option<u8>,
    /// Minimum gap between two checks.
    interval_ms: u64,
    /// Uptime of the last check.
    last_check_ms: u64,
}

impl ReminderEngine {
    pub fn new(interval_ms: u32) -> Self {
        Self {
            medications: Vec::new(),
            hydration_hour: None,
            interval_ms: u64::from(interval_ms),
            last_check_ms: 0,
        }
    }

    /// Build from a `(name, hour, minute)` table.
    pub fn from_table(table: &[(&'static str, u8, u8)], interval_ms: u32) -> Self {
        let mut engine = Self::new(interval_ms);
        for &(name, hour, minute) in table {
            if engine.add(name, hour, minute).is_none() {
                warn!("Reminders: table full, '{}' dropped", name);
            }
        }
        if !engine.is_chronological() {
            warn!("Reminders: medication table not in time order; next-dose lookup will be wrong");
        }
        engine
    }

    /// Add a medication.  Returns the slot index, or `None` if full.
    pub fn add(&mut self, name: &'static str, hour: u8, minute: u8) -> Option<usize> {
        let entry = MedicationEntry {
            name,
            hour,
            minute,
            pending: false,
            last_ack_date: 0,
        };
        self.medications.push(entry).ok()?;
        let slot = self.medications.len() - 1;
        info!("Reminders: '{}' at {:02}:{:02} (slot {})", name, hour, minute, slot);
        Some(slot)
    }

    /// Run a check if the interval has elapsed since the previous one.
    pub fn tick(&mut self, now_ms: u64, now: &DateTime, delegate: &mut dyn ReminderDelegate) {
        if !self.is_due(now_ms) {
            return;
        }
        self.last_check_ms = now_ms;
        self.check(now, delegate);
    }

    /// True once the check interval has elapsed since the previous check.
    /// Lets the caller skip the clock read on throttled ticks.
    pub fn is_due(&self, now_ms: u64) -> bool {
        now_ms.saturating_sub(self.last_check_ms) >= self.interval_ms
    }

    /// One unthrottled check: hydration, due-check, then render.
    pub fn check(&mut self, now: &DateTime, delegate: &mut dyn ReminderDelegate) {
        // 1. Hydration nudge, independent of any dose.
        if now.minute == 0 && self.hydration_hour != Some(now.hour) {
            self.hydration_hour = Some(now.hour);
            info!("Reminders: hydration nudge for {:02}:00", now.hour);
            delegate.on_reminder(Reminder::Hydration { hour: now.hour });
        }

        // 2. Arm doses whose minute has come and that were not taken today.
        let today = now.day_code();
        for (index, med) in self.medications.iter_mut().enumerate() {
            if !med.pending && med.is_due_at(now) && med.last_ack_date != today {
                med.pending = true;
                info!("Reminders: '{}' now pending", med.name);
                delegate.on_reminder(Reminder::MedicationArmed {
                    index,
                    name: med.name,
                });
            }
        }

        // 3. Only the first pending dose is shown.
        if let Some((index, med)) = self.first_pending() {
            delegate.on_reminder(Reminder::MedicationDue {
                index,
                name: med.name,
            });
        }
    }

    /// Handle the medicine button.
    pub fn acknowledge(&mut self, now: &DateTime) -> Acknowledgment {
        let today = now.day_code();
        if let Some((index, med)) = self
            .medications
            .iter_mut()
            .enumerate()
            .find(|(_, m)| m.pending)
        {
            med.pending = false;
            med.last_ack_date = today;
            info!("Reminders: '{}' acknowledged on {}", med.name, today);
            return Acknowledgment::Taken {
                index,
                name: med.name,
            };
        }

        match self.next_due(now) {
            Some((index, med)) => Acknowledgment::NextDue {
                index,
                name: med.name,
                hour: med.hour,
                minute: med.minute,
            },
            None => Acknowledgment::NoneScheduled,
        }
    }

    /// First entry strictly later than `now` in table order, else the
    /// first entry (tomorrow). Assumes a chronological table.
    pub fn next_due(&self, now: &DateTime) -> Option<(usize, &MedicationEntry)> {
        let now_min = now.minute_of_day();
        self.medications
            .iter()
            .enumerate()
            .find(|(_, m)| m.minute_of_day() > now_min)
            .or_else(|| self.medications.first().map(|m| (0, m)))
    }

    /// Lowest-index pending entry.
    pub fn first_pending(&self) -> Option<(usize, &MedicationEntry)> {
        self.medications.iter().enumerate().find(|(_, m)| m.pending)
    }

    /// Number of entries currently pending.
    pub fn pending_count(&self) -> usize {
        self.medications.iter().filter(|m| m.pending).count()
    }

    /// True if entries are in ascending time-of-day order.
    pub fn is_chronological(&self) -> bool {
        self.medications
            .windows(2)
            .all(|w| w[0].minute_of_day() <= w[1].minute_of_day())
    }

    pub fn entries(&self) -> &[MedicationEntry] {
        &self.medications
    }

    /// Last hour whose hydration nudge fired.
    pub fn hydration_hour(&self) -> Option<u8> {
        self.hydration_hour
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════
