//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (which goes to UART / USB-CDC in production).
//! One line per event, prefixed with a fixed-width tag.

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;
use crate::registry::TagIdentity;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started { clock_fault: None } => {
                info!("START | clock ok");
            }
            AppEvent::Started {
                clock_fault: Some(e),
            } => {
                warn!("START | degraded: {}", e);
            }
            AppEvent::ClockFault(e) => {
                warn!("CLOCK | {}", e);
            }
            AppEvent::TagSessionStarted(TagIdentity::Known { index, name }) => {
                info!("TAG   | known #{} '{}'", index, name);
            }
            AppEvent::TagSessionStarted(TagIdentity::Unknown { hex }) => {
                info!("TAG   | unknown {}", hex);
            }
            AppEvent::TagSessionEnded { reason, held_ms } => {
                info!("TAG   | ended {:?} after {}ms", reason, held_ms);
            }
            AppEvent::HydrationNudge { hour } => {
                info!("WATER | {:02}:00 nudge", hour);
            }
            AppEvent::MedicationArmed { name } => {
                info!("MED   | '{}' pending", name);
            }
            AppEvent::MedicationDue { name } => {
                info!("MED   | '{}' due", name);
            }
            AppEvent::MedicationTaken { name, affirmation } => {
                info!("MED   | '{}' taken ({})", name, affirmation);
            }
            AppEvent::NextMedication { name, hour, minute } => {
                info!("MED   | next '{}' @{:02}:{:02}", name, hour, minute);
            }
            AppEvent::MemoryRecall { item: Some(name) } => {
                info!("MEM   | last seen '{}'", name);
            }
            AppEvent::MemoryRecall { item: None } => {
                info!("MEM   | nothing seen yet");
            }
            AppEvent::ExerciseCompleted { cycles } => {
                info!("BREATH| {} rounds done", cycles);
            }
            AppEvent::SosRaised => {
                warn!("SOS   | raised");
            }
            AppEvent::SosFinished { bursts } => {
                warn!("SOS   | finished, {} bursts", bursts);
            }
            AppEvent::IdleRedraw => {
                info!("IDLE  | menu redrawn");
            }
        }
    }
}
