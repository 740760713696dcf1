//! Outbound application events.
//!
//! The [`AppService`](super::service::AppService) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them; on the device they go to the serial
//! log.

use crate::error::ClockError;
use crate::fsm::SessionEnd;
use crate::registry::TagIdentity;

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// Boot finished; carries the clock fault seen during boot, if any.
    Started { clock_fault: Option<ClockError> },

    /// The RTC could not be read at runtime; time features are degraded.
    ClockFault(ClockError),

    /// A token entered the field.
    TagSessionStarted(TagIdentity),

    /// The presence loop returned to idle.
    TagSessionEnded { reason: SessionEnd, held_ms: u64 },

    /// Hourly water reminder shown.
    HydrationNudge { hour: u8 },

    /// A dose became pending.
    MedicationArmed { name: &'static str },

    /// The first pending dose was shown.
    MedicationDue { name: &'static str },

    /// A dose was acknowledged.
    MedicationTaken {
        name: &'static str,
        affirmation: &'static str,
    },

    /// Nothing pending; the next dose was shown.
    NextMedication {
        name: &'static str,
        hour: u8,
        minute: u8,
    },

    /// Memory button: the last recognised item (if any) was shown.
    MemoryRecall { item: Option<&'static str> },

    /// Breathing exercise ran to completion.
    ExerciseCompleted { cycles: u8 },

    /// SOS window started.
    SosRaised,

    /// SOS window finished; carries the number of bursts sounded.
    SosFinished { bursts: u32 },

    /// Menu redrawn after the idle timeout.
    IdleRedraw,
}
