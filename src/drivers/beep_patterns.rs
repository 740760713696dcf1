//! Buzzer pulse patterns.
//!
//! The buzzer is level-triggered, so every audible cue is a fixed table of
//! on/off pulses. The service walks a pattern's [`Pulse`]s, switching the
//! tone and sleeping for each half; [`BeepPattern::level_at`] gives the same
//! answer for a phase offset, which is what tests use.
//!
//! ## Pattern table
//!
//! | Pattern        | Shape                         | Used by                 |
//! |----------------|-------------------------------|-------------------------|
//! | Ack            | one click                     | accepted button press   |
//! | Hydration      | two short                     | hourly water nudge      |
//! | MedicationDue  | one long                      | pending dose reminder   |
//! | Inhale         | one short                     | breathing: inhale cue   |
//! | Exhale         | one long                      | breathing: exhale cue   |
//! | SosBurst       | short-long-short              | SOS window, repeated    |
//! | Warning        | two medium                    | boot clock warnings     |

/// One on/off half-cycle pair, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pulse {
    pub on_ms: u32,
    pub off_ms: u32,
}

const fn pulse(on_ms: u32, off_ms: u32) -> Pulse {
    Pulse { on_ms, off_ms }
}

/// Pattern identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BeepPattern {
    Ack,
    Hydration,
    MedicationDue,
    Inhale,
    Exhale,
    SosBurst,
    Warning,
}

const ACK: &[Pulse] = &[pulse(40, 0)];
const HYDRATION: &[Pulse] = &[pulse(100, 100), pulse(100, 0)];
const MEDICATION_DUE: &[Pulse] = &[pulse(800, 0)];
const INHALE: &[Pulse] = &[pulse(120, 0)];
const EXHALE: &[Pulse] = &[pulse(600, 0)];
const SOS_BURST: &[Pulse] = &[pulse(150, 100), pulse(450, 100), pulse(150, 300)];
const WARNING: &[Pulse] = &[pulse(250, 150), pulse(250, 0)];

impl BeepPattern {
    /// The pulse table for this pattern.
    pub const fn pulses(self) -> &'static [Pulse] {
        match self {
            Self::Ack => ACK,
            Self::Hydration => HYDRATION,
            Self::MedicationDue => MEDICATION_DUE,
            Self::Inhale => INHALE,
            Self::Exhale => EXHALE,
            Self::SosBurst => SOS_BURST,
            Self::Warning => WARNING,
        }
    }

    /// Total time the pattern occupies the buzzer.
    pub const fn duration_ms(self) -> u32 {
        let pulses = self.pulses();
        let mut total = 0;
        let mut i = 0;
        while i < pulses.len() {
            total += pulses[i].on_ms + pulses[i].off_ms;
            i += 1;
        }
        total
    }

    /// Tone level `phase_ms` into the pattern. Silent past the end.
    pub fn level_at(self, phase_ms: u32) -> bool {
        let mut start = 0;
        for p in self.pulses() {
            if phase_ms < start + p.on_ms {
                return phase_ms >= start;
            }
            start += p.on_ms + p.off_ms;
            if phase_ms < start {
                return false;
            }
        }
        false
    }
}
