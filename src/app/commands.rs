//! Inbound commands to the application service.
//!
//! Each maps to one user-initiated, blocking flow. The main loop produces
//! them from accepted button presses; tests inject them directly.

use crate::drivers::button::ButtonId;

/// Commands that trigger a user flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppCommand {
    /// Show the memory prompt and the last item seen.
    RecallMemory,

    /// Acknowledge the first pending dose, or show the next one.
    AcknowledgeMedication,

    /// Run the guided breathing sequence.
    StartExercise,

    /// Raise the local SOS alert.
    RaiseSos,
}

impl AppCommand {
    /// The flow bound to a physical button.
    pub fn for_button(id: ButtonId) -> Self {
        match id {
            ButtonId::Memory => Self::RecallMemory,
            ButtonId::Medicine => Self::AcknowledgeMedication,
            ButtonId::Exercise => Self::StartExercise,
            ButtonId::Sos => Self::RaiseSos,
        }
    }
}
