//! Shared mutable context threaded through every session handler.
//!
//! The service writes the latest poll result in, handlers update the
//! presence bookkeeping, and the requested outputs are read back out and
//! applied to the buzzer, reader and display.

/// Why a session returned to idle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// No successful read for longer than the absence timeout.
    TagRemoved,
    /// SOS held while the tag was present.
    SosPressed,
}

// ---------------------------------------------------------------------------
// Output requests (written by handlers; applied by the service)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionOutputs {
    /// Continuous tone while a tag is present.
    pub buzzer_on: bool,
    /// Halt the card and stop crypto before the next read.
    pub end_reader_session: bool,
    /// Put the menu back on the display.
    pub redraw_menu: bool,
}

// ---------------------------------------------------------------------------
// SessionContext
// ---------------------------------------------------------------------------

pub struct SessionContext {
    // -- Inputs for the current poll --
    pub now_ms: u64,
    /// The reader returned a token on this poll.
    pub tag_seen: bool,
    /// SOS accepted on this poll.
    pub sos_pressed: bool,

    // -- Presence bookkeeping --
    /// Uptime of the last successful read.
    pub last_seen_ms: u64,
    /// Uptime the current session opened.
    pub started_ms: u64,
    pub absence_timeout_ms: u64,
    pub end_reason: Option<SessionEnd>,

    // -- Outputs --
    pub outputs: SessionOutputs,
}

impl SessionContext {
    pub fn new(absence_timeout_ms: u32) -> Self {
        Self {
            now_ms: 0,
            tag_seen: false,
            sos_pressed: false,
            last_seen_ms: 0,
            started_ms: 0,
            absence_timeout_ms: u64::from(absence_timeout_ms),
            end_reason: None,
            outputs: SessionOutputs::default(),
        }
    }

    /// Load one poll's inputs.
    pub fn observe(&mut self, now_ms: u64, tag_seen: bool, sos_pressed: bool) {
        self.now_ms = now_ms;
        self.tag_seen = tag_seen;
        self.sos_pressed = sos_pressed;
    }

    /// Time since the last successful read.
    pub fn absent_for_ms(&self) -> u64 {
        self.now_ms.saturating_sub(self.last_seen_ms)
    }

    /// How long the current (or last) session has been open.
    pub fn held_ms(&self) -> u64 {
        self.now_ms.saturating_sub(self.started_ms)
    }
}
