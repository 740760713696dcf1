//! Polled, per-button debounced input sampler.
//!
//! ## Hardware
//!
//! Four active-low momentary switches with pull-ups. Nothing is
//! interrupt-driven: the main loop samples each line every tick and the
//! sampler decides whether the level counts as a new press.
//!
//! ## Acceptance rule
//!
//! | Cell | Button   | Path                       |
//! |------|----------|----------------------------|
//! | 0    | Memory   | `poll` (ack beep, idle)    |
//! | 1    | Medicine | `poll` (ack beep, idle)    |
//! | 2    | Exercise | `poll` (ack beep, idle)    |
//! | 3    | SOS      | `poll_held` (no ack beep)  |
//!
//! A sample is accepted only when the line is asserted and strictly more
//! than the debounce window has passed since that cell last accepted.
//! Holding a button therefore re-triggers once per window.

use log::debug;

/// Logical button ids, in debounce-cell order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ButtonId {
    Memory = 0,
    Medicine = 1,
    Exercise = 2,
    Sos = 3,
}

impl ButtonId {
    pub const COUNT: usize = 4;

    /// Buttons sampled through the ordinary `poll` path, in check order.
    pub const MENU: [ButtonId; 3] = [ButtonId::Memory, ButtonId::Medicine, ButtonId::Exercise];

    pub fn index(self) -> usize {
        self as usize
    }
}

/// Debounce cells, one per logical button.
#[derive(Debug, Clone)]
pub struct InputSampler {
    debounce_ms: u64,
    last_accept_ms: [Option<u64>; ButtonId::COUNT],
}

impl InputSampler {
    pub fn new(debounce_ms: u32) -> Self {
        Self {
            debounce_ms: u64::from(debounce_ms),
            last_accept_ms: [None; ButtonId::COUNT],
        }
    }

    /// Sample a menu button. `asserted` is the already-inverted line level.
    /// Returns `true` at most once per debounce window.
    pub fn poll(&mut self, id: ButtonId, asserted: bool, now_ms: u64) -> bool {
        self.accept(id, asserted, now_ms)
    }

    /// Held-detection path for SOS. Same window, own cell; the caller
    /// inlines the reaction instead of going through the menu path.
    pub fn poll_held(&mut self, asserted: bool, now_ms: u64) -> bool {
        self.accept(ButtonId::Sos, asserted, now_ms)
    }

    /// When `id` last produced an accepted press.
    pub fn last_accepted(&self, id: ButtonId) -> Option<u64> {
        self.last_accept_ms[id.index()]
    }

    fn accept(&mut self, id: ButtonId, asserted: bool, now_ms: u64) -> bool {
        if !asserted {
            return false;
        }
        let cell = &mut self.last_accept_ms[id.index()];
        let open = match *cell {
            Some(last) => now_ms.saturating_sub(last) > self.debounce_ms,
            None => true,
        };
        if open {
            *cell = Some(now_ms);
            debug!("Button {:?} accepted at {}ms", id, now_ms);
        }
        open
    }
}
