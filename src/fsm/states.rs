//! Concrete session handler functions and table builder.
//!
//! ```text
//!  IDLE ──[token read]──▶ SESSION_ACTIVE
//!    ▲                         │
//!    └──[absent > timeout]─────┤
//!    └──[SOS pressed]──────────┘
//! ```

use super::context::{SessionContext, SessionEnd};
use super::{StateDescriptor, StateId};
use log::debug;

/// Build the static state table.
pub fn build_state_table() -> [StateDescriptor; StateId::COUNT] {
    [
        // Index 0: Idle
        StateDescriptor {
            id: StateId::Idle,
            name: "Idle",
            on_enter: None,
            on_exit: None,
            on_update: idle_update,
        },
        // Index 1: SessionActive
        StateDescriptor {
            id: StateId::SessionActive,
            name: "SessionActive",
            on_enter: Some(active_enter),
            on_exit: Some(active_exit),
            on_update: active_update,
        },
    ]
}

// ═══════════════════════════════════════════════════════════════════════════
//  IDLE
// ═══════════════════════════════════════════════════════════════════════════

fn idle_update(ctx: &mut SessionContext) -> Option<StateId> {
    if ctx.tag_seen {
        return Some(StateId::SessionActive);
    }
    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  SESSION_ACTIVE
// ═══════════════════════════════════════════════════════════════════════════

fn active_enter(ctx: &mut SessionContext) {
    ctx.started_ms = ctx.now_ms;
    ctx.last_seen_ms = ctx.now_ms;
    ctx.end_reason = None;
    ctx.outputs.buzzer_on = true;
    ctx.outputs.end_reader_session = false;
    ctx.outputs.redraw_menu = false;
}

fn active_update(ctx: &mut SessionContext) -> Option<StateId> {
    if ctx.sos_pressed {
        ctx.end_reason = Some(SessionEnd::SosPressed);
        return Some(StateId::Idle);
    }

    if ctx.tag_seen {
        ctx.last_seen_ms = ctx.now_ms;
        return None;
    }

    if ctx.absent_for_ms() > ctx.absence_timeout_ms {
        debug!("Session: no read for {}ms", ctx.absent_for_ms());
        ctx.end_reason = Some(SessionEnd::TagRemoved);
        return Some(StateId::Idle);
    }

    None
}

fn active_exit(ctx: &mut SessionContext) {
    ctx.outputs.buzzer_on = false;
    ctx.outputs.end_reader_session = true;
    ctx.outputs.redraw_menu = true;
}
