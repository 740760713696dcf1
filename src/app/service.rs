//! Application service: the flow controller.
//!
//! [`AppService`] owns every piece of mutable state: debounce cells, the
//! item registry, the reminder engine, the tag session FSM and the idle
//! timer.  All I/O flows through port traits injected at call sites, so
//! the whole service runs against a simulated board in tests.
//!
//! ```text
//!  ClockPort ────▶ ┌──────────────────────────────┐ ──▶ DisplayPort
//!  TagReaderPort ─▶│         AppService           │ ──▶ BuzzerPort
//!  ButtonPort ────▶│ Session FSM · Reminders ·    │ ──▶ EventSink
//!                  │ Sampler · Registry           │
//!                  └──────────────────────────────┘
//! ```
//!
//! One [`tick`](AppService::tick) runs, in order: tag check, throttled
//! reminder check, button checks, idle timeout.  Flows block the loop
//! until they finish; the only early exit is SOS inside a tag session.

use embedded_hal::delay::DelayNs;
use log::{debug, info, warn};

use crate::clock::DateTime;
use crate::config::{SystemConfig, AFFIRMATIONS, KNOWN_ITEMS, MEDICATIONS};
use crate::drivers::beep_patterns::BeepPattern;
use crate::drivers::button::{ButtonId, InputSampler};
use crate::error::ClockError;
use crate::fsm::{Fsm, SessionContext, SessionEnd, StateId};
use crate::registry::{ItemRegistry, TagIdentity, Token};
use crate::scheduler::{Acknowledgment, ReminderEngine};

use super::commands::AppCommand;
use super::events::AppEvent;
use super::ports::{BoardPort, BuzzerPort, DisplayPort, EventSink, Reminder, ReminderDelegate};
use super::screens::{self, Screen};

/// Shown in place of a time stamp when the clock has never been read.
const NO_TIME: &str = "--:-- --/--";

// ───────────────────────────────────────────────────────────────
// AppService
// ───────────────────────────────────────────────────────────────

pub struct AppService {
    config: SystemConfig,
    sampler: InputSampler,
    registry: ItemRegistry,
    reminders: ReminderEngine,
    session: Fsm,
    session_ctx: SessionContext,
    /// Uptime of the last accepted input or menu return.
    last_activity_ms: u64,
    /// Last successful clock read.
    last_time: Option<DateTime>,
    /// A clock fault has been reported and not yet cleared.
    clock_faulted: bool,
}

impl AppService {
    /// Construct with the compiled-in item and medication tables.
    pub fn new(config: SystemConfig) -> Self {
        let registry = ItemRegistry::from_table(KNOWN_ITEMS);
        let reminders = ReminderEngine::from_table(MEDICATIONS, config.scheduler_interval_ms);
        Self::with_tables(config, registry, reminders)
    }

    /// Construct with caller-supplied tables.
    pub fn with_tables(
        config: SystemConfig,
        registry: ItemRegistry,
        reminders: ReminderEngine,
    ) -> Self {
        Self {
            sampler: InputSampler::new(config.debounce_ms),
            session_ctx: SessionContext::new(config.tag_absence_timeout_ms),
            session: Fsm::session(),
            registry,
            reminders,
            config,
            last_activity_ms: 0,
            last_time: None,
            clock_faulted: false,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Splash, clock probe, first menu.  Never fails: a missing or
    /// stopped clock is reported and the device carries on degraded.
    pub fn boot(&mut self, hw: &mut impl BoardPort, sink: &mut impl EventSink) {
        show(hw, &Screen::splash());
        hw.delay_ms(self.config.prompt_hold_ms);

        let clock_fault = match hw.has_valid_time() {
            Ok(true) => None,
            Ok(false) => {
                warn!("RTC lost power; time is unreliable until set");
                show(hw, &Screen::rtc_lost_power());
                timed_beep(hw, BeepPattern::Warning, self.config.prompt_hold_ms);
                Some(ClockError::LostPower)
            }
            Err(e) => {
                warn!("RTC unavailable: {}", e);
                self.clock_faulted = true;
                show(hw, &Screen::rtc_not_found());
                timed_beep(hw, BeepPattern::Warning, self.config.prompt_hold_ms);
                Some(e)
            }
        };

        self.session.start(&mut self.session_ctx);
        self.return_to_menu(hw, sink);
        sink.emit(&AppEvent::Started { clock_fault });
        info!(
            "AppService started ({} items, {} medications)",
            self.registry.len(),
            self.reminders.entries().len()
        );
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// One pass of the main loop.
    pub fn tick(&mut self, hw: &mut impl BoardPort, sink: &mut impl EventSink) {
        // 1. Tag check; a read escalates into the blocking presence loop.
        if let Some(token) = hw.try_read_token() {
            self.run_tag_session(&token, hw, sink);
        }

        // 2. Reminders, on their own cadence.
        let now_ms = hw.now_ms();
        if self.reminders.is_due(now_ms) {
            match self.current_time(hw, sink) {
                Some(now) => {
                    let mut view = ReminderView {
                        hw: &mut *hw,
                        sink: &mut *sink,
                        config: &self.config,
                    };
                    self.reminders.tick(now_ms, &now, &mut view);
                }
                None => debug!("Reminders skipped: no wall-clock time"),
            }
        }

        // 3. Buttons, in cell order.  SOS is inlined on its own path.
        for id in ButtonId::MENU {
            if self.poll_button(id, hw) {
                self.handle_command(AppCommand::for_button(id), hw, sink);
            }
        }
        if self.poll_sos(hw) {
            self.handle_command(AppCommand::RaiseSos, hw, sink);
        }

        // 4. Idle timeout.
        let now_ms = hw.now_ms();
        if now_ms.saturating_sub(self.last_activity_ms) > u64::from(self.config.idle_timeout_ms) {
            self.return_to_menu(hw, sink);
            sink.emit(&AppEvent::IdleRedraw);
        }
    }

    // ── Command handling ──────────────────────────────────────

    /// Run a user flow to completion.
    pub fn handle_command(
        &mut self,
        cmd: AppCommand,
        hw: &mut impl BoardPort,
        sink: &mut impl EventSink,
    ) {
        debug!("Command: {:?}", cmd);
        match cmd {
            AppCommand::RecallMemory => self.run_memory(hw, sink),
            AppCommand::AcknowledgeMedication => self.run_acknowledge(hw, sink),
            AppCommand::StartExercise => self.run_exercise(hw, sink),
            AppCommand::RaiseSos => self.run_sos(hw, sink),
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn config(&self) -> &SystemConfig {
        &self.config
    }

    pub fn registry(&self) -> &ItemRegistry {
        &self.registry
    }

    pub fn reminders(&self) -> &ReminderEngine {
        &self.reminders
    }

    /// Current tag session state.
    pub fn session_state(&self) -> StateId {
        self.session.current_state()
    }

    /// Last successful clock read, if any.
    pub fn last_time(&self) -> Option<DateTime> {
        self.last_time
    }

    pub fn last_activity_ms(&self) -> u64 {
        self.last_activity_ms
    }

    // ── Inputs ────────────────────────────────────────────────

    /// Debounced menu button: on acceptance record activity and chirp.
    fn poll_button(&mut self, id: ButtonId, hw: &mut impl BoardPort) -> bool {
        let asserted = hw.is_asserted(id);
        let now_ms = hw.now_ms();
        if !self.sampler.poll(id, asserted, now_ms) {
            return false;
        }
        self.last_activity_ms = now_ms;
        play(hw, BeepPattern::Ack);
        true
    }

    /// Held-SOS path: own cell, no chirp.
    fn poll_sos(&mut self, hw: &mut impl BoardPort) -> bool {
        let asserted = hw.is_asserted(ButtonId::Sos);
        let now_ms = hw.now_ms();
        if !self.sampler.poll_held(asserted, now_ms) {
            return false;
        }
        self.last_activity_ms = now_ms;
        true
    }

    /// Read the wall clock, falling back to the last good value.
    /// A fault is reported once until the clock reads again.
    fn current_time(
        &mut self,
        hw: &mut impl BoardPort,
        sink: &mut impl EventSink,
    ) -> Option<DateTime> {
        match hw.now() {
            Ok(now) => {
                if self.clock_faulted {
                    info!("RTC readable again");
                    self.clock_faulted = false;
                }
                self.last_time = Some(now);
                Some(now)
            }
            Err(e) => {
                if !self.clock_faulted {
                    warn!("RTC read failed: {}", e);
                    self.clock_faulted = true;
                    sink.emit(&AppEvent::ClockFault(e));
                }
                self.last_time
            }
        }
    }

    // ── Tag session ───────────────────────────────────────────

    fn run_tag_session(
        &mut self,
        token: &Token,
        hw: &mut impl BoardPort,
        sink: &mut impl EventSink,
    ) {
        let stamp = match self.current_time(hw, sink) {
            Some(now) => now.stamp(),
            None => screens::fit(NO_TIME),
        };
        let identity = self.registry.resolve(token, &stamp);
        let screen = match &identity {
            TagIdentity::Known { name, .. } => Screen::item_found(name, &stamp),
            TagIdentity::Unknown { hex } => Screen::unknown_tag(hex),
        };
        show(hw, &screen);
        sink.emit(&AppEvent::TagSessionStarted(identity));
        hw.end_session();

        self.session_ctx.observe(hw.now_ms(), true, false);
        self.session.tick(&mut self.session_ctx);
        hw.set_tone(self.session_ctx.outputs.buzzer_on);

        // Presence loop.  Starves the main loop while the tag stays put.
        while self.session.current_state() == StateId::SessionActive {
            hw.delay_ms(self.config.tag_poll_interval_ms);
            let sos = self.poll_sos(hw);
            let seen = hw.try_read_token().is_some();
            if seen {
                hw.end_session();
            }
            self.session_ctx.observe(hw.now_ms(), seen, sos);
            self.session.tick(&mut self.session_ctx);
        }

        let outputs = self.session_ctx.outputs;
        hw.set_tone(outputs.buzzer_on);
        if outputs.end_reader_session {
            hw.end_session();
        }
        if outputs.redraw_menu {
            self.return_to_menu(hw, sink);
        }

        let reason = self.session_ctx.end_reason.unwrap_or(SessionEnd::TagRemoved);
        sink.emit(&AppEvent::TagSessionEnded {
            reason,
            held_ms: self.session_ctx.held_ms(),
        });

        if reason == SessionEnd::SosPressed {
            self.run_sos(hw, sink);
        }
    }

    // ── Flows ─────────────────────────────────────────────────

    fn run_memory(&mut self, hw: &mut impl BoardPort, sink: &mut impl EventSink) {
        show(hw, &Screen::memory_prompt());
        hw.delay_ms(self.config.prompt_hold_ms);

        let item = self.registry.last_recognised();
        show(hw, &Screen::memory_recall(item));
        sink.emit(&AppEvent::MemoryRecall {
            item: item.map(|i| i.name),
        });
        hw.delay_ms(self.config.prompt_hold_ms);

        self.return_to_menu(hw, sink);
    }

    fn run_acknowledge(&mut self, hw: &mut impl BoardPort, sink: &mut impl EventSink) {
        let now = self.current_time(hw, sink).unwrap_or_default();
        match self.reminders.acknowledge(&now) {
            Acknowledgment::Taken { name, .. } => {
                let affirmation = pick_affirmation(hw.next_u32());
                show(hw, &Screen::medication_taken(affirmation, name));
                sink.emit(&AppEvent::MedicationTaken { name, affirmation });
            }
            Acknowledgment::NextDue {
                name, hour, minute, ..
            } => {
                show(hw, &Screen::next_medication(name, hour, minute));
                sink.emit(&AppEvent::NextMedication { name, hour, minute });
            }
            Acknowledgment::NoneScheduled => show(hw, &Screen::no_medication()),
        }
        hw.delay_ms(self.config.prompt_hold_ms);
        self.return_to_menu(hw, sink);
    }

    fn run_exercise(&mut self, hw: &mut impl BoardPort, sink: &mut impl EventSink) {
        let cycles = self.config.breathing_cycles;
        info!("Breathing exercise: {} rounds", cycles);
        for cycle in 1..=cycles {
            timed_phase(
                hw,
                &Screen::inhale(cycle, cycles),
                Some(BeepPattern::Inhale),
                self.config.inhale_ms,
            );
            timed_phase(hw, &Screen::hold(cycle, cycles), None, self.config.hold_ms);
            timed_phase(
                hw,
                &Screen::exhale(cycle, cycles),
                Some(BeepPattern::Exhale),
                self.config.exhale_ms,
            );
        }
        show(hw, &Screen::exercise_done());
        sink.emit(&AppEvent::ExerciseCompleted { cycles });
        hw.delay_ms(self.config.prompt_hold_ms);
        self.return_to_menu(hw, sink);
    }

    fn run_sos(&mut self, hw: &mut impl BoardPort, sink: &mut impl EventSink) {
        warn!("SOS raised");
        show(hw, &Screen::sos_alert());
        sink.emit(&AppEvent::SosRaised);

        let window = u64::from(self.config.sos_window_ms);
        let burst = u64::from(BeepPattern::SosBurst.duration_ms());
        let started = hw.now_ms();
        let mut bursts = 0u32;
        loop {
            let elapsed = hw.now_ms().saturating_sub(started);
            if elapsed + burst > window {
                break;
            }
            play(hw, BeepPattern::SosBurst);
            bursts += 1;
        }
        let elapsed = hw.now_ms().saturating_sub(started);
        if let Ok(rest) = u32::try_from(window.saturating_sub(elapsed)) {
            hw.delay_ms(rest);
        }
        hw.set_tone(false);

        show(hw, &Screen::sos_done());
        sink.emit(&AppEvent::SosFinished { bursts });
        hw.delay_ms(self.config.sos_closing_ms);
        self.return_to_menu(hw, sink);
    }

    /// Draw the menu and restart the idle timer.
    fn return_to_menu(&mut self, hw: &mut impl BoardPort, sink: &mut impl EventSink) {
        let now = self.current_time(hw, sink);
        show(hw, &Screen::menu(now.as_ref()));
        self.last_activity_ms = hw.now_ms();
    }
}

// ───────────────────────────────────────────────────────────────
// Reminder rendering
// ───────────────────────────────────────────────────────────────

/// Renders reminders while the engine is mid-check.
struct ReminderView<'a, H, S> {
    hw: &'a mut H,
    sink: &'a mut S,
    config: &'a SystemConfig,
}

impl<H: BoardPort, S: EventSink> ReminderDelegate for ReminderView<'_, H, S> {
    fn on_reminder(&mut self, reminder: Reminder) {
        match reminder {
            Reminder::Hydration { hour } => {
                show(self.hw, &Screen::hydration());
                self.sink.emit(&AppEvent::HydrationNudge { hour });
                timed_beep(self.hw, BeepPattern::Hydration, self.config.hydration_hold_ms);
            }
            Reminder::MedicationArmed { name, .. } => {
                self.sink.emit(&AppEvent::MedicationArmed { name });
            }
            Reminder::MedicationDue { name, .. } => {
                show(self.hw, &Screen::medication_due(name));
                self.sink.emit(&AppEvent::MedicationDue { name });
                play(self.hw, BeepPattern::MedicationDue);
            }
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Output helpers
// ───────────────────────────────────────────────────────────────

fn show(hw: &mut impl DisplayPort, screen: &Screen) {
    hw.clear();
    hw.write_at(0, 0, &screen.top);
    hw.write_at(0, 1, &screen.bottom);
}

/// Sound a pattern to completion, leaving the buzzer off.
fn play<H: BuzzerPort + DelayNs + ?Sized>(hw: &mut H, pattern: BeepPattern) {
    for pulse in pattern.pulses() {
        hw.set_tone(true);
        hw.delay_ms(pulse.on_ms);
        hw.set_tone(false);
        if pulse.off_ms > 0 {
            hw.delay_ms(pulse.off_ms);
        }
    }
}

/// Sound a pattern, then wait out the rest of `total_ms`.
fn timed_beep<H: BuzzerPort + DelayNs + ?Sized>(hw: &mut H, pattern: BeepPattern, total_ms: u32) {
    play(hw, pattern);
    hw.delay_ms(total_ms.saturating_sub(pattern.duration_ms()));
}

/// One breathing phase lasting exactly `total_ms`.
fn timed_phase<H: BoardPort>(
    hw: &mut H,
    screen: &Screen,
    cue: Option<BeepPattern>,
    total_ms: u32,
) {
    show(hw, screen);
    match cue {
        Some(pattern) => timed_beep(hw, pattern, total_ms),
        None => hw.delay_ms(total_ms),
    }
}

fn pick_affirmation(random: u32) -> &'static str {
    if AFFIRMATIONS.is_empty() {
        return "Well done!";
    }
    AFFIRMATIONS[random as usize % AFFIRMATIONS.len()]
}
