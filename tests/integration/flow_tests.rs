//! Boot sequence, button dispatch, the blocking user flows and the idle
//! redraw, timed against the simulated clock.

use crate::mock_hw::{run_until, BoardCall, MockBoard, RecordingSink};

use carepal::app::commands::AppCommand;
use carepal::app::events::AppEvent;
use carepal::app::service::AppService;
use carepal::clock::DateTime;
use carepal::config::SystemConfig;
use carepal::drivers::button::ButtonId;
use carepal::error::ClockError;

const MENU_TOP: &str = "1Mem 2Med 3Ex 4!";

fn wall() -> DateTime {
    DateTime::new(2024, 5, 14, 10, 15, 0)
}

fn make_app() -> (AppService, MockBoard, RecordingSink) {
    let mut app = AppService::new(SystemConfig::default());
    let mut hw = MockBoard::at(wall());
    let mut sink = RecordingSink::new();
    app.boot(&mut hw, &mut sink);
    (app, hw, sink)
}

fn pair(top: &str, bottom: &str) -> (String, String) {
    (top.to_string(), bottom.to_string())
}

// ── Boot ──────────────────────────────────────────────────────

#[test]
fn boot_shows_splash_then_menu() {
    let (_app, hw, sink) = make_app();

    let screens = hw.screens();
    assert_eq!(screens[0], pair("CarePal", "Starting..."));
    assert_eq!(hw.display(), (MENU_TOP, "10:15 14/05"));
    assert_eq!(sink.events, vec![AppEvent::Started { clock_fault: None }]);
    assert_eq!(hw.uptime_ms(), 1_500);
}

#[test]
fn boot_without_rtc_degrades() {
    let mut app = AppService::new(SystemConfig::default());
    let mut hw = MockBoard::without_rtc();
    let mut sink = RecordingSink::new();
    app.boot(&mut hw, &mut sink);

    assert!(hw.saw_screen("RTC not found", "Time unreliable"));
    assert_eq!(hw.display(), (MENU_TOP, "--:-- --/--"));
    assert!(sink.events.contains(&AppEvent::Started {
        clock_fault: Some(ClockError::NotFound),
    }));
    // Warning beep while the fault screen is up.
    assert!(hw.calls.contains(&BoardCall::Tone(true)));
    assert!(!hw.tone());

    // No wall time: reminders are skipped and the boot fault is not re-reported.
    run_until(&mut app, &mut hw, &mut sink, 12_000);
    assert_eq!(sink.count(|e| matches!(e, AppEvent::ClockFault(_))), 0);
    assert_eq!(sink.count(|e| matches!(e, AppEvent::HydrationNudge { .. })), 0);
    assert!(app.last_time().is_none());
}

#[test]
fn boot_with_stopped_oscillator_warns_but_keeps_time() {
    let mut app = AppService::new(SystemConfig::default());
    let mut hw = MockBoard::at(wall());
    hw.lost_power = true;
    let mut sink = RecordingSink::new();
    app.boot(&mut hw, &mut sink);

    assert!(hw.saw_screen("RTC lost power", "Please set time"));
    assert!(sink.events.contains(&AppEvent::Started {
        clock_fault: Some(ClockError::LostPower),
    }));
    assert_eq!(hw.display().1, "10:15 14/05");
    assert_eq!(hw.uptime_ms(), 3_000);
}

#[test]
fn acknowledge_without_clock_shows_first_dose() {
    let mut app = AppService::new(SystemConfig::default());
    let mut hw = MockBoard::without_rtc();
    let mut sink = RecordingSink::new();
    app.boot(&mut hw, &mut sink);

    app.handle_command(AppCommand::AcknowledgeMedication, &mut hw, &mut sink);

    assert!(hw.saw_screen("Next Med:", "BP Tablet @08:00"));
}

// ── Memory ────────────────────────────────────────────────────

#[test]
fn memory_with_nothing_seen() {
    let (mut app, mut hw, mut sink) = make_app();
    let start = hw.uptime_ms();
    hw.forget_calls();

    app.handle_command(AppCommand::RecallMemory, &mut hw, &mut sink);

    assert_eq!(
        hw.screens()[..2],
        [pair("Memory helper", "Show me an item"), pair("Nothing seen", "yet")]
    );
    assert!(sink.events.contains(&AppEvent::MemoryRecall { item: None }));
    assert_eq!(hw.uptime_ms() - start, 3_000);
    assert_eq!(hw.display().0, MENU_TOP);
}

// ── Breathing exercise ────────────────────────────────────────

#[test]
fn exercise_runs_two_timed_rounds() {
    let (mut app, mut hw, mut sink) = make_app();
    let start = hw.uptime_ms();
    hw.forget_calls();

    app.handle_command(AppCommand::StartExercise, &mut hw, &mut sink);

    let expected = [
        pair("Breathe in...", "Round 1/2"),
        pair("Hold...", "Round 1/2"),
        pair("Breathe out...", "Round 1/2"),
        pair("Breathe in...", "Round 2/2"),
        pair("Hold...", "Round 2/2"),
        pair("Breathe out...", "Round 2/2"),
        pair("Well done!", "Feel calmer now"),
    ];
    assert_eq!(hw.screens()[..expected.len()], expected);

    let config = app.config();
    let expected_ms = config.exercise_duration_ms() + config.prompt_hold_ms;
    assert_eq!(hw.uptime_ms() - start, u64::from(expected_ms));
    assert!(sink.events.contains(&AppEvent::ExerciseCompleted { cycles: 2 }));
    assert!(!hw.tone());
}

#[test]
fn exercise_cues_inhale_and_exhale_only() {
    let (mut app, mut hw, mut sink) = make_app();
    hw.forget_calls();

    app.handle_command(AppCommand::StartExercise, &mut hw, &mut sink);

    let beeps = hw
        .calls
        .iter()
        .filter(|c| **c == BoardCall::Tone(true))
        .count();
    assert_eq!(beeps, 4, "one cue per inhale and exhale, none on hold");
}

// ── SOS ───────────────────────────────────────────────────────

#[test]
fn sos_window_sounds_four_bursts() {
    let (mut app, mut hw, mut sink) = make_app();
    let start = hw.uptime_ms();
    hw.forget_calls();

    app.handle_command(AppCommand::RaiseSos, &mut hw, &mut sink);

    assert_eq!(
        hw.screens()[..2],
        [pair("!!! SOS !!!", "Sending signal"), pair("Help is coming", "Stay calm")]
    );
    assert!(sink.events.contains(&AppEvent::SosFinished { bursts: 4 }));
    let config = app.config();
    assert_eq!(
        hw.uptime_ms() - start,
        u64::from(config.sos_window_ms + config.sos_closing_ms)
    );
    assert!(!hw.tone());
}

// ── Button dispatch ───────────────────────────────────────────

#[test]
fn button_press_runs_its_flow_after_a_chirp() {
    let (mut app, mut hw, mut sink) = make_app();
    hw.press(ButtonId::Exercise, 2_000, 50);
    hw.forget_calls();

    run_until(&mut app, &mut hw, &mut sink, 2_000);

    // Ack click comes before the first breathing screen.
    let first_tone = hw.calls.iter().position(|c| *c == BoardCall::Tone(true));
    let first_write = hw
        .calls
        .iter()
        .position(|c| matches!(c, BoardCall::Write { .. }));
    assert!(first_tone < first_write);
    assert!(sink.events.contains(&AppEvent::ExerciseCompleted { cycles: 2 }));
}

#[test]
fn held_sos_button_raises_without_chirp() {
    let (mut app, mut hw, mut sink) = make_app();
    hw.press(ButtonId::Sos, 2_000, 100);
    hw.forget_calls();

    run_until(&mut app, &mut hw, &mut sink, 2_000);

    assert!(sink.events.contains(&AppEvent::SosRaised));
    // First write is the alert, not preceded by an ack click.
    assert_eq!(hw.calls[0], BoardCall::Clear);
}

#[test]
fn short_press_triggers_once() {
    let (mut app, mut hw, mut sink) = make_app();
    hw.press(ButtonId::Memory, 2_000, 150);

    run_until(&mut app, &mut hw, &mut sink, 2_100);

    assert_eq!(sink.count(|e| matches!(e, AppEvent::MemoryRecall { .. })), 1);
}

#[test]
fn held_button_retriggers_after_the_flow() {
    let (mut app, mut hw, mut sink) = make_app();
    // Memory flow takes 3 s; still held when it returns.
    hw.press(ButtonId::Memory, 2_000, 5_000);

    run_until(&mut app, &mut hw, &mut sink, 9_000);

    assert_eq!(sink.count(|e| matches!(e, AppEvent::MemoryRecall { .. })), 2);
}

// ── Idle redraw ───────────────────────────────────────────────

#[test]
fn idle_timeout_redraws_menu_once() {
    let (mut app, mut hw, mut sink) = make_app();

    run_until(&mut app, &mut hw, &mut sink, 16_000);
    assert_eq!(sink.count(|e| *e == AppEvent::IdleRedraw), 0);

    run_until(&mut app, &mut hw, &mut sink, 20_000);
    assert_eq!(sink.count(|e| *e == AppEvent::IdleRedraw), 1);
    assert_eq!(hw.display().0, MENU_TOP);
    assert!(app.last_activity_ms() > 16_500);
}

#[test]
fn activity_postpones_idle_redraw() {
    let (mut app, mut hw, mut sink) = make_app();
    hw.press(ButtonId::Medicine, 10_000, 50);

    run_until(&mut app, &mut hw, &mut sink, 20_000);

    assert_eq!(sink.count(|e| *e == AppEvent::IdleRedraw), 0);
}
