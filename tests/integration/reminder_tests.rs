//! Reminder engine driven through the full service: hydration nudges,
//! medication arming, acknowledgement and the next-dose lookup.

use crate::mock_hw::{run_until, MockBoard, RecordingSink};

use carepal::app::commands::AppCommand;
use carepal::app::events::AppEvent;
use carepal::app::service::AppService;
use carepal::clock::DateTime;
use carepal::config::{SystemConfig, AFFIRMATIONS};
use carepal::drivers::button::ButtonId;
use carepal::error::ClockError;

fn make_app(wall: DateTime) -> (AppService, MockBoard, RecordingSink) {
    let mut app = AppService::new(SystemConfig::default());
    let mut hw = MockBoard::at(wall);
    let mut sink = RecordingSink::new();
    app.boot(&mut hw, &mut sink);
    (app, hw, sink)
}

fn armed(e: &AppEvent) -> bool {
    matches!(e, AppEvent::MedicationArmed { .. })
}

fn shown_due(e: &AppEvent) -> bool {
    matches!(e, AppEvent::MedicationDue { .. })
}

// ── Dose at its minute, acknowledged, not re-armed ────────────

#[test]
fn dose_arms_at_its_minute_and_is_shown() {
    let (mut app, mut hw, mut sink) = make_app(DateTime::new(2024, 5, 14, 8, 0, 0));

    // First check is one interval after power-up.
    run_until(&mut app, &mut hw, &mut sink, 5_000);

    assert_eq!(hw.display(), ("MED DUE", "BP Tablet"));
    assert!(app.reminders().entries()[0].pending);
    assert!(sink.events.contains(&AppEvent::MedicationArmed { name: "BP Tablet" }));
    assert!(sink.events.contains(&AppEvent::MedicationDue { name: "BP Tablet" }));
}

#[test]
fn acknowledged_dose_stays_quiet_for_the_rest_of_the_minute() {
    let (mut app, mut hw, mut sink) = make_app(DateTime::new(2024, 5, 14, 8, 0, 0));
    run_until(&mut app, &mut hw, &mut sink, 5_000);
    assert_eq!(app.reminders().pending_count(), 1);

    let now = hw.uptime_ms();
    hw.press(ButtonId::Medicine, now, 100);
    app.tick(&mut hw, &mut sink);

    assert!(hw.saw_screen(AFFIRMATIONS[0], "BP Tablet"));
    assert!(sink.events.contains(&AppEvent::MedicationTaken {
        name: "BP Tablet",
        affirmation: AFFIRMATIONS[0],
    }));
    assert_eq!(app.reminders().pending_count(), 0);
    assert_eq!(app.reminders().entries()[0].last_ack_date, 20_240_514);

    // Still 08:00 for several more checks.
    run_until(&mut app, &mut hw, &mut sink, 30_000);
    assert_eq!(hw.wall().minute, 0);
    assert!(hw.wall().second >= 30);

    assert_eq!(sink.count(armed), 1, "must not re-arm after acknowledgement");
    assert_eq!(sink.count(shown_due), 1);
    assert_eq!(app.reminders().pending_count(), 0);
}

#[test]
fn affirmation_comes_from_the_random_source() {
    let (mut app, mut hw, mut sink) = make_app(DateTime::new(2024, 5, 14, 8, 0, 0));
    run_until(&mut app, &mut hw, &mut sink, 5_000);

    hw.random = 3;
    app.handle_command(AppCommand::AcknowledgeMedication, &mut hw, &mut sink);

    assert!(hw.saw_screen(AFFIRMATIONS[3 % AFFIRMATIONS.len()], "BP Tablet"));
}

#[test]
fn pending_dose_is_shown_on_every_check_until_acknowledged() {
    let (mut app, mut hw, mut sink) = make_app(DateTime::new(2024, 5, 14, 8, 0, 0));

    run_until(&mut app, &mut hw, &mut sink, 20_000);

    assert_eq!(sink.count(armed), 1);
    assert_eq!(sink.count(shown_due), 4, "checks at 5 s, 10 s, 15 s, 20 s");
    assert!(app.reminders().entries()[0].pending);
    assert_eq!(hw.display(), ("MED DUE", "BP Tablet"));
}

// ── Next dose lookup ──────────────────────────────────────────

#[test]
fn nothing_pending_shows_next_dose() {
    let (mut app, mut hw, mut sink) = make_app(DateTime::new(2024, 5, 14, 9, 0, 0));

    app.handle_command(AppCommand::AcknowledgeMedication, &mut hw, &mut sink);

    assert!(hw.saw_screen("Next Med:", "Vitamin D @13:30"));
    assert!(sink.events.contains(&AppEvent::NextMedication {
        name: "Vitamin D",
        hour: 13,
        minute: 30,
    }));
    assert_eq!(app.reminders().pending_count(), 0);
}

#[test]
fn next_dose_wraps_to_tomorrow_after_the_last_one() {
    let (mut app, mut hw, mut sink) = make_app(DateTime::new(2024, 5, 14, 21, 0, 0));

    app.handle_command(AppCommand::AcknowledgeMedication, &mut hw, &mut sink);

    assert!(hw.saw_screen("Next Med:", "BP Tablet @08:00"));
}

#[test]
fn acknowledge_flow_returns_to_menu() {
    let (mut app, mut hw, mut sink) = make_app(DateTime::new(2024, 5, 14, 9, 0, 0));
    let before = hw.uptime_ms();

    app.handle_command(AppCommand::AcknowledgeMedication, &mut hw, &mut sink);

    assert_eq!(hw.uptime_ms() - before, u64::from(app.config().prompt_hold_ms));
    assert_eq!(hw.display().0, "1Mem 2Med 3Ex 4!");
}

// ── Hydration ─────────────────────────────────────────────────

#[test]
fn hydration_nudge_fires_once_at_the_top_of_the_hour() {
    let (mut app, mut hw, mut sink) = make_app(DateTime::new(2024, 5, 14, 10, 59, 50));

    // Checks land on 10:59:55, 11:00:00, 11:00:05 and 11:00:10.
    run_until(&mut app, &mut hw, &mut sink, 20_000);

    let nudges: Vec<_> = sink
        .events
        .iter()
        .filter(|e| matches!(e, AppEvent::HydrationNudge { .. }))
        .collect();
    assert_eq!(nudges, vec![&AppEvent::HydrationNudge { hour: 11 }]);
    assert!(hw.saw_screen("Drink water!", "Stay hydrated"));
    assert_eq!(app.reminders().hydration_hour(), Some(11));
}

#[test]
fn hydration_and_dose_share_one_check() {
    let (mut app, mut hw, mut sink) = make_app(DateTime::new(2024, 5, 14, 8, 0, 0));
    run_until(&mut app, &mut hw, &mut sink, 5_000);

    let hydration = sink
        .events
        .iter()
        .position(|e| matches!(e, AppEvent::HydrationNudge { hour: 8 }));
    let due = sink.events.iter().position(shown_due);
    assert!(hydration.is_some() && due.is_some());
    assert!(hydration < due, "water first, then the dose");
}

// ── Clock faults at runtime ───────────────────────────────────

#[test]
fn runtime_clock_fault_is_reported_once_per_outage() {
    let (mut app, mut hw, mut sink) = make_app(DateTime::new(2024, 5, 14, 10, 15, 0));
    let fault = |e: &AppEvent| matches!(e, AppEvent::ClockFault(_));

    hw.clock_error = Some(ClockError::NotFound);
    run_until(&mut app, &mut hw, &mut sink, 20_000);
    assert_eq!(sink.count(fault), 1);
    // Last good reading is kept for display.
    assert_eq!(app.last_time().map(|t| t.minute), Some(15));

    hw.clock_error = None;
    run_until(&mut app, &mut hw, &mut sink, 26_000);
    assert_eq!(sink.count(fault), 1);

    hw.clock_error = Some(ClockError::InvalidTime);
    run_until(&mut app, &mut hw, &mut sink, 32_000);
    assert_eq!(sink.count(fault), 2);
    assert!(sink.events.contains(&AppEvent::ClockFault(ClockError::InvalidTime)));
}
