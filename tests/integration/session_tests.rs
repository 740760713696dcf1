//! Tag sessions: recognition, the presence loop, buzzer hold and the
//! SOS escape hatch.

use crate::mock_hw::{run_until, MockBoard, RecordingSink};

use carepal::app::commands::AppCommand;
use carepal::app::events::AppEvent;
use carepal::app::service::AppService;
use carepal::clock::DateTime;
use carepal::config::{SystemConfig, MEDICATIONS};
use carepal::drivers::button::ButtonId;
use carepal::fsm::{SessionEnd, StateId};
use carepal::registry::{token_hex, ItemRegistry, TagIdentity};
use carepal::scheduler::ReminderEngine;

const KEYS: [u8; 4] = [0xA3, 0xF1, 0xC2, 0x2B];

fn make_app() -> (AppService, MockBoard, RecordingSink) {
    let mut app = AppService::new(SystemConfig::default());
    let mut hw = MockBoard::at(DateTime::new(2024, 5, 14, 10, 15, 0));
    let mut sink = RecordingSink::new();
    app.boot(&mut hw, &mut sink);
    (app, hw, sink)
}

fn ended(sink: &RecordingSink) -> Vec<(SessionEnd, u64)> {
    sink.events
        .iter()
        .filter_map(|e| match e {
            AppEvent::TagSessionEnded { reason, held_ms } => Some((*reason, *held_ms)),
            _ => None,
        })
        .collect()
}

// ── Known item ────────────────────────────────────────────────

#[test]
fn known_tag_shows_item_and_holds_buzzer_until_removed() {
    let (mut app, mut hw, mut sink) = make_app();
    hw.add_tag(&KEYS, 2_000, 3_000);

    run_until(&mut app, &mut hw, &mut sink, 2_000);

    assert!(hw.saw_screen("Found: Keys", "10:15 14/05"));
    assert!(sink.events.contains(&AppEvent::TagSessionStarted(TagIdentity::Known {
        index: 0,
        name: "Keys",
    })));

    // Buzzer sounded for the whole time the tag was in the field, and
    // the session closed only after more than 300 ms of silence.
    assert!(!hw.tone());
    assert!(hw.tone_on_ms >= 1_000, "tone held {} ms", hw.tone_on_ms);
    assert!(hw.uptime_ms() > 3_000 + 300);

    let sessions = ended(&sink);
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0].0, SessionEnd::TagRemoved);
    assert!(sessions[0].1 > 1_000);

    assert_eq!(app.session_state(), StateId::Idle);
    assert_eq!(hw.display().0, "1Mem 2Med 3Ex 4!");
}

#[test]
fn recognition_updates_last_seen_for_memory_recall() {
    let (mut app, mut hw, mut sink) = make_app();
    hw.add_tag(&KEYS, 2_000, 2_100);
    run_until(&mut app, &mut hw, &mut sink, 2_000);

    let item = app.registry().last_recognised().map(|i| (i.name, i.last_seen.clone()));
    assert_eq!(item.as_ref().map(|(n, s)| (*n, s.as_str())), Some(("Keys", "10:15 14/05")));

    app.handle_command(AppCommand::RecallMemory, &mut hw, &mut sink);
    assert!(hw.saw_screen("Memory helper", "Show me an item"));
    assert!(hw.saw_screen("Last: Keys", "10:15 14/05"));
    assert!(sink.events.contains(&AppEvent::MemoryRecall { item: Some("Keys") }));
}

#[test]
fn every_read_is_followed_by_ending_the_card_session() {
    let (mut app, mut hw, mut sink) = make_app();
    hw.add_tag(&KEYS, 2_000, 2_500);
    hw.forget_calls();

    run_until(&mut app, &mut hw, &mut sink, 2_000);

    // One after the first read, one per successful poll, one on exit.
    let polls = (2_500 - 2_000) / u64::from(app.config().tag_poll_interval_ms);
    assert!(hw.end_session_count() as u64 >= polls + 1);
}

#[test]
fn seven_byte_token_resolves() {
    let (mut app, mut hw, mut sink) = make_app();
    hw.add_tag(&[0x04, 0xA2, 0x24, 0x6A, 0x1F, 0x62, 0x80], 2_000, 2_100);

    run_until(&mut app, &mut hw, &mut sink, 2_000);

    assert!(hw.saw_screen("Found: Pill Box", "10:15 14/05"));
}

#[test]
fn lookup_ignores_hex_case() {
    let config = SystemConfig::default();
    let registry = ItemRegistry::from_table(&[("a3f1c22b", "Keys")]);
    let reminders = ReminderEngine::from_table(MEDICATIONS, config.scheduler_interval_ms);
    let mut app = AppService::with_tables(config, registry, reminders);
    let mut hw = MockBoard::at(DateTime::new(2024, 5, 14, 10, 15, 0));
    let mut sink = RecordingSink::new();
    app.boot(&mut hw, &mut sink);
    hw.add_tag(&KEYS, 2_000, 2_100);

    run_until(&mut app, &mut hw, &mut sink, 2_000);

    assert!(hw.saw_screen("Found: Keys", "10:15 14/05"));
}

// ── Unknown token ─────────────────────────────────────────────

#[test]
fn unknown_tag_shows_its_hex() {
    let (mut app, mut hw, mut sink) = make_app();
    let token = [0xDE, 0xAD, 0xBE, 0xEF];
    hw.add_tag(&token, 2_000, 2_100);

    run_until(&mut app, &mut hw, &mut sink, 2_000);

    assert!(hw.saw_screen("Unknown tag", "DEADBEEF"));
    assert!(sink.events.contains(&AppEvent::TagSessionStarted(TagIdentity::Unknown {
        hex: token_hex(&token),
    })));
    assert!(app.registry().last_recognised().is_none());
    assert_eq!(ended(&sink).len(), 1);
}

#[test]
fn unknown_triple_size_token_is_shown_whole() {
    let (mut app, mut hw, mut sink) = make_app();
    let token = [0x04, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77, 0x88, 0x99];
    hw.add_tag(&token, 2_000, 2_100);

    run_until(&mut app, &mut hw, &mut sink, 2_000);

    assert!(hw.saw_screen("Unknown 04112233", "445566778899"));
}

#[test]
fn prefix_of_a_known_token_is_unknown() {
    let (mut app, mut hw, mut sink) = make_app();
    hw.add_tag(&KEYS[..3], 2_000, 2_100);

    run_until(&mut app, &mut hw, &mut sink, 2_000);

    assert!(hw.saw_screen("Unknown tag", "A3F1C2"));
}

// ── SOS inside a session ──────────────────────────────────────

#[test]
fn sos_ends_session_and_raises_alert() {
    let (mut app, mut hw, mut sink) = make_app();
    hw.add_tag(&KEYS, 2_000, 60_000);
    hw.press(ButtonId::Sos, 2_500, 200);

    // The tick at 2 s opens the session; SOS breaks out of it.
    run_until(&mut app, &mut hw, &mut sink, 2_000);

    let sessions = ended(&sink);
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0].0, SessionEnd::SosPressed);

    let end = sink
        .events
        .iter()
        .position(|e| matches!(e, AppEvent::TagSessionEnded { .. }));
    let raised = sink.events.iter().position(|e| *e == AppEvent::SosRaised);
    assert!(end < raised);
    assert!(sink.events.contains(&AppEvent::SosFinished { bursts: 4 }));
    assert!(hw.saw_screen("!!! SOS !!!", "Sending signal"));
    assert!(!hw.tone());
    assert_eq!(app.session_state(), StateId::Idle);
}

// ── Main loop is starved while the tag stays put ──────────────

#[test]
fn reminders_wait_for_the_tag_to_leave() {
    let mut app = AppService::new(SystemConfig::default());
    let mut hw = MockBoard::at(DateTime::new(2024, 5, 14, 7, 59, 58));
    let mut sink = RecordingSink::new();
    app.boot(&mut hw, &mut sink);
    hw.add_tag(&KEYS, 2_000, 9_000);

    run_until(&mut app, &mut hw, &mut sink, 10_000);

    let end = sink
        .events
        .iter()
        .position(|e| matches!(e, AppEvent::TagSessionEnded { .. }));
    let armed = sink
        .events
        .iter()
        .position(|e| matches!(e, AppEvent::MedicationArmed { .. }));
    assert!(end.is_some() && armed.is_some());
    assert!(end < armed, "no reminder check while the session is open");
}
