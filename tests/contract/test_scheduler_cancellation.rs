//! Contract Tests for Scheduler Cancellation
//!
//! Once a session is torn down, dropped or has replaced its sequence, no
//! pending timer may touch its transcript or call into the host bridge.

#[path = "../test_utils/mod.rs"]
mod test_utils;

use std::sync::Arc;
use std::time::Duration;

use pagolaterm::models::{SessionPhase, SimulatedProgram, TranscriptLine};
use pagolaterm::scheduler::{ScheduledSequence, ScheduledStep};
use pagolaterm::session::{Session, SessionKind, SessionProfile, SubmitOutcome};
use pagolaterm::{sessions, CommandOutcome, CommandRegistry, Config};
use test_utils::{fast_config, texts, RecordingBridge};
use tokio::time::sleep;

fn welcome(bridge: &Arc<RecordingBridge>) -> Session {
    sessions::builder(SessionKind::Welcome, &Config::default())
        .bridge(bridge.clone())
        .build()
        .unwrap()
}

#[tokio::test(start_paused = true)]
async fn test_teardown_during_countdown_stops_everything() {
    let bridge = RecordingBridge::new();
    let mut session = welcome(&bridge);

    session.submit_line("github");
    sleep(Duration::from_millis(1500)).await;
    let snapshot = texts(&session);
    assert_eq!(snapshot.last().unwrap(), "Redirigiendo en 3...");

    session.teardown();
    assert_eq!(session.phase(), SessionPhase::Finished);
    assert!(!session.is_playing());

    sleep(Duration::from_secs(30)).await;
    assert_eq!(texts(&session), snapshot);
    assert!(bridge.navigations().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_dropping_a_session_cancels_its_timers() {
    let bridge = RecordingBridge::new();
    let mut session = welcome(&bridge);

    session.submit_line("github");
    drop(session);

    sleep(Duration::from_secs(30)).await;
    assert!(bridge.navigations().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_teardown_during_boot_suppresses_boot_complete() {
    let bridge = RecordingBridge::new();
    let mut session = sessions::builder(SessionKind::Boot, &Config::default())
        .bridge(bridge.clone())
        .build()
        .unwrap();

    sleep(Duration::from_millis(1000)).await;
    assert_eq!(session.transcript_len(), 2);

    session.teardown();
    sleep(Duration::from_secs(30)).await;

    assert_eq!(session.transcript_len(), 2);
    assert_eq!(bridge.boot_completions(), 0);
    assert_eq!(session.phase(), SessionPhase::Finished);
}

#[tokio::test(start_paused = true)]
async fn test_teardown_is_idempotent_and_final() {
    let bridge = RecordingBridge::new();
    let mut session = welcome(&bridge);

    session.teardown();
    session.teardown();

    assert_eq!(session.submit_line("about"), SubmitOutcome::Ignored);
    session.select_program(SimulatedProgram::SecurityGate);
    assert_eq!(session.phase(), SessionPhase::Finished);
    assert!(!session.input_enabled());
}

#[tokio::test(start_paused = true)]
async fn test_replaced_sequence_never_writes() {
    let mut session = sessions::builder(SessionKind::Ide, &fast_config())
        .seed(3)
        .build()
        .unwrap();

    // Each run replaces the previous launch; only one prompt may appear
    session.run();
    sleep(Duration::from_millis(50)).await;
    session.select_program(SimulatedProgram::SecurityGate);
    session.run();

    sleep(Duration::from_secs(2)).await;
    let lines = texts(&session);
    assert_eq!(
        lines,
        vec![
            "> Initializing Runtime Environment...",
            "SECURE CONNECTION ESTABLISHED.",
            "Enter Admin Password:",
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_last_step_returns_busy_session_to_ready() {
    let registry = CommandRegistry::new().with("wait", "slow", |_| CommandOutcome::Schedule {
        immediate: Vec::new(),
        sequence: ScheduledSequence::new()
            .then(ScheduledStep::after_ms(100).line(TranscriptLine::plain("one")))
            .then(ScheduledStep::after_ms(100).line(TranscriptLine::plain("two"))),
    });
    let mut session = Session::builder(SessionProfile::new(SessionKind::Welcome, "$"))
        .registry(registry)
        .build()
        .unwrap();

    session.submit_line("wait");
    sleep(Duration::from_millis(150)).await;
    assert_eq!(session.phase(), SessionPhase::Busy);

    sleep(Duration::from_millis(100)).await;
    assert_eq!(texts(&session), vec!["$ wait", "one", "two"]);
    assert_eq!(session.phase(), SessionPhase::Ready);
    assert!(session.input_enabled());
}

#[tokio::test(start_paused = true)]
async fn test_select_program_cannot_reopen_a_finished_boot_session() {
    let bridge = RecordingBridge::new();
    let mut session = sessions::builder(SessionKind::Boot, &Config::default())
        .bridge(bridge.clone())
        .build()
        .unwrap();
    sleep(Duration::from_millis(9000)).await;

    session.submit_line("start");
    sleep(Duration::from_millis(1100)).await;
    assert_eq!(session.phase(), SessionPhase::Finished);
    assert_eq!(bridge.transitions(), 1);
    let len = session.transcript_len();

    assert!(!session.select_program(SimulatedProgram::SecurityGate));
    assert_eq!(session.phase(), SessionPhase::Finished);
    assert!(!session.input_enabled());
    assert_eq!(session.submit_line("help"), SubmitOutcome::Ignored);
    assert_eq!(session.transcript_len(), len);
}

#[tokio::test(start_paused = true)]
async fn test_select_program_leaves_the_boot_script_running() {
    let bridge = RecordingBridge::new();
    let mut session = sessions::builder(SessionKind::Boot, &Config::default())
        .bridge(bridge.clone())
        .build()
        .unwrap();

    sleep(Duration::from_millis(500)).await;
    assert!(!session.select_program(SimulatedProgram::AiOracle));
    assert_eq!(session.phase(), SessionPhase::Booting);
    assert!(session.is_playing());

    sleep(Duration::from_millis(9000)).await;
    assert_eq!(session.phase(), SessionPhase::Ready);
    assert_eq!(bridge.boot_completions(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_select_program_is_ide_only() {
    let bridge = RecordingBridge::new();
    let mut session = welcome(&bridge);
    session.submit_line("about");
    let before = texts(&session);

    assert!(!session.select_program(SimulatedProgram::SecurityGate));
    assert_eq!(texts(&session), before);
    assert_eq!(session.phase(), SessionPhase::Ready);

    session.teardown();
    let mut ide = sessions::builder(SessionKind::Ide, &fast_config())
        .build()
        .unwrap();
    assert!(ide.select_program(SimulatedProgram::SecurityGate));
    ide.teardown();
    assert!(!ide.select_program(SimulatedProgram::AiOracle));
    assert_eq!(ide.selected_program(), SimulatedProgram::SecurityGate);
}
