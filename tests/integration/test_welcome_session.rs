//! Integration Tests for the Welcome Console
//!
//! Single-line answers, the busy gate during a redirect, configurable
//! countdowns, focus and autoscroll signalling.

#[path = "../test_utils/mod.rs"]
mod test_utils;

use std::sync::Arc;
use std::time::Duration;

use pagolaterm::models::{LineKind, SessionPhase};
use pagolaterm::session::{Session, SessionKind, SubmitOutcome};
use pagolaterm::{sessions, Config};
use test_utils::{kinds, texts, RecordingBridge};
use tokio::time::sleep;

fn welcome_session(bridge: &Arc<RecordingBridge>, config: &Config) -> Session {
    sessions::builder(SessionKind::Welcome, config)
        .bridge(bridge.clone())
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_starts_ready_with_banner() {
    let bridge = RecordingBridge::new();
    let session = welcome_session(&bridge, &Config::default());

    assert_eq!(session.phase(), SessionPhase::Ready);
    assert!(session.input_enabled());
    assert_eq!(
        texts(&session),
        vec![
            "Cargando perfil de Víctor Pagola...",
            "Detectado: Pasión por IA y Automatización.",
            "Sistema listo. Escribe \"help\" para interactuar.",
        ]
    );
    assert_eq!(
        kinds(&session),
        vec![LineKind::System, LineKind::Success, LineKind::Info]
    );
    // No boot script, so no boot completion either
    assert!(bridge.events().is_empty());
}

#[tokio::test]
async fn test_answers_are_single_lines_without_blank() {
    let bridge = RecordingBridge::new();
    let mut session = welcome_session(&bridge, &Config::default());
    session.submit_line("clear");

    session.submit_line("ai_vision");
    assert_eq!(
        texts(&session),
        vec![
            "root@pagola:~$ ai_vision",
            "Objetivo: Implementar IA para optimizar procesos reales, mejorarlos e implementar nuevas tecnologías en proyectos.",
        ]
    );
    assert_eq!(kinds(&session), vec![LineKind::Input, LineKind::Warning]);

    session.submit_line("stack");
    assert_eq!(
        texts(&session)[3],
        "Java | Python | AI Prompting | Linux | SQL | vibecoding"
    );
    assert_eq!(session.transcript_len(), 4);
}

#[tokio::test]
async fn test_help_and_unknown() {
    let bridge = RecordingBridge::new();
    let mut session = welcome_session(&bridge, &Config::default());
    session.submit_line("clear");

    session.submit_line("help");
    session.submit_line("ls -la");

    assert_eq!(
        texts(&session),
        vec![
            "root@pagola:~$ help",
            "Comandos: about, ai_vision, stack, contact, clear, github",
            "root@pagola:~$ ls -la",
            "Error: Comando 'ls -la' desconocido.",
        ]
    );
    assert_eq!(kinds(&session)[3], LineKind::Error);
}

#[tokio::test]
async fn test_blank_submission_is_ignored() {
    let bridge = RecordingBridge::new();
    let mut session = welcome_session(&bridge, &Config::default());
    let before = session.transcript_len();

    assert_eq!(session.submit_line("   "), SubmitOutcome::Ignored);
    assert_eq!(session.submit(), SubmitOutcome::Ignored);
    assert_eq!(session.transcript_len(), before);
}

#[tokio::test]
async fn test_focus_requested_without_scroll_after_submit() {
    let bridge = RecordingBridge::new();
    let mut session = welcome_session(&bridge, &Config::default());
    let before = session.focus_requests();

    session.type_str("about");
    session.type_char('\r');

    assert_eq!(session.input_text(), "");
    assert_eq!(session.focus_requests(), before + 1);
    assert!(session.last_focus().unwrap().prevent_scroll);
}

#[tokio::test]
async fn test_autoscroll_signal_is_synchronous() {
    let bridge = RecordingBridge::new();
    let mut session = welcome_session(&bridge, &Config::default());
    let mut scroll = session.subscribe_scroll();
    scroll.mark_unchanged();

    session.submit_line("contact");
    assert!(scroll.has_changed().unwrap());
    scroll.mark_unchanged();

    session.submit_line("clear");
    assert!(scroll.has_changed().unwrap());
}

#[tokio::test(start_paused = true)]
async fn test_github_with_configured_countdown() {
    let mut config = Config::default();
    config.redirect.countdown = 5;
    config.redirect.url = "https://example.org/profile".to_string();

    let bridge = RecordingBridge::new();
    let mut session = welcome_session(&bridge, &config);
    session.submit_line("clear");

    session.submit_line("github");
    sleep(Duration::from_secs(20)).await;

    let lines = session.transcript();
    let countdown: Vec<&str> = lines
        .iter()
        .filter(|l| l.text.starts_with("Redirigiendo en"))
        .map(|l| l.text.as_str())
        .collect();
    assert_eq!(
        countdown,
        vec![
            "Redirigiendo en 5...",
            "Redirigiendo en 4...",
            "Redirigiendo en 3...",
            "Redirigiendo en 2...",
            "Redirigiendo en 1...",
        ]
    );
    assert!(lines
        .iter()
        .filter(|l| l.text.starts_with("Redirigiendo en"))
        .all(|l| l.kind == LineKind::System));

    let last = lines.last().unwrap();
    assert_eq!(last.text, "CONNECTION ESTABLISHED. LAUNCHING...");
    assert_eq!(last.kind, LineKind::Success);
    assert_eq!(bridge.navigations(), vec!["https://example.org/profile"]);
    assert_eq!(session.phase(), SessionPhase::Ready);
}

#[tokio::test(start_paused = true)]
async fn test_commands_ignored_while_redirecting() {
    let bridge = RecordingBridge::new();
    let mut session = welcome_session(&bridge, &Config::default());

    session.submit_line("github");
    assert_eq!(session.phase(), SessionPhase::Busy);
    let before = session.transcript_len();

    sleep(Duration::from_millis(500)).await;
    assert_eq!(session.submit_line("about"), SubmitOutcome::Ignored);
    assert_eq!(session.submit_line("github"), SubmitOutcome::Ignored);
    assert_eq!(session.submit_line("clear"), SubmitOutcome::Ignored);
    assert_eq!(session.transcript_len(), before);

    sleep(Duration::from_secs(10)).await;
    assert_eq!(bridge.navigations().len(), 1);

    // Back to Ready: a second redirect is accepted
    assert!(matches!(
        session.submit_line("github"),
        SubmitOutcome::Scheduled { .. }
    ));
    sleep(Duration::from_secs(10)).await;
    assert_eq!(bridge.navigations().len(), 2);
}
