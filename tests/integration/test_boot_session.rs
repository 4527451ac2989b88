//! Integration Tests for the Boot Console
//!
//! Boot script timing, input gating while booting, the visitor commands and
//! the `start` / `github` hand-offs. Virtual time keeps every delay exact.

#[path = "../test_utils/mod.rs"]
mod test_utils;

use std::sync::Arc;
use std::time::Duration;

use pagolaterm::models::{LineKind, SessionPhase};
use pagolaterm::session::{Session, SessionKind, SubmitOutcome};
use pagolaterm::terminal::InputResult;
use pagolaterm::{sessions, Config};
use test_utils::{kinds, texts, RecordingBridge};
use tokio::time::sleep;

const BOOT_TEXTS: [&str; 8] = [
    "Initializing PAGOLA_OS kernel...",
    "Loading interface modules...",
    "Verifying user permissions...",
    "Acceso Concedido.",
    "",
    "Bienvenido a la terminal interactiva.",
    "Escribe 'help' para ver comandos o 'start' para entrar.",
    "",
];

fn boot_session(bridge: &Arc<RecordingBridge>) -> Session {
    sessions::builder(SessionKind::Boot, &Config::default())
        .bridge(bridge.clone())
        .build()
        .unwrap()
}

/// Boot session past its script, transcript cleared
async fn ready_session(bridge: &Arc<RecordingBridge>) -> Session {
    let mut session = boot_session(bridge);
    sleep(Duration::from_millis(9000)).await;
    assert_eq!(session.phase(), SessionPhase::Ready);
    assert_eq!(session.submit_line("clear"), SubmitOutcome::Cleared);
    session
}

#[tokio::test(start_paused = true)]
async fn test_boot_lines_arrive_in_order_with_cumulative_delays() {
    let bridge = RecordingBridge::new();
    let session = boot_session(&bridge);

    assert_eq!(session.phase(), SessionPhase::Booting);
    assert!(session.transcript().is_empty());

    // Deadlines: 300, 900, 1800, 3000, 4300, 5700, 7200, 8800
    sleep(Duration::from_millis(350)).await;
    assert_eq!(texts(&session), BOOT_TEXTS[..1].to_vec());

    sleep(Duration::from_millis(600)).await; // 950
    assert_eq!(session.transcript_len(), 2);

    sleep(Duration::from_millis(2100)).await; // 3050
    assert_eq!(session.transcript_len(), 4);
    assert_eq!(session.transcript()[3].kind, LineKind::Success);

    sleep(Duration::from_millis(5650)).await; // 8700
    assert_eq!(session.transcript_len(), 7);
    assert_eq!(session.phase(), SessionPhase::Booting);
    assert_eq!(bridge.boot_completions(), 0);

    sleep(Duration::from_millis(200)).await; // 8900
    assert_eq!(texts(&session), BOOT_TEXTS.to_vec());
    assert_eq!(session.phase(), SessionPhase::Ready);
    assert_eq!(bridge.boot_completions(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_highlighted_invitation_line() {
    let bridge = RecordingBridge::new();
    let session = boot_session(&bridge);
    sleep(Duration::from_millis(9000)).await;

    let line = &session.transcript()[6];
    let segments = line.segments();
    let highlighted: Vec<&str> = segments
        .iter()
        .filter(|s| s.highlighted)
        .map(|s| s.text)
        .collect();

    assert_eq!(highlighted, vec!["help", "start"]);
    assert_eq!(segments.len(), 5);
    assert_eq!(segments[0].text, "Escribe '");
}

#[tokio::test(start_paused = true)]
async fn test_input_disabled_while_booting() {
    let bridge = RecordingBridge::new();
    let mut session = boot_session(&bridge);

    assert!(!session.input_enabled());
    assert_eq!(session.type_char('h'), InputResult::Disabled);
    assert_eq!(session.submit_line("help"), SubmitOutcome::Ignored);
    assert_eq!(session.focus_requests(), 0);

    sleep(Duration::from_millis(9000)).await;
    assert!(session.input_enabled());
    assert_eq!(session.focus_requests(), 1);
    assert!(session.last_focus().unwrap().prevent_scroll);
    assert_eq!(session.transcript_len(), BOOT_TEXTS.len());
}

#[tokio::test(start_paused = true)]
async fn test_help_lists_commands_and_ends_with_blank() {
    let bridge = RecordingBridge::new();
    let mut session = ready_session(&bridge).await;

    session.submit_line("help");
    assert_eq!(
        texts(&session),
        vec![
            "visitor@pagola:~$ help",
            "Comandos disponibles:",
            "  about    - ¿Quién soy?",
            "  stack    - Tecnologías y Habilidades",
            "  contact  - Información de contacto",
            "  github   - Ir a mi GitHub",
            "  clear    - Limpiar terminal",
            "  start    - Iniciar Portfolio UI",
            "",
        ]
    );
    assert_eq!(kinds(&session)[0], LineKind::Input);
    assert_eq!(kinds(&session)[1], LineKind::Warning);
}

#[tokio::test(start_paused = true)]
async fn test_contact_answer() {
    let bridge = RecordingBridge::new();
    let mut session = ready_session(&bridge).await;

    session.submit_line("Contact");
    let lines = texts(&session);
    assert_eq!(lines[0], "visitor@pagola:~$ Contact");
    assert_eq!(lines[1], "Email: victorpagola.w@gmail.com");
    assert_eq!(lines[4], "Ubicación: Alhaurín de la Torre, Málaga");
    assert_eq!(lines.len(), 6);
}

#[tokio::test(start_paused = true)]
async fn test_unknown_command() {
    let bridge = RecordingBridge::new();
    let mut session = ready_session(&bridge).await;

    let outcome = session.submit_line("sudo");
    assert_eq!(
        outcome,
        SubmitOutcome::Unknown {
            token: "sudo".to_string()
        }
    );
    assert_eq!(
        texts(&session),
        vec![
            "visitor@pagola:~$ sudo",
            "Comando no encontrado: sudo. Escribe 'help' para ver opciones.",
            "",
        ]
    );
    assert_eq!(
        kinds(&session),
        vec![LineKind::Input, LineKind::Error, LineKind::Plain]
    );
    assert_eq!(session.phase(), SessionPhase::Ready);
}

#[tokio::test(start_paused = true)]
async fn test_start_transitions_once_after_a_second() {
    let bridge = RecordingBridge::new();
    let mut session = ready_session(&bridge).await;

    assert!(matches!(
        session.submit_line("start"),
        SubmitOutcome::Scheduled { .. }
    ));
    assert_eq!(
        texts(&session),
        vec!["visitor@pagola:~$ start", "Iniciando interfaz gráfica..."]
    );
    assert_eq!(kinds(&session)[1], LineKind::Success);
    assert_eq!(session.phase(), SessionPhase::Busy);

    assert_eq!(session.submit_line("help"), SubmitOutcome::Ignored);
    assert_eq!(session.transcript_len(), 2);

    sleep(Duration::from_millis(990)).await;
    assert_eq!(bridge.transitions(), 0);

    sleep(Duration::from_millis(20)).await;
    assert_eq!(bridge.transitions(), 1);
    assert_eq!(session.phase(), SessionPhase::Finished);
    assert!(!session.input_enabled());

    sleep(Duration::from_secs(10)).await;
    assert_eq!(bridge.transitions(), 1);
    assert_eq!(session.submit_line("start"), SubmitOutcome::Ignored);
}

#[tokio::test(start_paused = true)]
async fn test_github_countdown_in_spanish() {
    let bridge = RecordingBridge::new();
    let mut session = ready_session(&bridge).await;

    session.submit_line("github");
    assert_eq!(
        texts(&session),
        vec![
            "visitor@pagola:~$ github",
            "Iniciando protocolo de transferencia a GitHub...",
        ]
    );

    sleep(Duration::from_millis(1500)).await;
    assert_eq!(texts(&session)[2], "Redirigiendo en 3...");
    assert_eq!(kinds(&session)[2], LineKind::Plain);

    sleep(Duration::from_millis(3000)).await; // 4.5 s
    assert_eq!(
        texts(&session)[2..],
        [
            "Redirigiendo en 3...",
            "Redirigiendo en 2...",
            "Redirigiendo en 1...",
            "CONEXIÓN ESTABLECIDA.",
        ]
    );
    assert!(bridge.navigations().is_empty());

    sleep(Duration::from_millis(1000)).await; // 5.5 s
    assert_eq!(bridge.navigations(), vec!["https://github.com/Paagola"]);
    assert_eq!(session.phase(), SessionPhase::Ready);
}

#[tokio::test(start_paused = true)]
async fn test_clear_has_no_echo() {
    let bridge = RecordingBridge::new();
    let mut session = boot_session(&bridge);
    sleep(Duration::from_millis(9000)).await;

    session.submit_line("about");
    assert!(session.transcript_len() > BOOT_TEXTS.len());

    assert_eq!(session.submit_line("  CLEAR "), SubmitOutcome::Cleared);
    assert!(session.transcript().is_empty());
    assert_eq!(session.phase(), SessionPhase::Ready);
}
