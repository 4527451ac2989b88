//! Welcome console
//!
//! Starts ready with a short profile banner. Every answer is a single line.

use crate::commands::{CommandOutcome, CommandRegistry, HELP_COMMAND};
use crate::config::Config;
use crate::models::{LineKind, TranscriptLine};
use crate::session::{SessionBuilder, SessionKind, SessionProfile};

use super::{countdown_redirect, RedirectStyle};

/// Welcome console preset
pub fn builder(config: &Config) -> SessionBuilder {
    SessionBuilder::new(profile(config))
        .registry(registry(config))
        .initial_lines(initial_lines())
        .timing(config.timing.clone())
}

pub fn profile(config: &Config) -> SessionProfile {
    SessionProfile::new(SessionKind::Welcome, config.profile.welcome_prompt.clone())
        .unknown_command(unknown_command)
}

fn unknown_command(token: &str) -> TranscriptLine {
    TranscriptLine::error(format!("Error: Comando '{}' desconocido.", token))
}

pub fn initial_lines() -> Vec<TranscriptLine> {
    vec![
        TranscriptLine::system("Cargando perfil de Víctor Pagola..."),
        TranscriptLine::success("Detectado: Pasión por IA y Automatización."),
        TranscriptLine::info("Sistema listo. Escribe \"help\" para interactuar."),
    ]
}

/// Command table of the welcome console
pub fn registry(config: &Config) -> CommandRegistry {
    let redirect = config.redirect.clone();
    let timing = config.timing.clone();

    CommandRegistry::new()
        .with(HELP_COMMAND, "list commands", |ctx| {
            let names: Vec<&str> = ctx
                .registry
                .names()
                .filter(|name| *name != HELP_COMMAND)
                .collect();
            CommandOutcome::Lines(vec![TranscriptLine::info(format!(
                "Comandos: {}",
                names.join(", ")
            ))])
        })
        .with_lines(
            "about",
            "who I am",
            vec![TranscriptLine::success(
                "Víctor Pagola. Desarrollador Backend & IT Technician. Transformando ideas en código eficiente.",
            )],
        )
        .with_lines(
            "ai_vision",
            "what AI is for",
            vec![TranscriptLine::warning(
                "Objetivo: Implementar IA para optimizar procesos reales, mejorarlos e implementar nuevas tecnologías en proyectos.",
            )],
        )
        .with_lines(
            "stack",
            "tools",
            vec![TranscriptLine::info(
                "Java | Python | AI Prompting | Linux | SQL | vibecoding",
            )],
        )
        .with_lines(
            "contact",
            "email",
            vec![TranscriptLine::info("Email: victorpagola.w@gmail.com")],
        )
        .with_clear("wipe the console")
        .with("github", "open GitHub", move |_| {
            countdown_redirect(
                &redirect,
                timing.countdown_interval(),
                timing.redirect_delay(),
                RedirectStyle {
                    countdown_kind: LineKind::System,
                    established: "CONNECTION ESTABLISHED. LAUNCHING...",
                },
            )
        })
}
