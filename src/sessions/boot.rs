//! Boot console
//!
//! Plays the kernel boot script, then accepts the visitor commands. `start`
//! hands control to the graphical portfolio.

use crate::bridge::HostEffect;
use crate::commands::{CommandContext, CommandOutcome, CommandRegistry, HELP_COMMAND};
use crate::config::{Config, TimingConfig};
use crate::models::{LineKind, SessionPhase, TranscriptLine};
use crate::scheduler::{ScheduledSequence, ScheduledStep};
use crate::session::{SessionBuilder, SessionKind, SessionProfile};

use super::{countdown_redirect, RedirectStyle};

/// Delay of each boot line, measured from the previous one
const BOOT_DELAYS_MS: [u64; 8] = [300, 600, 900, 1200, 1300, 1400, 1500, 1600];

pub const LAUNCH_LINE: &str = "Iniciando interfaz gráfica...";

/// Boot console preset
pub fn builder(config: &Config) -> SessionBuilder {
    SessionBuilder::new(profile(config))
        .registry(registry(config))
        .boot_script(boot_script(&config.timing))
        .timing(config.timing.clone())
}

pub fn profile(config: &Config) -> SessionProfile {
    SessionProfile::new(SessionKind::Boot, config.profile.boot_prompt.clone())
        .unknown_command(unknown_command)
        .trailing_blank(true)
}

fn unknown_command(token: &str) -> TranscriptLine {
    TranscriptLine::error(format!(
        "Comando no encontrado: {}. Escribe 'help' para ver opciones.",
        token
    ))
}

/// The kernel boot lines, one per step
pub fn boot_script(timing: &TimingConfig) -> ScheduledSequence {
    let lines = [
        TranscriptLine::plain("Initializing PAGOLA_OS kernel..."),
        TranscriptLine::plain("Loading interface modules..."),
        TranscriptLine::plain("Verifying user permissions..."),
        TranscriptLine::success("Acceso Concedido."),
        TranscriptLine::blank(),
        TranscriptLine::plain("Bienvenido a la terminal interactiva."),
        TranscriptLine::plain("Escribe 'help' para ver comandos o 'start' para entrar.")
            .with_highlights(["help", "start"]),
        TranscriptLine::blank(),
    ];

    BOOT_DELAYS_MS
        .into_iter()
        .zip(lines)
        .map(|(ms, line)| ScheduledStep::after(timing.boot_delay(ms)).line(line))
        .collect()
}

/// Command table of the boot console
pub fn registry(config: &Config) -> CommandRegistry {
    let redirect = config.redirect.clone();
    let timing = config.timing.clone();
    let launch_delay = timing.launch_delay();

    CommandRegistry::new()
        .with(HELP_COMMAND, "Mostrar esta ayuda", help)
        .with_lines(
            "about",
            "¿Quién soy?",
            vec![
                TranscriptLine::plain("Víctor Pagola - Java/Python Developer & IT Technician."),
                TranscriptLine::plain("Persona proactiva y creativa con fuerte interés en tecnología."),
                TranscriptLine::plain("Especializado en automatización, IA y desarrollo de software."),
            ],
        )
        .with_lines(
            "stack",
            "Tecnologías y Habilidades",
            vec![
                TranscriptLine::plain("Lenguajes: Java, Python, JavaScript, SQL, HTML, CSS"),
                TranscriptLine::plain("Sistemas: Linux, CMD, Virtualización, Redes Locales"),
                TranscriptLine::plain("Herramientas: Git, GitHub, Office 365, Workbench"),
                TranscriptLine::plain("Skills: Gestión de Sistemas, Soporte Técnico, IA"),
            ],
        )
        .with_lines(
            "contact",
            "Información de contacto",
            vec![
                TranscriptLine::plain("Email: victorpagola.w@gmail.com"),
                TranscriptLine::plain("LinkedIn: linkedin.com/in/pagola/"),
                TranscriptLine::plain("GitHub: github.com/Paagola"),
                TranscriptLine::plain("Ubicación: Alhaurín de la Torre, Málaga"),
            ],
        )
        .with("github", "Ir a mi GitHub", move |_| {
            countdown_redirect(
                &redirect,
                timing.countdown_interval(),
                timing.redirect_delay(),
                RedirectStyle {
                    countdown_kind: LineKind::Plain,
                    established: "CONEXIÓN ESTABLECIDA.",
                },
            )
        })
        .with_clear("Limpiar terminal")
        .with("start", "Iniciar Portfolio UI", move |_| CommandOutcome::Schedule {
            immediate: vec![TranscriptLine::success(LAUNCH_LINE)],
            sequence: ScheduledSequence::new().then(
                ScheduledStep::after(launch_delay)
                    .phase(SessionPhase::Finished)
                    .effect(HostEffect::ScreenTransition),
            ),
        })
}

/// Header plus one padded line per command, `help` itself excluded
fn help(ctx: &CommandContext<'_>) -> CommandOutcome {
    let mut lines = vec![TranscriptLine::warning("Comandos disponibles:")];
    lines.extend(
        ctx.registry
            .entries()
            .iter()
            .filter(|entry| entry.name() != HELP_COMMAND)
            .map(|entry| TranscriptLine::plain(format!("  {:<8} - {}", entry.name(), entry.summary()))),
    );
    CommandOutcome::Lines(lines)
}
