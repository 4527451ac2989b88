//! Session Presets
//!
//! The three consoles of the portfolio, assembled from the generic engine:
//! a command table, a profile, and the lines or script present at start.

pub mod boot;
pub mod ide;
pub mod welcome;

use std::time::Duration;

use crate::bridge::HostEffect;
use crate::commands::CommandOutcome;
use crate::config::{Config, RedirectConfig};
use crate::models::{LineKind, SessionPhase, TranscriptLine};
use crate::scheduler::{ScheduledSequence, ScheduledStep};
use crate::session::{SessionBuilder, SessionKind};

/// Warning printed when a redirect starts
pub const REDIRECT_BANNER: &str = "Iniciando protocolo de transferencia a GitHub...";

/// Builder for the preset of `kind`; add a bridge and seed before building
pub fn builder(kind: SessionKind, config: &Config) -> SessionBuilder {
    match kind {
        SessionKind::Boot => boot::builder(config),
        SessionKind::Welcome => welcome::builder(config),
        SessionKind::Ide => ide::builder(config),
    }
}

/// Appearance of a countdown-then-redirect
#[derive(Debug, Clone, Copy)]
pub struct RedirectStyle {
    /// Kind of the "Redirigiendo en K..." lines
    pub countdown_kind: LineKind,
    /// Line printed once the countdown reaches zero
    pub established: &'static str,
}

/// `github` handler body: a warning now, one countdown line per interval,
/// the success line one interval later, then navigation after the redirect
/// delay.
pub fn countdown_redirect(
    redirect: &RedirectConfig,
    interval: Duration,
    redirect_delay: Duration,
    style: RedirectStyle,
) -> CommandOutcome {
    let mut sequence: ScheduledSequence = (1..=redirect.countdown)
        .rev()
        .map(|k| {
            ScheduledStep::after(interval).line(TranscriptLine::new(
                format!("Redirigiendo en {}...", k),
                style.countdown_kind,
            ))
        })
        .collect();

    sequence.push(ScheduledStep::after(interval).line(TranscriptLine::success(style.established)));
    sequence.push(
        ScheduledStep::after(redirect_delay)
            .phase(SessionPhase::Ready)
            .effect(HostEffect::Navigate(redirect.url.clone())),
    );

    CommandOutcome::Schedule {
        immediate: vec![TranscriptLine::warning(REDIRECT_BANNER)],
        sequence,
    }
}
