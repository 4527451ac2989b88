//! Test fixtures

use pagolaterm::models::LineKind;
use pagolaterm::{Config, Session};

/// Transcript texts, oldest first
pub fn texts(session: &Session) -> Vec<String> {
    session.transcript().into_iter().map(|l| l.text).collect()
}

/// Transcript line kinds, oldest first
pub fn kinds(session: &Session) -> Vec<LineKind> {
    session.transcript().into_iter().map(|l| l.kind).collect()
}

/// Config with short, round delays for tests that do not care about the
/// real timings
pub fn fast_config() -> Config {
    let mut config = Config::default();
    config.timing.boot_speed_percent = 10;
    config.timing.countdown_interval_ms = 100;
    config.timing.redirect_delay_ms = 100;
    config.timing.launch_delay_ms = 100;
    config.timing.program_start_ms = 100;
    config.timing.thinking_ms = 100;
    config
}
