//! IDE console
//!
//! No command table. The visitor picks a program, runs it, and answers its
//! prompt; see [`crate::programs`] for the scripted behaviour.

use crate::config::Config;
use crate::session::{SessionBuilder, SessionKind, SessionProfile};

/// IDE console preset
pub fn builder(config: &Config) -> SessionBuilder {
    SessionBuilder::new(profile()).timing(config.timing.clone())
}

pub fn profile() -> SessionProfile {
    SessionProfile::new(SessionKind::Ide, ">")
}
