//! PagolaTerm - simulated shell engine for the portfolio consoles
//!
//! This library drives three fake terminals: the boot intro, the welcome
//! page console and the in-page IDE. Nothing is executed for real; every
//! answer is scripted and every delay comes from a cancellable scheduler.
//!
//! ## Module Organization
//!
//! ### Engine
//!
//! - [`session`] - Session state machine, input gating, dispatch
//! - [`commands`] - Command registry and resolution
//! - [`scheduler`] - Timed, cancellable output sequences
//! - [`terminal`] - Transcript store and single-line input control
//! - [`bridge`] - Host callbacks (screen transition, navigation)
//!
//! ### Content
//!
//! - [`sessions`] - The boot, welcome and IDE presets
//! - [`programs`] - Scripted replies of the IDE programs
//! - [`models`] - Transcript lines and session phases
//!
//! ### Support
//!
//! - [`config`] - Timings, redirect target and prompts; TOML/JSON loading
//! - [`mod@error`] - Error types and Result aliases
//!
//! ## Quick Start
//!
//! ```no_run
//! use pagolaterm::{sessions, Config, SessionKind};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> pagolaterm::Result<()> {
//! let config = Config::default();
//! let mut session = sessions::builder(SessionKind::Welcome, &config).build()?;
//!
//! session.submit_line("about");
//! for line in session.transcript() {
//!     println!("{}", line.text);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Concurrency
//!
//! Sessions run on a tokio runtime. Each session owns one scheduler that
//! spawns at most one timer task at a time; the task shares the session
//! state through an `Arc<Mutex<_>>` and never holds the lock across an
//! await or a host callback. Dropping a session cancels its timers.

#[macro_use]
extern crate tracing;

pub mod bridge;
pub mod commands;
pub mod config;
pub mod error;
pub mod models;
pub mod programs;
pub mod scheduler;
pub mod session;
pub mod sessions;
pub mod terminal;

pub use bridge::{BridgeEvent, ChannelBridge, HostBridge, HostEffect, NoopBridge};
pub use commands::{CommandOutcome, CommandRegistry, Resolution};
pub use config::loader::ConfigLoader;
pub use config::Config;
pub use error::{Error, Result};
pub use models::{LineKind, SessionPhase, SimulatedProgram, TranscriptLine};
pub use scheduler::{ScheduledSequence, ScheduledStep, Scheduler, SequenceHandle};
pub use session::{Session, SessionBuilder, SessionKind, SessionProfile, SubmitOutcome};

/// The current version of PagolaTerm from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// The application name from Cargo.toml
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// The application description from Cargo.toml
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Load the configuration from the default locations.
///
/// A broken or invalid file is logged and replaced by defaults, so the
/// consoles always come up.
///
/// # Examples
///
/// ```no_run
/// let config = pagolaterm::init();
/// assert!(config.validate().is_ok());
/// ```
pub fn init() -> Config {
    info!("Initializing {} v{}", NAME, VERSION);

    match ConfigLoader::load() {
        Ok(config) => config,
        Err(e) => {
            warn!("Failed to load configuration: {}. Using defaults", e);
            Config::default()
        }
    }
}

/// Load the configuration from an explicit file.
///
/// Unlike [`init`], errors are returned: a file the user named must be
/// usable.
pub fn init_with_config(path: &std::path::Path) -> Result<Config> {
    info!("Initializing {} v{} with {}", NAME, VERSION, path.display());
    ConfigLoader::load_from_path(path)
}
