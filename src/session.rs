//! Session State Machine
//!
//! A [`Session`] ties one transcript, one input control, one scheduler and
//! one random source together and routes submitted lines according to its
//! phase:
//!
//! - `Ready` lines go through the command registry;
//! - `AwaitingInput` lines are answers to the running program;
//! - anything else is dropped.
//!
//! Mutable state lives in a `SessionCore` behind `Arc<Mutex<_>>`, shared
//! only with this session's scheduler task. The lock is never held across
//! an await or a host callback.

use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::sync::watch;
use uuid::Uuid;

use crate::bridge::{HostBridge, HostEffect, NoopBridge};
use crate::commands::{CommandOutcome, CommandRegistry, Resolution};
use crate::config::TimingConfig;
use crate::error::{Error, Result};
use crate::models::{SessionPhase, SimulatedProgram, TranscriptLine};
use crate::programs;
use crate::scheduler::{
    ScheduledSequence, ScheduledStep, Scheduler, SequenceId, StepResult, StepTarget,
};
use crate::terminal::{FocusOptions, InputControl, InputResult, Transcript};

/// Which console a session implements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionKind {
    /// Intro console with the boot script
    Boot,
    /// Welcome page console
    Welcome,
    /// In-page IDE running the scripted programs
    Ide,
}

impl SessionKind {
    pub const ALL: [SessionKind; 3] = [SessionKind::Boot, SessionKind::Welcome, SessionKind::Ide];

    pub fn as_str(&self) -> &'static str {
        match self {
            SessionKind::Boot => "boot",
            SessionKind::Welcome => "welcome",
            SessionKind::Ide => "ide",
        }
    }
}

impl fmt::Display for SessionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SessionKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_lowercase();
        SessionKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == wanted)
            .ok_or_else(|| Error::UnknownSession {
                name: s.to_string(),
            })
    }
}

/// Per-console presentation rules
#[derive(Debug, Clone)]
pub struct SessionProfile {
    /// Console the profile belongs to
    pub kind: SessionKind,
    /// Prompt echoed in front of submitted commands
    pub prompt: String,
    /// Builds the error line for an unknown token
    pub unknown_command: fn(&str) -> TranscriptLine,
    /// Append a blank line after synchronous responses
    pub trailing_blank: bool,
}

impl SessionProfile {
    pub fn new(kind: SessionKind, prompt: impl Into<String>) -> Self {
        Self {
            kind,
            prompt: prompt.into(),
            unknown_command: default_unknown_command,
            trailing_blank: false,
        }
    }

    pub fn unknown_command(mut self, format: fn(&str) -> TranscriptLine) -> Self {
        self.unknown_command = format;
        self
    }

    pub fn trailing_blank(mut self, enabled: bool) -> Self {
        self.trailing_blank = enabled;
        self
    }

    /// Echo line for a submitted command
    pub fn echo(&self, raw: &str) -> TranscriptLine {
        TranscriptLine::input(format!("{} {}", self.prompt, raw))
    }
}

fn default_unknown_command(token: &str) -> TranscriptLine {
    TranscriptLine::error(format!("Unknown command: {}", token))
}

/// What a submission did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Dropped: blank line, disabled input or finished session
    Ignored,
    /// Transcript wiped
    Cleared,
    /// Command answered synchronously
    Executed { token: String },
    /// Token not in the table
    Unknown { token: String },
    /// Command started a scheduled sequence
    Scheduled { token: String },
    /// Line was an answer to a waiting program
    Answered { program: SimulatedProgram },
}

/// State shared between a session and its scheduler task
#[derive(Debug)]
struct SessionCore {
    transcript: Transcript,
    phase: SessionPhase,
    input: InputControl,
    /// Sequence allowed to write; anything else is stale
    current_sequence: Option<SequenceId>,
    torn_down: bool,
    /// Whether `Ready` enables the input (false without a registry)
    accepts_commands: bool,
}

impl SessionCore {
    fn new(accepts_commands: bool) -> Self {
        Self {
            transcript: Transcript::new(),
            phase: SessionPhase::Booting,
            input: InputControl::new(),
            current_sequence: None,
            torn_down: false,
            accepts_commands,
        }
    }

    /// Enter `phase` and update the input control to match
    fn set_phase(&mut self, phase: SessionPhase) {
        if self.phase != phase {
            debug!("Session phase {} -> {}", self.phase, phase);
        }
        self.phase = phase;

        let enabled =
            phase.accepts_input() && (self.accepts_commands || phase != SessionPhase::Ready);
        self.input.set_enabled(enabled);
        if enabled {
            self.input.request_focus(FocusOptions::PREVENT_SCROLL);
        }
    }
}

impl StepTarget for SessionCore {
    fn begin_sequence(&mut self, sequence: SequenceId) {
        self.current_sequence = Some(sequence);
    }

    fn apply_step(&mut self, sequence: SequenceId, step: ScheduledStep, last: bool) -> StepResult {
        if self.torn_down || self.current_sequence != Some(sequence) {
            return StepResult::Stale;
        }

        self.transcript.append_all(step.lines);
        if let Some(phase) = step.phase {
            self.set_phase(phase);
        }

        if last {
            self.current_sequence = None;
            if self.phase == SessionPhase::Busy {
                self.set_phase(SessionPhase::Ready);
            }
        }

        StepResult::Applied(step.effect)
    }
}

/// One simulated console
pub struct Session {
    id: Uuid,
    profile: SessionProfile,
    core: Arc<Mutex<SessionCore>>,
    scheduler: Scheduler,
    bridge: Arc<dyn HostBridge>,
    registry: Option<Arc<CommandRegistry>>,
    rng: StdRng,
    timing: TimingConfig,
    program: SimulatedProgram,
}

impl Session {
    /// Start building a session with `profile`
    pub fn builder(profile: SessionProfile) -> SessionBuilder {
        SessionBuilder::new(profile)
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn kind(&self) -> SessionKind {
        self.profile.kind
    }

    pub fn profile(&self) -> &SessionProfile {
        &self.profile
    }

    pub fn registry(&self) -> Option<&CommandRegistry> {
        self.registry.as_deref()
    }

    pub fn phase(&self) -> SessionPhase {
        self.core().phase
    }

    /// Snapshot of the transcript, oldest line first
    pub fn transcript(&self) -> Vec<TranscriptLine> {
        self.core().transcript.lines().to_vec()
    }

    pub fn transcript_len(&self) -> usize {
        self.core().transcript.len()
    }

    /// Autoscroll signal of the transcript
    pub fn subscribe_scroll(&self) -> watch::Receiver<u64> {
        self.core().transcript.subscribe()
    }

    pub fn input_text(&self) -> String {
        self.core().input.text().to_string()
    }

    pub fn input_enabled(&self) -> bool {
        self.core().input.is_enabled()
    }

    pub fn focus_requests(&self) -> u64 {
        self.core().input.focus_requests()
    }

    pub fn last_focus(&self) -> Option<FocusOptions> {
        self.core().input.last_focus()
    }

    pub fn is_torn_down(&self) -> bool {
        self.core().torn_down
    }

    /// Whether a scheduled sequence is still running
    pub fn is_playing(&self) -> bool {
        self.scheduler.is_playing()
    }

    /// Program the IDE console runs next
    pub fn selected_program(&self) -> SimulatedProgram {
        self.program
    }

    /// Feed one key. Enter submits the buffer.
    pub fn type_char(&mut self, ch: char) -> InputResult {
        let result = self.core().input.process_char(ch);
        if let InputResult::LineReady(line) = &result {
            self.dispatch(line);
        }
        result
    }

    /// Feed every character of `text`
    pub fn type_str(&mut self, text: &str) {
        for ch in text.chars() {
            self.type_char(ch);
        }
    }

    pub fn backspace(&mut self) -> InputResult {
        self.core().input.backspace()
    }

    /// Replace the input buffer
    pub fn set_input(&mut self, text: &str) -> InputResult {
        self.core().input.set_text(text)
    }

    /// Submit the current buffer, as if Enter was pressed
    pub fn submit(&mut self) -> SubmitOutcome {
        let line = {
            let mut core = self.core();
            if !core.input.is_enabled() {
                debug!("Submit ignored, input disabled in phase {}", core.phase);
                return SubmitOutcome::Ignored;
            }
            core.input.take()
        };
        self.dispatch(&line)
    }

    /// Type `raw` into the buffer and submit it
    pub fn submit_line(&mut self, raw: &str) -> SubmitOutcome {
        match self.set_input(raw) {
            InputResult::Disabled => {
                debug!("Submit of '{}' ignored, input disabled", raw);
                SubmitOutcome::Ignored
            }
            _ => self.submit(),
        }
    }

    fn dispatch(&mut self, raw: &str) -> SubmitOutcome {
        let phase = {
            let core = self.core();
            if core.torn_down {
                return SubmitOutcome::Ignored;
            }
            core.phase
        };

        let outcome = match phase {
            SessionPhase::Ready => self.dispatch_command(raw),
            SessionPhase::AwaitingInput(purpose) => self.answer(purpose.program, raw),
            _ => {
                debug!("Submission ignored in phase {}", phase);
                SubmitOutcome::Ignored
            }
        };

        let mut core = self.core();
        core.input.clear();
        core.input.request_focus(FocusOptions::PREVENT_SCROLL);
        outcome
    }

    fn dispatch_command(&mut self, raw: &str) -> SubmitOutcome {
        let Some(registry) = self.registry.clone() else {
            debug!("Session {} has no command table", self.profile.kind);
            return SubmitOutcome::Ignored;
        };

        match registry.resolve(raw) {
            Resolution::Ignored => {
                debug!("Blank submission ignored");
                SubmitOutcome::Ignored
            }
            Resolution::Clear => self.clear_transcript(),
            Resolution::Command { token, outcome } => {
                debug!("Dispatching '{}'", token);
                match outcome {
                    CommandOutcome::Lines(lines) => {
                        self.append_response(raw, lines);
                        SubmitOutcome::Executed { token }
                    }
                    CommandOutcome::Schedule {
                        immediate,
                        sequence,
                    } => {
                        {
                            let mut core = self.core();
                            let echo = self.profile.echo(raw);
                            core.transcript
                                .append_all(std::iter::once(echo).chain(immediate));
                            core.set_phase(SessionPhase::Busy);
                        }
                        self.play(sequence);
                        SubmitOutcome::Scheduled { token }
                    }
                    CommandOutcome::Clear => self.clear_transcript(),
                }
            }
            Resolution::Unknown { token } => {
                debug!("Unknown command '{}'", token);
                let line = (self.profile.unknown_command)(&token);
                self.append_response(raw, vec![line]);
                SubmitOutcome::Unknown { token }
            }
        }
    }

    fn clear_transcript(&self) -> SubmitOutcome {
        self.core().transcript.clear();
        SubmitOutcome::Cleared
    }

    /// Echo, response lines, then the optional blank, as one batch
    fn append_response(&self, raw: &str, lines: Vec<TranscriptLine>) {
        let mut batch = Vec::with_capacity(lines.len() + 2);
        batch.push(self.profile.echo(raw));
        batch.extend(lines);
        if self.profile.trailing_blank {
            batch.push(TranscriptLine::blank());
        }
        self.core().transcript.append_all(batch);
    }

    fn answer(&mut self, program: SimulatedProgram, raw: &str) -> SubmitOutcome {
        let draw = self.rng.random_range(0..programs::response_count(program));
        let reply = programs::reply(program, raw, draw);

        {
            let mut core = self.core();
            core.transcript.append(TranscriptLine::input(raw));
            core.set_phase(SessionPhase::Busy);
        }

        self.play(ScheduledSequence::new().then(
            ScheduledStep::after(self.timing.thinking())
                .lines(reply)
                .phase(SessionPhase::Ready),
        ));
        SubmitOutcome::Answered { program }
    }

    /// Choose the IDE program. Cancels whatever runs and resets the console.
    /// Returns false when the selection was refused.
    pub fn select_program(&mut self, program: SimulatedProgram) -> bool {
        if self.profile.kind != SessionKind::Ide {
            debug!("Selection ignored, {} session has no programs", self.profile.kind);
            return false;
        }

        {
            let core = self.core();
            let closed = matches!(core.phase, SessionPhase::Booting | SessionPhase::Finished);
            if core.torn_down || closed {
                debug!("Selection ignored in phase {}", core.phase);
                return false;
            }
        }

        info!("Selected program {}", program);
        self.program = program;
        self.scheduler.cancel();

        let mut core = self.core();
        core.current_sequence = None;
        core.transcript.clear();
        core.input.clear();
        core.set_phase(SessionPhase::Ready);
        true
    }

    /// Run the selected program. Returns false when the run was refused.
    pub fn run(&mut self) -> bool {
        if self.profile.kind != SessionKind::Ide {
            debug!("Run ignored, {} session has no programs", self.profile.kind);
            return false;
        }

        {
            let mut core = self.core();
            let allowed = matches!(
                core.phase,
                SessionPhase::Ready | SessionPhase::AwaitingInput(_)
            );
            if core.torn_down || !allowed {
                debug!("Run ignored in phase {}", core.phase);
                return false;
            }

            core.transcript.clear();
            core.transcript
                .append(TranscriptLine::system(programs::RUNTIME_BANNER));
            core.input.clear();
            core.set_phase(SessionPhase::Busy);
        }

        info!("Running {}", self.program);
        self.play(programs::launch_sequence(
            self.program,
            self.timing.program_start(),
        ));
        true
    }

    /// Cancel all timers and finish the session. Idempotent.
    pub fn teardown(&mut self) {
        self.scheduler.cancel();

        let mut core = self.core();
        if core.torn_down {
            return;
        }
        core.torn_down = true;
        core.current_sequence = None;
        core.set_phase(SessionPhase::Finished);
        info!("Session {} ({}) torn down", self.id, self.profile.kind);
    }

    fn play(&mut self, sequence: ScheduledSequence) -> SequenceId {
        self.scheduler
            .play(&self.core, Arc::clone(&self.bridge), sequence)
    }

    fn core(&self) -> MutexGuard<'_, SessionCore> {
        self.core.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.teardown();
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("kind", &self.profile.kind)
            .field("phase", &self.phase())
            .field("program", &self.program)
            .finish_non_exhaustive()
    }
}

/// Builder for [`Session`]
pub struct SessionBuilder {
    profile: SessionProfile,
    registry: Option<Arc<CommandRegistry>>,
    bridge: Arc<dyn HostBridge>,
    initial_lines: Vec<TranscriptLine>,
    boot_script: Option<ScheduledSequence>,
    rng: Option<StdRng>,
    timing: TimingConfig,
}

impl SessionBuilder {
    pub fn new(profile: SessionProfile) -> Self {
        Self {
            profile,
            registry: None,
            bridge: Arc::new(NoopBridge),
            initial_lines: Vec::new(),
            boot_script: None,
            rng: None,
            timing: TimingConfig::default(),
        }
    }

    pub fn kind(&self) -> SessionKind {
        self.profile.kind
    }

    /// Command table; without one the input only opens for program answers
    pub fn registry(self, registry: CommandRegistry) -> Self {
        self.shared_registry(Arc::new(registry))
    }

    pub fn shared_registry(mut self, registry: Arc<CommandRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn bridge(mut self, bridge: Arc<dyn HostBridge>) -> Self {
        self.bridge = bridge;
        self
    }

    /// Lines present before anything is typed
    pub fn initial_lines(mut self, lines: Vec<TranscriptLine>) -> Self {
        self.initial_lines = lines;
        self
    }

    /// Script played at construction. Its last step always enters `Ready`
    /// and reports `BootComplete`.
    pub fn boot_script(mut self, script: ScheduledSequence) -> Self {
        self.boot_script = Some(script);
        self
    }

    pub fn rng(mut self, rng: StdRng) -> Self {
        self.rng = Some(rng);
        self
    }

    /// Deterministic random source
    pub fn seed(self, seed: u64) -> Self {
        self.rng(StdRng::seed_from_u64(seed))
    }

    pub fn timing(mut self, timing: TimingConfig) -> Self {
        self.timing = timing;
        self
    }

    /// Create the session. Must be called inside a tokio runtime.
    pub fn build(self) -> Result<Session> {
        let scheduler = Scheduler::new()?;
        let accepts_commands = self.registry.is_some();

        let mut core = SessionCore::new(accepts_commands);
        core.transcript.append_all(self.initial_lines);

        let mut session = Session {
            id: Uuid::new_v4(),
            profile: self.profile,
            core: Arc::new(Mutex::new(core)),
            scheduler,
            bridge: self.bridge,
            registry: self.registry,
            rng: self
                .rng
                .unwrap_or_else(|| StdRng::from_rng(&mut rand::rng())),
            timing: self.timing,
            program: SimulatedProgram::default(),
        };

        info!("Session {} ({}) created", session.id, session.profile.kind);

        match self.boot_script {
            Some(script) => {
                session.play(finish_boot(script));
            }
            None => session.core().set_phase(SessionPhase::Ready),
        }

        Ok(session)
    }
}

/// Make the final step of a boot script enter `Ready` and report completion
fn finish_boot(script: ScheduledSequence) -> ScheduledSequence {
    let mut steps: Vec<ScheduledStep> = script.steps().to_vec();
    match steps.last_mut() {
        Some(last) => {
            last.phase = Some(SessionPhase::Ready);
            last.effect = Some(HostEffect::BootComplete);
        }
        None => steps.push(
            ScheduledStep::after_ms(0)
                .phase(SessionPhase::Ready)
                .effect(HostEffect::BootComplete),
        ),
    }
    steps.into_iter().collect()
}
