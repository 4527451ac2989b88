//! Timed Output Scheduler
//!
//! Plays declarative [`ScheduledSequence`]s into a session. A sequence is a
//! list of steps; each step waits its delay (measured from the previous
//! step's deadline, so ticks do not drift), appends its lines, optionally
//! changes the session phase and optionally hands a [`HostEffect`] to the
//! host bridge.
//!
//! The scheduler is the only component that owns timers. One spawned task
//! runs one sequence. Cancelling aborts the task, and every step re-checks
//! with its target that the sequence is still current before writing, so a
//! stale timer can never touch a torn-down session.

use std::sync::{Arc, Mutex, PoisonError, Weak};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};

use crate::bridge::{self, HostBridge, HostEffect};
use crate::error::{Error, Result};
use crate::models::{SessionPhase, TranscriptLine};

/// Identifier of one played sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SequenceId(u64);

impl SequenceId {
    pub fn value(&self) -> u64 {
        self.0
    }
}

/// One deferred write
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledStep {
    /// Wait before firing, measured from the previous step
    pub delay: Duration,
    /// Lines appended when the step fires
    pub lines: Vec<TranscriptLine>,
    /// Phase entered after the lines are appended
    pub phase: Option<SessionPhase>,
    /// Host effect invoked after the phase change
    pub effect: Option<HostEffect>,
}

impl ScheduledStep {
    /// Empty step firing after `delay`
    pub fn after(delay: Duration) -> Self {
        Self {
            delay,
            lines: Vec::new(),
            phase: None,
            effect: None,
        }
    }

    /// Empty step firing after `ms` milliseconds
    pub fn after_ms(ms: u64) -> Self {
        Self::after(Duration::from_millis(ms))
    }

    pub fn line(mut self, line: TranscriptLine) -> Self {
        self.lines.push(line);
        self
    }

    pub fn lines<I>(mut self, lines: I) -> Self
    where
        I: IntoIterator<Item = TranscriptLine>,
    {
        self.lines.extend(lines);
        self
    }

    pub fn phase(mut self, phase: SessionPhase) -> Self {
        self.phase = Some(phase);
        self
    }

    pub fn effect(mut self, effect: HostEffect) -> Self {
        self.effect = Some(effect);
        self
    }
}

/// Ordered list of steps played strictly in order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScheduledSequence {
    steps: Vec<ScheduledStep>,
}

impl ScheduledSequence {
    pub fn new() -> Self {
        Self { steps: Vec::new() }
    }

    /// Append a step
    pub fn then(mut self, step: ScheduledStep) -> Self {
        self.steps.push(step);
        self
    }

    pub fn push(&mut self, step: ScheduledStep) {
        self.steps.push(step);
    }

    pub fn steps(&self) -> &[ScheduledStep] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Time from play to the last step
    pub fn total_duration(&self) -> Duration {
        self.steps.iter().map(|s| s.delay).sum()
    }

    /// Every line the sequence will append, in order
    pub fn all_lines(&self) -> impl Iterator<Item = &TranscriptLine> {
        self.steps.iter().flat_map(|s| s.lines.iter())
    }
}

impl FromIterator<ScheduledStep> for ScheduledSequence {
    fn from_iter<I: IntoIterator<Item = ScheduledStep>>(iter: I) -> Self {
        Self {
            steps: iter.into_iter().collect(),
        }
    }
}

/// Outcome of offering a fired step to its target
#[derive(Debug, Clone, PartialEq)]
pub enum StepResult {
    /// Step written; effect (if any) still has to be delivered
    Applied(Option<HostEffect>),
    /// Sequence is no longer current; playback stops
    Stale,
}

/// Something a sequence can be played into
pub trait StepTarget: Send + 'static {
    /// Mark `sequence` as the current one, invalidating any other
    fn begin_sequence(&mut self, sequence: SequenceId);

    /// Apply a fired step. `last` is set on the final step so the target can
    /// release its current-sequence marker under the same lock.
    fn apply_step(&mut self, sequence: SequenceId, step: ScheduledStep, last: bool) -> StepResult;
}

/// Handle to a running sequence
#[derive(Debug)]
pub struct SequenceHandle {
    id: SequenceId,
    task: JoinHandle<()>,
}

impl SequenceHandle {
    pub fn id(&self) -> SequenceId {
        self.id
    }

    /// Abort all pending timers of this sequence
    pub fn cancel(&self) {
        self.task.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

/// Per-session timer owner
#[derive(Debug)]
pub struct Scheduler {
    /// Runtime the timer tasks are spawned on
    runtime: Handle,
    /// Next sequence id
    next_id: u64,
    /// Sequence currently playing, if any
    in_flight: Option<SequenceHandle>,
}

impl Scheduler {
    /// Create a scheduler bound to the current tokio runtime
    pub fn new() -> Result<Self> {
        let runtime = Handle::try_current().map_err(|_| Error::NoRuntime)?;
        Ok(Self::with_handle(runtime))
    }

    /// Create a scheduler bound to a specific runtime
    pub fn with_handle(runtime: Handle) -> Self {
        Self {
            runtime,
            next_id: 1,
            in_flight: None,
        }
    }

    /// Play `sequence` into `target`, cancelling whatever was playing.
    pub fn play<T: StepTarget>(
        &mut self,
        target: &Arc<Mutex<T>>,
        bridge: Arc<dyn HostBridge>,
        mut sequence: ScheduledSequence,
    ) -> SequenceId {
        self.cancel();

        // The target only learns a sequence ended through its last step
        if sequence.is_empty() {
            sequence.push(ScheduledStep::after(Duration::ZERO));
        }

        let id = SequenceId(self.next_id);
        self.next_id += 1;

        target
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .begin_sequence(id);

        debug!(
            "Playing sequence {} ({} steps, {:?})",
            id.0,
            sequence.len(),
            sequence.total_duration()
        );

        let weak = Arc::downgrade(target);
        let start = Instant::now();
        let task = self
            .runtime
            .spawn(run_sequence(weak, bridge, id, start, sequence));
        self.in_flight = Some(SequenceHandle { id, task });
        id
    }

    /// Cancel the in-flight sequence, if any
    pub fn cancel(&mut self) {
        if let Some(handle) = self.in_flight.take() {
            if !handle.is_finished() {
                debug!("Cancelling sequence {}", handle.id.0);
            }
            handle.cancel();
        }
    }

    /// Check whether a sequence is still running
    pub fn is_playing(&self) -> bool {
        self.in_flight.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Id of the most recently played sequence
    pub fn current(&self) -> Option<SequenceId> {
        self.in_flight.as_ref().map(SequenceHandle::id)
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        self.cancel();
    }
}

async fn run_sequence<T: StepTarget>(
    target: Weak<Mutex<T>>,
    bridge: Arc<dyn HostBridge>,
    id: SequenceId,
    start: Instant,
    sequence: ScheduledSequence,
) {
    let total = sequence.steps.len();
    let mut deadline = start;

    for (index, step) in sequence.steps.into_iter().enumerate() {
        deadline += step.delay;
        sleep_until(deadline).await;

        let Some(target) = target.upgrade() else {
            trace!("Sequence {} target dropped", id.0);
            return;
        };

        // The effect goes out under the target lock, so a teardown that
        // returned first always sees the step as stale
        let mut guard = target.lock().unwrap_or_else(PoisonError::into_inner);
        match guard.apply_step(id, step, index + 1 == total) {
            StepResult::Stale => {
                trace!("Sequence {} is stale, stopping", id.0);
                return;
            }
            StepResult::Applied(effect) => {
                trace!("Sequence {} fired step {}/{}", id.0, index + 1, total);
                if let Some(effect) = effect {
                    bridge::deliver(bridge.as_ref(), &effect);
                }
            }
        }
        drop(guard);
    }
}
