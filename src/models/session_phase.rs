//! Session Phase Model
//!
//! The lifecycle of one simulated shell. Exactly one phase is active at a
//! time; the phase alone decides whether the input control is usable.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Simulated program that can block on stdin in the IDE console
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum SimulatedProgram {
    /// `AI_Oracle.py`, answers any question
    #[default]
    AiOracle,
    /// `SecurityGate.java`, asks for an admin password
    SecurityGate,
}

impl SimulatedProgram {
    /// All programs, in the order the IDE lists them
    pub const ALL: [SimulatedProgram; 2] = [SimulatedProgram::AiOracle, SimulatedProgram::SecurityGate];

    /// File name shown in the IDE tab
    pub fn file_name(&self) -> &'static str {
        match self {
            SimulatedProgram::AiOracle => "AI_Oracle.py",
            SimulatedProgram::SecurityGate => "SecurityGate.java",
        }
    }

    /// Language label of the source file
    pub fn language(&self) -> &'static str {
        match self {
            SimulatedProgram::AiOracle => "python",
            SimulatedProgram::SecurityGate => "java",
        }
    }
}

impl fmt::Display for SimulatedProgram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_name())
    }
}

impl FromStr for SimulatedProgram {
    type Err = Error;

    /// Accepts the file name or the language, case-insensitively
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        SimulatedProgram::ALL
            .into_iter()
            .find(|p| p.file_name().to_lowercase() == wanted || p.language() == wanted)
            .ok_or_else(|| Error::UnknownProgram {
                name: s.trim().to_string(),
            })
    }
}

/// Why a session is waiting for a free-text answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AwaitPurpose {
    /// Program blocked on stdin; decides how the answer is handled
    pub program: SimulatedProgram,
}

impl AwaitPurpose {
    pub fn new(program: SimulatedProgram) -> Self {
        Self { program }
    }
}

/// Lifecycle phase of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SessionPhase {
    /// Boot script still playing
    #[default]
    Booting,
    /// Idle, accepting commands
    Ready,
    /// A simulated program is waiting on stdin
    AwaitingInput(AwaitPurpose),
    /// A scheduled sequence is running; input is ignored
    Busy,
    /// Session handed off or torn down; nothing is accepted any more
    Finished,
}

impl SessionPhase {
    /// Whether the input control may be enabled in this phase
    pub fn accepts_input(&self) -> bool {
        matches!(self, SessionPhase::Ready | SessionPhase::AwaitingInput(_))
    }

    /// Check if the session has ended
    pub fn is_finished(&self) -> bool {
        matches!(self, SessionPhase::Finished)
    }

    /// Purpose of the pending answer, if any
    pub fn await_purpose(&self) -> Option<AwaitPurpose> {
        match self {
            SessionPhase::AwaitingInput(purpose) => Some(*purpose),
            _ => None,
        }
    }
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionPhase::Booting => write!(f, "booting"),
            SessionPhase::Ready => write!(f, "ready"),
            SessionPhase::AwaitingInput(purpose) => {
                write!(f, "awaiting input ({})", purpose.program)
            }
            SessionPhase::Busy => write!(f, "busy"),
            SessionPhase::Finished => write!(f, "finished"),
        }
    }
}
