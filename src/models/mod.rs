//! Core data models for PagolaTerm
//!
//! This module contains the plain data structures shared by the engine:
//! transcript lines and session phases.

pub mod session_phase;
pub mod transcript_line;

// Re-exports for convenience
pub use session_phase::{AwaitPurpose, SessionPhase, SimulatedProgram};
pub use transcript_line::{LineKind, Segment, TranscriptLine};
