//! Terminal Surface
//!
//! The two pieces of a simulated terminal that the presentation layer
//! reads from: the transcript and the single-line input control.

pub mod input;
pub mod transcript;

// Re-exports for convenience
pub use input::{FocusOptions, InputControl, InputResult};
pub use transcript::Transcript;
