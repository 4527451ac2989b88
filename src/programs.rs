//! Scripted Programs
//!
//! The two fake programs the IDE console "runs". Nothing is executed: a run
//! is a start-up delay followed by a prompt, and an answer is turned into a
//! canned reply by a pure function of `(program, answer, draw)`. The random
//! draw is taken by the session from its injected generator, so tests can
//! pin any branch.

use std::time::Duration;

use crate::models::{AwaitPurpose, SessionPhase, SimulatedProgram, TranscriptLine};
use crate::scheduler::{ScheduledSequence, ScheduledStep};

/// First line of every run
pub const RUNTIME_BANNER: &str = "> Initializing Runtime Environment...";

/// Reply of the oracle when the question is about hiring
pub const HIRE_RESPONSE: &str = "> Prediction: Hiring this developer increases efficiency by 200%.";

const HIRE_KEYWORDS: [&str; 3] = ["job", "work", "contract"];

const ORACLE_RESPONSES: [&str; 5] = [
    "> Computing... The answer is 42. But you knew that.",
    "> I've analyzed 14 million futures. In only one do you fix that bug without coffee.",
    "> ERROR: Too much human logic detected. Please try thinking like a machine.",
    // index 3 quotes the answer, see `oracle_response`
    "",
    "> Synthesizing... Have you tried turning the universe off and on again?",
];

/// Number of distinct random replies a program can pick from.
/// The session draws in `0..response_count(program)`.
pub fn response_count(program: SimulatedProgram) -> usize {
    match program {
        SimulatedProgram::AiOracle => ORACLE_RESPONSES.len(),
        SimulatedProgram::SecurityGate => 1,
    }
}

/// Lines printed once the program is up and blocked on stdin
pub fn prompt_lines(program: SimulatedProgram) -> Vec<TranscriptLine> {
    match program {
        SimulatedProgram::AiOracle => {
            vec![TranscriptLine::info("Ask the AI anything (Job, Life, Code?):")]
        }
        SimulatedProgram::SecurityGate => vec![
            TranscriptLine::success("SECURE CONNECTION ESTABLISHED."),
            TranscriptLine::warning("Enter Admin Password:"),
        ],
    }
}

/// Steps played after the runtime banner: wait, print the prompt, then
/// block on stdin.
pub fn launch_sequence(program: SimulatedProgram, startup: Duration) -> ScheduledSequence {
    ScheduledSequence::new().then(
        ScheduledStep::after(startup)
            .lines(prompt_lines(program))
            .phase(SessionPhase::AwaitingInput(AwaitPurpose::new(program))),
    )
}

/// Lines appended after the thinking delay in reply to `answer`
pub fn reply(program: SimulatedProgram, answer: &str, draw: usize) -> Vec<TranscriptLine> {
    match program {
        SimulatedProgram::AiOracle => vec![
            TranscriptLine::system("> Neural Network Thinking..."),
            TranscriptLine::info(oracle_response(answer, draw)),
        ],
        SimulatedProgram::SecurityGate => {
            let verdict = if password_accepted(answer) {
                TranscriptLine::success("> ACCESS GRANTED. Welcome back, Commander.")
            } else {
                TranscriptLine::error("> ACCESS DENIED. This incident will be reported.")
            };
            vec![TranscriptLine::system("> Verifying hash..."), verdict]
        }
    }
}

/// The oracle's answer. Hiring questions always get the same reply;
/// anything else picks `draw % 5` from the canned set.
pub fn oracle_response(answer: &str, draw: usize) -> String {
    let lowered = answer.to_lowercase();
    if HIRE_KEYWORDS.iter().any(|k| lowered.contains(k)) {
        return HIRE_RESPONSE.to_string();
    }

    match draw % ORACLE_RESPONSES.len() {
        3 => format!(
            "> Analysis of '{}': Result uncertain. Recommend hiring Víctor to solve it.",
            answer
        ),
        i => ORACLE_RESPONSES[i].to_string(),
    }
}

/// `admin` in any case, or anything longer than five characters
pub fn password_accepted(answer: &str) -> bool {
    answer.to_lowercase() == "admin" || answer.chars().count() > 5
}
