//! Command Registry & Dispatcher
//!
//! Maps normalized command tokens to handlers. A handler either returns
//! lines to append right away, asks for a clear, or returns a
//! [`ScheduledSequence`] that the session plays while it is busy.
//!
//! Resolution is separate from application: [`CommandRegistry::resolve`]
//! decides what a submitted line means, the session applies it to its
//! transcript and phase.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::models::TranscriptLine;
use crate::scheduler::ScheduledSequence;

/// Reserved token that wipes the transcript without an echo
pub const CLEAR_COMMAND: &str = "clear";

/// Conventional token listing the session's commands
pub const HELP_COMMAND: &str = "help";

/// Normalize raw input into a command token: trim, then lower-case
pub fn normalize(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// What a handler wants done
#[derive(Debug, Clone, PartialEq)]
pub enum CommandOutcome {
    /// Append these lines now
    Lines(Vec<TranscriptLine>),
    /// Wipe the transcript
    Clear,
    /// Append `immediate` now, then go busy and play `sequence`
    Schedule {
        immediate: Vec<TranscriptLine>,
        sequence: ScheduledSequence,
    },
}

/// Data a handler sees
#[derive(Clone, Copy)]
pub struct CommandContext<'a> {
    /// Normalized token
    pub token: &'a str,
    /// Raw submitted text
    pub raw: &'a str,
    /// The table the command was found in
    pub registry: &'a CommandRegistry,
}

/// Command implementation
pub trait CommandHandler: Send + Sync {
    fn handle(&self, ctx: &CommandContext<'_>) -> CommandOutcome;
}

impl<F> CommandHandler for F
where
    F: Fn(&CommandContext<'_>) -> CommandOutcome + Send + Sync,
{
    fn handle(&self, ctx: &CommandContext<'_>) -> CommandOutcome {
        self(ctx)
    }
}

/// One registered command
#[derive(Clone)]
pub struct CommandEntry {
    name: String,
    summary: String,
    handler: Arc<dyn CommandHandler>,
}

impl CommandEntry {
    /// Normalized name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// One-line description used by help listings
    pub fn summary(&self) -> &str {
        &self.summary
    }

    pub fn handler(&self) -> &dyn CommandHandler {
        self.handler.as_ref()
    }
}

impl fmt::Debug for CommandEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandEntry")
            .field("name", &self.name)
            .field("summary", &self.summary)
            .finish_non_exhaustive()
    }
}

/// Meaning of a submitted line
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// Blank submission; nothing happens
    Ignored,
    /// Reserved `clear`
    Clear,
    /// Known command
    Command {
        token: String,
        outcome: CommandOutcome,
    },
    /// Token not in the table
    Unknown { token: String },
}

/// Closed, per-session command table
#[derive(Debug, Clone, Default)]
pub struct CommandRegistry {
    /// Entries in registration order
    entries: Vec<CommandEntry>,
    /// Normalized name -> position in `entries`
    index: HashMap<String, usize>,
}

impl CommandRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a closure command
    pub fn register<F>(&mut self, name: &str, summary: &str, handler: F)
    where
        F: Fn(&CommandContext<'_>) -> CommandOutcome + Send + Sync + 'static,
    {
        self.register_handler(name, summary, handler);
    }

    /// Register a command. Re-registering a name replaces the handler and
    /// keeps the original listing position.
    pub fn register_handler<H>(&mut self, name: &str, summary: &str, handler: H)
    where
        H: CommandHandler + 'static,
    {
        let entry = CommandEntry {
            name: normalize(name),
            summary: summary.to_string(),
            handler: Arc::new(handler),
        };

        match self.index.get(&entry.name) {
            Some(&position) => {
                warn!("Command '{}' registered twice, replacing handler", entry.name);
                self.entries[position] = entry;
            }
            None => {
                self.index.insert(entry.name.clone(), self.entries.len());
                self.entries.push(entry);
            }
        }
    }

    /// Builder-style [`register`](Self::register)
    pub fn with<F>(mut self, name: &str, summary: &str, handler: F) -> Self
    where
        F: Fn(&CommandContext<'_>) -> CommandOutcome + Send + Sync + 'static,
    {
        self.register(name, summary, handler);
        self
    }

    /// Register a command that always prints the same lines
    pub fn with_lines(self, name: &str, summary: &str, lines: Vec<TranscriptLine>) -> Self {
        self.with(name, summary, move |_| {
            CommandOutcome::Lines(lines.clone())
        })
    }

    /// Register the reserved `clear` so it shows up in listings
    pub fn with_clear(self, summary: &str) -> Self {
        self.with(CLEAR_COMMAND, summary, |_| CommandOutcome::Clear)
    }

    /// Look up a normalized token
    pub fn lookup(&self, token: &str) -> Option<&CommandEntry> {
        self.index.get(token).map(|&i| &self.entries[i])
    }

    pub fn contains(&self, token: &str) -> bool {
        self.index.contains_key(token)
    }

    /// Entries in registration order
    pub fn entries(&self) -> &[CommandEntry] {
        &self.entries
    }

    /// Names in registration order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Decide what a raw submitted line means
    pub fn resolve(&self, raw: &str) -> Resolution {
        let token = normalize(raw);

        if token.is_empty() {
            return Resolution::Ignored;
        }
        if token == CLEAR_COMMAND {
            return Resolution::Clear;
        }

        match self.lookup(&token) {
            Some(entry) => {
                let ctx = CommandContext {
                    token: &token,
                    raw,
                    registry: self,
                };
                let outcome = entry.handler.handle(&ctx);
                Resolution::Command { token, outcome }
            }
            None => Resolution::Unknown { token },
        }
    }
}
