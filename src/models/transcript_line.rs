//! Transcript Line Model
//!
//! A single line of simulated terminal output. Lines carry a rendering tag
//! (`LineKind`) instead of raw escape sequences, plus an optional list of
//! terms the presentation layer should emphasise.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Rendering tag for a transcript line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LineKind {
    /// Runtime chatter (boot messages, countdown ticks)
    System,
    /// Positive outcome
    Success,
    /// Neutral information
    Info,
    /// Attention, usually a header or an announced side effect
    Warning,
    /// Failure, e.g. an unknown command
    Error,
    /// Echo of something the visitor typed
    Input,
    /// Untagged text
    #[default]
    Plain,
}

impl LineKind {
    /// Short name used in logs and by text renderers
    pub fn as_str(&self) -> &'static str {
        match self {
            LineKind::System => "system",
            LineKind::Success => "success",
            LineKind::Info => "info",
            LineKind::Warning => "warning",
            LineKind::Error => "error",
            LineKind::Input => "input",
            LineKind::Plain => "plain",
        }
    }
}

/// Piece of a line after highlight splitting
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment<'a> {
    /// Text of this piece
    pub text: &'a str,
    /// Whether this piece is one of the highlight terms
    pub highlighted: bool,
}

/// One immutable line of a session transcript
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptLine {
    /// The text content
    pub text: String,

    /// Rendering tag
    pub kind: LineKind,

    /// Terms to emphasise, applied in order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub highlight_terms: Vec<String>,

    /// When this line was created
    pub timestamp: DateTime<Utc>,
}

impl TranscriptLine {
    /// Create a new line of the given kind
    pub fn new(text: impl Into<String>, kind: LineKind) -> Self {
        Self {
            text: text.into(),
            kind,
            highlight_terms: Vec::new(),
            timestamp: Utc::now(),
        }
    }

    pub fn plain(text: impl Into<String>) -> Self {
        Self::new(text, LineKind::Plain)
    }

    pub fn system(text: impl Into<String>) -> Self {
        Self::new(text, LineKind::System)
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self::new(text, LineKind::Success)
    }

    pub fn info(text: impl Into<String>) -> Self {
        Self::new(text, LineKind::Info)
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self::new(text, LineKind::Warning)
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self::new(text, LineKind::Error)
    }

    pub fn input(text: impl Into<String>) -> Self {
        Self::new(text, LineKind::Input)
    }

    /// Empty spacer line
    pub fn blank() -> Self {
        Self::plain(String::new())
    }

    /// Attach highlight terms
    pub fn with_highlights<I, S>(mut self, terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.highlight_terms = terms.into_iter().map(Into::into).collect();
        self
    }

    /// Check whether the line is an empty spacer
    pub fn is_blank(&self) -> bool {
        self.text.is_empty()
    }

    /// Split the text into plain and highlighted segments.
    ///
    /// Terms are applied in order and each one only splits the parts that
    /// are still plain. Empty plain fragments are dropped.
    pub fn segments(&self) -> Vec<Segment<'_>> {
        let mut parts = vec![Segment {
            text: self.text.as_str(),
            highlighted: false,
        }];

        for term in self.highlight_terms.iter().filter(|t| !t.is_empty()) {
            let mut next = Vec::with_capacity(parts.len());
            for part in parts {
                if part.highlighted {
                    next.push(part);
                    continue;
                }

                let mut pieces = part.text.split(term.as_str()).peekable();
                while let Some(piece) = pieces.next() {
                    if !piece.is_empty() {
                        next.push(Segment {
                            text: piece,
                            highlighted: false,
                        });
                    }
                    if pieces.peek().is_some() {
                        next.push(Segment {
                            text: term.as_str(),
                            highlighted: true,
                        });
                    }
                }
            }
            parts = next;
        }

        parts
    }
}

impl PartialEq for TranscriptLine {
    // Timestamps are informational; two lines are the same line if they
    // would render the same.
    fn eq(&self, other: &Self) -> bool {
        self.text == other.text
            && self.kind == other.kind
            && self.highlight_terms == other.highlight_terms
    }
}

impl Eq for TranscriptLine {}

impl Default for TranscriptLine {
    fn default() -> Self {
        Self::blank()
    }
}

impl From<String> for TranscriptLine {
    fn from(text: String) -> Self {
        Self::plain(text)
    }
}

impl From<&str> for TranscriptLine {
    fn from(text: &str) -> Self {
        Self::plain(text)
    }
}
