//! Transcript Store
//!
//! Append-only log of transcript lines. The only destructive operation is a
//! full clear. Every mutation bumps a revision published on a `watch`
//! channel, which the presentation layer treats as "scroll to the newest
//! line now".

use tokio::sync::watch;

use crate::models::TranscriptLine;

/// Ordered, append-only line log owned by one session
#[derive(Debug)]
pub struct Transcript {
    /// Lines in insertion order
    lines: Vec<TranscriptLine>,
    /// Autoscroll signal, carries the mutation revision
    scroll_tx: watch::Sender<u64>,
}

impl Transcript {
    /// Create an empty transcript
    pub fn new() -> Self {
        let (scroll_tx, _) = watch::channel(0);
        Self {
            lines: Vec::new(),
            scroll_tx,
        }
    }

    /// Append one line
    pub fn append(&mut self, line: TranscriptLine) {
        self.lines.push(line);
        self.signal_scroll();
    }

    /// Append a batch of lines with a single autoscroll signal.
    /// An empty batch is not a mutation.
    pub fn append_all<I>(&mut self, lines: I)
    where
        I: IntoIterator<Item = TranscriptLine>,
    {
        let before = self.lines.len();
        self.lines.extend(lines);
        if self.lines.len() != before {
            self.signal_scroll();
        }
    }

    /// Remove every line
    pub fn clear(&mut self) {
        self.lines.clear();
        self.signal_scroll();
    }

    /// All lines, oldest first
    pub fn lines(&self) -> &[TranscriptLine] {
        &self.lines
    }

    /// Newest line
    pub fn last(&self) -> Option<&TranscriptLine> {
        self.lines.last()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Number of mutations so far
    pub fn revision(&self) -> u64 {
        *self.scroll_tx.borrow()
    }

    /// Subscribe to the autoscroll signal
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.scroll_tx.subscribe()
    }

    fn signal_scroll(&self) {
        // send_modify notifies even with no receivers alive
        self.scroll_tx.send_modify(|revision| *revision += 1);
    }
}

impl Default for Transcript {
    fn default() -> Self {
        Self::new()
    }
}
