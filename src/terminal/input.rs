//! Single-line Input Control
//!
//! Assembles keystrokes into a line and tracks whether the control may be
//! used and focused. The owning session flips `enabled` as its phase changes;
//! edits made while disabled are dropped.

/// How focus should be acquired
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FocusOptions {
    /// Acquire focus without scrolling the page; only the transcript
    /// container is allowed to scroll.
    pub prevent_scroll: bool,
}

impl FocusOptions {
    /// The only mode the engine ever requests
    pub const PREVENT_SCROLL: FocusOptions = FocusOptions {
        prevent_scroll: true,
    };
}

/// Result of feeding one key to the input control
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputResult {
    /// Buffer content changed
    TextChanged,
    /// Enter was pressed; carries the raw submitted line
    LineReady(String),
    /// Key had no effect
    NoOp,
    /// Control is disabled, key dropped
    Disabled,
}

/// Single-line text input owned by one session
#[derive(Debug, Clone)]
pub struct InputControl {
    /// Current text
    buffer: String,
    /// Cursor position in characters
    cursor: usize,
    /// Whether the control is interactable
    enabled: bool,
    /// Number of focus requests issued so far
    focus_requests: u64,
    /// Options of the latest focus request
    last_focus: Option<FocusOptions>,
}

impl InputControl {
    /// Create a disabled, empty control
    pub fn new() -> Self {
        Self {
            buffer: String::new(),
            cursor: 0,
            enabled: false,
            focus_requests: 0,
            last_focus: None,
        }
    }

    /// Process a single character
    pub fn process_char(&mut self, ch: char) -> InputResult {
        if !self.enabled {
            return InputResult::Disabled;
        }

        match ch {
            '\n' | '\r' => InputResult::LineReady(self.take()),
            '\x7f' | '\x08' => self.backspace(),
            ch if ch.is_control() => InputResult::NoOp,
            ch => self.insert_char(ch),
        }
    }

    /// Insert character at the cursor
    fn insert_char(&mut self, ch: char) -> InputResult {
        let at = self.byte_offset(self.cursor);
        self.buffer.insert(at, ch);
        self.cursor += 1;
        InputResult::TextChanged
    }

    /// Delete the character before the cursor
    pub fn backspace(&mut self) -> InputResult {
        if !self.enabled {
            return InputResult::Disabled;
        }
        if self.cursor == 0 {
            return InputResult::NoOp;
        }

        let at = self.byte_offset(self.cursor - 1);
        self.buffer.remove(at);
        self.cursor -= 1;
        InputResult::TextChanged
    }

    /// Replace the whole buffer, cursor at the end
    pub fn set_text(&mut self, text: &str) -> InputResult {
        if !self.enabled {
            return InputResult::Disabled;
        }
        self.buffer = text.replace(['\n', '\r'], "");
        self.cursor = self.buffer.chars().count();
        InputResult::TextChanged
    }

    /// Take the buffer, leaving the control empty
    pub fn take(&mut self) -> String {
        self.cursor = 0;
        std::mem::take(&mut self.buffer)
    }

    /// Clear the buffer
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.cursor = 0;
    }

    /// Current text
    pub fn text(&self) -> &str {
        &self.buffer
    }

    /// Cursor position in characters
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Enable or disable the control. Disabling keeps the buffer.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Ask the presentation layer to focus the control.
    /// Ignored while disabled.
    pub fn request_focus(&mut self, options: FocusOptions) -> bool {
        if !self.enabled {
            return false;
        }
        self.focus_requests += 1;
        self.last_focus = Some(options);
        true
    }

    /// Number of focus requests issued so far
    pub fn focus_requests(&self) -> u64 {
        self.focus_requests
    }

    /// Options of the most recent focus request
    pub fn last_focus(&self) -> Option<FocusOptions> {
        self.last_focus
    }

    fn byte_offset(&self, char_index: usize) -> usize {
        self.buffer
            .char_indices()
            .nth(char_index)
            .map(|(i, _)| i)
            .unwrap_or(self.buffer.len())
    }
}

impl Default for InputControl {
    fn default() -> Self {
        Self::new()
    }
}
