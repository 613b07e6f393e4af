//! Incremental per-line highlighting.
//!
//! The editor re-renders after every keystroke. [`Highlighter`] keeps the
//! entry state of each line, re-lexes from the first edited line and stops as
//! soon as a line is reached whose entry state did not change.

use crate::lexer::{classify, LexState, Span};

#[derive(Debug, Clone)]
struct LineEntry {
    text: String,
    entry: LexState,
    exit: LexState,
    spans: Vec<Span>,
    dirty: bool,
}

impl LineEntry {
    fn dirty(text: String) -> Self {
        Self {
            text,
            entry: LexState::default(),
            exit: LexState::default(),
            spans: Vec::new(),
            dirty: true,
        }
    }
}

/// Cached classification of a whole document.
#[derive(Debug, Clone, Default)]
pub struct Highlighter {
    lines: Vec<LineEntry>,
}

impl Highlighter {
    /// Creates an empty highlighter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a highlighter and classifies every line of `text`.
    #[must_use]
    pub fn with_text(text: &str) -> Self {
        let mut highlighter = Self::new();
        let lines: Vec<&str> = text.split('\n').collect();
        highlighter.edit(0, 0, &lines);
        highlighter
    }

    /// Number of lines in the document.
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Spans of a line, if it exists.
    #[must_use]
    pub fn spans(&self, line: usize) -> Option<&[Span]> {
        self.lines.get(line).map(|entry| entry.spans.as_slice())
    }

    /// Text of a line, if it exists.
    #[must_use]
    pub fn line_text(&self, line: usize) -> Option<&str> {
        self.lines.get(line).map(|entry| entry.text.as_str())
    }

    /// State the lexer is in when it reaches `line`.
    ///
    /// Lines past the end report the state after the last line.
    #[must_use]
    pub fn state_before(&self, line: usize) -> LexState {
        match line.checked_sub(1) {
            None => LexState::default(),
            Some(previous) => self
                .lines
                .get(previous)
                .or_else(|| self.lines.last())
                .map(|entry| entry.exit)
                .unwrap_or_default(),
        }
    }

    /// Replaces `removed` lines starting at `start` with `inserted`.
    ///
    /// Returns the number of lines that were re-lexed.
    pub fn edit(&mut self, start: usize, removed: usize, inserted: &[&str]) -> usize {
        let start = start.min(self.lines.len());
        let removed = removed.min(self.lines.len() - start);
        self.lines.splice(
            start..start + removed,
            inserted.iter().map(|text| LineEntry::dirty((*text).to_string())),
        );

        let mut state = self.state_before(start);
        let mut relexed = 0;
        for entry in &mut self.lines[start..] {
            if !entry.dirty && entry.entry == state {
                break;
            }
            let (spans, exit) = classify(&entry.text, &state);
            entry.entry = state;
            entry.exit = exit;
            entry.spans = spans;
            entry.dirty = false;
            state = exit;
            relexed += 1;
        }
        relexed
    }
}
