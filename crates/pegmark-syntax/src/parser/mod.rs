//! # Parser - Event-Based Tree Construction
//!
//! This module holds the token cursor the grammar rules drive. Rules inspect
//! tokens, consume them and emit [`Event`]s; the [`Sink`] turns the events
//! into a [`Tree`](crate::tree::Tree) once the rule has finished.
//!
//! ## The Marker System
//!
//! `parser.start()` reserves a spot in the event list and returns a
//! [`Marker`]. The marker **must** be settled in one of four ways:
//!
//! - `complete(p, KIND)` → the placeholder becomes a `Start`, a `Finish` is
//!   pushed, everything emitted in between becomes the element's children
//! - `abandon(p)` → no element; children emitted since stay where they are
//! - `revert(p, text)` → the placeholder becomes a literal `STR` (used when
//!   an opener such as `[` turns out not to open anything)
//! - `rollback(p)` → backtrack: events *and* token position return to where
//!   the marker was started
//!
//! Dropping an unsettled marker panics. `rollback` is what gives the grammar
//! its PEG flavour: an alternative is tried, and if it fails the input is
//! re-read by the next alternative as if nothing happened.
//!
//! ## Limits
//!
//! Inline rules run over a token sub-range (a heading's text, a paragraph's
//! lines). [`Parser::set_limit`] narrows the visible stream so `at_end()`
//! and `nth()` treat the limit as end of input.

pub mod event;
pub mod sink;

pub(crate) mod grammar;

use crate::element::{Contents, ElementKind};
use crate::engine::{Extensions, SideTables};
use crate::lexer::Token;
use crate::syntax_kind::SyntaxKind;
use event::Event;

pub use sink::Sink;

/// The parser state machine.
///
/// Holds the token stream, current position, and accumulated events.
/// Grammar functions receive `&mut Parser` and use its methods to:
///
/// - Inspect tokens: `current()`, `nth()`, `at()`, `at_end()`
/// - Consume tokens: `bump()`, `eat()`, `bump_as_str()`
/// - Build structure: `start()` → `Marker` → `complete()`/`abandon()`/...
pub struct Parser<'t, 'input> {
    tokens: &'t [Token<'input>],
    pos: usize,
    limit: usize,
    events: Vec<Event>,
    tables: &'t SideTables,
    extensions: Extensions,
}

/// A saved parser position for backtracking without a marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checkpoint {
    pos: usize,
    events: usize,
}

impl<'t, 'input> Parser<'t, 'input> {
    /// Create a new parser over a slice of tokens.
    pub fn new(
        tokens: &'t [Token<'input>],
        tables: &'t SideTables,
        extensions: Extensions,
    ) -> Self {
        Self {
            tokens,
            pos: 0,
            limit: tokens.len(),
            events: Vec::new(),
            tables,
            extensions,
        }
    }

    pub fn extensions(&self) -> Extensions {
        self.extensions
    }

    pub fn tables(&self) -> &SideTables {
        self.tables
    }

    /// Bytes of input covered by the tokens consumed so far.
    pub fn consumed_bytes(&self) -> usize {
        self.tokens[..self.pos].iter().map(|t| t.text.len()).sum()
    }

    /// Consume the parser, returning the events emitted.
    pub fn into_events(self) -> Vec<Event> {
        self.events
    }

    /// Start a new node and return a marker.
    pub fn start(&mut self) -> Marker {
        let checkpoint = self.checkpoint();
        self.events.push(Event::Placeholder);
        Marker {
            checkpoint,
            completed: false,
        }
    }

    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            pos: self.pos,
            events: self.events.len(),
        }
    }

    /// Return to a checkpoint, discarding events emitted since.
    pub fn rewind(&mut self, checkpoint: Checkpoint) {
        self.pos = checkpoint.pos;
        self.events.truncate(checkpoint.events);
    }

    /// Current token position.
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Narrow the visible token stream to end at `limit`, returning the
    /// previous limit so the caller can restore it.
    pub fn set_limit(&mut self, limit: usize) -> usize {
        std::mem::replace(&mut self.limit, limit.min(self.tokens.len()))
    }

    /// Current token kind, or EOF if past end.
    pub fn current(&self) -> SyntaxKind {
        self.nth(0)
    }

    /// Look ahead n tokens.
    pub fn nth(&self, n: usize) -> SyntaxKind {
        self.kind_at(self.pos + n)
    }

    /// Kind of the token at an absolute index, EOF beyond the limit.
    pub fn kind_at(&self, index: usize) -> SyntaxKind {
        if index >= self.limit {
            return SyntaxKind::EOF;
        }
        self.tokens
            .get(index)
            .map(|t| t.kind)
            .unwrap_or(SyntaxKind::EOF)
    }

    /// Text of the token at an absolute index, empty beyond the limit.
    pub fn text_at(&self, index: usize) -> &'input str {
        if index >= self.limit {
            return "";
        }
        self.tokens.get(index).map(|t| t.text).unwrap_or("")
    }

    /// Check if at end of input.
    pub fn at_end(&self) -> bool {
        self.pos >= self.limit
    }

    /// Check if current token is of given kind.
    pub fn at(&self, kind: SyntaxKind) -> bool {
        self.current() == kind
    }

    /// Consume the current token if it matches.
    pub fn eat(&mut self, kind: SyntaxKind) -> bool {
        if self.at(kind) {
            self.bump();
            true
        } else {
            false
        }
    }

    /// Consume the current token unconditionally.
    pub fn bump(&mut self) {
        if !self.at_end() {
            self.pos += 1;
        }
    }

    /// Consume n tokens.
    pub fn bump_n(&mut self, n: usize) {
        for _ in 0..n {
            self.bump();
        }
    }

    /// Get the text of the current token.
    pub fn current_text(&self) -> &'input str {
        self.text_at(self.pos)
    }

    /// Text of the tokens in `from..to`.
    pub fn text(&self, from: usize, to: usize) -> String {
        let to = to.min(self.limit).min(self.tokens.len());
        if from >= to {
            return String::new();
        }
        self.tokens[from..to].iter().map(|t| t.text).collect()
    }

    /// Emit an event.
    pub fn push(&mut self, event: Event) {
        self.events.push(event);
    }

    /// Emit a childless element.
    pub fn leaf(&mut self, kind: ElementKind, contents: Contents) {
        self.events.push(Event::leaf(kind, contents));
    }

    /// Emit literal text, extending the previous `STR` if it is the last
    /// event.
    pub fn push_str(&mut self, text: &str) {
        if let Some(Event::Leaf {
            kind: ElementKind::STR,
            contents: Contents::Text(last),
        }) = self.events.last_mut()
        {
            last.push_str(text);
            return;
        }
        self.events.push(Event::str(text));
    }

    /// Emit the current token as literal text and consume it.
    pub fn bump_as_str(&mut self) {
        let text = self.current_text();
        self.push_str(text);
        self.bump();
    }

    // === Line helpers ===
    //
    // Block rules work a line at a time. These take absolute token indices
    // so rules can look ahead several lines without moving the cursor.

    /// Index of the NEWLINE ending the line that contains `index`, or the
    /// limit if the line is unterminated.
    pub fn line_end(&self, index: usize) -> usize {
        (index..self.limit)
            .find(|&i| self.kind_at(i) == SyntaxKind::NEWLINE)
            .unwrap_or(self.limit)
    }

    /// Index of the first token of the line after the one at `index`.
    pub fn next_line(&self, index: usize) -> usize {
        (self.line_end(index) + 1).min(self.limit)
    }

    /// True if the line starting at `index` holds only whitespace.
    pub fn is_blank_line(&self, index: usize) -> bool {
        index < self.limit
            && (index..self.line_end(index)).all(|i| self.kind_at(i) == SyntaxKind::WHITESPACE)
    }

    /// Width of the leading whitespace of the line starting at `index`.
    pub fn indent_at(&self, index: usize) -> usize {
        if self.kind_at(index) == SyntaxKind::WHITESPACE {
            whitespace_width(self.text_at(index))
        } else {
            0
        }
    }

    /// Full text of the line starting at `index`, including its newline.
    pub fn line_text(&self, index: usize) -> String {
        self.text(index, self.next_line(index))
    }

    /// Index of the first non-whitespace token at or after `index`.
    pub fn skip_whitespace_at(&self, index: usize) -> usize {
        if self.kind_at(index) == SyntaxKind::WHITESPACE {
            index + 1
        } else {
            index
        }
    }

    /// True at the start of a line.
    pub fn at_line_start(&self) -> bool {
        self.pos == 0 || self.kind_at(self.pos - 1) == SyntaxKind::NEWLINE
    }

    /// Move the cursor to an absolute token index.
    pub fn jump(&mut self, index: usize) {
        self.pos = index.min(self.limit);
    }

    /// Consume consecutive blank lines, returning their text.
    pub fn bump_blank_lines(&mut self) -> String {
        let start = self.pos;
        while self.is_blank_line(self.pos) {
            let next = self.next_line(self.pos);
            self.jump(next);
        }
        self.text(start, self.pos)
    }
}

/// Column width of a whitespace run, with tabs counting four.
pub fn whitespace_width(text: &str) -> usize {
    text.chars().map(|c| if c == '\t' { 4 } else { 1 }).sum()
}

/// A marker for a node being constructed.
///
/// When you call `parser.start()`, a `Placeholder` event is pushed and you
/// get a `Marker` pointing to it. Every marker must be settled through
/// `complete`, `complete_with`, `abandon`, `revert` or `rollback`; dropping
/// one unsettled panics.
#[must_use = "Markers must be completed or abandoned, dropping them is a bug"]
pub struct Marker {
    /// Parser state when the marker was started; the placeholder sits at
    /// `checkpoint.events`.
    checkpoint: Checkpoint,
    /// Tracks whether the marker has been settled
    completed: bool,
}

impl Marker {
    /// Complete this marker, creating an element of the given kind.
    pub fn complete(self, p: &mut Parser<'_, '_>, kind: ElementKind) {
        self.complete_with(p, kind, Contents::Empty);
    }

    /// Complete this marker with a payload.
    pub fn complete_with(mut self, p: &mut Parser<'_, '_>, kind: ElementKind, contents: Contents) {
        self.completed = true;
        let event_at_pos = &mut p.events[self.checkpoint.events];
        assert!(matches!(event_at_pos, Event::Placeholder));
        *event_at_pos = Event::Start { kind, contents };
        p.events.push(Event::Finish);
    }

    /// Abandon this marker without creating an element.
    ///
    /// Events pushed after `start()` stay in place; the placeholder becomes
    /// inert (or is removed if nothing followed it).
    pub fn abandon(mut self, p: &mut Parser<'_, '_>) {
        self.completed = true;
        if self.checkpoint.events == p.events.len() - 1 {
            match p.events.pop() {
                Some(Event::Placeholder) => {}
                _ => unreachable!(),
            }
        }
    }

    /// Turn the placeholder into literal text, keeping the events and token
    /// position that followed it.
    pub fn revert(mut self, p: &mut Parser<'_, '_>, text: &str) {
        self.completed = true;
        p.events[self.checkpoint.events] = Event::str(text);
    }

    /// Backtrack to the state at `start()`.
    pub fn rollback(mut self, p: &mut Parser<'_, '_>) {
        self.completed = true;
        p.rewind(self.checkpoint);
    }
}

impl Drop for Marker {
    fn drop(&mut self) {
        if !self.completed && !std::thread::panicking() {
            panic!("Marker must be either completed or abandoned");
        }
    }
}
