//! # Parser Events
//!
//! Events are the intermediate representation between parsing and tree
//! building. Grammar rules never touch the [`Tree`](crate::tree::Tree)
//! directly; they emit a **flat sequence** of events that the
//! [`Sink`](super::sink::Sink) replays into the arena.
//!
//! ```text
//! Start(H1)
//!   Leaf(STR "Title")
//! Finish
//! ```
//!
//! Keeping the output flat is what makes backtracking cheap: a rule that
//! fails after emitting events just truncates the event vector back to where
//! it started.

use crate::element::{Contents, ElementKind};

/// An event emitted by the parser during tree construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Begin a new element that will receive the following events as
    /// children until the matching `Finish`.
    Start {
        kind: ElementKind,
        contents: Contents,
    },

    /// A childless element.
    Leaf {
        kind: ElementKind,
        contents: Contents,
    },

    /// Finish the current element.
    Finish,

    /// A placeholder that will be replaced.
    ///
    /// When `parser.start()` is called, a `Placeholder` is pushed. Later,
    /// `marker.complete()` replaces it with a real `Start`, `revert()` turns
    /// it into literal text, or `rollback()` removes it together with
    /// everything emitted after it.
    Placeholder,
}

impl Event {
    /// Create a start event with no contents.
    pub fn start(kind: ElementKind) -> Self {
        Event::Start {
            kind,
            contents: Contents::Empty,
        }
    }

    pub fn leaf(kind: ElementKind, contents: Contents) -> Self {
        Event::Leaf { kind, contents }
    }

    /// A `STR` leaf.
    pub fn str(text: impl Into<String>) -> Self {
        Event::Leaf {
            kind: ElementKind::STR,
            contents: Contents::Text(text.into()),
        }
    }
}
