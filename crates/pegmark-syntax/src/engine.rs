//! # Grammar Engine Session
//!
//! The engine owns a working buffer and matches named rules against a
//! prefix of it. Each [`GrammarEngine::parse`] call consumes what the rule
//! matched; what is left over is the **remainder**, handed back by the next
//! [`GrammarEngine::reset_buffer`] call.
//!
//! ```
//! use pegmark_syntax::{Engine, Extensions, GrammarEngine, Rule};
//!
//! let mut engine = Engine::new(Extensions::default());
//! engine.reset_buffer("# Title\n\nBody.\n\n".to_owned());
//!
//! let heading = engine.parse(Rule::Docblock).unwrap().unwrap();
//! assert_eq!(heading.roots().len(), 1);
//!
//! // The heading rule stopped after its own line.
//! assert_eq!(engine.reset_buffer(String::new()), "\nBody.\n\n");
//! ```
//!
//! The reference and notes rules produce no tree; they fill the session's
//! [`SideTables`], which later block parses consult when resolving
//! `[text][label]` links and `[^label]` note references.

use std::collections::HashMap;
use std::fmt;

use thiserror::Error;

use crate::element::LinkTarget;
use crate::lexer::lex;
use crate::parser::{Parser, Sink, grammar};
use crate::tree::Tree;

/// Named entry points of the grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rule {
    /// Scan the whole buffer for link reference definitions.
    References,
    /// Scan the whole buffer for note definitions.
    Notes,
    /// One top-level block.
    Docblock,
    /// Every block in the buffer.
    Doc,
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Rule::References => "References",
            Rule::Notes => "Notes",
            Rule::Docblock => "Docblock",
            Rule::Doc => "Doc",
        };
        f.write_str(name)
    }
}

/// Syntax extensions, fixed for the lifetime of a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Extensions {
    /// Typographic quotes, dashes and ellipses.
    pub smart: bool,
    /// `[^label]` notes and `^[inline notes]`.
    pub notes: bool,
    /// Drop raw HTML blocks and inline HTML.
    pub filter_html: bool,
    /// Drop `<style>` blocks.
    pub filter_styles: bool,
    /// Definition lists.
    pub dlists: bool,
}

/// Errors a rule invocation can fail with.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("rule {rule} matched nothing at byte {offset}")]
    NoProgress { rule: Rule, offset: usize },
}

/// Definitions collected by the reference and notes passes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SideTables {
    references: HashMap<String, LinkTarget>,
    notes: HashMap<String, String>,
}

impl SideTables {
    /// Register a link reference; the first definition of a label wins.
    pub fn add_reference(&mut self, label: &str, target: LinkTarget) {
        self.references
            .entry(normalize_label(label))
            .or_insert(target);
    }

    /// Register a note; the first definition of a label wins.
    pub fn add_note(&mut self, label: &str, text: String) {
        self.notes.entry(normalize_label(label)).or_insert(text);
    }

    pub fn reference(&self, label: &str) -> Option<&LinkTarget> {
        self.references.get(&normalize_label(label))
    }

    pub fn note(&self, label: &str) -> Option<&str> {
        self.notes.get(&normalize_label(label)).map(String::as_str)
    }

    pub fn reference_count(&self) -> usize {
        self.references.len()
    }

    pub fn note_count(&self) -> usize {
        self.notes.len()
    }

    pub fn clear(&mut self) {
        self.references.clear();
        self.notes.clear();
    }
}

/// Labels match case-insensitively with whitespace runs collapsed.
pub fn normalize_label(label: &str) -> String {
    label
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// The interface the document driver uses to talk to a grammar engine.
pub trait GrammarEngine {
    /// Replace the working buffer, returning whatever the previous rule left
    /// unconsumed.
    fn reset_buffer(&mut self, text: String) -> String;

    /// Match `rule` against a prefix of the working buffer.
    ///
    /// Document rules return the elements they matched (`None` if nothing
    /// but blank lines was consumed); scanning rules always return `None`.
    fn parse(&mut self, rule: Rule) -> Result<Option<Tree>, EngineError>;

    fn extensions(&self) -> Extensions;

    /// Forget per-document state: side tables and any unconsumed buffer.
    fn clear(&mut self);
}

/// The built-in Markdown grammar engine.
#[derive(Debug, Default)]
pub struct Engine {
    buffer: String,
    pos: usize,
    extensions: Extensions,
    tables: SideTables,
}

impl Engine {
    pub fn new(extensions: Extensions) -> Self {
        Self {
            extensions,
            ..Self::default()
        }
    }

    pub fn tables(&self) -> &SideTables {
        &self.tables
    }

    /// The unconsumed part of the working buffer.
    pub fn remainder(&self) -> &str {
        &self.buffer[self.pos..]
    }
}

impl GrammarEngine for Engine {
    fn reset_buffer(&mut self, text: String) -> String {
        let previous = std::mem::replace(&mut self.buffer, text);
        let remainder = previous[self.pos..].to_owned();
        self.pos = 0;
        remainder
    }

    fn parse(&mut self, rule: Rule) -> Result<Option<Tree>, EngineError> {
        let input = &self.buffer[self.pos..];
        if input.is_empty() {
            return Ok(None);
        }

        let tokens = lex(input);
        let mut p = Parser::new(&tokens, &self.tables, self.extensions);

        let mut references = Vec::new();
        let mut notes = Vec::new();
        match rule {
            Rule::References => references = grammar::references(&mut p),
            Rule::Notes => notes = grammar::notes(&mut p),
            Rule::Docblock => grammar::docblock(&mut p),
            Rule::Doc => grammar::doc(&mut p),
        }

        let consumed = p.consumed_bytes();
        if consumed == 0 {
            return Err(EngineError::NoProgress {
                rule,
                offset: self.pos,
            });
        }
        let events = p.into_events();
        self.pos += consumed;

        for (label, target) in references {
            self.tables.add_reference(&label, target);
        }
        for (label, text) in notes {
            self.tables.add_note(&label, text);
        }

        let tree = Sink::new(events).finish();
        Ok((!tree.is_empty()).then_some(tree))
    }

    fn extensions(&self) -> Extensions {
        self.extensions
    }

    fn clear(&mut self) {
        self.buffer.clear();
        self.pos = 0;
        self.tables.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::ElementKind;
    use pretty_assertions::assert_eq;

    fn engine_with(text: &str) -> Engine {
        let mut engine = Engine::new(Extensions::default());
        engine.reset_buffer(text.to_owned());
        engine
    }

    #[test]
    fn reset_buffer_returns_remainder() {
        let mut engine = engine_with("one\n\ntwo\n\n");
        engine.parse(Rule::Docblock).unwrap();
        assert_eq!(engine.remainder(), "two\n\n");
        assert_eq!(engine.reset_buffer(String::new()), "two\n\n");
        assert_eq!(engine.remainder(), "");
    }

    #[test]
    fn references_consume_whole_buffer() {
        let mut engine = engine_with("[a]: /url \"Title\"\n\nText [a].\n\n");
        let tree = engine.parse(Rule::References).unwrap();
        assert!(tree.is_none());
        assert_eq!(engine.reset_buffer(String::new()), "");
        assert_eq!(
            engine.tables().reference("A"),
            Some(&LinkTarget {
                url: "/url".into(),
                title: "Title".into()
            })
        );
    }

    #[test]
    fn doc_parses_every_block() {
        let mut engine = engine_with("# H\n\npara\n\n---\n");
        let tree = engine.parse(Rule::Doc).unwrap().unwrap();
        let kinds: Vec<_> = tree.roots().iter().map(|&id| tree[id].kind).collect();
        assert_eq!(
            kinds,
            vec![ElementKind::H1, ElementKind::PARA, ElementKind::HRULE]
        );
        assert_eq!(engine.remainder(), "");
    }

    #[test]
    fn blank_buffer_yields_no_tree() {
        let mut engine = engine_with("\n\n");
        assert_eq!(engine.parse(Rule::Docblock).unwrap(), None);
        assert_eq!(engine.remainder(), "");
    }

    #[test]
    fn empty_buffer_yields_no_tree() {
        let mut engine = engine_with("");
        assert_eq!(engine.parse(Rule::Doc).unwrap(), None);
    }

    #[test]
    fn clear_forgets_definitions_and_buffer() {
        let mut engine = engine_with("[a]: /u\n\n");
        engine.parse(Rule::References).unwrap();
        engine.reset_buffer("left over".to_owned());
        engine.clear();
        assert_eq!(engine.tables().reference_count(), 0);
        assert_eq!(engine.reset_buffer(String::new()), "");
    }

    #[test]
    fn labels_normalize() {
        assert_eq!(normalize_label("  Foo \n Bar "), "foo bar");
    }
}
