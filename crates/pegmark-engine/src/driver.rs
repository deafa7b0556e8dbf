//! # Document Driver
//!
//! The driver runs a grammar engine over one document in ordered passes:
//!
//! ```text
//! Init ─► References ─► Notes ─► BlockLoop ─► Done
//!                   └─(notes off)─┘
//! ```
//!
//! 1. **Init**: the input is read and tab-expanded once.
//! 2. **References**: the whole text is scanned for link reference
//!    definitions.
//! 3. **Notes**: with the notes extension, the whole text is scanned again
//!    for note definitions.
//! 4. **BlockLoop**: one top-level block is parsed at a time. The engine's
//!    remainder after each block is the text for the next one; raw blocks
//!    in each tree are resolved before the tree goes to the formatter. The
//!    loop stops once the remainder is one of [`TERMINAL_REMAINDERS`].
//! 5. **Done**: the formatter is finished.
//!
//! Every rule invocation first checks that the previous one consumed its
//! whole buffer. Any error aborts the document; the engine session is
//! cleared either way, so the driver can take the next document.

use std::io::Read;

use log::{debug, trace};
use pegmark_syntax::{Engine, Extensions, GrammarEngine, Rule, Tree};

use crate::error::DriverError;
use crate::format::Formatter;
use crate::preformat::Preformatter;
use crate::resolve::resolve;

/// Remainders that leave nothing worth another docblock.
pub const TERMINAL_REMAINDERS: [&str; 7] =
    ["", "\n", "\r\n", "\n\n", "\r\n\n", "\n\n\n", "\r\n\n\n"];

pub fn is_terminal(remainder: &str) -> bool {
    TERMINAL_REMAINDERS.contains(&remainder)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Init,
    References,
    Notes,
    BlockLoop,
    Done,
}

/// Feed `text` to the engine and match `rule` against it.
///
/// Fails with [`DriverError::BufferNotEmpty`] if the previous invocation
/// left text behind.
pub fn parse_rule<E: GrammarEngine + ?Sized>(
    engine: &mut E,
    rule: Rule,
    text: String,
) -> Result<Option<Tree>, DriverError> {
    let remainder = engine.reset_buffer(text);
    if !remainder.is_empty() {
        return Err(DriverError::BufferNotEmpty { rule, remainder });
    }
    Ok(engine.parse(rule)?)
}

/// Sequentially reusable Markdown parser.
pub struct Driver<E: GrammarEngine = Engine> {
    preformatter: Preformatter,
    engine: E,
    phase: Phase,
}

impl Driver<Engine> {
    pub fn new(extensions: Extensions) -> Self {
        Self::with_engine(Engine::new(extensions))
    }
}

impl<E: GrammarEngine> Driver<E> {
    pub fn with_engine(engine: E) -> Self {
        Self {
            preformatter: Preformatter::new(),
            engine,
            phase: Phase::Init,
        }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn extensions(&self) -> Extensions {
        self.engine.extensions()
    }

    /// The phase the last document reached.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Parse `src` and hand every top-level block to `formatter`, in
    /// document order, then finish it.
    pub fn markdown<R, F>(&mut self, src: R, formatter: &mut F) -> Result<(), DriverError>
    where
        R: Read,
        F: Formatter + ?Sized,
    {
        let result = self.run(src, formatter);
        self.engine.clear();
        if let Err(e) = &result {
            debug!("document aborted in phase {:?}: {e}", self.phase);
        }
        result
    }

    fn run<R, F>(&mut self, src: R, formatter: &mut F) -> Result<(), DriverError>
    where
        R: Read,
        F: Formatter + ?Sized,
    {
        self.enter(Phase::Init);
        let text = self.preformatter.preformat(src).map_err(DriverError::Read)?;

        self.enter(Phase::References);
        parse_rule(&mut self.engine, Rule::References, text.clone())?;

        if self.engine.extensions().notes {
            self.enter(Phase::Notes);
            parse_rule(&mut self.engine, Rule::Notes, text.clone())?;
        }

        self.enter(Phase::BlockLoop);
        let mut remainder = text;
        loop {
            let tree = parse_rule(&mut self.engine, Rule::Docblock, remainder)?;
            remainder = self.engine.reset_buffer(String::new());

            if let Some(mut tree) = tree {
                resolve(&mut self.engine, &mut tree)?;
                trace!("docblock with {} top-level elements", tree.roots().len());
                formatter.format_block(tree).map_err(DriverError::Format)?;
            }

            if is_terminal(&remainder) {
                break;
            }
        }

        self.enter(Phase::Done);
        formatter.finish().map_err(DriverError::Format)
    }

    fn enter(&mut self, phase: Phase) {
        debug!("driver phase {:?} -> {phase:?}", self.phase);
        self.phase = phase;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("")]
    #[case("\n")]
    #[case("\r\n")]
    #[case("\n\n")]
    #[case("\r\n\n")]
    #[case("\n\n\n")]
    #[case("\r\n\n\n")]
    fn terminal_remainders(#[case] remainder: &str) {
        assert!(is_terminal(remainder));
    }

    #[rstest]
    #[case("x")]
    #[case("\n\n\n\n")]
    #[case(" \n")]
    #[case("\r\n\r\n")]
    fn non_terminal_remainders(#[case] remainder: &str) {
        assert!(!is_terminal(remainder));
    }

    #[test]
    fn parse_rule_rejects_leftover_buffer() {
        let mut engine = Engine::new(Extensions::default());
        engine.reset_buffer("one\n\ntwo\n".to_owned());
        engine.parse(Rule::Docblock).unwrap();

        let err = parse_rule(&mut engine, Rule::Doc, "x\n".to_owned()).unwrap_err();

        assert!(matches!(
            err,
            DriverError::BufferNotEmpty { rule: Rule::Doc, ref remainder } if remainder == "two\n"
        ));
    }
}
