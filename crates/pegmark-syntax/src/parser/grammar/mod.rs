//! # Grammar Rules
//!
//! This module contains the grammar rules that drive parsing. Each function
//! takes a `&mut Parser` and uses its methods to:
//!
//! 1. Inspect tokens (`p.current()`, `p.at()`, `p.nth()`, the line helpers)
//! 2. Consume tokens (`p.bump()`, `p.eat()`, `p.jump()`)
//! 3. Build tree structure (`p.start()` → marker → `complete()`/`rollback()`)
//!
//! ## Module Structure
//!
//! - [`block`] - Block-level elements (headings, paragraphs, lists, quotes,
//!   definitions)
//! - [`inline`] - Inline elements (emphasis, links, code spans, notes,
//!   smart punctuation)
//!
//! ## Ordered Choice
//!
//! Rules are tried in a fixed order and the first one that matches wins,
//! PEG style. A rule that turns out not to match rolls its marker back, so
//! the next alternative sees the input untouched. Malformed input never
//! fails: the last alternative for a block is a plain paragraph and the last
//! alternative for an inline is a literal `STR`.
//!
//! ## Deferred Blocks
//!
//! List items and block quotes are not parsed recursively here. Their
//! content (indentation and `>` markers stripped) is emitted as a single
//! `RAW` child, with [`RawPiece::Split`](crate::element::RawPiece::Split)
//! between blocks that were not separated by a blank line. The driver
//! re-parses that text later with [`doc`].

mod block;
mod inline;

use crate::element::LinkTarget;
use crate::parser::Parser;

/// Collect link reference definitions from the whole buffer.
pub fn references(p: &mut Parser<'_, '_>) -> Vec<(String, LinkTarget)> {
    let mut found = Vec::new();
    while !p.at_end() {
        match block::reference_definition(p, p.pos()) {
            Some(definition) => {
                p.jump(definition.end);
                p.bump_blank_lines();
                found.push((definition.label, definition.target));
            }
            None => block::skip_block(p),
        }
    }
    found
}

/// Collect note definitions from the whole buffer.
pub fn notes(p: &mut Parser<'_, '_>) -> Vec<(String, String)> {
    let mut found = Vec::new();
    while !p.at_end() {
        match block::note_definition(p, p.pos()) {
            Some(note) => {
                p.jump(note.end);
                found.push((note.label, note.text));
            }
            None => block::skip_block(p),
        }
    }
    found
}

/// One block, after any blank lines.
pub fn docblock(p: &mut Parser<'_, '_>) {
    p.bump_blank_lines();
    if !p.at_end() {
        block::block(p);
    }
}

/// Every block in the buffer.
pub fn doc(p: &mut Parser<'_, '_>) {
    loop {
        p.bump_blank_lines();
        if p.at_end() {
            break;
        }
        block::block(p);
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{Extensions, SideTables};
    use crate::lexer::lex;
    use pretty_assertions::assert_eq;

    fn scan<R>(input: &str, extensions: Extensions, f: impl FnOnce(&mut Parser<'_, '_>) -> R) -> R {
        let tokens = lex(input);
        let tables = SideTables::default();
        let mut p = Parser::new(&tokens, &tables, extensions);
        let result = f(&mut p);
        assert!(p.at_end(), "scanning rules consume the whole buffer");
        result
    }

    #[test]
    fn references_skip_paragraphs() {
        let input = "Intro line\n[hidden]: /no\n\n[Shown]: /yes 'T'\n\n# H\n[after]: /h\n";
        let found = scan(input, Extensions::default(), references);
        let labels: Vec<_> = found.iter().map(|(label, _)| label.as_str()).collect();
        assert_eq!(labels, vec!["Shown", "after"]);
        assert_eq!(
            found[0].1,
            LinkTarget {
                url: "/yes".into(),
                title: "T".into()
            }
        );
    }

    #[test]
    fn note_definitions_are_references_without_the_extension() {
        let input = "[^1]: /target\n\n";
        let found = scan(input, Extensions::default(), references);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].0, "^1");

        let notes_on = Extensions {
            notes: true,
            ..Extensions::default()
        };
        assert!(scan(input, notes_on, references).is_empty());
    }

    #[test]
    fn notes_collect_indented_continuations() {
        let extensions = Extensions {
            notes: true,
            ..Extensions::default()
        };
        let input = "Text.\n\n[^n]: First\nline.\n\n    Second.\n\nAfter.\n";
        let found = scan(input, extensions, notes);
        assert_eq!(
            found,
            vec![("n".to_owned(), "First\nline.\n\n\nSecond.\n\n\n".to_owned())]
        );
    }

    #[test]
    fn docblock_parses_one_block() {
        let tokens = lex("\n\npara\n\nnext\n");
        let tables = SideTables::default();
        let mut p = Parser::new(&tokens, &tables, Extensions::default());
        docblock(&mut p);
        assert_eq!(p.consumed_bytes(), "\n\npara\n\n".len());
    }
}
